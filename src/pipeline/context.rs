// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Per-run pipeline state

use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};

/// Counts finished boolean operations and measures reduction time
pub struct BooleanTimer {
    show_progress: bool,
    total: usize,
    done: usize,
    started: Option<Instant>,
    stopped: Option<Duration>,
    progress: Option<ProgressBar>,
}

impl BooleanTimer {
    pub fn new(show_progress: bool) -> Self {
        Self {
            show_progress,
            total: 0,
            done: 0,
            started: None,
            stopped: None,
            progress: None,
        }
    }

    /// Start timing a reduction of `nbool` operations
    pub fn init(&mut self, nbool: usize) {
        self.total = nbool;
        self.done = 0;
        self.started = Some(Instant::now());
        self.stopped = None;

        self.progress = if self.show_progress && nbool > 0 {
            let pb = ProgressBar::new(nbool as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} booleans")
            {
                pb.set_style(style.progress_chars("#>-"));
            }
            Some(pb)
        } else {
            None
        };
    }

    pub fn step(&mut self) {
        self.done += 1;
        if let Some(ref pb) = self.progress {
            pb.inc(1);
        }
    }

    pub fn steps(&self) -> usize {
        self.done
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Time since `init`, frozen once `finish` is called
    pub fn elapsed(&self) -> Duration {
        match (self.stopped, self.started) {
            (Some(stopped), _) => stopped,
            (None, Some(started)) => started.elapsed(),
            (None, None) => Duration::ZERO,
        }
    }

    pub fn finish(&mut self) {
        self.stopped = Some(self.elapsed());
        if let Some(pb) = self.progress.take() {
            pb.finish_and_clear();
        }
    }
}

/// State threaded through the reduction of one model
pub struct PipelineContext {
    pub secant_tolerance: f64,
    pub timer: BooleanTimer,
}

impl PipelineContext {
    pub fn new(secant_tolerance: f64, show_progress: bool) -> Self {
        Self {
            secant_tolerance,
            timer: BooleanTimer::new(show_progress),
        }
    }
}
