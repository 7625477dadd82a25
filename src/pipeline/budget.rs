// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

use crate::error::{Result, XcsgError};

/// Ceiling on the number of boolean operations a model may require
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetGuard {
    max: usize,
}

impl BudgetGuard {
    pub fn new(max: usize) -> Self {
        Self { max }
    }

    /// Reject models needing more than `max` booleans. Must run before any kernel call.
    pub fn check(&self, nbool: usize) -> Result<()> {
        if nbool > self.max {
            return Err(XcsgError::BudgetExceeded { nbool, max: self.max });
        }
        Ok(())
    }
}
