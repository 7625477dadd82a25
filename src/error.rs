// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types shared across the pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Failure raised by a geometry kernel (3D booleans, 2D clipping or triangulation)
#[derive(Debug, Clone, Error, PartialEq)]
#[error("({kernel} error): {message}")]
pub struct KernelError {
    pub kernel: &'static str,
    pub message: String,
}

impl KernelError {
    pub fn new(kernel: &'static str, message: impl Into<String>) -> Self {
        Self {
            kernel,
            message: message.into(),
        }
    }
}

/// Failure to turn a scene node into a model graph
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("no constructor for tag <{0}>")]
    UnknownTag(String),

    #[error("<{tag}> is missing required property '{key}'")]
    MissingProperty { tag: String, key: String },

    #[error("<{tag}> property '{key}' has invalid value '{value}'")]
    InvalidProperty {
        tag: String,
        key: String,
        value: String,
    },

    #[error("<{0}> has no operands")]
    NoOperands(String),

    #[error("<{parent}> cannot take <{child}> as an operand")]
    MixedOperand { parent: String, child: String },

    #[error("<{tag}> is malformed: {reason}")]
    Malformed { tag: String, reason: String },
}

/// Top-level error type
#[derive(Debug, Error)]
pub enum XcsgError {
    #[error("usage error: {0}")]
    Usage(String),

    #[error("File does not exist: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("XML error in {path}: {message}")]
    Xml { path: String, message: String },

    #[error("OpenSCAD csg syntax error: {0}")]
    CsgSyntax(String),

    #[error("root element is <{0}>, expected <xcsg>")]
    NotScene(String),

    #[error("xcsg tree contains no data")]
    NoModel,

    #[error("build error: {0}")]
    Build(#[from] BuildError),

    #[error("Max {max} boolean operations allowed in this configuration, model requires {nbool}")]
    BudgetExceeded { nbool: usize, max: usize },

    #[error(transparent)]
    Kernel(#[from] KernelError),

    #[error("failed to write {format} file: {message}")]
    Export { format: &'static str, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T, E = XcsgError> = std::result::Result<T, E>;
