// Copyright 2025 the Glance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to load or validate a [`GazeConfig`](crate::config::GazeConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the file failed.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for the config schema.
    #[error("failed to parse gaze config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value is out of range.
    #[error("invalid `{field}`: {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}

/// A frame that cannot be routed. The tick degrades to a no-op.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum FrameError {
    /// No head pose was supplied.
    #[error("frame has no head pose")]
    MissingHeadPose,
    /// No viewport size was supplied, or it is empty.
    #[error("frame has no usable viewport")]
    MissingViewport,
    /// No surface provider was supplied.
    #[error("frame has no surface provider")]
    MissingSurfaces,
}
