//! Error type for the windowing / rendering front end.
//!
//! Navigation never fails from the shell's point of view (the engine renders
//! its own error pages). Only start-up of the native front end can fail.

use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, ShellError>;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("event loop failure: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("native handle unavailable: {0}")]
    Handle(#[from] winit::raw_window_handle::HandleError),

    #[error("rendering context failure in {context}: {details}")]
    Rendering {
        context: &'static str,
        details: String,
    },

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ShellError {
    pub(crate) fn rendering(context: &'static str, details: impl std::fmt::Debug) -> Self {
        Self::Rendering {
            context,
            details: format!("{details:?}"),
        }
    }
}
