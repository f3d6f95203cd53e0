/// Error handling module for Update Runner.
///
/// This module defines the error types used throughout the library.
/// Most failures inside an update cycle are absorbed and logged by the
/// controller; the variants here carry enough context to make those log
/// lines useful and to let tests assert on what went wrong.
///
/// # Example
///
/// ```
/// use update_runner::error::{Error, Result};
///
/// fn handle_error(result: Result<()>) {
///     match result {
///         Ok(_) => println!("Operation succeeded"),
///         Err(Error::ConfigInvalid(msg)) => println!("Bad configuration: {}", msg),
///         Err(Error::Process(msg)) => println!("Process error: {}", msg),
///         Err(e) => println!("Other error: {}", e),
///     }
/// }
/// ```
use thiserror::Error;

/// Errors that can occur in the update-runner library.
///
/// Each variant includes context information to help diagnose the failure
/// from a single log line.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to parse configuration from a file or string.
    ///
    /// This error occurs when:
    /// - The configuration file cannot be read
    /// - The JSON or YAML is malformed
    /// - Field types are incorrect
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),

    /// Configuration parses but contains invalid values.
    ///
    /// This error occurs when:
    /// - The remote version URL is empty or not HTTP(S)
    /// - The poll interval or fetch timeout is zero
    /// - A command to run is empty
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    /// Error when starting or recording the managed server process.
    ///
    /// This error occurs when:
    /// - The executable cannot be spawned
    /// - The process identity record cannot be written
    #[error("Server process error: {0}")]
    Process(String),

    /// Delivering a signal to the managed process failed.
    ///
    /// This error occurs when:
    /// - The recorded process no longer exists
    /// - The supervisor lacks permission to signal it
    #[error("Failed to signal process {pid}: {reason}")]
    Signal {
        /// Process the signal was addressed to
        pid: u32,
        /// Reason reported by the OS
        reason: String,
    },

    /// An external command exited unsuccessfully or could not be run.
    ///
    /// This error occurs when:
    /// - The program is not found or not executable
    /// - The program exits with a non-zero status
    #[error("Command failed: {0}")]
    Command(String),

    /// Writing the local version failed for one or more artifacts.
    ///
    /// Both artifacts are always attempted, so this lists every target
    /// that could not be written.
    #[error("Failed to persist version to {}", .0.join(", "))]
    VersionPersist(Vec<String>),

    /// The remote version endpoint could not be queried.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for update-runner operations.
pub type Result<T> = std::result::Result<T, Error>;
