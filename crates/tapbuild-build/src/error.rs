//! Error types for the build orchestration module

use std::time::Duration;

use tapbuild_core::Architecture;
use thiserror::Error;

/// Failure of a single shell command
#[derive(Error, Debug)]
pub enum CommandError {
    /// The process could not be started
    #[error("Failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The process exited unsuccessfully
    #[error("Command `{command}` failed with {}", describe_exit(.code))]
    Failed { command: String, code: Option<i32>, stderr: String },

    /// The executor's deadline elapsed before the process finished
    #[error("Command `{command}` timed out after {duration:?}")]
    Timeout { command: String, duration: Duration },
}

impl CommandError {
    /// Create a non-zero exit error
    pub fn failed(command: impl Into<String>, code: Option<i32>, stderr: impl Into<String>) -> Self {
        Self::Failed { command: command.into(), code, stderr: stderr.into() }
    }

    /// The command text that failed
    pub fn command(&self) -> &str {
        match self {
            Self::Spawn { command, .. }
            | Self::Failed { command, .. }
            | Self::Timeout { command, .. } => command,
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Build-specific error types
#[derive(Error, Debug)]
pub enum BuildError {
    /// Pre-build clean command failed
    #[error("Clean failed: {source}")]
    Clean {
        #[source]
        source: CommandError,
    },

    /// Compiling one architecture failed
    #[error("Build failed for {arch}: {source}")]
    Compile {
        arch: Architecture,
        #[source]
        source: CommandError,
    },

    /// Universal output directory could not be created
    #[error("Failed to create output directory {path}: {source}")]
    OutputDirectory {
        path: String,
        #[source]
        source: CommandError,
    },

    /// Merging the architecture slices failed
    #[error("Failed to create universal binary {output}: {source}")]
    Merge {
        output: String,
        #[source]
        source: CommandError,
    },

    /// Symbol stripping failed
    #[error("Failed to strip symbols from {path}: {source}")]
    Strip {
        path: String,
        #[source]
        source: CommandError,
    },

    /// The fingerprint command produced no usable hash
    #[error("Missing SHA-256 fingerprint for {path}")]
    MissingFingerprint {
        path: String,
        #[source]
        source: Option<CommandError>,
    },
}

/// Result type alias for build operations
pub type Result<T> = std::result::Result<T, BuildError>;

impl BuildError {
    /// The underlying command failure, if this error wraps one
    pub fn command_error(&self) -> Option<&CommandError> {
        match self {
            Self::Clean { source }
            | Self::Compile { source, .. }
            | Self::OutputDirectory { source, .. }
            | Self::Merge { source, .. }
            | Self::Strip { source, .. } => Some(source),
            Self::MissingFingerprint { source, .. } => source.as_ref(),
        }
    }

    /// Short name of the pipeline step that failed
    pub fn step(&self) -> &'static str {
        match self {
            Self::Clean { .. } => "clean",
            Self::Compile { .. } => "compile",
            Self::OutputDirectory { .. } => "output_directory",
            Self::Merge { .. } => "merge",
            Self::Strip { .. } => "strip",
            Self::MissingFingerprint { .. } => "fingerprint",
        }
    }
}
