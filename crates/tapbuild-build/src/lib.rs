//! Build orchestration for tapbuild
//!
//! This crate compiles a project for its target architectures through a
//! pluggable command executor, merges universal binaries, and fingerprints
//! the resulting artifact.

pub mod error;
pub mod executor;
pub mod orchestrator;
pub mod progress_ui;
pub mod testing;

pub use error::{BuildError, CommandError, Result};
pub use executor::{CommandExecutor, ExecutorConfig, OutputMode, ShellExecutor};
pub use orchestrator::{parse_fingerprint, release_binary_path, universal_dir, ProjectBuilder};
pub use progress_ui::{
    BuildPhase, IndicatifProgress, NoOpProgress, ProgressFactory, ProgressReporter,
    TracingProgress,
};
pub use tapbuild_config::{BuildConfig, TestCommand};
pub use tapbuild_core::{Architecture, BinaryArtifactInfo, BuildMode};
pub use testing::{Invocation, RecordedCommand, ScriptedExecutor};
