//! Progress reporting for build phases
//!
//! The builder announces each phase to a [`ProgressReporter`]. Reporters only
//! observe; they cannot influence the build.

use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use tapbuild_core::Architecture;
use tracing::info;

/// A step of the build pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildPhase {
    /// Running the pre-build clean command
    Cleaning { project_path: String },
    /// Compiling one architecture
    Compiling { arch: Architecture },
    /// Creating the universal output directory
    CreatingOutputDirectory { path: String },
    /// Combining architecture slices into one binary
    Merging { output: String },
    /// Stripping symbols from the merged binary
    Stripping { path: String },
    /// Hashing the final binary
    Fingerprinting { path: String },
    /// Build finished and the artifact is ready
    Finished { path: String },
}

impl BuildPhase {
    /// Stable phase name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cleaning { .. } => "clean",
            Self::Compiling { .. } => "compile",
            Self::CreatingOutputDirectory { .. } => "output_directory",
            Self::Merging { .. } => "merge",
            Self::Stripping { .. } => "strip",
            Self::Fingerprinting { .. } => "fingerprint",
            Self::Finished { .. } => "finished",
        }
    }

    /// Human-readable message
    pub fn describe(&self) -> String {
        match self {
            Self::Cleaning { project_path } => format!("Cleaning {project_path}"),
            Self::Compiling { arch } => format!("Building for {arch}"),
            Self::CreatingOutputDirectory { path } => {
                format!("Creating universal binary folder at {path}")
            }
            Self::Merging { output } => format!("Combining architectures into {output}"),
            Self::Stripping { path } => format!("Stripping unneeded symbols from {path}"),
            Self::Fingerprinting { path } => format!("Computing SHA-256 of {path}"),
            Self::Finished { path } => format!("Binary ready at {path}"),
        }
    }
}

/// Receives build phase notifications
pub trait ProgressReporter: Send + Sync {
    fn on_phase(&self, phase: &BuildPhase);
}

impl<F> ProgressReporter for F
where
    F: Fn(&BuildPhase) + Send + Sync,
{
    fn on_phase(&self, phase: &BuildPhase) {
        self(phase)
    }
}

/// Reporter that ignores every phase
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpProgress;

impl ProgressReporter for NoOpProgress {
    fn on_phase(&self, _phase: &BuildPhase) {}
}

/// Reporter that logs each phase at info level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressReporter for TracingProgress {
    fn on_phase(&self, phase: &BuildPhase) {
        info!(phase = phase.name(), "{}", phase.describe());
    }
}

/// Spinner-based reporter for interactive terminals
pub struct IndicatifProgress {
    spinner: ProgressBar,
    start_time: Instant,
}

impl IndicatifProgress {
    /// Create a new spinner reporter
    pub fn new() -> Self {
        Self::with_bar(ProgressBar::new_spinner())
    }

    /// Reporter that draws nowhere; used when no terminal is attached
    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden())
    }

    fn with_bar(spinner: ProgressBar) -> Self {
        if let Ok(style) = ProgressStyle::default_spinner()
            .template("{prefix:.bold.dim} {spinner:.green} [{elapsed_precise}] {wide_msg}")
        {
            spinner.set_style(style);
        }
        spinner.set_prefix("tapbuild");
        spinner.enable_steady_tick(Duration::from_millis(100));

        Self { spinner, start_time: Instant::now() }
    }

    /// Whether the spinner has been finished
    pub fn is_finished(&self) -> bool {
        self.spinner.is_finished()
    }
}

impl Default for IndicatifProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for IndicatifProgress {
    fn on_phase(&self, phase: &BuildPhase) {
        match phase {
            BuildPhase::Finished { path } => {
                let elapsed = self.start_time.elapsed();
                self.spinner.finish_with_message(format!("✓ {path} ({elapsed:.1?})"));
            }
            _ => self.spinner.set_message(phase.describe()),
        }
    }
}

/// Progress reporter factory
pub struct ProgressFactory;

impl ProgressFactory {
    /// Pick a reporter for the current environment
    pub fn create(interactive: bool) -> Box<dyn ProgressReporter> {
        if interactive && atty::is(atty::Stream::Stderr) {
            Box::new(IndicatifProgress::new())
        } else {
            Box::new(TracingProgress)
        }
    }

    /// Create a no-op reporter
    pub fn create_noop() -> Box<dyn ProgressReporter> {
        Box::new(NoOpProgress)
    }
}
