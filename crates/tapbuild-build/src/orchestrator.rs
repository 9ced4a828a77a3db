//! Build orchestration logic
//!
//! [`ProjectBuilder`] compiles every architecture a build mode resolves to,
//! merges and strips universal binaries, and fingerprints the final artifact.
//! Every step runs through a [`CommandExecutor`] and completes before the next
//! one starts.

use std::sync::Arc;

use tapbuild_config::{normalize_project_path, BuildConfig};
use tapbuild_core::{Architecture, BinaryArtifactInfo, BuildMode};
use tracing::{debug, info, warn};

use crate::{
    error::{BuildError, Result},
    executor::CommandExecutor,
    progress_ui::{BuildPhase, NoOpProgress, ProgressReporter},
};

/// Placeholder replaced by the project path in clean command templates
pub const PACKAGE_PATH_PLACEHOLDER: &str = "{package_path}";

/// Builds release binaries for a project
pub struct ProjectBuilder<E> {
    /// Executor every command is issued through
    executor: E,
    /// Phase observer
    progress: Arc<dyn ProgressReporter>,
    /// Command run before compiling when the configuration asks for a clean build
    clean_command: Option<String>,
}

impl<E: CommandExecutor> ProjectBuilder<E> {
    /// Create a builder with no progress reporting and no clean command
    pub fn new(executor: E) -> Self {
        Self { executor, progress: Arc::new(NoOpProgress), clean_command: None }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    /// Set the command issued when a configuration has `should_clean` set.
    ///
    /// `{package_path}` in the template is replaced by the project path.
    pub fn with_clean_command(mut self, template: impl Into<String>) -> Self {
        self.clean_command = Some(template.into());
        self
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Build the project described by `config`, cleaning first if requested
    pub async fn build(&self, config: &BuildConfig) -> Result<BinaryArtifactInfo> {
        if config.should_clean() {
            self.clean(config.project_path()).await?;
        }

        self.build_project(
            config.project_name(),
            config.project_path(),
            config.build_mode(),
            config.extra_build_args(),
        )
        .await
    }

    /// Compile, merge if universal, and fingerprint a project's binary
    pub async fn build_project(
        &self,
        name: &str,
        path: &str,
        build_mode: BuildMode,
        extra_build_args: &[String],
    ) -> Result<BinaryArtifactInfo> {
        let project_path = normalize_project_path(path);
        let archs = build_mode.architectures();
        info!("Building {} ({}) at {}", name, build_mode, project_path);

        for &arch in archs {
            self.compile(arch, &project_path, extra_build_args).await?;
        }

        let binary_path = match archs {
            [arch] if !build_mode.is_universal() => release_binary_path(&project_path, *arch, name),
            _ => self.build_universal_binary(name, &project_path, archs).await?,
        };

        let fingerprint = self.fingerprint(&binary_path).await?;

        info!("Built {} ({})", binary_path, fingerprint);
        self.progress.on_phase(&BuildPhase::Finished { path: binary_path.clone() });

        Ok(BinaryArtifactInfo::new(binary_path, fingerprint))
    }

    async fn clean(&self, project_path: &str) -> Result<()> {
        let Some(template) = &self.clean_command else {
            debug!("Clean requested for {} but no clean command is configured", project_path);
            return Ok(());
        };

        let command = template.replace(PACKAGE_PATH_PLACEHOLDER, project_path);
        self.progress.on_phase(&BuildPhase::Cleaning { project_path: project_path.to_string() });

        self.executor
            .run_and_print(&command)
            .await
            .map_err(|source| BuildError::Clean { source })
    }

    async fn compile(
        &self,
        arch: Architecture,
        project_path: &str,
        extra_build_args: &[String],
    ) -> Result<()> {
        self.progress.on_phase(&BuildPhase::Compiling { arch });

        let command = compile_command(arch, project_path, extra_build_args);
        debug!("Compile command: {}", command);

        self.executor
            .run_and_print(&command)
            .await
            .map_err(|source| BuildError::Compile { arch, source })
    }

    async fn build_universal_binary(
        &self,
        name: &str,
        project_path: &str,
        archs: &[Architecture],
    ) -> Result<String> {
        let output_dir = universal_dir(project_path);
        let universal_path = format!("{output_dir}{name}");

        self.progress.on_phase(&BuildPhase::CreatingOutputDirectory { path: output_dir.clone() });
        self.executor
            .run_and_print(&format!("mkdir -p {output_dir}"))
            .await
            .map_err(|source| BuildError::OutputDirectory { path: output_dir.clone(), source })?;

        self.progress.on_phase(&BuildPhase::Merging { output: universal_path.clone() });
        let inputs: Vec<String> =
            archs.iter().map(|&arch| release_binary_path(project_path, arch, name)).collect();
        self.executor
            .run_and_print(&format!("lipo -create -output {universal_path} {}", inputs.join(" ")))
            .await
            .map_err(|source| BuildError::Merge { output: universal_path.clone(), source })?;

        self.progress.on_phase(&BuildPhase::Stripping { path: universal_path.clone() });
        self.executor
            .run_and_print(&format!("strip -u -r {universal_path}"))
            .await
            .map_err(|source| BuildError::Strip { path: universal_path.clone(), source })?;

        info!("Universal binary created at {}", universal_path);
        Ok(universal_path)
    }

    async fn fingerprint(&self, binary_path: &str) -> Result<String> {
        self.progress.on_phase(&BuildPhase::Fingerprinting { path: binary_path.to_string() });

        let output = match self.executor.run(&format!("shasum -a 256 {binary_path}")).await {
            Ok(output) => output,
            Err(e) => {
                warn!("Fingerprint command failed: {}", e);
                return Err(BuildError::MissingFingerprint {
                    path: binary_path.to_string(),
                    source: Some(e),
                });
            }
        };

        parse_fingerprint(&output)
            .map(str::to_string)
            .ok_or_else(|| BuildError::MissingFingerprint {
                path: binary_path.to_string(),
                source: None,
            })
    }
}

/// First whitespace-delimited token of a hash command's output
pub fn parse_fingerprint(output: &str) -> Option<&str> {
    output.split_whitespace().next()
}

/// Where the toolchain writes one architecture's release binary
pub fn release_binary_path(project_path: &str, arch: Architecture, name: &str) -> String {
    format!("{project_path}.build/{}/release/{name}", arch.release_dir())
}

/// Output directory for merged binaries, with trailing separator
pub fn universal_dir(project_path: &str) -> String {
    format!("{project_path}.build/universal/")
}

fn compile_command(arch: Architecture, project_path: &str, extra_build_args: &[String]) -> String {
    let mut command = format!(
        "swift build -c release --arch {} -Xswiftc -Osize -Xswiftc -wmo \
         -Xlinker -dead_strip_dylibs --package-path {project_path}",
        arch.name()
    );
    if !extra_build_args.is_empty() {
        command.push(' ');
        command.push_str(&extra_build_args.join(" "));
    }
    command
}
