//! Build configuration for tapbuild
//!
//! This crate describes what a single build invocation produces and handles
//! YAML configuration parsing, validation, and environment variable
//! substitution.

use std::path::Path;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tapbuild_core::{BuildMode, Error, Result};

mod manifest;

pub use manifest::{executable_names, read_executable_names, MANIFEST_FILE};

/// Command used to run the project's tests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestCommand {
    /// The toolchain's standard test command
    Default,
    /// A caller-supplied shell command
    Custom(String),
}

impl TestCommand {
    /// Parse the config file form: `default` or any other command text
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.eq_ignore_ascii_case("default") {
            Self::Default
        } else {
            Self::Custom(value.to_string())
        }
    }
}

/// Immutable description of one build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    project_name: String,
    project_path: String,
    build_mode: BuildMode,
    extra_build_args: Vec<String>,
    should_clean: bool,
    test_command: Option<TestCommand>,
}

impl BuildConfig {
    /// Create a configuration with no extra arguments, cleaning enabled and
    /// no test command.
    ///
    /// The project path is normalized to end with `/`.
    pub fn new(
        project_name: impl Into<String>,
        project_path: impl AsRef<str>,
        build_mode: BuildMode,
    ) -> Result<Self> {
        let project_path = project_path.as_ref();
        if project_path.trim().is_empty() {
            return Err(Error::config("project_path cannot be empty"));
        }

        let config = Self {
            project_name: project_name.into(),
            project_path: normalize_project_path(project_path),
            build_mode,
            extra_build_args: Vec::new(),
            should_clean: default_should_clean(),
            test_command: None,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_extra_build_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_build_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_should_clean(mut self, should_clean: bool) -> Self {
        self.should_clean = should_clean;
        self
    }

    pub fn with_test_command(mut self, test_command: Option<TestCommand>) -> Self {
        self.test_command = test_command;
        self
    }

    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read config file {path:?}: {e}")))?;

        Self::from_yaml_str(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(content)
            .map_err(|e| Error::config(format!("Failed to parse YAML: {e}")))?;

        file.into_build_config()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.project_name.trim().is_empty() {
            return Err(Error::config("project_name cannot be empty"));
        }

        if self.project_name.chars().any(|c| c.is_whitespace() || c == '/') {
            return Err(Error::config(format!(
                "project_name must not contain whitespace or '/': {:?}",
                self.project_name
            )));
        }

        Ok(())
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Project directory, always ending with `/`
    pub fn project_path(&self) -> &str {
        &self.project_path
    }

    pub fn build_mode(&self) -> BuildMode {
        self.build_mode
    }

    pub fn extra_build_args(&self) -> &[String] {
        &self.extra_build_args
    }

    pub fn should_clean(&self) -> bool {
        self.should_clean
    }

    pub fn test_command(&self) -> Option<&TestCommand> {
        self.test_command.as_ref()
    }
}

/// On-disk configuration file layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Name of the executable product; detected from the manifest when omitted
    #[serde(default)]
    pub project_name: Option<String>,

    /// Path to the package root
    pub project_path: String,

    /// Target architecture(s)
    #[serde(default)]
    pub build_mode: BuildMode,

    /// Arguments appended to every compile command
    #[serde(default)]
    pub extra_build_args: Vec<String>,

    /// Clean the package before building
    #[serde(default = "default_should_clean")]
    pub should_clean: bool,

    /// `default` or a custom command; omitted means tests are not run
    #[serde(default)]
    pub test_command: Option<String>,
}

impl ConfigFile {
    /// Expand environment variables and validate
    pub fn into_build_config(self) -> Result<BuildConfig> {
        let project_path = expand_env_vars(&self.project_path)?;
        let project_name = match self.project_name {
            Some(name) => name,
            None => single_executable(&project_path)?,
        };

        Ok(BuildConfig::new(project_name, project_path, self.build_mode)?
            .with_extra_build_args(self.extra_build_args)
            .with_should_clean(self.should_clean)
            .with_test_command(self.test_command.as_deref().map(TestCommand::parse)))
    }
}

fn single_executable(project_path: &str) -> Result<String> {
    let mut names = read_executable_names(project_path)?;
    match names.len() {
        1 => Ok(names.remove(0)),
        0 => Err(Error::config(format!(
            "No executable products found in {project_path}; set project_name"
        ))),
        _ => Err(Error::config(format!(
            "Multiple executable products found ({}); set project_name",
            names.join(", ")
        ))),
    }
}

/// Ensure a project path ends with a separator
pub fn normalize_project_path(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}/")
    }
}

/// Expand `$VAR` and `${VAR}` references
fn expand_env_vars(value: &str) -> Result<String> {
    static ENV_VAR_RE: OnceLock<Regex> = OnceLock::new();
    let env_var_re =
        cached_regex(&ENV_VAR_RE, r"\$\{([^}]+)\}|\$([A-Za-z_][A-Za-z0-9_]*)")?;

    let mut missing = None;
    let expanded = env_var_re.replace_all(value, |cap: &Captures<'_>| {
        let var_name = cap.get(1).or_else(|| cap.get(2)).map_or("", |m| m.as_str());
        match std::env::var(var_name) {
            Ok(var_value) => var_value,
            Err(_) => {
                missing.get_or_insert_with(|| var_name.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(var_name) => Err(Error::config(format!("Environment variable not found: {var_name}"))),
        None => Ok(expanded.into_owned()),
    }
}

/// Compile `pattern` on first use and reuse it afterwards
pub(crate) fn cached_regex(
    cell: &'static OnceLock<Regex>,
    pattern: &str,
) -> Result<&'static Regex> {
    if let Some(re) = cell.get() {
        return Ok(re);
    }
    let re = Regex::new(pattern)
        .map_err(|e| Error::config(format!("Invalid pattern {pattern}: {e}")))?;
    Ok(cell.get_or_init(|| re))
}

fn default_should_clean() -> bool {
    true
}
