//! Build modes and the architectures they resolve to

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A physical CPU architecture the toolchain can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Architecture {
    /// Apple Silicon
    #[serde(rename = "arm64", alias = "aarch64")]
    Arm64,
    /// Intel
    #[serde(rename = "x86_64", alias = "amd64")]
    X86_64,
}

impl Architecture {
    /// Name passed to the compiler's `--arch` flag
    pub fn name(&self) -> &'static str {
        match self {
            Self::Arm64 => "arm64",
            Self::X86_64 => "x86_64",
        }
    }

    /// Build directory segment the toolchain writes this architecture's output to
    pub fn release_dir(&self) -> String {
        format!("{}-apple-macosx", self.name())
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Architecture {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "arm64" | "aarch64" => Ok(Self::Arm64),
            "x86_64" | "amd64" => Ok(Self::X86_64),
            _ => Err(Error::UnknownBuildMode { value: s.to_string() }),
        }
    }
}

/// Which architecture(s) a single build invocation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BuildMode {
    #[serde(rename = "arm64", alias = "aarch64")]
    Arm64,
    #[serde(rename = "x86_64", alias = "amd64")]
    X86_64,
    /// Both architectures merged into one binary
    #[default]
    #[serde(rename = "universal")]
    Universal,
}

impl BuildMode {
    /// Architectures to compile, in the order the compile commands are issued.
    pub fn architectures(&self) -> &'static [Architecture] {
        match self {
            Self::Arm64 => &[Architecture::Arm64],
            Self::X86_64 => &[Architecture::X86_64],
            Self::Universal => &[Architecture::Arm64, Architecture::X86_64],
        }
    }

    pub fn is_universal(&self) -> bool {
        matches!(self, Self::Universal)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Arm64 => "arm64",
            Self::X86_64 => "x86_64",
            Self::Universal => "universal",
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "universal" => Ok(Self::Universal),
            other => match Architecture::from_str(other) {
                Ok(Architecture::Arm64) => Ok(Self::Arm64),
                Ok(Architecture::X86_64) => Ok(Self::X86_64),
                Err(_) => Err(Error::UnknownBuildMode { value: s.to_string() }),
            },
        }
    }
}

impl From<Architecture> for BuildMode {
    fn from(arch: Architecture) -> Self {
        match arch {
            Architecture::Arm64 => Self::Arm64,
            Architecture::X86_64 => Self::X86_64,
        }
    }
}
