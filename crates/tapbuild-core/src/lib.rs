//! Core types for tapbuild
//!
//! This crate provides the build modes, architectures, artifact value
//! and error types shared by the configuration and build crates.

pub mod arch;
pub mod artifact;
pub mod error;
pub mod hash;

pub use arch::{Architecture, BuildMode};
pub use artifact::BinaryArtifactInfo;
pub use error::{Error, Result};
pub use hash::compute_sha256;
