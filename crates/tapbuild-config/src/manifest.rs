//! Executable product detection from a package manifest

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tapbuild_core::Result;

use crate::cached_regex;

/// Manifest file name at the package root
pub const MANIFEST_FILE: &str = "Package.swift";

/// Names of the `.executable(name: "...")` products declared in a manifest
///
/// Names are returned in declaration order. Entries without a quoted name
/// are skipped.
pub fn executable_names(manifest: &str) -> Result<Vec<String>> {
    static EXECUTABLE_RE: OnceLock<Regex> = OnceLock::new();
    let executable_re = cached_regex(&EXECUTABLE_RE, r#"\.executable\s*\(\s*name:\s*"([^"]+)""#)?;

    Ok(executable_re
        .captures_iter(manifest)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
        .collect())
}

/// Read the manifest under `project_path` and list its executables
pub fn read_executable_names(project_path: impl AsRef<Path>) -> Result<Vec<String>> {
    let manifest = std::fs::read_to_string(project_path.as_ref().join(MANIFEST_FILE))?;
    executable_names(&manifest)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MULTIPLE_EXECUTABLES: &str = r#"
// swift-tools-version:5.9
import PackageDescription

let package = Package(
    name: "MyTestPackage",
    products: [
        .library(
            name: "MyLibrary",
            targets: ["MyLibrary"]
        ),
        .executable(
            name: "FirstExecutable",
            targets: ["FirstTarget"]
        ),
        .executable(
            name: "SecondExecutable",
            targets: ["SecondTarget"]
        ),
    ],
    targets: [
        .target(name: "MyLibrary", dependencies: []),
        .executableTarget(name: "FirstTarget", dependencies: []),
        .executableTarget(name: "SecondTarget", dependencies: []),
    ]
)
"#;

    const NO_EXECUTABLES: &str = r#"
let package = Package(
    name: "MyTestPackage",
    products: [
        .library(name: "MyLibrary", targets: ["MyLibrary"])
    ],
    targets: [
        .target(name: "MyLibrary", dependencies: [])
    ]
)
"#;

    const SINGLE_EXECUTABLE: &str = r#"
let package = Package(
    name: "MyTestPackage",
    products: [
        .executable(
            name: "SingleExecutable",
            targets: ["SingleTarget"]
        )
    ],
    targets: [
        .executableTarget(name: "SingleTarget", dependencies: [])
    ]
)
"#;

    const MALFORMED_EXECUTABLE: &str = r#"
let package = Package(
    name: "MyTestPackage",
    products: [
        .executable(
            name: "ValidExecutable",
            targets: ["ValidTarget"]
        ),
        .executable(name: , targets: ["MalformedTarget"])
    ],
    targets: [
        .executableTarget(name: "ValidTarget", dependencies: [])
    ]
)
"#;

    #[test]
    fn test_multiple_executables_in_order() {
        assert_eq!(
            executable_names(MULTIPLE_EXECUTABLES).unwrap(),
            vec!["FirstExecutable", "SecondExecutable"]
        );
    }

    #[test]
    fn test_no_executables() {
        assert!(executable_names(NO_EXECUTABLES).unwrap().is_empty());
    }

    #[test]
    fn test_single_executable() {
        assert_eq!(executable_names(SINGLE_EXECUTABLE).unwrap(), vec!["SingleExecutable"]);
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        assert_eq!(executable_names(MALFORMED_EXECUTABLE).unwrap(), vec!["ValidExecutable"]);
    }

    #[test]
    fn test_read_from_project_directory() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(MANIFEST_FILE), SINGLE_EXECUTABLE).unwrap();

        assert_eq!(read_executable_names(temp_dir.path()).unwrap(), vec!["SingleExecutable"]);
    }
}
