//! Shared test utilities for tagforge CLI integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use assert_cmd::Command;

/// Get a Command for the tagforge binary.
///
/// The command runs without colour and never reads the user's own config:
/// `TAGFORGE_CONFIG` points at a file that does not exist, so defaults apply.
///
/// # Panics
///
/// Panics if the tagforge binary cannot be found. This should not happen
/// in a properly configured test environment.
#[allow(deprecated)]
pub fn tagforge_cmd() -> Command {
    let mut cmd = Command::cargo_bin("tagforge").expect("tagforge binary should exist");
    cmd.env("NO_COLOR", "1")
        .env("TAGFORGE_CONFIG", "/nonexistent/tagforge-test/config.yaml")
        .env_remove("TAGFORGE_COLOR")
        .env_remove("TAGFORGE_VERBOSE")
        .env_remove("TAGFORGE_QUIET")
        .env_remove("TAGFORGE_IMAGE_EXTENSIONS")
        .env_remove("TAGFORGE_SIDECAR_EXTENSION");
    cmd
}

/// Create an image with a sidecar (`None` means no sidecar file).
pub fn add_image(dir: &Path, name: &str, sidecar: Option<&str>) {
    let image = dir.join(name);
    fs::write(&image, b"\x89PNG").expect("write image");
    if let Some(text) = sidecar {
        fs::write(image.with_extension("txt"), text).expect("write sidecar");
    }
}

/// Read the sidecar of an image.
pub fn read_sidecar(dir: &Path, image: &str) -> String {
    fs::read_to_string(dir.join(image).with_extension("txt")).expect("read sidecar")
}

/// Three images: `a.png` (cat, grass), `b.png` (dog), `c.jpg` (cat, dog).
pub fn create_test_dataset(dir: &Path) {
    add_image(dir, "a.png", Some("cat, grass"));
    add_image(dir, "b.png", Some("dog"));
    add_image(dir, "c.jpg", Some("cat, dog"));
}
