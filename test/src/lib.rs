//! Shared resources for tests: network fixtures and signature files that
//! live in the workspace `resources/test` directory.
use std::{fs, path::PathBuf};

pub fn read_shared_resource(name: &str) -> String {
    let path = shared_resource_path(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Unable to read {:?}: {}", path, e))
}

pub fn shared_resource_path(name: &str) -> PathBuf {
    let mut path = shared_resource_dir();
    path.push(name);
    path
}

/// Directory holding the signature JSON files used by tests.
pub fn shared_signature_dir() -> PathBuf {
    let mut path = shared_resource_dir();
    path.push("signatures");
    path
}

fn shared_resource_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("..");
    path.push("resources");
    path.push("test");
    path
}
