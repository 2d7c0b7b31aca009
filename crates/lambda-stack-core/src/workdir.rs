// crates/lambda-stack-core/src/workdir.rs
// ============================================================================
// Module: Scratch Working Directories
// Description: Isolated copies of stack directories.
// Purpose: Let concurrent runs of one configuration keep separate state.
// Dependencies: tempfile, walkdir
// ============================================================================

//! ## Overview
//! A scratch copy carries the configuration files of a stack directory but no
//! local Terraform state, provider cache, or lock file, so every run starts
//! from a clean working directory.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io;
use std::path::Path;

use tempfile::TempDir;
use walkdir::DirEntry;
use walkdir::WalkDir;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Local provider and module cache directory.
const TERRAFORM_CACHE_DIR: &str = ".terraform";
/// Dependency lock file.
const TERRAFORM_LOCK_FILE: &str = ".terraform.lock.hcl";
/// Local state file prefix (covers backups).
const TERRAFORM_STATE_PREFIX: &str = "terraform.tfstate";

// ============================================================================
// SECTION: Copy
// ============================================================================

/// Copies `source` into a fresh temporary directory.
///
/// The returned [`TempDir`] deletes the copy when dropped.
///
/// # Errors
///
/// Returns [`io::Error`] when `source` is not a directory or a file cannot be
/// copied.
pub fn copy_to_scratch(source: &Path) -> io::Result<TempDir> {
    if !source.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("stack directory {} does not exist", source.display()),
        ));
    }
    let scratch = tempfile::Builder::new().prefix("lambda-stack-").tempdir()?;
    let walker = WalkDir::new(source).min_depth(1).into_iter().filter_entry(|entry| !is_local_state(entry));
    for entry in walker {
        let entry = entry.map_err(io::Error::other)?;
        let relative = entry.path().strip_prefix(source).map_err(io::Error::other)?;
        let target = scratch.path().join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(scratch)
}

/// Returns true for entries that hold local state rather than configuration.
fn is_local_state(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    name == TERRAFORM_CACHE_DIR || name == TERRAFORM_LOCK_FILE || name.starts_with(TERRAFORM_STATE_PREFIX)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
