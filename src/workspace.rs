//! Go workspace (`GOPATH`) handling.

use crate::error::GenerateError;
use std::env;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

fn lowercase(p: &Path) -> PathBuf {
    PathBuf::from(p.to_string_lossy().to_lowercase())
}

/// Import path of the application in `app_dir` relative to one of the
/// `src` directories listed in `gopath`.
pub fn package_path_in(gopath: &OsStr, app_dir: &Path) -> Result<String, GenerateError> {
    if gopath.is_empty() {
        return Err(GenerateError::MissingWorkspace);
    }
    let app_dir = fs::canonicalize(app_dir).unwrap_or_else(|_| app_dir.to_path_buf());
    let app_lower = lowercase(&app_dir);

    for entry in env::split_paths(gopath) {
        let src = entry.join("src");
        let src = fs::canonicalize(&src).unwrap_or(src);
        let src_lower = lowercase(&src);
        if !app_lower.starts_with(&src_lower) {
            continue;
        }
        if app_lower == src_lower {
            return Err(GenerateError::AtWorkspaceRoot(app_dir));
        }
        let rest: Vec<String> = app_dir
            .components()
            .skip(src.components().count())
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let pkg = rest.join("/");
        debug!(src = %src.display(), package = %pkg, "resolved package path");
        return Ok(pkg);
    }

    Err(GenerateError::OutsideWorkspace {
        gopath: gopath.to_string_lossy().into_owned(),
        dir: app_dir,
    })
}

/// [`package_path_in`] with the `GOPATH` of the current process.
pub fn package_path(app_dir: &Path) -> Result<String, GenerateError> {
    let gopath = env::var_os("GOPATH").unwrap_or_default();
    package_path_in(&gopath, app_dir)
}
