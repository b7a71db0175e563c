//! Skeleton of a fresh beego API application.

use crate::codegen::template::render;
use crate::rules::RULE_FILE;
use anyhow::{bail, Context, Result};
use serde_json::json;
use std::fs;
use std::path::Path;
use tracing::info;

const MODELS_README: &str = include_str!("codegen/templates/models_readme.md.tpl");

const EMPTY_DIRS: &[&str] = &["controllers", "models", "routers", "utils"];

/// Create the application skeleton in `dir`. `pkg_path` is the Go import
/// path of the application. Refuses to touch a non-empty directory.
pub fn new_app(dir: &Path, pkg_path: &str) -> Result<()> {
    if dir.exists() {
        let occupied = fs::read_dir(dir)
            .with_context(|| format!("could not read {}", dir.display()))?
            .next()
            .is_some();
        if occupied {
            bail!("{} already exists and is not empty", dir.display());
        }
    }
    let app_name = pkg_path.rsplit('/').next().unwrap_or(pkg_path);
    info!(app = app_name, dir = %dir.display(), "Creating API...");

    for sub in EMPTY_DIRS.iter().chain(&["conf", "rules"]) {
        let path = dir.join(sub);
        fs::create_dir_all(&path)
            .with_context(|| format!("could not create {}", path.display()))?;
    }

    let names = json!({ "appName": app_name, "pkgPath": pkg_path });
    let files = [
        ("main.go", render("app_main", &names)?),
        ("conf/app.conf", render("app_conf", &names)?),
        (RULE_FILE, render("rule", &names)?),
        ("README.md", render("app_readme", &names)?),
        ("models/README.md", MODELS_README.to_string()),
    ];
    for (name, content) in files {
        let path = dir.join(name);
        fs::write(&path, content).with_context(|| format!("could not write {}", path.display()))?;
    }
    info!("New API successfully created!");
    Ok(())
}
