pub mod controllers;
pub mod dto;
pub mod format;
pub mod models;
pub mod router;
pub mod template;

use crate::ir::{self, Table};
use anyhow::{Context, Result};
use format::SourceFormatter;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Output directories of a generated application.
#[derive(Debug, Clone)]
pub struct MvcPaths {
    pub models: PathBuf,
    pub dto: PathBuf,
    pub controllers: PathBuf,
    pub routers: PathBuf,
}

impl MvcPaths {
    pub fn new(app_dir: &Path) -> Self {
        let models = app_dir.join("models");
        MvcPaths {
            dto: models.join("dto"),
            models,
            controllers: app_dir.join("controllers"),
            routers: app_dir.join("routers"),
        }
    }

    pub fn create(&self) -> Result<()> {
        for dir in [&self.models, &self.dto, &self.controllers, &self.routers] {
            fs::create_dir_all(dir)
                .with_context(|| format!("could not create directory {}", dir.display()))?;
        }
        Ok(())
    }
}

/// Truncate-write a file that later stages depend on.
fn write_source(path: &Path, content: &str, formatter: &dyn SourceFormatter) -> Result<()> {
    fs::write(path, content).with_context(|| format!("could not write {}", path.display()))?;
    debug!(file = %path.display(), "wrote");
    formatter.format(path);
    Ok(())
}

/// Write a helper file nothing else reads back; failures only warn.
fn write_helper(path: &Path, content: &str, formatter: &dyn SourceFormatter) {
    match fs::write(path, content) {
        Ok(()) => formatter.format(path),
        Err(e) => warn!(file = %path.display(), error = %e, "could not write file"),
    }
}

pub fn write_model_files(tables: &[Table], paths: &MvcPaths, formatter: &dyn SourceFormatter) -> Result<()> {
    write_helper(&paths.dto.join("dto_model.go"), &dto::dto_source(tables), formatter);
    write_helper(&paths.models.join("lg_pager.go"), models::LG_PAGER, formatter);
    for table in tables {
        let source = models::model_source(table)?;
        write_source(&paths.models.join(models::file_name(table)), &source, formatter)?;
    }
    Ok(())
}

pub fn write_controller_files(
    tables: &[Table],
    paths: &MvcPaths,
    pkg_path: &str,
    formatter: &dyn SourceFormatter,
) -> Result<()> {
    let base = paths.controllers.join("BaseController.go");
    if !base.exists() {
        write_helper(&base, controllers::BASE_CONTROLLER, formatter);
    }
    for table in tables.iter().filter(|t| !t.is_degenerate()) {
        let source = controllers::controller_source(table, pkg_path)?;
        write_source(&paths.controllers.join(models::file_name(table)), &source, formatter)?;
    }
    Ok(())
}

pub fn write_router_file(
    tables: &[Table],
    paths: &MvcPaths,
    pkg_path: &str,
    formatter: &dyn SourceFormatter,
) -> Result<()> {
    let source = router::router_source(tables, pkg_path)?;
    write_source(&paths.routers.join("router.go"), &source, formatter)
}

/// Emit models, controllers and the router for `tables` under `app_dir`.
/// Every file is rewritten from scratch, so re-running is idempotent.
pub fn generate_app_code(
    tables: &[Table],
    app_dir: &Path,
    pkg_path: &str,
    formatter: &dyn SourceFormatter,
) -> Result<()> {
    let paths = MvcPaths::new(app_dir);
    paths.create()?;

    info!("Creating model files...");
    write_model_files(tables, &paths, formatter)?;
    info!("Creating controller files...");
    write_controller_files(tables, &paths, pkg_path, formatter)?;
    info!("Creating router files...");
    write_router_file(tables, &paths, pkg_path, formatter)?;

    let skipped: Vec<&str> = tables
        .iter()
        .filter(|t| t.is_degenerate())
        .map(|t| t.name.as_str())
        .collect();
    if !skipped.is_empty() {
        debug!(tables = ?skipped, "struct-only models, no controller or route");
    }
    info!(
        tables = tables.len(),
        join_tables = tables.iter().filter(|t| ir::is_join_table(&t.name)).count(),
        "application code generated"
    );
    Ok(())
}
