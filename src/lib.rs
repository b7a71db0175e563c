pub mod codegen;
pub mod config;
pub mod error;
pub mod introspect;
pub mod ir;
pub mod manifest;
pub mod relation;
pub mod rules;
pub mod scaffold;
pub mod types;
pub mod workspace;

pub use error::{GenerateError, RuleError};

use anyhow::Result;
use codegen::format::SourceFormatter;
use introspect::{CatalogSnapshot, MysqlCatalog};
use ir::Table;
use relation::{InferenceEngine, RelationSummary};
use std::path::Path;
use tracing::info;
use types::TypeMap;

/// Build tables from catalog metadata and infer their relations.
pub fn analyze(snapshot: &CatalogSnapshot, type_map: &TypeMap) -> Result<(Vec<Table>, RelationSummary)> {
    let mut tables = introspect::build_tables(snapshot, type_map)?;
    let summary = InferenceEngine::new().run(&mut tables);
    info!(
        tables = tables.len(),
        candidates = summary.discovered,
        relations = summary.confirmed.len(),
        "schema analyzed"
    );
    Ok((tables, summary))
}

/// Read the catalog of the database behind `conn`.
pub async fn introspect_database(conn: &str) -> Result<CatalogSnapshot> {
    let catalog = MysqlCatalog::connect(conn).await?;
    catalog.snapshot().await
}

/// Analyze `snapshot` and write the application code under `app_dir`.
pub fn generate_code(
    snapshot: &CatalogSnapshot,
    type_map: &TypeMap,
    app_dir: &Path,
    pkg_path: &str,
    formatter: &dyn SourceFormatter,
) -> Result<Vec<Table>> {
    let (tables, _) = analyze(snapshot, type_map)?;
    codegen::generate_app_code(&tables, app_dir, pkg_path, formatter)?;
    Ok(tables)
}
