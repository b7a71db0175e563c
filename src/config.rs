use crate::types::TypeMap;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

pub const DEFAULT_TYPE_MAP: &str = "type_map.toml";
pub const DEFAULT_CONN: &str = "mysql://root@127.0.0.1:3306/test";

#[derive(Debug, Default, Deserialize)]
struct TypeMapFile {
    #[serde(default)]
    db_types: HashMap<String, String>,
}

/// Built-in type map extended by the `[db_types]` table of `path`, if the
/// file exists.
pub fn load_type_map(path: &Path) -> Result<TypeMap> {
    if !path.exists() {
        debug!(file = %path.display(), "no type map file, using built-in types");
        return Ok(TypeMap::default());
    }
    let text =
        fs::read_to_string(path).with_context(|| format!("could not read {}", path.display()))?;
    let file: TypeMapFile =
        toml::from_str(&text).with_context(|| format!("could not parse {}", path.display()))?;
    debug!(file = %path.display(), extra = file.db_types.len(), "loaded type map");
    Ok(TypeMap::with_overrides(&file.db_types)?)
}

/// Connection string: explicit flag, then `DATABASE_URL`, then the local
/// default.
pub fn resolve_conn(flag: Option<String>) -> String {
    flag.filter(|c| !c.is_empty())
        .or_else(|| std::env::var("DATABASE_URL").ok().filter(|c| !c.is_empty()))
        .unwrap_or_else(|| DEFAULT_CONN.to_string())
}
