use super::template::render;
use crate::error::GenerateError;
use crate::ir::Table;
use serde_json::json;

pub fn namespace(route: &str, ctrl_name: &str) -> Result<String, GenerateError> {
    render("namespace", &json!({ "nameSpace": route, "ctrlName": ctrl_name }))
}

/// `routers/router.go`: one namespace per table that has a controller.
pub fn router_source(tables: &[Table], pkg_path: &str) -> Result<String, GenerateError> {
    let mut namespaces = String::new();
    for table in tables.iter().filter(|t| !t.is_degenerate()) {
        namespaces.push_str(&namespace(&table.name, &table.struct_name())?);
    }
    let app_name = pkg_path.rsplit('/').next().unwrap_or(pkg_path);
    render(
        "router",
        &json!({
            "appName": app_name,
            "pkgPath": pkg_path,
            "nameSpaces": namespaces,
        }),
    )
}
