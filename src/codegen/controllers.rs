use super::template::render;
use crate::error::GenerateError;
use crate::ir::Table;
use serde_json::json;

pub const BASE_CONTROLLER: &str = include_str!("templates/base_controller.go.tpl");

/// Field names a raw request payload is checked against: every retained
/// column except the reverse side of a one-to-one relation.
pub fn payload_fields(table: &Table) -> String {
    let names: Vec<String> = table
        .retained()
        .filter(|c| !c.tag.reverse_one)
        .map(|c| format!("\"{}\"", c.name))
        .collect();
    format!("[]string{{{}}}", names.join(", "))
}

/// Human readable name used in the `@Description` annotations.
pub fn description(table: &Table) -> String {
    let description = table.comment.replace('表', "");
    let description = description.trim();
    if description.is_empty() {
        table.name.clone()
    } else {
        description.to_string()
    }
}

pub fn controller_source(table: &Table, pkg_path: &str) -> Result<String, GenerateError> {
    render(
        "controller",
        &json!({
            "ctrlName": table.struct_name(),
            "Description": description(table),
            "pkgPath": pkg_path,
            "colNamesString": payload_fields(table),
        }),
    )
}
