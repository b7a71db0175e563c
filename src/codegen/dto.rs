//! `models/dto/dto_model.go`: documentation-only transfer structs plus a JSON
//! sample per table, meant for API consumers rather than the ORM.

use crate::ir::{Column, ColumnType, Table};

pub fn dto_source(tables: &[Table]) -> String {
    let mut out = String::from("package dto\n\n");
    if tables.iter().any(|t| t.import_time_pkg) {
        out.push_str("import \"time\"\n\n");
    }
    for table in tables {
        out.push_str(&dto_struct(table));
        out.push_str(&json_sample(table));
    }
    out
}

fn dto_struct(table: &Table) -> String {
    let mut out = format!("// [{}] {}\n", table.name, table.comment);
    out.push_str(&format!("type {}_DTO struct {{\n", table.struct_name()));
    for col in table.retained() {
        out.push_str(&format!("\t{}\n", dto_field(col)));
    }
    out.push_str("}\n\n");
    out
}

fn dto_field(col: &Column) -> String {
    let relation = col.ty.is_relation();
    let ty = if relation {
        format!("{}_DTO", col.ty)
    } else {
        col.ty.to_string()
    };
    format!("{} {} {}", col.name, ty, col.tag.dto_comment(relation))
}

fn json_sample(table: &Table) -> String {
    let entries: Vec<String> = table
        .retained()
        .map(|col| {
            let value = match &col.ty {
                ColumnType::Ref(_) => "{\"Id\": 0}",
                ColumnType::RefList(_) => "[{\"Id\": 0}]",
                ColumnType::Scalar(s) => s.json_sample(),
            };
            format!("    \"{}\": {}", col.name, value)
        })
        .collect();
    format!(
        "/* [{}] json sample\n{{\n{}\n}}\n*/\n\n",
        table.name,
        entries.join(",\n")
    )
}
