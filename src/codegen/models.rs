use super::template::render;
use crate::error::GenerateError;
use crate::ir::{self, ColumnType, Table};
use serde_json::json;

pub const LG_PAGER: &str = include_str!("templates/lg_pager.go.tpl");

/// `type X struct { ... }` with one line per retained column.
pub fn struct_source(table: &Table) -> String {
    let mut out = format!("type {} struct {{\n", table.struct_name());
    for col in table.retained() {
        out.push_str(&format!("\t{}\n", col.to_string().trim_end()));
    }
    out.push_str("}\n");
    out
}

/// Full source of `models/<stem>.go`.
pub fn model_source(table: &Table) -> Result<String, GenerateError> {
    let model_struct = struct_source(table);
    if table.is_degenerate() {
        let import = if table.import_time_pkg {
            "import \"time\"\n"
        } else {
            ""
        };
        return render(
            "model_struct",
            &json!({ "importTimePkg": import, "modelStruct": model_struct }),
        );
    }

    let time_pkg = if table.import_time_pkg { "\"time\"" } else { "" };
    let model_name = table.struct_name();
    render(
        "model",
        &json!({
            "timePkg": time_pkg,
            "modelStruct": model_struct,
            "modelName": model_name,
            "tableName": table.name,
            "every_rl_add": every_rl_add(table),
            "every_rl_update": every_rl_update(table),
            "every_rl_patch": every_rl_patch(table),
            "every_m2m_part": every_m2m_part(table),
        }),
    )
}

/// Cascade inserts run inside `Add<Model>HasMany` after the parent row exists.
pub fn every_rl_add(table: &Table) -> String {
    let model = table.struct_name();
    let mut out = String::from("// every_rl\n");
    for col in table.retained() {
        let f = &col.name;
        if col.tag.m2m {
            out.push_str(&format!("\t// m2m_add {}\n", f));
            out.push_str(&format!("\tif m.{f} != nil && len(m.{f}) != 0 {{\n"));
            out.push_str(&format!("\t\tm2m := o.QueryM2M(m, \"{f}\")\n"));
            out.push_str(&format!("\t\tif _, err = m2m.Add(m.{f}); err != nil {{\n"));
            out.push_str("\t\t\to.Rollback()\n\t\t\treturn\n\t\t}\n\t}\n");
        } else if col.tag.reverse_many {
            out.push_str(&format!("\t// o2m_add {}\n", f));
            out.push_str(&format!("\tif m.{f} != nil && len(m.{f}) != 0 {{\n"));
            out.push_str(&format!("\t\tfor i := range m.{f} {{\n"));
            out.push_str(&format!("\t\t\tm.{f}[i].{model} = &{model}{{Id: m.Id}}\n"));
            out.push_str("\t\t}\n");
            out.push_str(&format!(
                "\t\tif _, err = o.InsertMulti(len(m.{f}), m.{f}); err != nil {{\n"
            ));
            out.push_str("\t\t\to.Rollback()\n\t\t\treturn\n\t\t}\n\t}\n");
        } else if col.tag.reverse_one {
            out.push_str(&format!("\t// o2o_add {}\n", f));
            out.push_str(&format!("\tif m.{f} != nil {{\n"));
            out.push_str(&format!("\t\tm.{f}.{model} = &{model}{{Id: m.Id}}\n"));
            out.push_str(&format!("\t\tif _, err = o.Insert(m.{f}); err != nil {{\n"));
            out.push_str("\t\t\to.Rollback()\n\t\t\treturn\n\t\t}\n\t}\n");
        }
    }
    out
}

/// Many-to-many members are cleared and re-added on a full update.
pub fn every_rl_update(table: &Table) -> String {
    let mut out = String::from("// every_rl\n");
    for col in table.retained().filter(|c| c.tag.m2m) {
        let f = &col.name;
        out.push_str(&format!("\t// m2m_update {}\n", f));
        out.push_str(&format!("\tif m.{f} != nil {{\n"));
        out.push_str(&format!("\t\tm2m := o.QueryM2M(m, \"{f}\")\n"));
        out.push_str("\t\tif _, err = m2m.Clear(); err != nil {\n");
        out.push_str("\t\t\to.Rollback()\n\t\t\treturn\n\t\t}\n");
        out.push_str(&format!("\t\tif len(m.{f}) != 0 {{\n"));
        out.push_str(&format!("\t\t\tif _, err = m2m.Add(m.{f}); err != nil {{\n"));
        out.push_str("\t\t\t\to.Rollback()\n\t\t\t\treturn\n\t\t\t}\n\t\t}\n\t}\n");
    }
    out
}

/// Named many-to-many fields in a patch are replaced wholesale and removed
/// from the column update list; one-to-many collections are only dropped
/// from the list.
pub fn every_rl_patch(table: &Table) -> String {
    let mut out = String::from("// every_rl\n");
    for col in table.retained() {
        let f = &col.name;
        if col.tag.m2m {
            out.push_str(&format!("\t\t// m2m_patch {}\n", f));
            out.push_str(&format!("\t\tif fname == \"{f}\" {{\n"));
            out.push_str(&format!("\t\t\tif m.{f} != nil {{\n"));
            out.push_str(&format!("\t\t\t\tm2m := o.QueryM2M(m, \"{f}\")\n"));
            out.push_str("\t\t\t\tif _, err = m2m.Clear(); err != nil {\n");
            out.push_str("\t\t\t\t\to.Rollback()\n\t\t\t\t\treturn\n\t\t\t\t}\n");
            out.push_str(&format!("\t\t\t\tif len(m.{f}) != 0 {{\n"));
            out.push_str(&format!(
                "\t\t\t\t\tif _, err = m2m.Add(m.{f}); err != nil {{\n"
            ));
            out.push_str("\t\t\t\t\t\to.Rollback()\n\t\t\t\t\t\treturn\n\t\t\t\t\t}\n\t\t\t\t}\n\t\t\t}\n");
            out.push_str("\t\t\tfields = append(fields[:index], fields[index+1:]...)\n\t\t}\n");
        } else if col.tag.reverse_many {
            out.push_str(&format!("\t\t// o2m_patch {}\n", f));
            out.push_str(&format!("\t\tif fname == \"{f}\" {{\n"));
            out.push_str("\t\t\tfields = append(fields[:index], fields[index+1:]...)\n\t\t}\n");
        }
    }
    out
}

/// Incremental attach/detach of many-to-many members by id.
pub fn every_m2m_part(table: &Table) -> String {
    let mut out = String::from("// every_m2m_part\n");
    for col in table.retained().filter(|c| c.tag.m2m) {
        let f = &col.name;
        let member = match &col.ty {
            ColumnType::RefList(name) | ColumnType::Ref(name) => name.clone(),
            ColumnType::Scalar(_) => continue,
        };
        out.push_str(&format!("\t// m2m_{} through {}\n", f, col.tag.m2m_through));
        out.push_str(&format!("\tif field == \"{f}\" {{\n"));
        out.push_str(&format!("\t\tm2m := o.QueryM2M(m, \"{f}\")\n"));
        out.push_str("\t\tfor _, did := range DelIds {\n");
        out.push_str(&format!("\t\t\tdelone := &{member}{{Id: did}}\n"));
        out.push_str("\t\t\tif m2m.Exist(delone) {\n");
        out.push_str("\t\t\t\tif _, err = m2m.Remove(delone); err != nil {\n");
        out.push_str("\t\t\t\t\to.Rollback()\n\t\t\t\t\treturn\n\t\t\t\t}\n\t\t\t}\n\t\t}\n");
        out.push_str("\t\tfor _, aid := range AddIds {\n");
        out.push_str(&format!("\t\t\taddone := &{member}{{Id: aid}}\n"));
        out.push_str("\t\t\tif !m2m.Exist(addone) {\n");
        out.push_str("\t\t\t\tif _, err = m2m.Add(addone); err != nil {\n");
        out.push_str("\t\t\t\t\to.Rollback()\n\t\t\t\t\treturn\n\t\t\t\t}\n\t\t\t}\n\t\t}\n\t}\n");
    }
    out
}

/// File name shared by the model and controller of `table`.
pub fn file_name(table: &Table) -> String {
    format!("{}.go", ir::file_stem(&table.name))
}
