use crate::types::GoScalar;
use std::collections::HashMap;
use std::fmt;

/// Infix marking a join table, e.g. `student_has_course`.
pub const JOIN_INFIX: &str = "_has_";
/// Column suffix marking a one-to-one link, e.g. `user_one`.
pub const ONE_SUFFIX: &str = "_one";
/// Column suffix marking a foreign key, e.g. `user_id`.
pub const FK_SUFFIX: &str = "_id";

#[derive(Debug, Clone, Default)]
pub struct Table {
    pub name: String,
    /// Single-column primary key; empty for weak tables.
    pub pk: String,
    pub uk: Vec<String>,
    pub fk: HashMap<String, ForeignKey>,
    pub columns: Vec<Column>,
    pub comment: String,
    pub import_time_pkg: bool,
    /// Names of the association columns injected by relation inference.
    pub relation: Vec<String>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Table {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn is_join(&self) -> bool {
        is_join_table(&self.name)
    }

    /// Weak and join tables get a bare struct with no CRUD, controller or route.
    pub fn is_degenerate(&self) -> bool {
        self.pk.is_empty() || self.is_join()
    }

    pub fn struct_name(&self) -> String {
        pascal_case(&self.name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns that make it into the generated struct.
    pub fn retained(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_need)
    }
}

pub fn is_join_table(name: &str) -> bool {
    name.len() > JOIN_INFIX.len() && name.contains(JOIN_INFIX)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    Scalar(GoScalar),
    /// Pointer to another generated struct.
    Ref(String),
    /// Slice of pointers to another generated struct.
    RefList(String),
}

impl ColumnType {
    pub fn is_relation(&self) -> bool {
        !matches!(self, ColumnType::Scalar(_))
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Scalar(s) => write!(f, "{}", s),
            ColumnType::Ref(name) => write!(f, "*{}", name),
            ColumnType::RefList(name) => write!(f, "[]*{}", name),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Column {
    /// Go field name.
    pub name: String,
    pub ty: ColumnType,
    /// Cleared when the column is replaced by an association field.
    pub is_need: bool,
    pub tag: OrmTag,
}

impl Column {
    /// Source column name, empty for injected association columns.
    pub fn source_name(&self) -> &str {
        &self.tag.column
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.ty, self.tag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub name: String,
    pub ref_schema: String,
    pub ref_table: String,
    pub ref_column: String,
}

/// Storage attributes rendered as a beego `orm:"..."` struct tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrmTag {
    pub auto: bool,
    pub pk: bool,
    pub null: bool,
    pub index: bool,
    pub unique: bool,
    pub column: String,
    pub size: String,
    pub decimals: String,
    pub digits: String,
    pub auto_now: bool,
    pub auto_now_add: bool,
    pub sql_type: String,
    pub default: String,
    pub rel_one: bool,
    pub reverse_one: bool,
    pub rel_fk: bool,
    pub reverse_many: bool,
    pub rel_m2m: bool,
    pub comment: String,
    /// Either side of a many-to-many association.
    pub m2m: bool,
    pub m2m_through: String,
}

impl OrmTag {
    pub fn options(&self) -> Vec<String> {
        let mut opts = Vec::new();
        if !self.column.is_empty() {
            opts.push(format!("column({})", self.column));
        }
        if self.auto {
            opts.push("auto".to_string());
        }
        if !self.size.is_empty() {
            opts.push(format!("size({})", self.size));
        }
        if !self.sql_type.is_empty() {
            opts.push(format!("type({})", self.sql_type));
        }
        if self.null {
            opts.push("null".to_string());
        }
        if self.auto_now {
            opts.push("auto_now".to_string());
        }
        if self.auto_now_add {
            opts.push("auto_now_add".to_string());
        }
        if !self.decimals.is_empty() {
            opts.push(format!("digits({});decimals({})", self.digits, self.decimals));
        }
        if self.rel_fk {
            opts.push("rel(fk)".to_string());
        }
        if self.rel_one {
            opts.push("rel(one)".to_string());
        }
        if self.reverse_one {
            opts.push("reverse(one)".to_string());
        }
        if self.reverse_many {
            opts.push("reverse(many)".to_string());
        }
        if self.rel_m2m {
            opts.push("rel(m2m)".to_string());
            opts.push(format!("rel_table({})", self.m2m_through));
        }
        if self.pk {
            opts.push("pk".to_string());
        }
        if self.unique {
            opts.push("unique".to_string());
        }
        if !self.default.is_empty() {
            opts.push(format!("default({})", self.default));
        }
        opts
    }

    /// Attribute comment used in the DTO file instead of an orm tag.
    pub fn dto_comment(&self, relation: bool) -> String {
        let mut out = String::from("/*");
        if relation {
            out.push_str(&format!("description:\"{}\"", self.comment));
            if self.rel_fk || self.rel_one {
                out.push_str(", must not be null");
            }
        } else {
            out.push_str(&format!("column:\"{}\"", self.column));
            if !self.size.is_empty() {
                out.push_str(&format!(", size:\"{}\"", self.size));
            }
            if !self.default.is_empty() {
                out.push_str(&format!(", default:\"{}\"", self.default));
            }
            if !self.comment.is_empty() {
                out.push_str(&format!(", comment:\"{}\"", self.comment));
            }
        }
        out.push_str("*/");
        out
    }
}

impl fmt::Display for OrmTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let opts = self.options();
        if opts.is_empty() {
            return Ok(());
        }
        if self.comment.is_empty() {
            write!(f, "`orm:\"{}\"`", opts.join(";"))
        } else {
            write!(
                f,
                "`orm:\"{}\" description:\"{}\"`",
                opts.join(";"),
                self.comment.replace('"', "\\\"")
            )
        }
    }
}

/// `very_important_person` => `VeryImportantPerson`
pub fn pascal_case(s: &str) -> String {
    s.split('_')
        .map(|p| {
            let p = p.trim();
            let mut c = p.chars();
            match c.next() {
                None => String::new(),
                Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
            }
        })
        .collect()
}

/// Go treats `*_test.go` as test files, so a trailing `_test` loses its
/// underscore: `foo_test` => `footest`.
pub fn file_stem(table: &str) -> String {
    let mut name = table.to_string();
    while name.ends_with("_test") {
        if let Some(pos) = name.rfind('_') {
            name.remove(pos);
        }
    }
    name
}
