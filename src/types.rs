use crate::error::GenerateError;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Scalar types the generated Go models can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GoScalar {
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Bool,
    String,
    Time,
    Float32,
    Float64,
}

impl GoScalar {
    pub fn as_str(self) -> &'static str {
        match self {
            GoScalar::Int => "int",
            GoScalar::Int8 => "int8",
            GoScalar::Int16 => "int16",
            GoScalar::Int32 => "int32",
            GoScalar::Int64 => "int64",
            GoScalar::Uint => "uint",
            GoScalar::Uint8 => "uint8",
            GoScalar::Uint16 => "uint16",
            GoScalar::Uint32 => "uint32",
            GoScalar::Uint64 => "uint64",
            GoScalar::Bool => "bool",
            GoScalar::String => "string",
            GoScalar::Time => "time.Time",
            GoScalar::Float32 => "float32",
            GoScalar::Float64 => "float64",
        }
    }

    /// Placeholder value used in the JSON samples of the DTO file.
    pub fn json_sample(self) -> &'static str {
        match self {
            GoScalar::Bool => "false",
            GoScalar::String => "\"\"",
            GoScalar::Time => "\"2020-01-02T03:04:05+08:00\"",
            GoScalar::Float32 | GoScalar::Float64 => "0.00",
            _ => "0",
        }
    }
}

impl fmt::Display for GoScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoScalar {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ty = match s.trim() {
            "int" => GoScalar::Int,
            "int8" => GoScalar::Int8,
            "int16" => GoScalar::Int16,
            "int32" => GoScalar::Int32,
            "int64" => GoScalar::Int64,
            "uint" => GoScalar::Uint,
            "uint8" => GoScalar::Uint8,
            "uint16" => GoScalar::Uint16,
            "uint32" => GoScalar::Uint32,
            "uint64" => GoScalar::Uint64,
            "bool" => GoScalar::Bool,
            "string" => GoScalar::String,
            "time.Time" => GoScalar::Time,
            "float32" => GoScalar::Float32,
            "float64" => GoScalar::Float64,
            other => return Err(other.to_string()),
        };
        Ok(ty)
    }
}

const MYSQL_TYPES: &[(&str, GoScalar)] = &[
    ("int", GoScalar::Int),
    ("integer", GoScalar::Int),
    ("tinyint", GoScalar::Int8),
    ("smallint", GoScalar::Int16),
    ("mediumint", GoScalar::Int32),
    ("bigint", GoScalar::Int64),
    ("int unsigned", GoScalar::Uint),
    ("integer unsigned", GoScalar::Uint),
    ("tinyint unsigned", GoScalar::Uint8),
    ("smallint unsigned", GoScalar::Uint16),
    ("mediumint unsigned", GoScalar::Uint32),
    ("bigint unsigned", GoScalar::Uint64),
    ("bit", GoScalar::Uint64),
    ("bool", GoScalar::Bool),
    ("enum", GoScalar::String),
    ("set", GoScalar::String),
    ("varchar", GoScalar::String),
    ("char", GoScalar::String),
    ("tinytext", GoScalar::String),
    ("mediumtext", GoScalar::String),
    ("text", GoScalar::String),
    ("longtext", GoScalar::String),
    ("blob", GoScalar::String),
    ("tinyblob", GoScalar::String),
    ("mediumblob", GoScalar::String),
    ("longblob", GoScalar::String),
    ("date", GoScalar::Time),
    ("datetime", GoScalar::Time),
    ("timestamp", GoScalar::Time),
    ("time", GoScalar::Time),
    ("float", GoScalar::Float32),
    ("double", GoScalar::Float64),
    ("decimal", GoScalar::Float64),
    ("binary", GoScalar::String),
    ("varbinary", GoScalar::String),
    ("year", GoScalar::Int16),
];

/// Native column type to Go scalar lookup. Unknown native types are fatal.
#[derive(Debug, Clone)]
pub struct TypeMap {
    entries: HashMap<String, GoScalar>,
}

impl Default for TypeMap {
    fn default() -> Self {
        TypeMap {
            entries: MYSQL_TYPES
                .iter()
                .map(|(native, ty)| (native.to_string(), *ty))
                .collect(),
        }
    }
}

impl TypeMap {
    /// Built-in MySQL table extended (or overridden) by `extra`, whose values
    /// are Go type names as written in `type_map.toml`.
    pub fn with_overrides(extra: &HashMap<String, String>) -> Result<Self, GenerateError> {
        let mut map = TypeMap::default();
        for (native, target) in extra {
            let ty = target
                .parse::<GoScalar>()
                .map_err(|_| GenerateError::UnknownTargetType {
                    native: native.clone(),
                    target: target.clone(),
                })?;
            map.entries.insert(native.to_lowercase(), ty);
        }
        Ok(map)
    }

    pub fn lookup(&self, native: &str) -> Result<GoScalar, GenerateError> {
        self.entries
            .get(native)
            .copied()
            .ok_or_else(|| GenerateError::UnmappedType(native.to_string()))
    }
}

pub fn is_temporal(data_type: &str) -> bool {
    matches!(data_type, "date" | "datetime" | "timestamp" | "time")
}

pub fn is_string(data_type: &str) -> bool {
    matches!(data_type, "char" | "varchar")
}

pub fn is_signed_int(data_type: &str) -> bool {
    matches!(data_type, "int" | "tinyint" | "smallint" | "mediumint" | "bigint")
}

pub fn is_decimal(data_type: &str) -> bool {
    data_type == "decimal"
}

pub fn is_binary(data_type: &str) -> bool {
    matches!(data_type, "binary" | "varbinary")
}

pub fn is_bit(data_type: &str) -> bool {
    data_type == "bit"
}

fn size_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z]+\(([0-9]+)\)$").expect("valid size regex"))
}

fn sign_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z]+(?:\([0-9]+\))?(.*)$").expect("valid sign regex"))
}

fn decimal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"decimal\(([0-9]+),([0-9]+)\)").expect("valid decimal regex"))
}

/// `varchar(255)` => `Some("255")`.
pub fn column_size(column_type: &str) -> Option<String> {
    size_re()
        .captures(column_type)
        .map(|c| c[1].to_string())
}

/// Trailing modifier of an integer column type, e.g. `"unsigned"` for
/// `int(10) unsigned` or `int unsigned`.
pub fn int_signedness(column_type: &str) -> String {
    sign_re()
        .captures(column_type)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_default()
}

/// `decimal(10,2)` => `Some(("10", "2"))`.
pub fn decimal_parts(column_type: &str) -> Option<(String, String)> {
    decimal_re()
        .captures(column_type)
        .map(|c| (c[1].to_string(), c[2].to_string()))
}
