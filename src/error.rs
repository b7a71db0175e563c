use std::path::PathBuf;
use thiserror::Error;

/// Fatal configuration and generation errors. Any of these aborts the run.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("data type '{0}' not found in the type map")]
    UnmappedType(String),
    #[error("unknown target type '{target}' for native type '{native}' in type map")]
    UnknownTargetType { native: String, target: String },
    #[error("GOPATH environment variable is not set or empty")]
    MissingWorkspace,
    #[error("cannot generate application code outside of GOPATH '{gopath}' (working directory '{}')", .dir.display())]
    OutsideWorkspace { gopath: String, dir: PathBuf },
    #[error("cannot generate application code in the workspace source root '{}'", .0.display())]
    AtWorkspaceRoot(PathBuf),
    #[error("template '{template}': {message}")]
    Template { template: String, message: String },
}

/// Rule document errors. Malformed rule expressions fail fast instead of
/// producing broken controller code.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("rule for {controller}.{api} is empty")]
    Empty { controller: String, api: String },
    #[error("rule for {controller}.{api} has no expression after '{name}': {rule}")]
    MissingExpression { controller: String, api: String, name: String, rule: String },
    #[error("rule for {controller}.{api} is missing the '->' separator: {rule}")]
    MissingSeparator { controller: String, api: String, rule: String },
    #[error("rule for {controller}.{api} has a field without ':': '{field}'")]
    BadField { controller: String, api: String, field: String },
    #[error("rule for {controller}.{api} has no insertion point")]
    MissingPos { controller: String, api: String },
}
