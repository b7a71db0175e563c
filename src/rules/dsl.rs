//! The one-line rule language.
//!
//! ```text
//! Check id:v.Id,name:v.Name->Run()->err     struct form
//! Func ->HookApi(&v)->-1                     raw call form
//! ```
//!
//! The struct form builds `&rules.CheckRule{...}` and calls a method on it,
//! the raw form inlines the call. The last segment is the assignment target;
//! `-1` (or no segment) means the result is discarded. `&#58;` stands for a
//! literal `:` inside field names and values.

use crate::error::RuleError;

pub const NO_TARGET: &str = "-1";
const FUNC: &str = "Func";
const ARROW: &str = "->";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleExpr {
    Struct {
        name: String,
        fields: Vec<(String, String)>,
        method: String,
        target: Option<String>,
    },
    Func {
        call: String,
        target: Option<String>,
    },
}

fn unescape(s: &str) -> String {
    s.trim().replace("&#58;", ":")
}

impl RuleExpr {
    /// Parse the rule of `controller`.`api`; the names only label errors.
    pub fn parse(controller: &str, api: &str, rule: &str) -> Result<Self, RuleError> {
        let ctx = || (controller.to_string(), api.to_string());
        let rule = rule.trim();
        if rule.is_empty() {
            let (controller, api) = ctx();
            return Err(RuleError::Empty { controller, api });
        }

        let (name, expr) = match rule.split_once(char::is_whitespace) {
            Some((name, expr)) if !expr.trim().is_empty() => (name, expr.trim()),
            _ => {
                let (controller, api) = ctx();
                return Err(RuleError::MissingExpression {
                    controller,
                    api,
                    name: rule.split_whitespace().next().unwrap_or_default().to_string(),
                    rule: rule.to_string(),
                });
            }
        };

        let parts: Vec<&str> = expr.split(ARROW).map(str::trim).collect();
        if parts.len() < 2 || parts[1].is_empty() {
            let (controller, api) = ctx();
            return Err(RuleError::MissingSeparator {
                controller,
                api,
                rule: rule.to_string(),
            });
        }
        let target = parts
            .get(2)
            .filter(|t| !t.is_empty() && **t != NO_TARGET)
            .map(|t| t.to_string());

        if name == FUNC {
            return Ok(RuleExpr::Func {
                call: parts[1].to_string(),
                target,
            });
        }

        let mut fields = Vec::new();
        for field in parts[0].split(',').map(str::trim).filter(|f| !f.is_empty()) {
            let (k, v) = field.split_once(':').ok_or_else(|| RuleError::BadField {
                controller: controller.to_string(),
                api: api.to_string(),
                field: field.to_string(),
            })?;
            fields.push((unescape(k), unescape(v)));
        }
        Ok(RuleExpr::Struct {
            name: name.to_string(),
            fields,
            method: parts[1].to_string(),
            target,
        })
    }

    /// Go statements for the rule, without a trailing newline.
    pub fn render(&self) -> String {
        match self {
            RuleExpr::Func { call, target } => match target {
                Some(t) => format!("{} = {}", t, call),
                None => call.clone(),
            },
            RuleExpr::Struct {
                name,
                fields,
                method,
                target,
            } => {
                let var = name.to_lowercase();
                let mut out = format!("{} := &rules.{}Rule{{\n", var, name);
                for (k, v) in fields {
                    out.push_str(&format!("\t{}: {},\n", k, v));
                }
                out.push_str("}\n");
                match target {
                    Some(t) => out.push_str(&format!("{} = {}.{}", t, var, method)),
                    None => out.push_str(&format!("{}.{}", var, method)),
                }
                out
            }
        }
    }
}
