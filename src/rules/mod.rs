//! Rule document handling: namespace rewriting, extra controllers and
//! snippet splicing driven by `rules/rule.yml`.
//!
//! ```yaml
//! route:
//!   api: shop
//!   controller: login,upload
//!   rulecontroller: order
//! controller:
//!   User:
//!     Post:
//!       pos: pos12
//!       rule: Check name:v.Name->Run()->err
//!       imports: shop/rules
//! ```
//!
//! Keys left empty (`controller:` with nothing after it) read as null and are
//! treated like absent ones.

pub mod dsl;
pub mod splice;

use crate::codegen::format::SourceFormatter;
use crate::codegen::template::render;
use crate::error::RuleError;
use crate::manifest::RouteManifest;
use anyhow::{Context, Result};
use dsl::RuleExpr;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::json;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

pub const RULE_FILE: &str = "rules/rule.yml";
pub const DEFAULT_API: &str = "api";

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Scalar as text: `api: 2` and `api: "2"` read the same, null reads empty.
fn scalar_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a scalar, found {:?}",
            other
        ))),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteSection {
    #[serde(default, deserialize_with = "scalar_text")]
    pub api: String,
    /// Comma separated names of extra plain controllers.
    #[serde(default, deserialize_with = "scalar_text")]
    pub controller: String,
    /// Comma separated names of extra `Rule<Name>` controllers.
    #[serde(default, deserialize_with = "scalar_text")]
    pub rulecontroller: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiRule {
    #[serde(default, deserialize_with = "scalar_text")]
    pub pos: String,
    #[serde(default, deserialize_with = "scalar_text")]
    pub rule: String,
    /// Comma separated import paths.
    #[serde(default, deserialize_with = "scalar_text")]
    pub imports: String,
}

/// Api name => rule for one controller.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct ControllerRules(#[serde(deserialize_with = "null_as_default")] pub BTreeMap<String, ApiRule>);

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    pub route: RouteSection,
    #[serde(default, deserialize_with = "null_as_default")]
    pub controller: BTreeMap<String, ControllerRules>,
}

/// A validated rule entry ready to be spliced.
#[derive(Debug, Clone)]
pub struct PlannedRule {
    pub controller: String,
    pub api: String,
    pub pos: String,
    pub imports: Vec<String>,
    pub expr: RuleExpr,
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl RuleDocument {
    pub fn parse(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let doc: Option<Self> = serde_yaml::from_str(text).context("could not parse rule document")?;
        Ok(doc.unwrap_or_default())
    }

    pub fn load(app_dir: &Path) -> Result<Self> {
        let path = app_dir.join(RULE_FILE);
        let text = fs::read_to_string(&path)
            .with_context(|| format!("could not read {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("in {}", path.display()))
    }

    pub fn api(&self) -> &str {
        let api = self.route.api.trim().trim_matches('/');
        if api.is_empty() {
            DEFAULT_API
        } else {
            api
        }
    }

    pub fn controllers(&self) -> Vec<String> {
        split_list(&self.route.controller)
    }

    pub fn rule_controllers(&self) -> Vec<String> {
        split_list(&self.route.rulecontroller)
    }

    /// Parse every rule up front so a single malformed entry aborts the run
    /// before any controller is touched.
    pub fn plan(&self) -> Result<Vec<PlannedRule>, RuleError> {
        let mut out = Vec::new();
        for (controller, apis) in &self.controller {
            for (api, entry) in &apis.0 {
                if entry.pos.trim().is_empty() {
                    return Err(RuleError::MissingPos {
                        controller: controller.clone(),
                        api: api.clone(),
                    });
                }
                out.push(PlannedRule {
                    controller: controller.clone(),
                    api: api.clone(),
                    pos: entry.pos.trim().to_string(),
                    imports: split_list(&entry.imports),
                    expr: RuleExpr::parse(controller, api, &entry.rule)?,
                });
            }
        }
        Ok(out)
    }
}

fn namespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"NewNamespace\("/[^"]*""#).expect("valid namespace regex"))
}

fn controller_path(app_dir: &Path, file: &str) -> PathBuf {
    app_dir.join("controllers").join(format!("{}.go", file))
}

/// `userInfo` => `UserInfo`: only the first letter changes.
fn title_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `RuleOrder` => `rule_order`
fn snake_case(name: &str) -> String {
    let mut out = String::new();
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() && i > 0 && !out.ends_with('_') {
            out.push('_');
        }
        out.push(c.to_ascii_lowercase());
    }
    out
}

/// Controller file for a rule document key: `user` and `User` map to
/// `user.go`, `UserInfo` and `RuleOrder` to `user_info.go` and
/// `rule_order.go` when those exist.
pub fn controller_file(app_dir: &Path, controller: &str) -> PathBuf {
    let lower = controller_path(app_dir, &controller.to_lowercase());
    if lower.exists() {
        return lower;
    }
    let snake = controller_path(app_dir, &snake_case(controller));
    if snake.exists() {
        return snake;
    }
    lower
}

/// Add one namespace plus a stub controller unless the route already exists.
fn add_route(
    app_dir: &Path,
    router: &mut String,
    route: &str,
    ctrl_name: &str,
    formatter: &dyn SourceFormatter,
) -> Result<()> {
    if router.contains(&format!("\"/{}\"", route)) {
        debug!(route, "route already present");
        return Ok(());
    }
    let partial = render("route_partial", &json!({ "route": route, "ctrlName": ctrl_name }))?;
    match splice::replace_marker(router, splice::ROUTER_MARKER, &partial) {
        Some(updated) => *router = updated,
        None => warn!(route, "router has no {} marker", splice::ROUTER_MARKER),
    }

    let path = controller_path(app_dir, route);
    if !path.exists() {
        let source = render("rule_controller", &json!({ "ctrlName": ctrl_name }))?;
        fs::write(&path, source).with_context(|| format!("could not write {}", path.display()))?;
        formatter.format(&path);
        info!(file = %path.display(), "created controller");
    }
    Ok(())
}

/// Point the router at the document's api prefix and register the extra
/// controllers it declares.
pub fn fix_router(app_dir: &Path, doc: &RuleDocument, formatter: &dyn SourceFormatter) -> Result<()> {
    let path = app_dir.join("routers").join("router.go");
    let mut router =
        fs::read_to_string(&path).with_context(|| format!("could not read {}", path.display()))?;

    let prefix = format!("NewNamespace(\"/{}\"", doc.api());
    router = namespace_re()
        .replace(&router, regex::NoExpand(&prefix))
        .into_owned();

    for name in doc.controllers() {
        let route = name.to_lowercase();
        add_route(app_dir, &mut router, &route, &title_case(&name), formatter)?;
    }
    for name in doc.rule_controllers() {
        let route = format!("rule_{}", name.to_lowercase());
        let ctrl = format!("Rule{}", title_case(&name));
        add_route(app_dir, &mut router, &route, &ctrl, formatter)?;
    }

    fs::write(&path, router).with_context(|| format!("could not write {}", path.display()))?;
    formatter.format(&path);
    Ok(())
}

/// Splice every planned rule into its controller file.
pub fn fix_controllers(app_dir: &Path, plan: &[PlannedRule], formatter: &dyn SourceFormatter) -> Result<()> {
    let mut by_controller: BTreeMap<&str, Vec<&PlannedRule>> = BTreeMap::new();
    for rule in plan {
        by_controller
            .entry(rule.controller.as_str())
            .or_default()
            .push(rule);
    }

    for (controller, rules) in by_controller {
        let path = controller_file(app_dir, controller);
        let mut source = fs::read_to_string(&path)
            .with_context(|| format!("could not read controller {} for rules", path.display()))?;

        for rule in rules {
            match splice::add_imports(&source, &rule.imports) {
                Some(updated) => source = updated,
                None => warn!(controller, api = %rule.api, "controller has no {} marker", splice::IMPORT_MARKER),
            }
            match splice::splice(&source, &rule.pos, &rule.api, &rule.expr.render()) {
                Some(updated) => {
                    debug!(controller, api = %rule.api, pos = %rule.pos, "spliced rule");
                    source = updated;
                }
                None => warn!(controller, api = %rule.api, pos = %rule.pos, "insertion point not found"),
            }
        }

        fs::write(&path, source).with_context(|| format!("could not write {}", path.display()))?;
        formatter.format(&path);
    }
    Ok(())
}

/// Run all rule phases against an application generated earlier and return
/// the route manifest that was written.
pub fn apply_rules(app_dir: &Path, formatter: &dyn SourceFormatter) -> Result<RouteManifest> {
    let doc = RuleDocument::load(app_dir)?;
    let plan = doc.plan()?;
    info!(api = doc.api(), rules = plan.len(), "Applying rules...");
    fix_router(app_dir, &doc, formatter)?;
    fix_controllers(app_dir, &plan, formatter)?;
    let manifest = RouteManifest::scan(app_dir, doc.api())?;
    manifest.write(app_dir)?;
    Ok(manifest)
}
