//! Route manifest: a JSON list of every annotated controller endpoint, used by
//! front ends and permission tooling.

use crate::ir;
use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Route {
    pub title: String,
    pub url: String,
    pub method_type: String,
    pub merged_url_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RouteManifest {
    pub api_base_url: String,
    pub routes: Vec<Route>,
}

fn quoted_path_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""/([^"]*)""#).expect("valid path regex"))
}

fn router_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^//\s*@router\s+(\S+)\s*\[([A-Za-z]+)\]").expect("valid router annotation regex")
    })
}

/// Namespaces registered in a router source, without the leading api prefix.
pub fn namespaces(router: &str) -> Vec<String> {
    quoted_path_re()
        .captures_iter(router)
        .skip(1)
        .map(|c| c[1].to_string())
        .collect()
}

/// Pair each `// @Description` with the next `// @router` line below it.
pub fn controller_routes(namespace: &str, source: &str) -> Vec<Route> {
    let mut routes = Vec::new();
    let mut title: Option<String> = None;
    for line in source.lines().map(str::trim) {
        if let Some(rest) = line.strip_prefix("// @Description") {
            title = Some(rest.trim().to_string());
        } else if let Some(caps) = router_re().captures(line) {
            let Some(title) = title.take() else {
                continue;
            };
            let method = caps[2].to_lowercase();
            let url = format!("/{}{}", namespace, &caps[1]);
            routes.push(Route {
                title,
                merged_url_key: format!("{}@{}", method, url),
                url,
                method_type: method,
            });
        }
    }
    routes
}

fn controller_source_path(app_dir: &Path, namespace: &str) -> Option<PathBuf> {
    let dir = app_dir.join("controllers");
    [namespace.to_string(), ir::file_stem(namespace)]
        .into_iter()
        .map(|stem| dir.join(format!("{}.go", stem)))
        .find(|p| p.exists())
}

impl RouteManifest {
    /// Build the manifest from `routers/router.go` and the controllers it
    /// references.
    pub fn scan(app_dir: &Path, api: &str) -> Result<Self> {
        let router_path = app_dir.join("routers").join("router.go");
        let router = fs::read_to_string(&router_path)
            .with_context(|| format!("could not read {}", router_path.display()))?;

        let mut manifest = RouteManifest {
            api_base_url: format!("/{}", api),
            routes: Vec::new(),
        };
        for ns in namespaces(&router) {
            let Some(path) = controller_source_path(app_dir, &ns) else {
                warn!(namespace = %ns, "no controller file for namespace");
                continue;
            };
            let source = fs::read_to_string(&path)
                .with_context(|| format!("could not read {}", path.display()))?;
            let routes = controller_routes(&ns, &source);
            debug!(namespace = %ns, routes = routes.len(), "scanned controller");
            manifest.routes.extend(routes);
        }
        Ok(manifest)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("could not serialize route manifest")
    }

    /// Write `routers/router.json` and its copy `static/router/router.json`.
    pub fn write(&self, app_dir: &Path) -> Result<()> {
        let json = self.to_json()?;
        let primary = app_dir.join("routers").join("router.json");
        fs::write(&primary, &json)
            .with_context(|| format!("could not write {}", primary.display()))?;

        let static_dir = app_dir.join("static").join("router");
        let copy = static_dir.join("router.json");
        if let Err(e) = fs::create_dir_all(&static_dir).and_then(|_| fs::write(&copy, &json)) {
            warn!(file = %copy.display(), error = %e, "could not write route manifest copy");
        }
        info!(routes = self.routes.len(), "route manifest written");
        Ok(())
    }
}
