use dbscaffold::rules::{RuleDocument, RULE_FILE};
use dbscaffold::scaffold::new_app;
use std::fs;
use tempfile::tempdir;

#[test]
fn creates_skeleton() {
    let dir = tempdir().unwrap();
    let app = dir.path().join("shop");
    new_app(&app, "acme/shop").unwrap();

    for sub in ["controllers", "models", "routers", "utils", "conf", "rules"] {
        assert!(app.join(sub).is_dir(), "missing {}", sub);
    }
    let main = fs::read_to_string(app.join("main.go")).unwrap();
    assert!(main.contains("_ \"acme/shop/routers\""));
    let conf = fs::read_to_string(app.join("conf/app.conf")).unwrap();
    assert!(conf.starts_with("appname = shop\n"));
    for key in ["open_api_sign = false", "open_jwt = false", "open_perm = false", "center_service ="] {
        assert!(conf.contains(key), "missing {}", key);
    }
    assert!(fs::read_to_string(app.join("README.md")).unwrap().starts_with("# shop"));
    assert!(app.join("models/README.md").exists());

    assert!(app.join("rules/rule.yml").exists());
    let rules = fs::read_to_string(app.join(RULE_FILE)).unwrap();
    assert!(rules.contains("route:\n"));
    assert!(rules.contains("acme/shop/rules"));
    let doc = RuleDocument::parse(&rules).unwrap();
    assert_eq!(doc.api(), "shop");
    assert!(doc.controllers().is_empty());
    assert!(doc.rule_controllers().is_empty());
    assert!(doc.plan().unwrap().is_empty());
}

#[test]
fn empty_directory_is_accepted() {
    let dir = tempdir().unwrap();
    new_app(dir.path(), "blog").unwrap();
    let conf = fs::read_to_string(dir.path().join("conf/app.conf")).unwrap();
    assert!(conf.starts_with("appname = blog\n"));
}

#[test]
fn refuses_non_empty_directory() {
    let dir = tempdir().unwrap();
    let app = dir.path().join("shop");
    new_app(&app, "acme/shop").unwrap();
    assert!(new_app(&app, "acme/shop").is_err());
}
