use super::*;
use crate::task::DocumentId;

#[test]
fn test_defaults() {
    let cfg = Config::default();
    assert_eq!(cfg.sync.date_format, "%Y/%m/%d %H:%M");
    assert_eq!(cfg.scheduler.poll_minutes, 60);
    assert!(cfg.scheduler.enabled);
    assert_eq!(cfg.store.db_path, "~/.taskflow/taskflow.db");
}

#[test]
fn test_partial_toml_fills_defaults() {
    let toml_str = r#"
        [sync]
        date_format = "%Y-%m-%d %H:%M"

        [scheduler]
        poll_minutes = 15
    "#;
    let cfg: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(cfg.sync.date_format, "%Y-%m-%d %H:%M");
    assert_eq!(cfg.sync.base_url, "http://localhost/view");
    assert_eq!(cfg.scheduler.poll_minutes, 15);
    assert_eq!(cfg.taskflow.log_level, "info");
}

#[test]
fn test_task_url_shape() {
    let sync = SyncConfig {
        base_url: "https://wiki.example.org/view/".to_string(),
        ..SyncConfig::default()
    };
    let url = sync.task_url(&DocumentId::from("Main.WebHome"), "abc12345-1735700000000");
    assert_eq!(
        url,
        "https://wiki.example.org/view/Main.WebHome#abc12345-1735700000000"
    );
}

#[test]
fn test_shellexpand_home() {
    std::env::set_var("HOME", "/home/taskflow");
    assert_eq!(shellexpand("~/data/db"), "/home/taskflow/data/db");
    assert_eq!(shellexpand("/absolute/path"), "/absolute/path");
}
