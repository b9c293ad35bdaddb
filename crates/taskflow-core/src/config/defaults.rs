//! Serde default value functions for the configuration structs.

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_db_path() -> String {
    "~/.taskflow/taskflow.db".to_string()
}

pub fn default_date_format() -> String {
    "%Y/%m/%d %H:%M".to_string()
}

pub fn default_base_url() -> String {
    "http://localhost/view".to_string()
}

pub fn default_poll_minutes() -> u64 {
    60
}

pub fn default_true() -> bool {
    true
}
