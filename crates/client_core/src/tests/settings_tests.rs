use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn temp_file(contents: &str) -> std::path::PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("classroom_settings_test_{suffix}.toml"));
    fs::write(&path, contents).expect("write settings");
    path
}

#[test]
fn missing_file_yields_defaults() {
    let settings = load_settings_from(Path::new("/definitely/not/here/classroom.toml"));
    assert_eq!(settings.api_base, "http://127.0.0.1:5000/api");
    assert!(settings.request_timeout.is_none());
    assert_eq!(settings.courses, default_catalog());
}

#[test]
fn file_overrides_api_base_and_catalog() {
    let path = temp_file(
        r##"
api_base = "https://lms.example.edu/api"
request_timeout_secs = 20

[[courses]]
id = 10
code = "BIO10100"
name = "Cell Biology"
color = "#22c55e"
"##,
    );

    let settings = load_settings_from(&path);
    assert_eq!(settings.api_base, "https://lms.example.edu/api");
    assert_eq!(settings.request_timeout, Some(Duration::from_secs(20)));
    assert_eq!(settings.courses.len(), 1);
    assert_eq!(settings.courses[0].code, "BIO10100");
    assert_eq!(settings.courses[0].section, "");

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn unparsable_file_is_ignored() {
    let path = temp_file("api_base = [not toml");
    let settings = load_settings_from(&path);
    assert_eq!(settings.api_base, Settings::default().api_base);
    fs::remove_file(path).expect("cleanup");
}

#[test]
fn env_overrides_win_in_order() {
    let vars: HashMap<&str, &str> = [
        ("CLASSROOM_API_BASE", "http://first/api"),
        ("APP__API_BASE", "http://second/api"),
        ("APP__REQUEST_TIMEOUT_SECS", "5"),
    ]
    .into_iter()
    .collect();

    let mut settings = Settings::default();
    apply_env_overrides(&mut settings, |key| vars.get(key).map(|v| v.to_string()));
    assert_eq!(settings.api_base, "http://second/api");
    assert_eq!(settings.request_timeout, Some(Duration::from_secs(5)));
}

#[test]
fn validates_api_base_url() {
    let mut settings = Settings::default();
    assert_eq!(
        settings.api_base_url().expect("url").as_str(),
        "http://127.0.0.1:5000/api"
    );

    settings.api_base = "ftp://example.com".to_string();
    assert!(settings.api_base_url().is_err());

    settings.api_base = "not a url".to_string();
    assert!(settings.api_base_url().is_err());
}

#[test]
fn load_settings_layers_process_env_over_file() {
    let path = temp_file("api_base = \"https://file.example.edu/api\"\nrequest_timeout_secs = 4\n");
    let settings = load_settings(&path);

    let mut expected = load_settings_from(&path);
    apply_env_overrides(&mut expected, |key| env::var(key).ok());
    assert_eq!(settings.api_base, expected.api_base);
    assert_eq!(settings.request_timeout, expected.request_timeout);
    if env::var("CLASSROOM_API_BASE").is_err() && env::var("APP__API_BASE").is_err() {
        assert_eq!(settings.api_base, "https://file.example.edu/api");
    }
    fs::remove_file(path).expect("cleanup");
}
