use rawhttp::config::{Config, DEFAULT_LISTEN_ADDR};

fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("rawhttp-{}-{}.yaml", name, std::process::id()));
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_config_default_address() {
    let cfg = Config::from_sources(None, None).unwrap();
    assert_eq!(cfg.listen_addr, DEFAULT_LISTEN_ADDR);
    assert_eq!(cfg.listen_addr, "127.0.0.1:42069");
}

#[test]
fn test_config_listen_override() {
    let cfg = Config::from_sources(None, Some("0.0.0.0:3000".to_string())).unwrap();
    assert_eq!(cfg.listen_addr, "0.0.0.0:3000");
}

#[test]
fn test_config_from_yaml_file() {
    let path = write_temp("file", "listen_addr: \"127.0.0.1:8000\"\n");

    let cfg = Config::from_sources(path.to_str(), Some("0.0.0.0:1".to_string())).unwrap();
    assert_eq!(cfg.listen_addr, "127.0.0.1:8000");

    std::fs::remove_file(path).unwrap();
}

#[test]
fn test_config_file_without_address_uses_default() {
    let path = write_temp("empty", "{}\n");

    let cfg = Config::from_file(&path).unwrap();
    assert_eq!(cfg.listen_addr, DEFAULT_LISTEN_ADDR);

    std::fs::remove_file(path).unwrap();
}

#[test]
fn test_config_malformed_file_is_an_error() {
    let path = write_temp("broken", "listen_addr: [unclosed\n");

    assert!(Config::from_file(&path).is_err());

    std::fs::remove_file(path).unwrap();
}

#[test]
fn test_config_missing_file_is_an_error() {
    assert!(Config::from_file("/nonexistent/rawhttp.yaml").is_err());
}

#[test]
fn test_config_clone() {
    let cfg1 = Config::default();
    let cfg2 = cfg1.clone();
    assert_eq!(cfg1.listen_addr, cfg2.listen_addr);
}
