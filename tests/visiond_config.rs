use std::sync::Mutex;

use tempfile::NamedTempFile;

use vision_bridge::Config;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "VISIOND_CONFIG",
        "VISIOND_HOST",
        "VISIOND_PORT",
        "VISIOND_MIN_RED_RATIO",
        "VISIOND_DISPLAY",
        "VISIOND_DISPLAY_DIR",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn loads_defaults_without_file_or_env() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = Config::load().expect("load config");
    assert_eq!(cfg.host, "0.0.0.0");
    assert_eq!(cfg.port, 5005);
    assert_eq!(cfg.min_red_ratio, 0.005);
    assert!(!cfg.display);
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{
        "host": "127.0.0.1",
        "port": 6001,
        "min_red_ratio": 0.01,
        "display": true,
        "display_dir": "frames-out"
    }"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");

    std::env::set_var("VISIOND_CONFIG", file.path());
    std::env::set_var("VISIOND_PORT", "7001");
    std::env::set_var("VISIOND_MIN_RED_RATIO", "0.02");

    let cfg = Config::load().expect("load config");
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 7001);
    assert_eq!(cfg.min_red_ratio, 0.02);
    assert!(cfg.display);
    assert_eq!(cfg.display_dir, std::path::PathBuf::from("frames-out"));

    clear_env();
}

#[test]
fn rejects_threshold_outside_unit_interval() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("VISIOND_MIN_RED_RATIO", "1.5");
    assert!(Config::load().is_err());

    std::env::set_var("VISIOND_MIN_RED_RATIO", "-0.2");
    assert!(Config::load().is_err());

    clear_env();
}

#[test]
fn rejects_unparseable_env_values() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("VISIOND_PORT", "not-a-port");
    assert!(Config::load().is_err());
    clear_env();

    std::env::set_var("VISIOND_DISPLAY", "perhaps");
    assert!(Config::load().is_err());
    clear_env();
}

#[test]
fn rejects_invalid_config_file() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    std::io::Write::write_all(&mut file, b"{ not json").expect("write config");
    std::env::set_var("VISIOND_CONFIG", file.path());

    assert!(Config::load().is_err());
    clear_env();
}
