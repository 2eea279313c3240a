// tests/notify_env.rs
//
// Alerter construction is best-effort: without full SMTP settings in the
// config the collector runs with alerts disabled.

use sentipulse::notify::EmailAlerter;
use sentipulse::AppConfig;

const VARS: [&str; 5] = ["SMTP_HOST", "SMTP_USER", "SMTP_PASS", "SMTP_PORT", "ALERT_EMAIL"];

fn clear_env() {
    for k in VARS {
        std::env::remove_var(k);
    }
}

#[serial_test::serial]
#[test]
fn disabled_without_smtp_settings() {
    clear_env();
    let cfg = AppConfig::from_env();
    assert!(EmailAlerter::from_config(&cfg).is_none());
}

#[serial_test::serial]
#[test]
fn partial_settings_stay_disabled() {
    clear_env();
    let mut cfg = AppConfig::from_env();
    cfg.smtp_host = Some("smtp.example.com".to_string());
    cfg.smtp_user = Some("alerts@example.com".to_string());
    assert!(EmailAlerter::from_config(&cfg).is_none());
}

#[serial_test::serial]
#[test]
fn full_settings_build_an_alerter() {
    clear_env();
    let mut cfg = AppConfig::from_env();
    cfg.smtp_host = Some("smtp.example.com".to_string());
    cfg.smtp_user = Some("alerts@example.com".to_string());
    cfg.smtp_pass = Some("secret".to_string());
    cfg.alert_email = Some("ops@example.com".to_string());
    assert!(EmailAlerter::from_config(&cfg).is_some());
}

#[serial_test::serial]
#[test]
fn smtp_env_vars_are_recognized() {
    clear_env();
    std::env::set_var("SMTP_HOST", "smtp.example.com");
    std::env::set_var("SMTP_USER", "alerts@example.com");
    std::env::set_var("SMTP_PASS", "secret");
    std::env::set_var("SMTP_PORT", "2525");
    std::env::set_var("ALERT_EMAIL", "ops@example.com");

    let cfg = AppConfig::from_env();
    assert_eq!(cfg.smtp_port, 2525);
    assert!(EmailAlerter::from_config(&cfg).is_some());
    clear_env();
}
