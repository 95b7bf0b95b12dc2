use super::*;

#[test]
fn defaults_point_at_local_service() {
    let settings = Settings::default();
    assert_eq!(settings.server_url, "http://127.0.0.1:8000");

    let options = settings.workflow_options();
    assert_eq!(options.progress.interval, Duration::from_millis(500));
    assert_eq!(options.results_delay, Duration::from_millis(1_000));
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file_overrides(
        &mut settings,
        r#"
server_url = "http://assess.internal:9000"
results_delay_ms = 250
progress_interval_ms = "200"
"#,
    );

    assert_eq!(settings.server_url, "http://assess.internal:9000");
    assert_eq!(settings.results_delay_ms, 250);
    assert_eq!(settings.progress_interval_ms, 200);
}

#[test]
fn unreadable_file_is_ignored() {
    let mut settings = Settings::default();
    apply_file_overrides(&mut settings, "server_url = [");
    assert_eq!(settings, Settings::default());
}

#[test]
fn app_prefixed_env_wins_over_short_name() {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings, |key| match key {
        "CVASSESS_SERVER_URL" => Some("http://short:1".into()),
        "APP__SERVER_URL" => Some("http://prefixed:2".into()),
        "APP__PROGRESS_INTERVAL_MS" => Some("not-a-number".into()),
        _ => None,
    });

    assert_eq!(settings.server_url, "http://prefixed:2");
    assert_eq!(settings.progress_interval_ms, 500);
}

#[test]
fn normalizes_bare_host_to_http_url() {
    assert_eq!(
        normalize_server_url("localhost:8000").expect("normalize"),
        "http://localhost:8000"
    );
}

#[test]
fn strips_trailing_slash() {
    assert_eq!(
        normalize_server_url("https://assess.example.com/api/").expect("normalize"),
        "https://assess.example.com/api"
    );
}

#[test]
fn empty_url_falls_back_to_default() {
    assert_eq!(
        normalize_server_url("   ").expect("normalize"),
        "http://127.0.0.1:8000"
    );
}

#[test]
fn rejects_non_http_schemes() {
    let err = normalize_server_url("ftp://files.example.com").expect_err("must fail");
    assert!(err.to_string().contains("unsupported scheme"));
}
