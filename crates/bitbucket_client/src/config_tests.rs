use super::*;

fn settings_from_json(raw: &str) -> BitbucketSettings {
    serde_json::from_str(raw).expect("Failed to parse settings fixture")
}

#[test]
fn test_cloud_defaults_api_base_url() {
    let settings = settings_from_json(r#"{ "host": "bitbucket.org" }"#);

    let config = BitbucketConfig::from_settings(settings).unwrap();

    assert_eq!(config.host, "bitbucket.org");
    assert_eq!(config.api_base_url, BITBUCKET_API_BASE_URL);
    assert!(config.is_cloud());
}

#[test]
fn test_host_defaults_to_cloud() {
    let settings = settings_from_json(r#"{}"#);

    let config = BitbucketConfig::from_settings(settings).unwrap();

    assert_eq!(config.host, BITBUCKET_HOST);
    assert_eq!(config.api_base_url, BITBUCKET_API_BASE_URL);
}

#[test]
fn test_server_requires_api_base_url() {
    let settings = settings_from_json(r#"{ "host": "bitbucket.mycompany.net" }"#);

    let error = BitbucketConfig::from_settings(settings).unwrap_err();

    assert_eq!(
        error.to_string(),
        "Invalid Bitbucket integration config, no apiBaseUrl provided for bitbucket.mycompany.net"
    );
}

#[test]
fn test_server_with_explicit_api_base_url() {
    let settings = settings_from_json(
        r#"{
            "host": "bitbucket.mycompany.net",
            "apiBaseUrl": "https://bitbucket.mycompany.net/rest/api/1.0"
        }"#,
    );

    let config = BitbucketConfig::from_settings(settings).unwrap();

    assert_eq!(config.host, "bitbucket.mycompany.net");
    assert_eq!(
        config.api_base_url,
        "https://bitbucket.mycompany.net/rest/api/1.0"
    );
    assert!(!config.is_cloud());
}

#[test]
fn test_username_without_app_password_is_rejected() {
    let settings = settings_from_json(r#"{ "username": "some-user" }"#);

    let error = BitbucketConfig::from_settings(settings).unwrap_err();

    assert!(matches!(error, Error::InvalidConfig(_)));
    assert!(error.to_string().contains("configured together"));
}

#[test]
fn test_app_password_without_username_is_rejected() {
    let settings = settings_from_json(r#"{ "appPassword": "my-secret" }"#);

    let error = BitbucketConfig::from_settings(settings).unwrap_err();

    assert!(matches!(error, Error::InvalidConfig(_)));
}

#[test]
fn test_token_next_to_basic_credentials_is_accepted() {
    let settings = settings_from_json(
        r#"{
            "token": "A",
            "username": "some-user",
            "appPassword": "my-secret"
        }"#,
    );

    let config = BitbucketConfig::from_settings(settings).unwrap();

    assert_eq!(config.token.as_deref(), Some("A"));
    assert_eq!(config.username.as_deref(), Some("some-user"));
    assert_eq!(config.app_password.as_deref(), Some("my-secret"));
}

#[test]
fn test_config_round_trips_through_serde() {
    let config = BitbucketConfig {
        host: "bitbucket.mycompany.net".to_string(),
        api_base_url: "https://bitbucket.mycompany.net/rest/api/1.0".to_string(),
        token: Some("A".to_string()),
        username: None,
        app_password: None,
    };

    let json = serde_json::to_string(&config).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

    // Field names follow the configuration file format
    assert_eq!(parsed["host"], "bitbucket.mycompany.net");
    assert_eq!(
        parsed["apiBaseUrl"],
        "https://bitbucket.mycompany.net/rest/api/1.0"
    );
    assert_eq!(parsed["token"], "A");
    // Absent credentials are omitted entirely
    assert!(parsed.get("username").is_none());
    assert!(parsed.get("appPassword").is_none());
}
