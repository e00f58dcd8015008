use super::*;

fn full_credentials() -> Credentials {
    Credentials {
        pc_app_id: Some("app".to_owned()),
        pc_secret: Some("secret".to_owned()),
        whatsapp_api_token: Some("token".to_owned()),
        whatsapp_phone_number_id: Some("1234".to_owned()),
        target_phone_number: Some("+1 555 0100".to_owned()),
    }
}

#[test]
fn every_missing_variable_is_named() {
    let creds = Credentials {
        pc_secret: Some("   ".to_owned()),
        whatsapp_api_token: Some("token".to_owned()),
        ..Credentials::default()
    };
    assert_eq!(
        creds.missing(),
        vec![
            "PC_APP_ID",
            "PC_SECRET",
            "WHATSAPP_PHONE_NUMBER_ID",
            "TARGET_PHONE_NUMBER"
        ]
    );

    let err = AppConfig::build(
        creds,
        Endpoints::default(),
        PathsConfig::default(),
        StyleConfig::default(),
    )
    .unwrap_err();
    let msg = err.to_string();
    assert!(matches!(err, CardError::Config(_)));
    for name in ["PC_APP_ID", "PC_SECRET", "WHATSAPP_PHONE_NUMBER_ID", "TARGET_PHONE_NUMBER"] {
        assert!(msg.contains(name), "{msg}");
    }
    assert!(!msg.contains("WHATSAPP_API_TOKEN"));
}

#[test]
fn build_wires_clients_with_timeouts() {
    let cfg = AppConfig::build(
        full_credentials(),
        Endpoints::default(),
        PathsConfig::default(),
        StyleConfig::default(),
    )
    .unwrap();
    assert_eq!(cfg.directory.base_url, DEFAULT_DIRECTORY_BASE_URL);
    assert_eq!(cfg.directory.anniversary_list_id, "4700166");
    assert_eq!(cfg.directory.timeout, Duration::from_secs(30));
    assert_eq!(cfg.messaging.base_url, "https://graph.facebook.com/v21.0");
    assert_eq!(cfg.messaging.upload_timeout, Duration::from_secs(60));
    assert_eq!(cfg.messaging.recipient, "+1 555 0100");
}

#[test]
fn invalid_style_is_rejected_at_build() {
    let style = StyleConfig {
        safe_top: 0.9,
        safe_bottom: 0.1,
        ..StyleConfig::default()
    };
    assert!(
        AppConfig::build(
            full_credentials(),
            Endpoints::default(),
            PathsConfig::default(),
            style
        )
        .is_err()
    );
}

#[test]
fn default_paths_point_at_the_postcard_template() {
    let paths = PathsConfig::default();
    assert_eq!(
        paths.template_path().unwrap(),
        PathBuf::from("postcard").join("felicidades.png")
    );
    assert_eq!(paths.out, PathBuf::from("combined_celebrations.jpg"));
}

#[test]
fn template_name_cannot_escape_the_directory() {
    let paths = PathsConfig {
        template_name: "../secrets.png".to_owned(),
        ..PathsConfig::default()
    };
    assert!(paths.template_path().is_err());
}

#[test]
fn run_date_parses_override() {
    assert_eq!(
        run_date(Some("2024-03-05")).unwrap(),
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    );
    assert!(matches!(run_date(Some("03/05/2024")), Err(CardError::Config(_))));
    assert!(run_date(None).is_ok());
}

#[test]
fn style_file_overrides_selected_fields() {
    let path = std::env::temp_dir().join(format!(
        "celebration_card_style_{}.json",
        std::process::id()
    ));
    std::fs::write(&path, r##"{"max_font_px": 80, "header_color": "#000000"}"##).unwrap();
    let style = load_style(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(style.max_font_px, 80);
    assert_eq!(style.min_font_px, 30);
    assert_eq!(style.header_color, crate::foundation::core::Rgba8::rgb(0, 0, 0));
}
