use serial_test::serial;

use super::*;

fn raw_with_store() -> RawSettings {
    let mut raw = RawSettings::default();
    raw.store.bucket = Some("pages".to_string());
    raw.store.endpoint = Some("https://storage.example.com/".to_string());
    raw
}

fn invalid_key(err: LoadError) -> &'static str {
    match err {
        LoadError::Invalid { key, .. } => key,
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = raw_with_store();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());
    raw.store.bucket = Some("from-file".to_string());

    let overrides = ServeOverrides {
        port: Some(4321),
        log_level: Some("debug".to_string()),
        store: StoreOverrides {
            bucket: Some("from-cli".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.public_addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert_eq!(settings.store.bucket, "from-cli");
}

#[test]
fn defaults_fill_optional_sections() {
    let settings = Settings::from_raw(raw_with_store()).expect("valid settings");

    assert_eq!(settings.server.public_addr.port(), DEFAULT_PORT);
    assert_eq!(settings.store.region, "us-east-1");
    assert_eq!(settings.store.timeout, Duration::from_secs(10));
    assert!(settings.store.credentials.is_none());
    assert_eq!(settings.site.title, "Блог");
    assert_eq!(settings.site.description, "Главная страница блога");
    assert_eq!(
        settings.articles.seed_file,
        std::path::Path::new("data/articles.json")
    );
    assert!(settings.articles.seed_on_empty);
    assert!(settings.database.url.is_none());
}

#[test]
fn missing_bucket_is_fatal() {
    let mut raw = raw_with_store();
    raw.store.bucket = None;
    let err = Settings::from_raw(raw).expect_err("bucket required");
    assert_eq!(invalid_key(err), "store.bucket");
}

#[test]
fn blank_endpoint_is_fatal() {
    let mut raw = raw_with_store();
    raw.store.endpoint = Some("   ".to_string());
    let err = Settings::from_raw(raw).expect_err("endpoint required");
    assert_eq!(invalid_key(err), "store.endpoint");
}

#[test]
fn endpoint_must_be_http_url() {
    let mut raw = raw_with_store();
    raw.store.endpoint = Some("ftp://storage.example.com".to_string());
    let err = Settings::from_raw(raw).expect_err("unsupported scheme");
    assert_eq!(invalid_key(err), "store.endpoint");

    let mut raw = raw_with_store();
    raw.store.endpoint = Some("not a url".to_string());
    let err = Settings::from_raw(raw).expect_err("malformed endpoint");
    assert_eq!(invalid_key(err), "store.endpoint");
}

#[test]
fn endpoint_is_normalized_and_scheme_controls_http() {
    let settings = Settings::from_raw(raw_with_store()).expect("valid settings");
    assert_eq!(settings.store.endpoint, "https://storage.example.com");
    assert!(!settings.store.allow_http);

    let mut raw = raw_with_store();
    raw.store.endpoint = Some("http://127.0.0.1:9000".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.store.endpoint, "http://127.0.0.1:9000");
    assert!(settings.store.allow_http);
}

#[test]
fn credentials_must_be_paired() {
    let mut raw = raw_with_store();
    raw.store.access_key_id = Some("AKIA".to_string());
    let err = Settings::from_raw(raw).expect_err("secret missing");
    assert_eq!(invalid_key(err), "store.credentials");

    let mut raw = raw_with_store();
    raw.store.access_key_id = Some("AKIA".to_string());
    raw.store.secret_access_key = Some("shh".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    let credentials = settings.store.credentials.expect("credentials");
    assert_eq!(credentials.access_key_id, "AKIA");
    assert_eq!(credentials.secret_access_key, "shh");
}

#[test]
fn credentials_debug_redacts_secret() {
    let credentials = StoreCredentials {
        access_key_id: "AKIA".to_string(),
        secret_access_key: "super-secret".to_string(),
    };
    let rendered = format!("{credentials:?}");
    assert!(rendered.contains("AKIA"));
    assert!(!rendered.contains("super-secret"));
}

#[test]
fn zero_store_timeout_is_rejected() {
    let mut raw = raw_with_store();
    raw.store.timeout_ms = Some(0);
    let err = Settings::from_raw(raw).expect_err("zero timeout");
    assert_eq!(invalid_key(err), "store.timeout_ms");
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = raw_with_store();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

const LEGACY_ENV: [(&str, &str); 6] = [
    ("S3_BUCKET_NAME", "pages"),
    ("S3_ENDPOINT", "http://minio:9000/"),
    ("S3_REGION", "eu-central-1"),
    ("S3_ACCESS_KEY", "AKIA"),
    ("S3_SECRET_KEY", "shh"),
    ("DATABASE_URL", "postgres://from-env"),
];

#[test]
#[serial]
fn bare_invocation_reads_legacy_environment() {
    // SAFETY: env-touching tests are serialized.
    unsafe {
        for (name, value) in LEGACY_ENV {
            std::env::set_var(name, value);
        }
    }

    let result = load(&CliArgs::parse_from(["pagestash"]));

    unsafe {
        for (name, _) in LEGACY_ENV {
            std::env::remove_var(name);
        }
    }

    let settings = result.expect("environment alone configures the default command");
    assert_eq!(settings.store.bucket, "pages");
    assert_eq!(settings.store.endpoint, "http://minio:9000");
    assert!(settings.store.allow_http);
    assert_eq!(settings.store.region, "eu-central-1");
    let credentials = settings.store.credentials.expect("credentials");
    assert_eq!(credentials.access_key_id, "AKIA");
    assert_eq!(credentials.secret_access_key, "shh");
    assert_eq!(settings.database.url.as_deref(), Some("postgres://from-env"));
}

#[test]
#[serial]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["pagestash"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
#[serial]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "pagestash",
        "serve",
        "--server-host",
        "127.0.0.1",
        "--database-url",
        "postgres://override",
        "--store-bucket",
        "pages",
        "--store-endpoint",
        "http://minio:9000",
        "--store-timeout-ms",
        "2500",
        "--articles-seed-on-empty=false",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            let overrides = &serve.overrides;
            assert_eq!(overrides.server_host.as_deref(), Some("127.0.0.1"));
            assert_eq!(
                overrides.database.database_url.as_deref(),
                Some("postgres://override")
            );
            assert_eq!(overrides.store.bucket.as_deref(), Some("pages"));
            assert_eq!(
                overrides.store.endpoint.as_deref(),
                Some("http://minio:9000")
            );
            assert_eq!(overrides.store.timeout_ms, Some(2500));
            assert_eq!(overrides.seed_on_empty, Some(false));
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
#[serial]
fn parse_seed_arguments() {
    let args = CliArgs::parse_from([
        "pagestash",
        "seed",
        "--database-url",
        "postgres://example",
        "/tmp/articles.json",
    ]);

    match args.command.expect("seed command") {
        Command::Seed(seed) => {
            assert_eq!(
                seed.database.database_url.as_deref(),
                Some("postgres://example")
            );
            assert_eq!(seed.file, std::path::Path::new("/tmp/articles.json"));
        }
        _ => panic!("wrong command parsed"),
    }
}
