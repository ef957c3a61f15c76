use fx_imoveis::config::{ConfigError, ConfigLoader};
use std::{
    env, fs,
    path::PathBuf,
    sync::{Mutex, MutexGuard, OnceLock},
};
use tempfile::TempDir;

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

fn env_guard() -> MutexGuard<'static, ()> {
    env_lock()
        .lock()
        .unwrap_or_else(|poison| poison.into_inner())
}

const KEYS: &[&str] = &[
    "FX_PROFILE",
    "FX_API_BIND_ADDR",
    "FX_LOG_LEVEL",
    "FX_LOG_FORMAT",
    "FX_JWT_SECRET",
    "FX_STORAGE_URL",
    "FX_STORAGE_SERVICE_KEY",
    "FX_MAX_IMAGE_MB",
    "FX_IMAGE_CACHE_TTL_SECONDS",
    "FX_GMAIL_EMAIL",
    "FX_LEAD_NOTIFY_TO",
    "FX_CORS_ALLOWED_ORIGINS",
];

fn clear_env() {
    unsafe {
        for key in KEYS {
            env::remove_var(key);
        }
    }
}

fn write_env_file(dir: &TempDir, name: &str, contents: &str) {
    let path = dir.path().join(name);
    fs::write(path, contents).unwrap();
}

fn loader_for(dir: &TempDir) -> ConfigLoader {
    ConfigLoader::with_base_dir(PathBuf::from(dir.path()))
}

#[test]
fn loads_defaults_when_no_env_present() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    let cfg = loader_for(&temp_dir).load().expect("config loads with defaults");

    assert_eq!(cfg.profile, "local");
    assert_eq!(cfg.api_bind_addr, "0.0.0.0:8080");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.storage.bucket, "imagens-imoveis");
    assert_eq!(cfg.images.max_image_mb, 5);
    assert_eq!(cfg.auth.session_ttl_hours, 12);
    assert!(!cfg.mail.is_complete());
    cfg.bind_addr().expect("default bind addr parses");
}

#[test]
fn layered_env_files_apply_in_order() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(&temp_dir, ".env", "FX_API_BIND_ADDR=127.0.0.1:3000\nFX_MAX_IMAGE_MB=8\n");
    write_env_file(&temp_dir, ".env.test", "FX_API_BIND_ADDR=192.168.0.10:5000\n");
    write_env_file(&temp_dir, ".env.test.local", "FX_API_BIND_ADDR=10.0.0.5:6000\n");

    // Select profile via .env.local before profile-specific files load.
    write_env_file(
        &temp_dir,
        ".env.local",
        "FX_PROFILE=test\nFX_API_BIND_ADDR=127.0.0.1:4000\n",
    );

    let cfg = loader_for(&temp_dir).load().expect("layered config loads");

    assert_eq!(cfg.profile, "test");
    assert_eq!(cfg.api_bind_addr, "10.0.0.5:6000");
    assert_eq!(cfg.images.max_image_mb, 8);
}

#[test]
fn process_env_overrides_files() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(
        &temp_dir,
        ".env",
        "FX_LOG_LEVEL=debug\nFX_CORS_ALLOWED_ORIGINS=https://a.example.com\n",
    );

    unsafe {
        env::set_var("FX_LOG_LEVEL", "warn");
        env::set_var(
            "FX_CORS_ALLOWED_ORIGINS",
            "https://fortxavier.com.br, https://www.fortxavier.com.br,",
        );
    }

    let cfg = loader_for(&temp_dir).load().expect("config loads");
    assert_eq!(cfg.log_level, "warn");
    assert_eq!(
        cfg.cors_allowed_origins,
        vec![
            "https://fortxavier.com.br".to_string(),
            "https://www.fortxavier.com.br".to_string()
        ]
    );

    clear_env();
}

#[test]
fn production_profile_requires_secrets() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(&temp_dir, ".env", "FX_PROFILE=prod\n");

    let err = loader_for(&temp_dir).load().unwrap_err();
    assert!(matches!(err, ConfigError::MissingJwtSecret));

    write_env_file(
        &temp_dir,
        ".env.prod",
        "FX_JWT_SECRET=0123456789abcdef0123456789abcdef\n\
         FX_STORAGE_URL=https://project.supabase.co\n\
         FX_STORAGE_SERVICE_KEY=service-key\n",
    );
    let cfg = loader_for(&temp_dir).load().expect("prod config loads");
    assert_eq!(cfg.profile, "prod");
    assert_eq!(cfg.storage.url.as_deref(), Some("https://project.supabase.co"));
}

#[test]
fn invalid_numbers_are_reported_with_their_key() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    unsafe {
        env::set_var("FX_IMAGE_CACHE_TTL_SECONDS", "five minutes");
    }

    let err = loader_for(&temp_dir).load().unwrap_err();
    match err {
        ConfigError::InvalidNumber { key, value } => {
            assert_eq!(key, "IMAGE_CACHE_TTL_SECONDS");
            assert_eq!(value, "five minutes");
        }
        other => panic!("expected invalid number, got {other:?}"),
    }

    clear_env();
}

#[test]
fn invalid_bind_addr_is_rejected() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(&temp_dir, ".env", "FX_API_BIND_ADDR=not-an-address\n");

    let err = loader_for(&temp_dir).load().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidBindAddr { .. }));
}

#[test]
fn oversized_image_limit_fails_validation() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(&temp_dir, ".env", "FX_MAX_IMAGE_MB=120\n");

    let err = loader_for(&temp_dir).load().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidMaxImageSize { value: 120 }));
}
