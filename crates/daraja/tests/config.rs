//! Loading client configuration from TOML files.

use std::io::Write;

use daraja::{C2bApiVersion, DarajaConfig, DarajaError, Environment};
use tempfile::NamedTempFile;

const PRODUCTION_CONFIG: &str = r#"
environment = "live"

[app]
consumer_key = "${DARAJA_IT_CONSUMER_KEY}"
consumer_secret = "s3cr3t-value"

[account]
short_code = "600000"
initiator_name = "apiop"
initiator_password = "${DARAJA_IT_INITIATOR_PASSWORD}"

[c2b]
api_version = "v2"
response_type = "Cancelled"

[b2c]
command_id = "SalaryPayment"

[cert]
path = "/etc/daraja/certs"

[cache]
enable = false
"#;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_production_file() {
    std::env::set_var("DARAJA_IT_CONSUMER_KEY", "key-from-env");
    std::env::remove_var("DARAJA_IT_INITIATOR_PASSWORD");
    let file = write_config(PRODUCTION_CONFIG);

    let config = DarajaConfig::load(file.path()).unwrap();
    config.validate().unwrap();

    assert_eq!(config.environment, Environment::Production);
    assert_eq!(config.app.consumer_key, "key-from-env");
    // unset variables are left as written
    assert_eq!(
        config.account.initiator_password,
        "${DARAJA_IT_INITIATOR_PASSWORD}"
    );
    assert_eq!(config.c2b.api_version, C2bApiVersion::V2);
    assert_eq!(config.b2c.command_id, "SalaryPayment");
    assert!(!config.cache.enable);
    assert_eq!(
        config.certificate_path(),
        std::path::PathBuf::from("/etc/daraja/certs/mpesa_production.cer")
    );

    let credentials = config.credentials();
    assert_eq!(credentials.short_code, "600000");
    assert!(!format!("{:?}", credentials).contains("s3cr3t-value"));
}

#[test]
fn test_defaults_fill_missing_sections() {
    let file = write_config("[app]\nconsumer_key = \"k\"\nconsumer_secret = \"s\"\n");
    let config = DarajaConfig::load(file.path()).unwrap();

    assert_eq!(config.environment, Environment::Sandbox);
    assert_eq!(config.b2b.command_id, "BusinessPayBill");
    assert_eq!(config.qrcode.trx_code, "BG");
    assert_eq!(config.http.timeout_secs, 30);
    assert!(config.cache.enable);
    assert!(matches!(
        config.validate(),
        Err(DarajaError::Configuration(_))
    ));
}

#[test]
fn test_invalid_toml() {
    let file = write_config("[app\nconsumer_key = ");
    let err = DarajaConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, DarajaError::Configuration(_)));
}
