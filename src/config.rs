use std::env;
use std::fs;
use std::time::Duration;
use log::LevelFilter;
use serde::Deserialize;
use crate::errors::ConfigError;
use crate::retry::RetryPolicy;

#[derive(Deserialize, Debug)]
pub struct General {
    pub log_path: String,
    pub log_level: LevelFilter,
    pub log_to_stdout: bool,
}

/// Where objects are read from and written to
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageParameters {
    File {
        root_dir: String,
    },
    Http {
        base_url: String,
        token: Option<String>,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

#[derive(Deserialize, Debug, Clone)]
pub struct IngestParameters {
    pub dest_bucket: String,
    #[serde(default = "default_dest_key")]
    pub dest_key: String,
    #[serde(default)]
    pub include_index: bool,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl IngestParameters {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy { max_attempts: self.max_attempts, delay: Duration::from_millis(self.retry_delay_ms) }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct InferenceParameters {
    pub endpoint_url: String,
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub instances_as_object: bool,
}

/// Days to render charts for
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DayRange {
    /// A fixed inclusive range of days regardless of month
    Fixed { first: u32, last: u32 },
    /// Every day of the selected month in the given year
    Calendar { year: i32 },
}

impl Default for DayRange {
    fn default() -> Self {
        DayRange::Fixed { first: 1, last: 30 }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct DashboardParameters {
    pub bucket: String,
    pub key: String,
    #[serde(default = "default_category_prefix")]
    pub category_prefix: String,
    #[serde(default = "default_indicator_fields")]
    pub indicator_fields: Vec<String>,
    #[serde(default)]
    pub day_range: DayRange,
    pub output_dir: String,
    #[serde(default = "default_y_label")]
    pub y_label: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct MailParameters {
    pub smtp_user: String,
    pub smtp_password: String,
    pub smtp_endpoint: String,
    pub from: String,
    pub to: String,
}

#[derive(Deserialize, Debug)]
pub struct Config {
    pub general: General,
    pub storage: StorageParameters,
    pub ingest: Option<IngestParameters>,
    pub inference: Option<InferenceParameters>,
    pub dashboard: Option<DashboardParameters>,
    pub mail: Option<MailParameters>,
}

fn default_timeout_secs() -> u64 { 60 }
fn default_dest_key() -> String { "predictions/result.csv".to_string() }
fn default_max_attempts() -> u32 { 3 }
fn default_retry_delay_ms() -> u64 { 500 }
fn default_category_prefix() -> String { "city_name_".to_string() }
fn default_y_label() -> String { "Price/MWH".to_string() }
fn default_indicator_fields() -> Vec<String> {
    ["city_name_ Barcelona", "city_name_Bilbao", "city_name_Madrid", "city_name_Seville", "city_name_Valencia"]
        .iter()
        .map(|f| f.to_string())
        .collect()
}

/// Loads the configuration file and returns a struct with all configuration items.
///
/// Secrets may be given in the environment instead of the file, see apply_env_overrides.
///
/// # Arguments
///
/// * 'config_path' - path to the configuration file
pub fn load_config(config_path: &str) -> Result<Config, ConfigError> {
    let toml = fs::read_to_string(config_path)
        .map_err(|e| ConfigError(format!("{}: {}", config_path, e)))?;

    parse_config(&toml)
}

/// Parses and validates a configuration document
///
/// # Arguments
///
/// * 'toml' - the configuration as a toml document
pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let mut config: Config = toml::from_str(toml)?;

    apply_env_overrides(&mut config);
    validate(&config)?;

    Ok(config)
}

/// Overrides tokens and passwords with values from the environment, if set:
/// PRICECAST_STORAGE_TOKEN, PRICECAST_INFERENCE_TOKEN and PRICECAST_SMTP_PASSWORD
///
/// # Arguments
///
/// * 'config' - the configuration to update
fn apply_env_overrides(config: &mut Config) {
    if let Ok(v) = env::var("PRICECAST_STORAGE_TOKEN") {
        if let StorageParameters::Http { token, .. } = &mut config.storage {
            *token = Some(v);
        }
    }
    if let Ok(v) = env::var("PRICECAST_INFERENCE_TOKEN") {
        if let Some(inference) = config.inference.as_mut() {
            inference.token = Some(v);
        }
    }
    if let Ok(v) = env::var("PRICECAST_SMTP_PASSWORD") {
        if let Some(mail) = config.mail.as_mut() {
            mail.smtp_password = v;
        }
    }
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if let Some(ingest) = &config.ingest {
        if ingest.dest_key.trim().is_empty() {
            return Err(ConfigError::from("ingest.dest_key must not be empty"));
        }
        if ingest.max_attempts == 0 {
            return Err(ConfigError::from("ingest.max_attempts must be at least 1"));
        }
    }

    if let Some(dashboard) = &config.dashboard {
        if dashboard.indicator_fields.is_empty() {
            return Err(ConfigError::from("dashboard.indicator_fields must not be empty"));
        }
        if let DayRange::Fixed { first, last } = dashboard.day_range {
            if first < 1 || last > 31 || first > last {
                return Err(ConfigError(format!("invalid dashboard.day_range {}..={}", first, last)));
            }
        }
    }

    Ok(())
}
