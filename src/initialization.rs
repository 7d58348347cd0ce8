use log::{info, warn};
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config as LogConfig, Root};
use log4rs::encode::pattern::PatternEncoder;
use crate::config::{General, InferenceParameters, MailParameters, StorageParameters};
use crate::errors::ConfigError;
use crate::manager_inference::Endpoint;
use crate::manager_mail::Mail;
use crate::manager_storage::file_store::FileStore;
use crate::manager_storage::{HttpStore, ObjectStore};

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {l:<5} {t} - {m}{n}";

/// Sets up logging to file and, if configured, to stdout
///
/// # Arguments
///
/// * 'general' - log path, level and stdout switch
pub fn init_logging(general: &General) -> Result<(), ConfigError> {
    let file = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build(&general.log_path)
        .map_err(|e| ConfigError(format!("log file {}: {}", general.log_path, e)))?;

    let mut builder = LogConfig::builder()
        .appender(Appender::builder().build("file", Box::new(file)));
    let mut root = Root::builder().appender("file");

    if general.log_to_stdout {
        let stdout = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build();
        builder = builder.appender(Appender::builder().build("stdout", Box::new(stdout)));
        root = root.appender("stdout");
    }

    let config = builder
        .build(root.build(general.log_level))
        .map_err(|e| ConfigError(e.to_string()))?;
    log4rs::init_config(config).map_err(|e| ConfigError(e.to_string()))?;

    info!("pricecast version: {}", env!("CARGO_PKG_VERSION"));

    Ok(())
}

/// Returns the object store given by the configuration. For the file backend, temporary
/// objects left behind by interrupted writes to the destination bucket are removed.
///
/// # Arguments
///
/// * 'storage' - storage backend parameters
/// * 'dest_bucket' - bucket that will be written to, if any
pub fn init_store(storage: &StorageParameters, dest_bucket: Option<&str>) -> Box<dyn ObjectStore> {
    match storage {
        StorageParameters::File { root_dir } => {
            let store = FileStore::new(root_dir);
            if let Some(bucket) = dest_bucket {
                match store.purge_stale(bucket) {
                    Ok(0) => {},
                    Ok(n) => info!("removed {} stale temporary objects from {}", n, bucket),
                    Err(e) => warn!("could not purge stale temporary objects from {}: {}", bucket, e),
                }
            }
            Box::new(store)
        },
        StorageParameters::Http { base_url, token, timeout_secs } => {
            Box::new(HttpStore::new(base_url, token.clone(), *timeout_secs))
        },
    }
}

/// Returns the inference endpoint given by the configuration
///
/// # Arguments
///
/// * 'inference' - endpoint parameters
pub fn init_endpoint(inference: &InferenceParameters) -> Endpoint {
    Endpoint::new(&inference.endpoint_url, inference.token.clone(), inference.timeout_secs, inference.instances_as_object)
}

/// Returns a mail sender if mail is configured and valid. A broken mail configuration
/// is logged but does not stop the pipelines.
///
/// # Arguments
///
/// * 'mail' - optional smtp parameters
pub fn init_mail(mail: Option<&MailParameters>) -> Option<Mail> {
    match mail.map(Mail::new) {
        Some(Ok(mail)) => Some(mail),
        Some(Err(e)) => {
            warn!("failure notifications disabled: {}", e);
            None
        },
        None => None,
    }
}
