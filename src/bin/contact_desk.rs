//! Line-oriented front end for the contact desk.
//!
//! Usage:
//!
//! ```text
//! contact_desk <config-path>
//! ```
//!
//! `config-path` names a TOML [`ContactDeskConfig`] document; an empty file
//! selects the in-memory store and a local Ollama moderator. After the store
//! is initialised, each line on stdin is one JSON request and each request
//! gets one JSON response line on stdout. Logs go to stderr.
//!
//! ```json
//! {"action": "submit", "fullName": "Ada Lovelace", "email": "ada@example.com",
//!  "phoneNumber": "+44 20 7946 0958", "countryCode": "GB",
//!  "message": "I would like to hear more about your services."}
//! {"action": "get", "contact_id": "5b0c1c0e-4a4e-4f5e-9f7c-1d2e3f405060"}
//! {"action": "list", "limit": 20, "offset": 0}
//! {"action": "health"}
//! ```
//!
//! Responses carry `success` and either the requested data or a `message`,
//! e.g. `{"success": true, "message": "Thank you ...", "contact_id": "..."}`.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use contact_desk::config::{ConfigError, ContactDeskConfig, LoggingConfig};
use contact_desk::contact::{
    adapters::factory::build_contact_store,
    domain::{ContactId, SubmissionForm},
    ports::InitializationError,
    services::{ContactIntakeService, IntakeError},
};
use contact_desk::moderation::ContentModerator;
use mockable::DefaultClock;
use serde::Deserialize;
use serde_json::{Value, json};
use std::env;
use std::io;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::runtime::Builder;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
enum DeskError {
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid log filter: {0}")]
    Logging(String),
    #[error("runtime init failed: {0}")]
    RuntimeInit(#[source] io::Error),
    #[error(transparent)]
    Store(#[from] InitializationError),
    #[error("stdio failure: {0}")]
    Stdio(#[source] io::Error),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum DeskRequest {
    Submit(SubmissionForm),
    Get {
        contact_id: String,
    },
    List {
        #[serde(default)]
        limit: Option<usize>,
        #[serde(default)]
        offset: Option<usize>,
    },
    Health,
}

fn main() -> Result<(), BoxError> {
    let args = collect_args()?;
    run(args.into_iter()).map_err(Into::into)
}

fn collect_args() -> Result<Vec<Utf8PathBuf>, DeskError> {
    env::args_os()
        .map(|arg_os| {
            let arg = arg_os
                .into_string()
                .map_err(|_| DeskError::InvalidArgs("argument is not valid UTF-8".into()))?;
            Ok(Utf8PathBuf::from(arg))
        })
        .collect()
}

fn run(args: impl Iterator<Item = Utf8PathBuf>) -> Result<(), DeskError> {
    let config_path = parse_args(args)?;
    let config = load_config(&config_path)?;
    install_tracing(&config.logging)?;
    info!(config = %config_path, "contact desk starting");

    let runtime = build_runtime()?;
    runtime.block_on(async {
        let service = start_service(&config).await?;
        let stdin = BufReader::new(tokio::io::stdin());
        let handled = serve(&service, stdin, tokio::io::stdout())
            .await
            .map_err(DeskError::Stdio)?;
        info!(handled, "input closed; contact desk stopping");
        Ok(())
    })
}

fn parse_args(mut args: impl Iterator<Item = Utf8PathBuf>) -> Result<Utf8PathBuf, DeskError> {
    let _program = args.next();
    let config_path = args
        .next()
        .ok_or_else(|| DeskError::InvalidArgs("missing config path argument".into()))?;
    if let Some(extra) = args.next() {
        let extra_arg = extra.as_str();
        return Err(DeskError::InvalidArgs(format!(
            "unexpected extra argument: {extra_arg}"
        )));
    }
    Ok(config_path)
}

fn load_config(config_path: &Utf8Path) -> Result<ContactDeskConfig, DeskError> {
    let contents = read_config_file(config_path).map_err(|source| DeskError::ConfigRead {
        path: config_path.to_owned(),
        source,
    })?;
    Ok(ContactDeskConfig::from_toml_str(&contents)?)
}

fn read_config_file(path: &Utf8Path) -> io::Result<String> {
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "config path has no file name")
    })?;
    let parent = path
        .parent()
        .filter(|dir| !dir.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    dir.read_to_string(file_name)
}

fn install_tracing(logging: &LoggingConfig) -> Result<(), DeskError> {
    let directive: Directive = format!("contact_desk={}", logging.level)
        .parse()
        .map_err(|err| DeskError::Logging(format!("{err}")))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive))
        .with_writer(io::stderr)
        .init();
    Ok(())
}

fn build_runtime() -> Result<tokio::runtime::Runtime, DeskError> {
    Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(DeskError::RuntimeInit)
}

async fn start_service(config: &ContactDeskConfig) -> Result<ContactIntakeService, DeskError> {
    let store = build_contact_store(&config.store, Arc::new(DefaultClock))?;
    if let Err(err) = store.initialize().await {
        error!(error = %err, backend = %store.backend(), "store initialisation failed");
        return Err(err.into());
    }
    info!(backend = %store.backend(), "contact store initialised");

    let moderator = Arc::new(ContentModerator::initialize(&config.moderation));
    Ok(ContactIntakeService::new(store, moderator))
}

async fn serve<R, W>(service: &ContactIntakeService, input: R, mut output: W) -> io::Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut handled = 0;
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let mut encoded = handle_line(service, &line).await.to_string();
        encoded.push('\n');
        output.write_all(encoded.as_bytes()).await?;
        output.flush().await?;
        handled += 1;
    }
    Ok(handled)
}

fn failure(message: impl Into<String>) -> Value {
    json!({ "success": false, "message": message.into() })
}

async fn handle_line(service: &ContactIntakeService, line: &str) -> Value {
    let request = match serde_json::from_str::<DeskRequest>(line) {
        Ok(request) => request,
        Err(err) => {
            warn!(error = %err, "malformed request line");
            return failure(format!("Malformed request: {err}"));
        }
    };

    match request {
        DeskRequest::Submit(form) => submit(service, form).await,
        DeskRequest::Get { contact_id } => {
            match service.contact(&ContactId::new(contact_id)).await {
                Ok(Some(record)) => json!({ "success": true, "contact": record }),
                Ok(None) => failure("Contact not found"),
                Err(err) => {
                    error!(error = %err, "contact lookup failed");
                    failure("Failed to retrieve contact")
                }
            }
        }
        DeskRequest::List { limit, offset } => match service.contacts(limit, offset).await {
            Ok(records) => json!({
                "success": true,
                "count": records.len(),
                "contacts": records,
            }),
            Err(err) => {
                error!(error = %err, "contact listing failed");
                failure("Failed to retrieve contacts")
            }
        },
        DeskRequest::Health => json!(service.health()),
    }
}

async fn submit(service: &ContactIntakeService, form: SubmissionForm) -> Value {
    match service.submit(form).await {
        Ok(receipt) => json!({
            "success": true,
            "message": receipt.message,
            "contact_id": receipt.contact_id,
        }),
        Err(err) => {
            match &err {
                IntakeError::Invalid(reason) => {
                    info!(reason = %reason, "submission failed validation");
                }
                IntakeError::Rejected { .. } => {}
                IntakeError::Store(source) => {
                    error!(error = %source, "submission could not be stored");
                }
            }
            failure(err.public_message())
        }
    }
}
