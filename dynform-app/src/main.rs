//! dynform
//!
//! Terminal client for the dynamic form service.
//!
//! # Usage
//!
//! ```bash
//! dynform
//! dynform --roll-number 21CS001 --name Ada
//! dynform --api-url http://localhost:3000
//! dynform --schema-file form.json
//! ```

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use dynform::{
    Credentials, FormBackend, FormResponse, FormSchema, LogSink, RunOutcome, Session,
};
use dynform_client::{BootstrapClient, BootstrapError, ClientConfig, DEFAULT_BASE_URL};
use dynform_ratatui_wizard::RatatuiBackend;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "dynform")]
#[command(version)]
#[command(about = "Fill in your dynamic form from the terminal", long_about = None)]
struct Cli {
    /// Form service URL
    #[arg(long, env = "DYNFORM_API_URL", default_value = DEFAULT_BASE_URL)]
    api_url: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Prefill the roll number on the login screen
    #[arg(long)]
    roll_number: Option<String>,

    /// Prefill the name on the login screen
    #[arg(long)]
    name: Option<String>,

    /// Load the form from a get-form response file instead of the service
    #[arg(long)]
    schema_file: Option<PathBuf>,

    /// Where to write logs; the terminal belongs to the UI
    #[arg(long, default_value = "dynform.log")]
    log_file: PathBuf,
}

/// Where the form comes from after login.
enum FormSource {
    Service(BootstrapClient),
    File(FormSchema),
}

impl FormSource {
    fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        match &cli.schema_file {
            Some(path) => Ok(Self::File(load_schema(path)?)),
            None => {
                let config = ClientConfig::default()
                    .with_base_url(&cli.api_url)
                    .with_timeout(Duration::from_secs(cli.timeout_secs));
                Ok(Self::Service(BootstrapClient::new(config)?))
            }
        }
    }

    /// Status line shown while the form is being fetched.
    fn status(&self, credentials: &Credentials) -> String {
        match self {
            Self::File(_) => "Loading form...".to_string(),
            Self::Service(client) => format!(
                "Logging in as {} at {}... (Ctrl-C to cancel)",
                credentials.roll_number,
                client.base_url()
            ),
        }
    }

    fn fetch(
        &self,
        runtime: &Runtime,
        credentials: &Credentials,
    ) -> Result<FormSchema, BootstrapError> {
        match self {
            Self::File(schema) => {
                credentials.check()?;
                Ok(schema.clone())
            }
            Self::Service(client) => {
                let cancel = CancellationToken::new();
                let trigger = cancel.clone();
                let watcher = runtime.spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        trigger.cancel();
                    }
                });
                let result =
                    runtime.block_on(client.bootstrap_with_cancel(credentials, cancel));
                watcher.abort();
                result
            }
        }
    }
}

fn load_schema(path: &Path) -> anyhow::Result<FormSchema> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let response: FormResponse = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a get-form response", path.display()))?;
    Ok(response.form)
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true),
        )
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_file)?;

    let source = FormSource::from_cli(&cli)?;
    let runtime = Runtime::new().context("cannot start async runtime")?;
    let mut prefill = Credentials::new(
        cli.roll_number.clone().unwrap_or_default(),
        cli.name.clone().unwrap_or_default(),
    );
    let mut session = Session::new();

    tracing::info!(api_url = %cli.api_url, offline = cli.schema_file.is_some(), "starting");

    loop {
        let Some(credentials) = RatatuiBackend::new().login(session.banner(), prefill.clone())?
        else {
            tracing::info!("user quit from login");
            return Ok(());
        };

        eprintln!("{}", source.status(&credentials));
        let schema = match source.fetch(&runtime, &credentials) {
            Ok(schema) => schema,
            Err(e) if e.is_cancelled() => {
                tracing::info!("bootstrap cancelled");
                return Ok(());
            }
            Err(e) => {
                tracing::warn!(error = %e, "bootstrap failed");
                session.login_failed(e.to_string())?;
                prefill = credentials;
                continue;
            }
        };

        let user = credentials.user();
        let backend = RatatuiBackend::new()
            .with_title(schema.title.clone())
            .with_user(user.name.clone());
        if let Err(e) = session.logged_in(user, schema) {
            session.login_failed(e.to_string())?;
            prefill = credentials;
            continue;
        }

        let mut sink = LogSink::new();
        let outcome = match session.engine_mut() {
            Some(engine) => backend.run(engine, &mut sink)?,
            None => RunOutcome::Cancelled,
        };

        match outcome {
            RunOutcome::Submitted => {
                session.finish()?;
                if let Some(submission) = sink.take() {
                    println!("FORM SUBMITTED: {}", submission.to_json());
                }
                prefill = Credentials::default();
            }
            RunOutcome::Cancelled => {
                tracing::info!("form cancelled");
                session.log_out();
                prefill = credentials;
            }
        }
    }
}
