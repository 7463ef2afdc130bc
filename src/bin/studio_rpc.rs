//! studio-rpc: 看板后端远程调用命令行工具
//!
//! Usage:
//!   studio-rpc call <action> [json] [--method GET|POST] [--retry N]
//!   studio-rpc batch <file.json> [--concurrency N] [--retry N]
//!   studio-rpc import-csv <action> <file.csv> [--concurrency N]
//!   studio-rpc upload <path> [--type T] [--mime M]
//!   studio-rpc actions
//!   studio-rpc login <token> | logout

use anyhow::{bail, Context};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use studio_rpc::client::guess_mime;
use studio_rpc::csv::parse_csv;
use studio_rpc::events::TracingEventSink;
use studio_rpc::{
    ActionCatalog, BatchOptions, BatchOutcome, CallRequest, ClientConfig, Credential,
    CredentialVault, HttpMethod, PersistedSession, RemoteCallClient, RemoteCallClientBuilder,
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

const KEYRING_SERVICE: &str = "studio-rpc";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let result = match args[1].as_str() {
        "call" => cmd_call(&args[2..]).await,
        "batch" => cmd_batch(&args[2..]).await,
        "import-csv" => cmd_import_csv(&args[2..]).await,
        "upload" => cmd_upload(&args[2..]).await,
        "actions" => cmd_actions(&args[2..]),
        "login" => cmd_login(&args[2..]),
        "logout" => cmd_logout(),
        "version" | "--version" | "-V" => {
            println!("studio-rpc {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn print_usage() {
    println!(
        r#"studio-rpc: 看板后端远程调用工具

USAGE:
    studio-rpc <COMMAND> [OPTIONS]

COMMANDS:
    call <action> [json]              Call one action (payload is a JSON object)
        --method <GET|POST>           Override the derived HTTP method
        --retry <N>                   Retry transient failures, N attempts total
    batch <file.json>                 Run a JSON array of {{action, payload, method}}
        --concurrency <N>             Cap calls in flight
        --retry <N>                   Attempts per call
    import-csv <action> <file.csv>    Send every CSV row as one call to <action>
        --concurrency <N>             Cap calls in flight
    upload <path>                     Upload a file through uploadFile
        --type <T>                    Backend upload type (default: file)
        --mime <M>                    MIME type (default: from extension)
    actions                           List the action catalog
    login <token>                     Store the session token in the OS keyring
    logout                            Remove the stored session token
    version                           Show version information
    help                              Show this help message

GLOBAL OPTIONS:
    --config <path>                   YAML configuration file

ENVIRONMENT:
    STUDIO_RPC_CONFIG                 Configuration file path
    STUDIO_RPC_ENDPOINT               Endpoint URL (overrides the file)
    STUDIO_RPC_TOKEN                  Session token when the keyring has none
    RUST_LOG                          Log filter (default: warn)"#
    );
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

/// Positional arguments, with flags and their values removed.
fn positionals(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut skip = false;
    for arg in args {
        if skip {
            skip = false;
        } else if arg.starts_with("--") {
            skip = true;
        } else {
            out.push(arg.as_str());
        }
    }
    out
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> anyhow::Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match flag_value(args, flag) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("invalid value for {flag}: {e}")),
    }
}

fn config_path(args: &[String]) -> Option<PathBuf> {
    flag_value(args, "--config")
        .map(PathBuf::from)
        .or_else(|| std::env::var("STUDIO_RPC_CONFIG").ok().map(PathBuf::from))
}

fn read_config(path: &Path) -> anyhow::Result<ClientConfig> {
    ClientConfig::from_file(path)
        .with_context(|| format!("loading configuration from {}", path.display()))
}

fn load_config(args: &[String]) -> anyhow::Result<ClientConfig> {
    let config = match config_path(args) {
        Some(p) => read_config(&p)?,
        None => ClientConfig::new(String::new()),
    };
    let config = config.with_env_overrides()?;
    if config.endpoint.trim().is_empty() {
        bail!("no endpoint configured; pass --config or set STUDIO_RPC_ENDPOINT");
    }
    Ok(config)
}

fn keyring_entry() -> anyhow::Result<keyring::Entry> {
    let user = std::env::var("USER").unwrap_or_else(|_| "default".to_string());
    keyring::Entry::new(KEYRING_SERVICE, &user).context("opening OS keyring")
}

/// An absent entry already means signed out.
fn ignore_missing(result: keyring::Result<()>) -> keyring::Result<()> {
    match result {
        Err(keyring::Error::NoEntry) => Ok(()),
        other => other,
    }
}

/// Session token in the OS keyring, with `STUDIO_RPC_TOKEN` as a read-only fallback.
struct KeyringVault {
    entry: Option<keyring::Entry>,
}

impl KeyringVault {
    fn open() -> Self {
        let entry = match keyring_entry() {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "OS keyring unavailable, token will not persist");
                None
            }
        };
        Self { entry }
    }
}

impl CredentialVault for KeyringVault {
    fn load(&self) -> Option<Credential> {
        self.entry
            .as_ref()
            .and_then(|entry| entry.get_password().ok())
            .or_else(|| std::env::var("STUDIO_RPC_TOKEN").ok())
            .filter(|t| !t.is_empty())
            .map(Credential::new)
    }

    fn save(&self, credential: &Credential) {
        if let Some(entry) = &self.entry {
            if let Err(e) = entry.set_password(credential.expose()) {
                warn!(error = %e, "failed to store token in OS keyring");
            }
        }
    }

    fn remove(&self) {
        if let Some(entry) = &self.entry {
            if let Err(e) = ignore_missing(entry.delete_password()) {
                warn!(error = %e, "failed to remove token from OS keyring");
            }
        }
    }
}

fn build_client(args: &[String]) -> anyhow::Result<RemoteCallClient> {
    let config = load_config(args)?;
    let session = PersistedSession::open(KeyringVault::open());
    let client = RemoteCallClientBuilder::from_config(&config)
        .event_sink(Arc::new(TracingEventSink))
        .session(Arc::new(session))
        .build()?;
    Ok(client)
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn cmd_call(args: &[String]) -> anyhow::Result<()> {
    let pos = positionals(args);
    let Some(action) = pos.first().copied() else {
        bail!("usage: studio-rpc call <action> [json]");
    };
    let payload: Value = match pos.get(1) {
        Some(raw) => serde_json::from_str(raw).context("payload is not valid JSON")?,
        None => Value::Null,
    };
    let method: Option<HttpMethod> = parse_flag(args, "--method")?;
    let attempts: Option<u32> = parse_flag(args, "--retry")?;

    let client = build_client(args)?;
    let data = match attempts {
        Some(n) => {
            let mut request = CallRequest::with_json(action, payload)?;
            request.method = method;
            client.execute(request, n).await?
        }
        None => client.call(action, payload, method).await?,
    };
    print_json(&data)
}

#[derive(Debug, Deserialize)]
struct BatchFileEntry {
    action: String,
    #[serde(default)]
    payload: Value,
    #[serde(default)]
    method: Option<HttpMethod>,
}

async fn cmd_batch(args: &[String]) -> anyhow::Result<()> {
    let pos = positionals(args);
    let Some(path) = pos.first() else {
        bail!("usage: studio-rpc batch <file.json>");
    };
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let entries: Vec<BatchFileEntry> =
        serde_json::from_str(&raw).context("batch file must be a JSON array of calls")?;

    let requests = entries
        .into_iter()
        .map(|e| {
            let mut request = CallRequest::with_json(e.action, e.payload)?;
            request.method = e.method;
            Ok(request)
        })
        .collect::<studio_rpc::Result<Vec<_>>>()?;

    let client = build_client(args)?;
    let outcome = client
        .batch_call_with(requests, batch_options(args)?)
        .await;
    report_batch(&outcome)
}

async fn cmd_import_csv(args: &[String]) -> anyhow::Result<()> {
    let pos = positionals(args);
    let (Some(action), Some(path)) = (pos.first(), pos.get(1)) else {
        bail!("usage: studio-rpc import-csv <action> <file.csv>");
    };
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let table = parse_csv(&raw)?;
    eprintln!("{} rows, columns: {}", table.len(), table.headers.join(", "));

    let client = build_client(args)?;
    let outcome = client
        .batch_call_with(table.into_requests(action), batch_options(args)?)
        .await;
    report_batch(&outcome)
}

async fn cmd_upload(args: &[String]) -> anyhow::Result<()> {
    let pos = positionals(args);
    let Some(path) = pos.first().copied() else {
        bail!("usage: studio-rpc upload <path> [--type T]");
    };
    let bytes = std::fs::read(path).with_context(|| format!("reading {path}"))?;
    let filename = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path);
    let mime = flag_value(args, "--mime").unwrap_or_else(|| guess_mime(filename));
    let upload_type = flag_value(args, "--type").unwrap_or("file");

    let client = build_client(args)?;
    let data = client.upload_file(filename, &bytes, mime, upload_type).await?;
    print_json(&data)
}

fn batch_options(args: &[String]) -> anyhow::Result<BatchOptions> {
    let mut options = BatchOptions::default();
    if let Some(n) = parse_flag::<usize>(args, "--concurrency")? {
        options = options.with_concurrency_limit(n);
    }
    if let Some(n) = parse_flag::<u32>(args, "--retry")? {
        options = options.with_max_attempts(n);
    }
    Ok(options)
}

fn report_batch(outcome: &BatchOutcome) -> anyhow::Result<()> {
    print_json(outcome)?;
    eprintln!(
        "{}/{} succeeded in {} ms",
        outcome.success_count(),
        outcome.len(),
        outcome.execution_time.as_millis()
    );
    if !outcome.all_succeeded() {
        bail!("{} call(s) failed", outcome.failure_count());
    }
    Ok(())
}

/// Default catalog plus overrides from the configuration file, if one is named.
fn load_catalog(args: &[String]) -> anyhow::Result<ActionCatalog> {
    let mut catalog = ActionCatalog::dashboard_default();
    if let Some(path) = config_path(args) {
        catalog.extend(read_config(&path)?.actions);
    }
    Ok(catalog)
}

fn cmd_actions(args: &[String]) -> anyhow::Result<()> {
    let catalog = load_catalog(args)?;
    println!("{:<26} {:<6} {:<6} RETRY", "ACTION", "METHOD", "AUTH");
    for (name, d) in catalog.sorted() {
        println!(
            "{:<26} {:<6} {:<6} {}",
            name,
            d.method.as_str(),
            if d.requires_auth { "yes" } else { "no" },
            if d.retryable { "yes" } else { "no" },
        );
    }
    Ok(())
}

fn cmd_login(args: &[String]) -> anyhow::Result<()> {
    let pos = positionals(args);
    let Some(token) = pos.first() else {
        bail!("usage: studio-rpc login <token>");
    };
    keyring_entry()?
        .set_password(token)
        .context("storing token in OS keyring")?;
    println!("Token stored.");
    Ok(())
}

fn cmd_logout() -> anyhow::Result<()> {
    ignore_missing(keyring_entry()?.delete_password())
        .context("removing token from OS keyring")?;
    println!("Signed out.");
    Ok(())
}
