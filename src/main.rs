use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use crossterm::tty::IsTty;
use gcpkit::config::{self, Settings};
use gcpkit::firestore::menu::{FirestoreHandler, DEFAULT_COLLECTION, FIRESTORE_MENU};
use gcpkit::gcp::GcpClient;
use gcpkit::menu;
use gcpkit::projects::menu::{ProjectsHandler, PROJECTS_MENU};
use gcpkit::pubsub::listen::{describe_message, subscribe_messages};
use gcpkit::pubsub::menu::{PubSubHandler, PUBSUB_MENU};
use gcpkit::pubsub::{operations as pubsub_ops, OutgoingMessage, PubSubApi};
use gcpkit::secrets::{self, operations as secret_ops};
use gcpkit::storage::menu::{StorageHandler, STORAGE_MENU};
use gcpkit::trigger::routes::{self as trigger_routes, AmbientStorage, CopyTrigger};
use gcpkit::trigger::{copy_to, plan_copy, CopyOutcome, StorageEvent};
use gcpkit::ui::Console;
use gcpkit::web::{self, backend, frontend};
use gcpkit::{logdemo, VERSION};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Topic used by `publish` when neither an argument nor PUBSUB_TOPIC is given
const DEFAULT_TOPIC: &str = "test-topic";

/// Subscription used by `listen` when neither an argument nor PUBSUB_SUBSCRIPTION is given
const DEFAULT_SUBSCRIPTION: &str = "test-subscription";

/// Default listen address of the copy trigger
const COPY_TRIGGER_ADDR: &str = "127.0.0.1:8082";

/// Small Google Cloud utilities
#[derive(Parser, Debug)]
#[command(name = "gcpkit", version = VERSION, about, long_about = None)]
struct Args {
    /// Directory holding the .env files
    #[arg(long, global = true, default_value = ".")]
    env_dir: PathBuf,

    /// Environment selecting .env.{ENV} (defaults to $ENV, then "development")
    #[arg(long, global = true)]
    env: Option<String>,

    /// Log level (interactive commands log to a file, servers to stderr)
    #[arg(long, global = true, value_enum)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive Pub/Sub topics and subscriptions menu
    Pubsub,
    /// Interactive projects menu
    Projects,
    /// Interactive Cloud Storage menu
    Storage,
    /// Interactive Firestore menu on FIRESTORE_COLLECTION
    Firestore,
    /// Publish one message
    Publish {
        /// Topic name (defaults to PUBSUB_TOPIC)
        topic: Option<String>,
        #[arg(short, long, default_value = "Hello from Pub/Sub!")]
        message: String,
        /// Message attribute as KEY=VALUE, repeatable
        #[arg(short = 'a', long = "attribute", value_parser = parse_attribute)]
        attributes: Vec<(String, String)>,
    },
    /// Print messages from a subscription for a while
    Listen {
        /// Subscription name (defaults to PUBSUB_SUBSCRIPTION)
        subscription: Option<String>,
        /// Seconds to listen before stopping
        #[arg(short, long, default_value_t = 5)]
        timeout: u64,
    },
    /// Read a secret version
    Secret {
        /// Secret name (defaults to SECRET_NAME)
        name: Option<String>,
        #[arg(long, default_value = secrets::LATEST_VERSION)]
        version: String,
    },
    /// Verify a service account key stored in Secret Manager
    CheckServiceAccount {
        /// Secret holding the key (defaults to SECRET_NAME)
        secret: Option<String>,
    },
    /// Run the copy trigger once on an event read from a JSON file
    CopyEvent { file: PathBuf },
    /// Serve the copy trigger over HTTP
    ServeCopy {
        #[arg(long, default_value = COPY_TRIGGER_ADDR)]
        addr: String,
    },
    /// Serve the backend API
    Backend {
        #[arg(long, default_value = web::BACKEND_ADDR)]
        addr: String,
    },
    /// Serve the frontend calling BACKEND_URL
    Frontend {
        #[arg(long, default_value = web::FRONTEND_ADDR)]
        addr: String,
    },
    /// Print the resolved configuration
    Config,
    /// Emit sample log events at every level
    LogDemo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogSink {
    File,
    Stderr,
}

impl Command {
    /// Menus own the terminal, so they log to a file
    fn log_sink(&self) -> LogSink {
        match self {
            Command::Pubsub
            | Command::Projects
            | Command::Storage
            | Command::Firestore
            | Command::Publish { .. }
            | Command::Listen { .. }
            | Command::Secret { .. }
            | Command::CheckServiceAccount { .. }
            | Command::Config => LogSink::File,
            Command::CopyEvent { .. }
            | Command::ServeCopy { .. }
            | Command::Backend { .. }
            | Command::Frontend { .. }
            | Command::LogDemo => LogSink::Stderr,
        }
    }

    fn default_log_level(&self) -> LogLevel {
        match self {
            Command::LogDemo => LogLevel::Debug,
            _ if self.log_sink() == LogSink::Stderr => LogLevel::Info,
            _ => LogLevel::Off,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn parse_attribute(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

fn setup_logging(
    level: LogLevel,
    sink: LogSink,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    // RUST_LOG may add per-target directives on top of the level
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(tracing_level).into())
        .from_env_lossy();

    let (writer, guard, ansi) = match sink {
        LogSink::File => {
            let log_path = get_log_path();
            if let Some(parent) = log_path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .with_context(|| format!("Failed to open log file {}", log_path.display()))?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            (non_blocking, guard, false)
        }
        LogSink::Stderr => {
            let ansi = io::stderr().is_tty();
            let (non_blocking, guard) = tracing_appender::non_blocking(io::stderr());
            (non_blocking, guard, ansi)
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(sink == LogSink::File)
        .with_line_number(sink == LogSink::File)
        .init();

    tracing::info!("gcpkit {} started with log level: {:?}", VERSION, level);
    if sink == LogSink::File {
        tracing::info!("Log file: {:?}", get_log_path());
    }

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("gcpkit").join("gcpkit.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".gcpkit").join("gcpkit.log");
    }
    PathBuf::from("gcpkit.log")
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let level = args.log_level.unwrap_or(args.command.default_log_level());
    let _log_guard = match setup_logging(level, args.command.log_sink()) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Logging disabled: {err:#}");
            None
        }
    };

    match run(args).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{:#}", err);
            eprintln!("❌ Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn client() -> Result<Arc<GcpClient>> {
    Ok(Arc::new(GcpClient::new().await?))
}

async fn run(args: Args) -> Result<ExitCode> {
    let settings = Settings::load(&args.env_dir, args.env.as_deref())
        .context("Failed to load configuration")?;
    let mut console = Console::stdout();

    match args.command {
        Command::Pubsub => {
            let ctx = settings.project_context()?;
            let client = client().await?;
            let handler = PubSubHandler {
                api: client.as_ref(),
                ctx: &ctx,
            };
            menu::run(&PUBSUB_MENU, &handler, &mut io::stdin().lock(), &mut console).await?;
        }
        Command::Projects => {
            let client = client().await?;
            let handler = ProjectsHandler {
                api: client.as_ref(),
            };
            menu::run(&PROJECTS_MENU, &handler, &mut io::stdin().lock(), &mut console).await?;
        }
        Command::Storage => {
            let ctx = settings.project_context()?;
            let client = client().await?;
            let handler = StorageHandler {
                api: client.as_ref(),
                ctx: &ctx,
            };
            menu::run(&STORAGE_MENU, &handler, &mut io::stdin().lock(), &mut console).await?;
        }
        Command::Firestore => {
            let ctx = settings.project_context()?;
            let collection = settings
                .get(config::FIRESTORE_COLLECTION)
                .unwrap_or(DEFAULT_COLLECTION);
            let client = client().await?;
            console.line(format!("Collection: {}", collection));
            let handler = FirestoreHandler {
                api: client.as_ref(),
                ctx: &ctx,
                collection,
            };
            menu::run(&FIRESTORE_MENU, &handler, &mut io::stdin().lock(), &mut console).await?;
        }
        Command::Publish {
            topic,
            message,
            attributes,
        } => {
            let ctx = settings.project_context()?;
            let topic = topic
                .or_else(|| settings.get(config::PUBSUB_TOPIC).map(str::to_string))
                .unwrap_or_else(|| DEFAULT_TOPIC.to_string());
            let message = attributes
                .iter()
                .fold(OutgoingMessage::text(&message), |m, (k, v)| m.with_attribute(k, v));
            let client = client().await?;
            let published =
                pubsub_ops::publish_message(client.as_ref(), &ctx, &mut console, &topic, message).await;
            console.check()?;
            return Ok(exit_code(published.is_ok()));
        }
        Command::Listen {
            subscription,
            timeout,
        } => {
            let ctx = settings.project_context()?;
            let subscription = subscription
                .or_else(|| settings.get(config::PUBSUB_SUBSCRIPTION).map(str::to_string))
                .unwrap_or_else(|| DEFAULT_SUBSCRIPTION.to_string());
            let api: Arc<dyn PubSubApi> = client().await?;
            let summary = subscribe_messages(
                api,
                &ctx,
                &mut console,
                &subscription,
                Duration::from_secs(timeout),
                |message| println!("{}", describe_message(message)),
            )
            .await;
            console.check()?;
            return Ok(exit_code(summary.is_ok()));
        }
        Command::Secret { name, version } => {
            let ctx = settings.project_context()?;
            let name = match name {
                Some(name) => name,
                None => settings.require(config::SECRET_NAME)?.to_string(),
            };
            let client = client().await?;
            let accessed =
                secret_ops::access_secret(client.as_ref(), &ctx, &mut console, &name, &version).await;
            console.check()?;
            return Ok(exit_code(accessed.is_ok()));
        }
        Command::CheckServiceAccount { secret } => {
            let ctx = settings.project_context()?;
            let secret = match secret {
                Some(secret) => secret,
                None => settings.require(config::SECRET_NAME)?.to_string(),
            };
            let client = client().await?;
            let passed = secret_ops::check_service_account(
                client.as_ref(),
                client.as_ref(),
                &ctx,
                &mut console,
                &secret,
            )
            .await;
            console.check()?;
            return Ok(exit_code(passed));
        }
        Command::CopyEvent { file } => {
            let body = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read event file {}", file.display()))?;
            let event = StorageEvent::parse(&body, None)
                .with_context(|| format!("Invalid event in {}", file.display()))?;
            let destination = match plan_copy(settings.get(config::DESTINATION_BUCKET), &event) {
                Ok(destination) => destination,
                Err(_) => return Ok(ExitCode::SUCCESS),
            };
            let client = client().await?;
            let outcome = copy_to(client.as_ref(), destination, &event).await;
            return Ok(exit_code(outcome == CopyOutcome::Copied));
        }
        Command::ServeCopy { addr } => {
            let trigger = CopyTrigger::new(
                Arc::new(AmbientStorage),
                settings.get(config::DESTINATION_BUCKET).map(str::to_string),
            );
            if trigger.destination().is_none() {
                tracing::warn!("DESTINATION_BUCKET is not set; events will be logged and skipped");
            }
            web::serve("copy-trigger", &addr, trigger_routes::create_router(trigger)).await?;
        }
        Command::Backend { addr } => {
            web::serve("backend", &addr, backend::create_router()).await?;
        }
        Command::Frontend { addr } => {
            let backend_url = settings
                .get(config::BACKEND_URL)
                .unwrap_or(frontend::DEFAULT_BACKEND_URL);
            tracing::info!(backend = backend_url, "Frontend will call the backend");
            let state = frontend::FrontendState::new(backend_url)?;
            web::serve("frontend", &addr, frontend::create_router(state)).await?;
        }
        Command::Config => {
            settings.print(&mut console);
        }
        Command::LogDemo => {
            logdemo::run(&mut console);
        }
    }

    console.check()?;
    Ok(ExitCode::SUCCESS)
}
