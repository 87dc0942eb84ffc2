use clap::Parser;

use eoslog::headless;
use eoslog_core::config::{Config, LastConnection};
use eoslog_core::ingest::{actor, transport_channel};
use eoslog_core::IngestionService;
use eoslog_feeds::WebSocketConnector;

#[derive(Parser)]
#[command(name = "eoslog", about = "eoslog: real-time terminal log viewer")]
struct Cli {
    /// Log source host. Connects on start when given.
    #[arg(long)]
    server: Option<String>,

    /// Log source port.
    #[arg(long)]
    port: Option<u16>,

    /// Credential tag forwarded to the log source.
    #[arg(long)]
    tag: Option<String>,

    /// Credential realm forwarded to the log source.
    #[arg(long)]
    realm: Option<String>,

    /// Credential secret forwarded to the log source.
    #[arg(long)]
    secret: Option<String>,

    /// Print notifications to stdout instead of starting the TUI.
    #[arg(long)]
    headless: bool,

    /// Write debug logs to <tmp>/eoslog-debug.log (tail -f to inspect).
    #[arg(long)]
    debug: bool,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        let connection = &mut config.connection;
        if let Some(server) = &self.server {
            connection.server = server.clone();
        }
        if let Some(port) = self.port {
            connection.port = port;
        }
        if let Some(tag) = &self.tag {
            connection.tag = tag.clone();
        }
        if let Some(realm) = &self.realm {
            connection.realm = realm.clone();
        }
        if let Some(secret) = &self.secret {
            connection.secret = secret.clone();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        let path = std::env::temp_dir().join("eoslog-debug.log");
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
        tracing::info!("eoslog debug log started, tail -f {}", path.display());
    }

    let mut config = Config::load().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "falling back to default config");
        Config::defaults()
    });
    let remembered = match LastConnection::load() {
        Ok(last) => last,
        Err(err) => {
            tracing::warn!(error = %err, "ignoring unreadable last connection");
            None
        }
    };
    if let Some(last) = &remembered {
        last.apply(&mut config.connection);
    }
    cli.apply(&mut config);

    let connect_on_start = cli.headless || cli.server.is_some() || remembered.is_some();
    let params = config.connection.to_params();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let _guard = runtime.enter();

    let (sink, transport_events) = transport_channel();
    let (notify_tx, notifications) = tokio::sync::mpsc::unbounded_channel();
    let mut service = IngestionService::new(WebSocketConnector::with_runtime(
        sink,
        runtime.handle().clone(),
    ));
    service.notifier_mut().forward_to(notify_tx);
    let (handle, _actor) = actor::spawn(service, transport_events);

    if cli.headless {
        handle.connect(params)?;
        return runtime.block_on(headless::run(notifications, std::io::stdout(), async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %err, "cannot listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        }));
    }

    eoslog_tui::run(
        config,
        handle,
        notifications,
        connect_on_start.then_some(params),
    )
}
