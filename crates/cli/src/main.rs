use anyhow::Context;
use clap::Parser;
use ferrous_frontend_application::ports::{BlocklistSink, BlocklistSource};
use ferrous_frontend_application::use_cases::{NetworkChangeMonitor, TrustAnchorManager};
use ferrous_frontend_application::{AdmissionPolicy, EngineSettings, QueryEngine};
use ferrous_frontend_domain::{BlocklistSet, CliOverrides};
use ferrous_frontend_infrastructure::dns::HickoryAnswerEncoder;
use ferrous_frontend_infrastructure::files::{FileBlocklistSource, FileTrustAnchorStore};
use ferrous_frontend_infrastructure::ipc::connect_backend;
use ferrous_frontend_infrastructure::route::run_route_monitor;
use ferrous_frontend_infrastructure::server::{
    bind_tcp, bind_udp, run_accept_loop, run_udp_listener, DescriptorBudget, Dispatcher,
    DispatcherHandle, ProcessDescriptors,
};
use ferrous_frontend_jobs::{BlocklistReloadJob, JobRunner};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

mod bootstrap;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

const EVENT_QUEUE: usize = 1024;

#[derive(Parser)]
#[command(name = "ferrous-frontend")]
#[command(version)]
#[command(about = "Ferrous Frontend - DNS query admission in front of a resolution engine")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Listen address, may be repeated (replaces the configured list)
    #[arg(short = 'l', long = "listen", value_name = "ADDR")]
    listen: Vec<String>,

    /// Unix socket of the resolution engine
    #[arg(short = 's', long, value_name = "PATH")]
    backend_socket: Option<String>,

    /// Blocklist file, one domain per line
    #[arg(short = 'b', long, value_name = "FILE")]
    blocklist: Option<String>,

    /// Trust anchor file
    #[arg(short = 't', long, value_name = "FILE")]
    trust_anchor_file: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        listen: cli.listen,
        backend_socket: cli.backend_socket,
        blocklist_file: cli.blocklist,
        trust_anchor_file: cli.trust_anchor_file,
        log_level: cli.log_level,
    };
    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config);

    info!("Starting Ferrous Frontend v{}", env!("CARGO_PKG_VERSION"));

    let shutdown = CancellationToken::new();
    let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE);

    let backend = Arc::new(
        connect_backend(Path::new(&config.backend.socket_path), events_tx.clone()).await?,
    );

    // Blocklist: loaded before the first query is admitted, then watched.
    let mut blocklist = BlocklistSet::new();
    let mut reload_job = None;
    if let Some(file) = &config.blocklist.file {
        let source = Arc::new(FileBlocklistSource::new(file));
        let mut loaded_at = None;
        if let Some(modified) = source.modified().await {
            match source.load().await {
                Ok(set) => {
                    blocklist = set;
                    loaded_at = Some(modified);
                }
                Err(e) => warn!(error = %e, "Blocklist not loaded"),
            }
        }
        let sink: Arc<dyn BlocklistSink> = Arc::new(DispatcherHandle::new(events_tx.clone()));
        let source: Arc<dyn BlocklistSource> = source;
        reload_job = Some(
            BlocklistReloadJob::new(source, sink)
                .with_interval(config.blocklist.reload_interval_secs)
                .with_last_modified(loaded_at),
        );
    }

    let engine = QueryEngine::new(
        AdmissionPolicy::new(blocklist, config.blocklist.log),
        backend.clone(),
        Arc::new(HickoryAnswerEncoder::new()),
        EngineSettings {
            tcp_initial_buffer: config.frontend.tcp_initial_buffer,
            minimize_answers: config.frontend.minimize_answers,
        },
    );

    let mut trust_anchors = TrustAnchorManager::new(backend.clone());
    if let Some(file) = &config.trust_anchor.file {
        trust_anchors = trust_anchors.with_store(Arc::new(FileTrustAnchorStore::new(file)));
    }
    let anchors = trust_anchors.load().context("failed to load trust anchors")?;
    info!(anchors, "Trust anchors loaded");

    let budget: Arc<dyn DescriptorBudget> =
        Arc::new(ProcessDescriptors::new(config.frontend.fd_reserve));
    let mut udp = Vec::new();
    for address in config.server.listen_addrs()? {
        let socket = Arc::new(
            bind_udp(address).with_context(|| format!("failed to bind UDP {}", address))?,
        );
        tokio::spawn(run_udp_listener(
            udp.len(),
            socket.clone(),
            config.frontend.max_udp_size,
            events_tx.clone(),
            shutdown.clone(),
        ));
        udp.push(socket);

        let listener =
            bind_tcp(address).with_context(|| format!("failed to bind TCP {}", address))?;
        tokio::spawn(run_accept_loop(
            listener,
            budget.clone(),
            config.frontend.accept_backoff(),
            events_tx.clone(),
            shutdown.clone(),
        ));
        info!(address = %address, "Listening on UDP and TCP");
    }

    if config.network.route_monitor {
        let monitor = NetworkChangeMonitor::new(backend.clone());
        let token = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = run_route_monitor(monitor, token).await {
                warn!(error = %e, "Route monitor stopped");
            }
        });
    }

    let mut jobs = JobRunner::new().with_shutdown_token(shutdown.clone());
    if let Some(job) = reload_job {
        jobs = jobs.with_blocklist_reload(job);
    }
    let job_handles = jobs.start();

    drop(events_tx);
    tokio::spawn(bootstrap::wait_for_signal(shutdown.clone()));

    let dispatcher = Dispatcher::new(
        engine,
        trust_anchors,
        udp,
        events_rx,
        config.frontend.tcp_timeout(),
    );
    let result = dispatcher.run(shutdown.clone()).await;
    shutdown.cancel();
    for handle in job_handles {
        if let Err(e) = handle.await {
            warn!(error = %e, "Background job panicked");
        }
    }
    result.context("frontend stopped")?;

    info!("Frontend shutdown complete");
    Ok(())
}
