use claude_gemini_proxy::config::config_search_paths;
use claude_gemini_proxy::endpoints::EndpointPreset;
use claude_gemini_proxy::{build_router, AppState, ProxyConfig, SharedLogger};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "claude-gemini-proxy",
    about = "Serve the Anthropic Messages API on top of Gemini Code Assist",
    version
)]
struct Cli {
    /// Path to config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Endpoint preset name (overrides config)
    #[arg(long)]
    endpoint: Option<String>,

    /// Event log file path
    #[arg(long, default_value = "claude-gemini-proxy.log")]
    log_file: PathBuf,

    /// Print config search paths and exit
    #[arg(long)]
    show_config_paths: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "claude_gemini_proxy=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if cli.show_config_paths {
        println!("Config search paths:");
        for (i, path) in config_search_paths().iter().enumerate() {
            println!("  {}. {}", i + 1, path.display());
        }
        return Ok(());
    }

    let mut config = ProxyConfig::find_and_load(cli.config.as_deref())?;

    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(endpoint) = cli.endpoint {
        if EndpointPreset::from_name(&endpoint).is_some() {
            config.upstream.base_url = None;
        }
        config.upstream.endpoint = endpoint;
    }

    let logger = SharedLogger::new(&cli.log_file)?;

    // Validate config eagerly
    let base_url = config.effective_base_url()?;
    let _access_token = config.resolve_access_token()?;

    info!("claude-gemini-proxy v{}", env!("CARGO_PKG_VERSION"));
    info!("  Endpoint:  {} ({})", config.upstream.endpoint, base_url);
    info!("  Project:   {}", config.upstream.project);
    info!("  Orphans:   {:?}", config.translation.orphan_policy);
    info!("  Port:      {}", config.port);
    info!("  Models:    {} override(s)", config.models.len());
    info!("  Log file:  {}", cli.log_file.display());

    logger.info(
        "startup",
        format!(
            "Starting claude-gemini-proxy base_url={} project={} port={}",
            base_url, config.upstream.project, config.port
        ),
    );

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(300))
        .build()?;

    let state = Arc::new(AppState {
        config: config.clone(),
        client,
        logger,
    });

    let app = build_router(state);
    let bind_addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    info!("Listening on http://{}", bind_addr);
    info!("  To use with Claude Code:");
    info!("    ANTHROPIC_BASE_URL=http://localhost:{} claude", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
