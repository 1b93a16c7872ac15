use anyhow::Context;
use sift::cli::init::{self, InitConfig, InitResult};
use sift::cli::output::Output;
use sift::cli::{Cli, Commands};
use sift::research::StartParams;
use sift::utils::toml_config::{ConfigError, LogFormat, SearchBackend, ServerConfig};
use sift::{AppState, SiftConfig, SiftConfigManager, create_app};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    match cli.command {
        Some(Commands::Init {
            path,
            force,
            host,
            port,
        }) => match init::run(
            InitConfig {
                path,
                force,
                host,
                port,
            },
            &output,
        ) {
            InitResult::Error(e) => anyhow::bail!("init failed: {}", e),
            InitResult::Success | InitResult::AlreadyExists => Ok(()),
        },
        Some(Commands::Config { validate }) => show_config(&cli.config, validate, &output),
        Some(Commands::Research {
            query,
            sources,
            max_results,
            language,
        }) => {
            let params = StartParams {
                query,
                sources,
                language,
                max_results,
            };
            run_research(&cli.config, params, cli.verbose, &output).await
        }
        None => serve(&cli.config, cli.verbose, cli.watch, &output).await,
    }
}

fn init_tracing(server: &ServerConfig, verbose: bool) {
    let default_level = if verbose { "debug" } else { server.log_level.as_str() };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    match server.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn serve(
    config_path: &Path,
    verbose: bool,
    watch: bool,
    output: &Output,
) -> anyhow::Result<()> {
    let config_manager = Arc::new(
        SiftConfigManager::new(config_path)
            .with_context(|| format!("failed to load {}", config_path.display()))?,
    );
    let config = config_manager.config();

    output.banner();
    init_tracing(&config.server, verbose);

    if watch {
        config_manager
            .start_watching()
            .context("failed to watch configuration file")?;
    }

    let state = AppState::from_config(Arc::clone(&config_manager))?;
    let app = create_app(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!(
        address = %addr,
        config = %config_manager.path().display(),
        dataset = %config.dataset.directory.display(),
        max_parallel = config.research.max_parallel,
        "Sift server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if watch {
        config_manager.stop_watching();
    }
    tracing::info!("Sift server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

fn show_config(config_path: &Path, validate: bool, output: &Output) -> anyhow::Result<()> {
    let config = match SiftConfig::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            output.error(&e.to_string());
            if matches!(e, ConfigError::FileNotFound(_)) {
                output.hint("Run 'sift-server init' to create one");
            }
            anyhow::bail!("invalid configuration");
        }
    };

    if validate {
        output.success(&format!("{} is valid", config_path.display()));
        return Ok(());
    }

    output.header("Configuration");
    output.kv("file", &config_path.display().to_string());
    output.kv(
        "listen",
        &format!("{}:{}", config.server.host, config.server.port),
    );
    output.kv("max parallel", &config.research.max_parallel.to_string());
    output.kv(
        "fetch timeout",
        &format!("{}s", config.research.fetch_timeout_secs),
    );
    output.kv("dataset", &config.dataset.directory.display().to_string());
    output.kv(
        "search",
        match config.search.backend {
            SearchBackend::None => "none",
            SearchBackend::DuckDuckGo => "duckduckgo",
            SearchBackend::Remote => "remote",
        },
    );
    output.kv(
        "summarizer",
        if config.summarizer.enabled {
            "enabled"
        } else {
            "disabled"
        },
    );

    output.header("Effective TOML");
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

async fn run_research(
    config_path: &Path,
    params: StartParams,
    verbose: bool,
    output: &Output,
) -> anyhow::Result<()> {
    let config = match SiftConfig::load(config_path) {
        Ok(config) => config,
        Err(ConfigError::FileNotFound(_)) => {
            output.warning(&format!(
                "{} not found, using defaults",
                config_path.display()
            ));
            SiftConfig::default()
        }
        Err(e) => return Err(e.into()),
    };

    let mut server = config.server.clone();
    if !verbose {
        server.log_level = "warn".to_string();
    }
    init_tracing(&server, verbose);

    let state = AppState::from_config(Arc::new(SiftConfigManager::from_config(config)))?;

    output.header(&format!("Researching \"{}\"", params.query));
    let started = state.orchestrator.start(params).await?;
    output.info(&format!(
        "{} sources resolved, fetching...",
        started.items.len()
    ));

    let finished = state.orchestrator.join(&started.request_id).await?;

    for item in &finished.items {
        output.source_row(
            item.status,
            item.source_type.as_str(),
            &item.title,
            &item.url,
        );
    }

    let detail = finished
        .error
        .clone()
        .unwrap_or_else(|| format!("{} sources", finished.items.len()));
    output.request_summary(finished.status, finished.progress, &detail);

    Ok(())
}
