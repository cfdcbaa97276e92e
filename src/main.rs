use anyhow::Context;
use callfacts::{
    AppState, ConfigManager,
    api::routes::create_router,
    cli::{
        Cli, Commands,
        init::{self, InitConfig, InitResult},
        output::Output,
    },
    tasks::TaskState,
    utils::toml_config::{CallfactsConfig, ConfigError, LogFormat},
};
use std::path::Path;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
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
            provider,
            host,
            port,
        }) => {
            let result = init::run(
                InitConfig {
                    path,
                    force,
                    provider,
                    host,
                    port,
                },
                &output,
            );
            match result {
                InitResult::Success | InitResult::AlreadyExists => Ok(()),
                InitResult::Error(e) => Err(anyhow::anyhow!(e)),
            }
        }
        Some(Commands::Config { full }) => show_config(&cli.config, full, &output),
        Some(Commands::Ask { question, urls }) => {
            let manager = load_config(&cli.config, &output)?;
            init_tracing(&manager.config(), cli.verbose);
            ask(manager, question, urls, &output).await
        }
        None => {
            let manager = load_config(&cli.config, &output)?;
            init_tracing(&manager.config(), cli.verbose);
            serve(manager, &output).await
        }
    }
}

fn load_config(path: &Path, output: &Output) -> anyhow::Result<Arc<ConfigManager>> {
    match ConfigManager::new(path) {
        Ok(manager) => Ok(Arc::new(manager)),
        Err(e @ ConfigError::FileNotFound(_)) => {
            output.error(&e.to_string());
            output.hint("Run 'callfacts-server init' to create a configuration file");
            Err(e.into())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to load {}", path.display())),
    }
}

fn init_tracing(config: &CallfactsConfig, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level))
    };

    let registry = tracing_subscriber::registry().with(filter);
    match config.server.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

fn print_warnings(config: &CallfactsConfig, output: &Output) -> anyhow::Result<()> {
    for warning in config.validate_with_warnings()? {
        output.warning(&warning.to_string());
    }
    Ok(())
}

fn show_config(path: &Path, full: bool, output: &Output) -> anyhow::Result<()> {
    let manager = load_config(path, output)?;
    let config = manager.config();

    output.header("Configuration");
    output.kv("file", &manager.path().display().to_string());
    output.kv("listen", &config.bind_addr());
    output.kv("provider", config.llm.kind());
    output.kv("model", config.llm.model());
    output.kv(
        "non-success documents",
        &format!("{:?}", config.fetch.non_success).to_lowercase(),
    );
    if let Some(dir) = &config.server.static_dir {
        output.kv("static_dir", &dir.display().to_string());
    }

    if full {
        output.subheader("Full configuration");
        println!("{}", toml::to_string_pretty(config.as_ref())?);
    }

    output.newline();
    print_warnings(&config, output)?;
    output.success("Configuration is valid");
    Ok(())
}

async fn ask(
    manager: Arc<ConfigManager>,
    question: String,
    urls: Vec<String>,
    output: &Output,
) -> anyhow::Result<()> {
    print_warnings(&manager.config(), output)?;
    let state = AppState::from_config(manager)?;

    let handle = state.tasks.create(question.clone(), urls.clone());
    state
        .pipeline
        .spawn(Arc::clone(&state.tasks), handle, question.clone(), urls)
        .await
        .context("Pipeline task panicked")?;

    let task = state.tasks.task(handle)?;
    output.header(&question);
    match task.state {
        TaskState::Done { facts } => {
            output.facts(&facts);
            Ok(())
        }
        TaskState::Error { reason } => {
            output.error(&reason);
            Err(anyhow::anyhow!("task {} failed", handle))
        }
        TaskState::Processing => Err(anyhow::anyhow!("task {} did not finish", handle)),
    }
}

async fn serve(manager: Arc<ConfigManager>, output: &Output) -> anyhow::Result<()> {
    output.banner();
    print_warnings(&manager.config(), output)?;

    if let Err(e) = manager.start_watching() {
        tracing::warn!("Config hot-reload disabled: {}", e);
    }

    let config = manager.config();
    let state = AppState::from_config(Arc::clone(&manager))?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(config.server.static_dir.as_deref())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(
        provider = config.llm.kind(),
        model = config.llm.model(),
        "Server listening on http://{}",
        addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Shutting down gracefully");
        })
        .await?;

    manager.stop_watching();
    Ok(())
}
