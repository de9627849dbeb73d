//! DeepSprint server binary.

use anyhow::Context;
use clap::Parser;
use deepsprint::{
    AppState, ArtifactStore, Config, DaedraSearch, LLMClient, LLMClientFactory, PageSummarizer,
    RunRegistry, SearchProvider, SerperSearch, SourceReader, api::routes::create_router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "deepsprint-server",
    about = "Multi-step automated research server",
    version
)]
struct Args {
    /// Bind host (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Artifact output directory (overrides OUTPUT_DIR)
    #[arg(long)]
    output_dir: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deepsprint=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let mut config = Config::from_env().context("failed to load configuration")?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(output_dir) = args.output_dir {
        config.research.output_dir = output_dir;
    }

    let provider = config.llm_provider()?;
    tracing::info!(provider = provider.name(), "creating LLM client");
    let llm: Arc<dyn LLMClient> = Arc::from(
        LLMClientFactory::new(provider)
            .create_default()
            .await
            .context("failed to create LLM client")?,
    );

    let search: Arc<dyn SearchProvider> = match config.search.provider.as_str() {
        "serper" => {
            let api_key = config
                .search
                .serper_api_key
                .clone()
                .context("SERPER_API_KEY is required when SEARCH_PROVIDER=serper")?;
            tracing::info!("using Serper web search");
            Arc::new(SerperSearch::new(api_key, config.search.serper_url.clone()))
        }
        _ => {
            tracing::info!("using daedra web search");
            Arc::new(DaedraSearch::new())
        }
    };
    let reader: Arc<dyn SourceReader> = Arc::new(PageSummarizer::new(llm.clone()));
    let artifacts = Arc::new(ArtifactStore::new(&config.research.output_dir));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        config: Arc::new(config),
        llm,
        search,
        reader,
        artifacts,
        runs: Arc::new(RunRegistry::new()),
    };

    let app = create_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "deepsprint server listening");
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
