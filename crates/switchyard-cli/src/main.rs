//! `switchyard` command-line entry point.

mod app_config;

use app_config::AppConfig;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use switchyard_core::{CompletionRequest, EmbedType, LlmResponse};
use switchyard_routing::{
    load_routing_config, CompletionEmbedding, CompletionRouter, CredentialResolver,
    EmbeddingProvider, EmbeddingRouter, EnvResolver, LlmBackend, LlmClient, RoutingConfig,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "switchyard", about = "Switchyard: provider routing for LLM and embedding backends")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "switchyard.toml")]
    config: PathBuf,

    /// Emit logs as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed a text and print the vector as JSON
    Embed {
        text: String,
        /// Embedding hint: query or document
        #[arg(long = "type", default_value = "document")]
        kind: EmbedType,
    },
    /// Send a single prompt and print the reply
    Complete {
        prompt: String,
        /// Optional system prompt
        #[arg(long)]
        system: Option<String>,
    },
    /// Show which providers each router would use
    Check,
}

/// Load a routing file for the initial config.
///
/// Failures are logged and leave the router unconfigured; the router keeps
/// re-reading the file, so fixing it takes effect without a restart.
fn initial_routing(path: Option<&Path>) -> Option<RoutingConfig> {
    let path = path?;
    match load_routing_config(path) {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring invalid routing config");
            None
        }
    }
}

struct Routers {
    completion: CompletionRouter,
    embedding: EmbeddingRouter,
    has_static_model: bool,
}

fn build_routers(config: &AppConfig, credentials: Arc<dyn CredentialResolver>) -> Routers {
    let static_model = config.static_model(credentials.as_ref());
    let mut embedding_fallback: Option<Arc<dyn EmbeddingProvider>> = None;
    let static_client: Option<Arc<dyn LlmBackend>> = static_model.map(|model| {
        info!(provider = ?model.provider, model = %model.model_id, "Static model configured");
        let supports_embeddings = model.provider.supports_embeddings();
        let client: Arc<dyn LlmBackend> = Arc::new(LlmClient::new(model));
        if supports_embeddings {
            embedding_fallback = Some(Arc::new(CompletionEmbedding::new(client.clone())));
        } else {
            warn!("Static model has no embedding endpoint, embeddings rely on routing only");
        }
        client
    });

    let completion = CompletionRouter::new(
        initial_routing(config.completion_routing.as_deref()),
        static_client.clone(),
        credentials.clone(),
        config.completion_routing.clone(),
    );
    let embedding = EmbeddingRouter::new(
        initial_routing(config.embedding_routing.as_deref()),
        embedding_fallback,
        credentials,
        config.embedding_routing.clone(),
    );

    Routers {
        completion,
        embedding,
        has_static_model: static_client.is_some(),
    }
}

fn describe(label: &str, config: Option<RoutingConfig>, path: Option<&Path>) {
    match path {
        Some(path) => println!("{label} routing: {}", path.display()),
        None => println!("{label} routing: (none)"),
    }
    let Some(config) = config else {
        println!("  not configured");
        return;
    };
    match config.default_descriptor() {
        Some((name, descriptor)) => println!(
            "  default provider: {name} (kind {}, base url from ${}, key from ${})",
            descriptor.kind, descriptor.base_url_env, descriptor.api_key_env
        ),
        None => println!("  no usable default provider"),
    }
    for name in config.providers.keys() {
        println!("  provider: {name}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if cli.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let config = AppConfig::load(&cli.config).await?;
    let routers = build_routers(&config, Arc::new(EnvResolver));

    match cli.command {
        Commands::Embed { text, kind } => {
            let vector = routers.embedding.embed(&text, kind).await?;
            if vector.is_empty() {
                warn!("No embedding provider configured, result is empty");
            }
            println!("{}", serde_json::to_string(&vector)?);
        }
        Commands::Complete { prompt, system } => {
            let mut request = CompletionRequest::from_prompt(prompt);
            if let Some(system) = system {
                request = request.with_system_prompt(system);
            }
            let response = routers.completion.chat(&request).await?;
            if response.is_empty() {
                warn!("No completion provider configured, reply is empty");
            }
            match &response {
                LlmResponse::ToolUse { content, tool_calls } => {
                    if let Some(content) = content {
                        println!("{content}");
                    }
                    for call in tool_calls {
                        println!("tool call {}: {} {}", call.id, call.name, call.arguments);
                    }
                }
                other => println!("{}", other.text().unwrap_or_default()),
            }
        }
        Commands::Check => {
            for (label, router_reload, current, path) in [
                (
                    "Embedding",
                    routers.embedding.router().reload(),
                    routers.embedding.router().current_config(),
                    config.embedding_routing.as_deref(),
                ),
                (
                    "Completion",
                    routers.completion.router().reload(),
                    routers.completion.router().current_config(),
                    config.completion_routing.as_deref(),
                ),
            ] {
                if let Err(e) = router_reload {
                    println!("{label} routing config error: {e}");
                }
                describe(label, current, path);
            }
            if routers.has_static_model {
                let embeds = routers.embedding.router().fallback().is_some();
                println!(
                    "Static model: configured (completion fallback{})",
                    if embeds { ", embedding fallback" } else { "" }
                );
            } else {
                println!("Static model: not configured");
            }
        }
    }

    Ok(())
}
