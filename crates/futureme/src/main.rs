//! Future-Me server.
//!
//! Startup runs the whole pipeline before binding the listener:
//! collect commit history, build the vector index, wire up the agent,
//! then serve. The first accepted request always sees a ready index.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use futureme_agent::{AgentConfig, FutureAgent, PersonaConfig};
use futureme_index::{CommitIndex, Retriever, build_index};
use futureme_ingest::{GithubConfig, GithubProvider, collect_records};
use futureme_llm::{HttpEmbedder, HttpEmbedderConfig, OpenAiBackend, OpenAiConfig};
use futureme_server::{Server, ServerConfig};
use futureme_session::SessionStore;

/// Future-Me: chat with a simulated future version of yourself,
/// grounded in your GitHub commit history.
#[derive(Parser, Debug)]
#[command(name = "futureme")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// GitHub personal access token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: String,

    /// Groq API key
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    groq_api_key: String,

    /// Global cap on commits collected across all repos
    #[arg(long, env = "GITHUB_MAX_COMMITS", default_value_t = 100)]
    max_commits: usize,

    /// Name the future persona speaks as
    #[arg(long, env = "FUTURE_ME_NAME", default_value = "Aziz")]
    persona_name: String,

    /// How many years ahead the persona lives
    #[arg(long, env = "FUTURE_ME_YEARS_AHEAD", default_value_t = 1)]
    years_ahead: u32,

    /// Name of the vector index
    #[arg(long, env = "FUTUREME_INDEX_NAME", default_value = "future_me_github")]
    index_name: String,

    /// Number of commit records retrieved per chat turn
    #[arg(long, env = "FUTUREME_TOP_K", default_value_t = 8)]
    top_k: usize,

    /// Groq chat model
    #[arg(long, env = "GROQ_MODEL", default_value = "llama-3.1-8b-instant")]
    model: String,

    /// OpenAI-compatible embeddings endpoint base URL
    #[arg(
        long,
        env = "FUTUREME_EMBEDDINGS_URL",
        default_value = "http://localhost:8080/v1"
    )]
    embeddings_url: String,

    /// Embeddings model
    #[arg(
        long,
        env = "FUTUREME_EMBEDDINGS_MODEL",
        default_value = "sentence-transformers/all-MiniLM-L6-v2"
    )]
    embeddings_model: String,

    /// Embedding dimensions produced by the embeddings model
    #[arg(long, env = "FUTUREME_EMBEDDINGS_DIMS", default_value_t = 384)]
    embeddings_dims: usize,

    /// API key for the embeddings endpoint, if it needs one
    #[arg(long, env = "FUTUREME_EMBEDDINGS_API_KEY", hide_env_values = true)]
    embeddings_api_key: Option<String>,

    /// Path to the index database. Omit for an in-memory index.
    #[arg(long, env = "FUTUREME_DB")]
    db: Option<PathBuf>,

    /// Address to bind the HTTP server to
    #[arg(long, env = "FUTUREME_BIND", default_value = "0.0.0.0:8000")]
    bind: SocketAddr,

    /// Comma-separated CORS origins. Empty allows any origin.
    #[arg(long, env = "FUTUREME_CORS_ORIGINS", value_delimiter = ',')]
    cors_origins: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(
                    "futureme=info,futureme_ingest=info,futureme_index=info,\
                     futureme_agent=info,futureme_server=info,futureme_llm=info,warn",
                )
            }),
        )
        .init();

    // 1) Collect commit history.
    info!(max_commits = cli.max_commits, "collecting commit history");
    let provider = GithubProvider::new(GithubConfig::new(&cli.github_token))
        .context("failed to create GitHub client")?;
    let records = collect_records(&provider, cli.max_commits)
        .await
        .context("failed to collect commit history")?;

    // 2) Build the vector index.
    let mut embedder_config = HttpEmbedderConfig::new(
        &cli.embeddings_url,
        &cli.embeddings_model,
        cli.embeddings_dims,
    );
    if let Some(key) = &cli.embeddings_api_key {
        embedder_config = embedder_config.with_api_key(key);
    }
    let embedder = Arc::new(
        HttpEmbedder::new(embedder_config).context("failed to create embeddings client")?,
    );

    let index = Arc::new(
        CommitIndex::open(cli.db.as_deref(), &cli.index_name, cli.embeddings_dims)
            .context("failed to open commit index")?,
    );
    build_index(index.as_ref(), embedder.as_ref(), &records)
        .await
        .context("failed to build commit index")?;

    // 3) Wire up the agent.
    let backend = OpenAiBackend::new(
        OpenAiConfig::groq(&cli.groq_api_key).with_model(&cli.model),
    )
    .context("failed to create chat backend")?;

    let agent = Arc::new(FutureAgent::new(
        Arc::new(backend),
        Retriever::new(index, embedder).with_top_k(cli.top_k),
        SessionStore::new(),
        AgentConfig {
            model: cli.model.clone(),
            persona: PersonaConfig::new(&cli.persona_name, cli.years_ahead),
            ..AgentConfig::default()
        },
    ));

    // 4) Serve.
    info!(bind = %cli.bind, "pipeline ready, starting server");
    let server = Server::new(
        agent,
        ServerConfig::new()
            .with_bind_address(cli.bind)
            .with_allowed_origins(cli.cors_origins),
    );
    server.run().await.context("server error")?;

    Ok(())
}
