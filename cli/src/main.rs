// Copyright (c) 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// rootcause CLI entrypoint. Grounded on `cli/src/main.rs` from the
// orchestrator lineage: a `clap` struct carrying global, env-backed flags,
// a `tracing-subscriber` init, and a thin `main` that wires application
// services together before handing them to an axum server.

use clap::Parser;
use rootcause_core::application::{IncidentService, JobScheduler};
use rootcause_core::application::agent_graph::AgentGraph;
use rootcause_core::application::investigation_runner::InvestigationRunner;
use rootcause_core::domain::mcp::ToolPolicy;
use rootcause_core::domain::retry::RetryPolicy;
use rootcause_core::infrastructure::llm::LlmConfig;
use rootcause_core::infrastructure::mcp::{load_server_map, McpToolRegistry};
use rootcause_core::infrastructure::InMemoryIncidentRepository;
use rootcause_core::presentation::{app, AppState, KnowledgeGraph};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "rootcause", about = "Autonomous SRE investigation engine")]
struct Cli {
    #[arg(long, global = true, env = "ROOTCAUSE_HOST", default_value = "127.0.0.1")]
    host: String,

    #[arg(long, global = true, env = "ROOTCAUSE_PORT", default_value = "8000")]
    port: u16,

    #[arg(long, global = true, env = "ROOTCAUSE_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Path to the MCP server map YAML (spec §6). If unset, the
    /// investigation engine runs with no tools available.
    #[arg(long, global = true, env = "ROOTCAUSE_MCP_CONFIG")]
    mcp_config: Option<PathBuf>,

    /// Path to the optional knowledge graph YAML.
    #[arg(long, global = true, env = "ROOTCAUSE_KNOWLEDGE_GRAPH")]
    knowledge_graph: Option<PathBuf>,

    #[arg(long, global = true, env = "ROOTCAUSE_MAX_ITERATIONS", default_value = "10")]
    max_iterations: u32,

    #[arg(long, global = true, env = "ROOTCAUSE_DEADLINE_SECONDS", default_value = "300")]
    deadline_seconds: u64,

    #[arg(long, global = true, env = "ROOTCAUSE_MAX_CONCURRENT_INVESTIGATIONS")]
    max_concurrent_investigations: Option<usize>,
}

fn init_tracing(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let llm_config = LlmConfig::from_env()?;
    let llm_provider = Arc::new(llm_config.build());

    let tool_registry = Arc::new(McpToolRegistry::new());
    if let Some(path) = &cli.mcp_config {
        let servers = load_server_map(path)?;
        tracing::info!(count = servers.len(), "loaded mcp server map");
        tool_registry.connect_all(servers).await?;
    } else {
        tracing::warn!("no mcp server map configured, investigations will have no tools");
    }

    let knowledge_graph = KnowledgeGraph::load(cli.knowledge_graph.as_deref())?;
    tracing::info!(nodes = knowledge_graph.len(), "loaded knowledge graph");

    let graph = AgentGraph::new(
        llm_provider,
        tool_registry,
        ToolPolicy::default(),
        RetryPolicy::default(),
    );
    let runner = Arc::new(InvestigationRunner::new(
        graph,
        cli.max_iterations,
        Duration::from_secs(cli.deadline_seconds),
    ));

    // Reaching this point means `LlmConfig::from_env` found a key and
    // `connect_all` didn't fail, so both readiness flags are true here —
    // `JobScheduler` still carries them explicitly since it's the thing
    // `/health` and the submit precondition consult at request time.
    let tools_ready = true;
    let llm_key_present = true;

    let incidents = IncidentService::new(Arc::new(InMemoryIncidentRepository::new()));
    let scheduler = Arc::new(JobScheduler::new(
        incidents.clone(),
        runner,
        cli.max_concurrent_investigations,
        tools_ready,
        llm_key_present,
    ));

    let state = AppState { incidents, scheduler };
    let router = app(state);

    let addr = format!("{}:{}", cli.host, cli.port);
    tracing::info!(%addr, "starting rootcause server");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
