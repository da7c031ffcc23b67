use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use console::style;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use events::Event;
use orchestrator::services::http_collaborator::DEFAULT_AGENT_URL;
use orchestrator::{
    CollaboratorRegistry, ConfirmationPrompt, DomainProfile, HttpCollaborator, WorkflowConfig,
    WorkflowContext, WorkflowRunner,
};
use revloop_core::{Domain, GateVerdict};

const REVLOOP_DIR: &str = ".revloop";
const CONFIG_FILE: &str = "config.toml";
const DEFAULT_MAX_CYCLES: u32 = 3;
const DEFAULT_REVIEW_TIMEOUT_SECS: u64 = 300;

#[derive(Parser)]
#[command(name = "revloop")]
#[command(about = "Quality-gated review workflows", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base URL of the collaborator agent service
    #[arg(long, global = true)]
    agent_url: Option<String>,

    /// Cycle budget for a workflow run
    #[arg(long, global = true)]
    max_cycles: Option<u32>,

    /// Per-reviewer timeout in seconds
    #[arg(long, global = true)]
    review_timeout_secs: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default .revloop/config.toml
    Init,
    /// Run the backend workflow: "<fix:|feat:|refactor:> <task>"
    Backend { task: String },
    /// Run the frontend workflow: "<fix:|feat:|refactor:> <task>"
    Frontend { task: String },
}

#[derive(Debug, Serialize, Deserialize)]
struct RevloopConfig {
    workflow: WorkflowSection,
    agent: AgentSection,
}

#[derive(Debug, Serialize, Deserialize)]
struct WorkflowSection {
    max_cycles: u32,
    review_timeout_secs: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct AgentSection {
    url: String,
}

impl Default for RevloopConfig {
    fn default() -> Self {
        Self {
            workflow: WorkflowSection {
                max_cycles: DEFAULT_MAX_CYCLES,
                review_timeout_secs: DEFAULT_REVIEW_TIMEOUT_SECS,
            },
            agent: AgentSection {
                url: DEFAULT_AGENT_URL.to_string(),
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Init => init_project().await,
        Commands::Backend { task } => run_workflow(Domain::Backend, task, &cli).await,
        Commands::Frontend { task } => run_workflow(Domain::Frontend, task, &cli).await,
    }
}

async fn init_project() -> Result<()> {
    let cwd = std::env::current_dir()?;
    let revloop_dir = cwd.join(REVLOOP_DIR);
    let config_path = revloop_dir.join(CONFIG_FILE);

    if config_path.exists() {
        println!("Already initialized at {}", config_path.display());
        return Ok(());
    }

    tokio::fs::create_dir_all(&revloop_dir).await?;
    let config_content = toml::to_string_pretty(&RevloopConfig::default())?;
    tokio::fs::write(&config_path, config_content).await?;

    println!("Initialized revloop in {}", cwd.display());
    println!();
    println!("Created:");
    println!("  {}/", REVLOOP_DIR);
    println!("  └── {}", CONFIG_FILE);
    println!();
    println!("Next steps:");
    println!("  1. Point [agent].url at your collaborator agent service");
    println!("  2. Run 'revloop backend \"fix: <task>\"' or 'revloop frontend ...'");

    Ok(())
}

async fn load_config() -> Result<Option<RevloopConfig>> {
    let config_path = std::env::current_dir()?.join(REVLOOP_DIR).join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }

    let content = tokio::fs::read_to_string(&config_path)
        .await
        .with_context(|| format!("Failed to read {}", config_path.display()))?;
    let config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", config_path.display()))?;
    Ok(Some(config))
}

async fn run_workflow(domain: Domain, task: &str, cli: &Cli) -> Result<()> {
    init_tracing();

    let file_config = load_config().await?.unwrap_or_default();

    let agent_url = cli
        .agent_url
        .clone()
        .unwrap_or(file_config.agent.url);
    let max_cycles = cli.max_cycles.unwrap_or(file_config.workflow.max_cycles);
    let review_timeout = Duration::from_secs(
        cli.review_timeout_secs
            .unwrap_or(file_config.workflow.review_timeout_secs),
    );

    tracing::info!(
        domain = %domain.as_str(),
        agent_url = %agent_url,
        max_cycles = max_cycles,
        "Configuring workflow"
    );

    let profile = DomainProfile::for_domain(domain);
    let mut registry = CollaboratorRegistry::new(
        Arc::new(HttpCollaborator::new(&agent_url, profile.implementer_id)),
        Arc::new(HttpCollaborator::new(&agent_url, profile.gate_id)),
    );
    for reviewer_id in profile.reviewer_ids {
        registry = registry.with_reviewer(Arc::new(HttpCollaborator::new(&agent_url, *reviewer_id)));
    }

    let bus = events::EventBus::new();
    let progress = tokio::spawn(print_progress(bus.subscribe()));

    let config = WorkflowConfig::new(domain)
        .with_max_cycles(max_cycles)
        .with_review_timeout(review_timeout);
    let runner = WorkflowRunner::new(WorkflowContext::new(config, registry).with_event_bus(bus));

    println!(
        "{} {} workflow (agent service at {})",
        style("revloop").bold(),
        domain.as_str(),
        agent_url
    );
    println!();

    let summary = runner.run(task, &StdinPrompt).await?;

    // Dropping the runner closes the bus so the progress task drains and
    // exits before the summary prints.
    drop(runner);
    let _ = progress.await;

    println!();
    println!("{}", summary.render());

    Ok(())
}

async fn print_progress(mut rx: tokio::sync::broadcast::Receiver<events::EventEnvelope>) {
    while let Ok(envelope) = rx.recv().await {
        match envelope.event {
            Event::CycleStarted { cycle, .. } => {
                println!("{}", style(format!("── cycle {} ──", cycle)).bold());
            }
            Event::PhaseStarted { phase, .. } => {
                println!("  {} started", style(phase).dim());
            }
            Event::CollaboratorCompleted {
                collaborator_id,
                blocker_count,
                degraded,
                ..
            } => {
                if degraded {
                    println!(
                        "  {} {} (recorded as blocker)",
                        style(collaborator_id).yellow(),
                        style("degraded").yellow()
                    );
                } else if blocker_count > 0 {
                    println!(
                        "  {} returned {} blocker{}",
                        style(collaborator_id).red(),
                        blocker_count,
                        if blocker_count == 1 { "" } else { "s" }
                    );
                } else {
                    println!("  {} done", collaborator_id);
                }
            }
            Event::VerdictRecorded { verdict, .. } => {
                println!("  verdict: {}", style(verdict).bold());
            }
            _ => {}
        }
    }
}

/// Reads the continuation answer from stdin. The workflow is
/// conversational; declining simply ends the run with a summary.
struct StdinPrompt;

#[async_trait]
impl ConfirmationPrompt for StdinPrompt {
    async fn confirm_continue(&self, cycle: u32, verdict: GateVerdict) -> orchestrator::Result<bool> {
        println!();
        println!(
            "Cycle {} finished with verdict {}.",
            cycle,
            style(verdict.as_str()).bold()
        );
        print!("Continue to cycle {}? [y/N] ", cycle + 1);
        std::io::stdout().flush()?;

        let line = tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            std::io::stdin().read_line(&mut line).map(|_| line)
        })
        .await
        .map_err(|e| orchestrator::OrchestratorError::Io(std::io::Error::other(e)))??;

        Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "revloop=info,orchestrator=info".into()),
        )
        .init();
}
