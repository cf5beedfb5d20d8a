//! # codeloop CLI
//!
//! Command-line interface for the coder/debugger loop.
//!
//! Usage:
//!   codeloop <task>
//!   codeloop run --turns 6 <task>
//!   codeloop check <file.py>
//!   codeloop models
//!
//! Examples:
//!   codeloop "Write a function that reverses a string"
//!   codeloop --provider openai --model gpt-4o-mini "Parse a CSV file"
//!   codeloop check solution.py
//!
//! A `.env` file in the working directory is read before the flags, so API
//! keys and `CODELOOP_*` settings can live there.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use codeloop_agent::{
    debugger_tools, extract_quality_score, Agent, ChatConfig, ConversationState, ExecutorConfig,
    GeneratorAgent, LinterConfig, RoundRobinChat, Signal, ToolRunnerAgent,
};
use codeloop_llm::{create_provider, LlmProvider, ProviderConfig, ProviderType};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "codeloop")]
#[command(author, version, about = "codeloop - an LLM coder and a debugger taking turns")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Task to solve (when not using subcommands)
    #[arg(trailing_var_arg = true)]
    task: Vec<String>,

    /// LLM backend: gemini, openai or anthropic
    #[arg(long, global = true, env = "CODELOOP_PROVIDER", default_value = "gemini")]
    provider: ProviderType,

    /// Model override (defaults to the provider's default model)
    #[arg(long, global = true, env = "CODELOOP_MODEL")]
    model: Option<String>,

    /// Base URL for the provider API (e.g. a local OpenAI-compatible server)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// API key; falls back to the provider's usual environment variable
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Number of turns
    #[arg(short, long, global = true, default_value_t = 4)]
    turns: usize,

    /// Python interpreter used by the executor
    #[arg(long, global = true, default_value = "python3")]
    python: String,

    /// Linter command
    #[arg(long, global = true, default_value = "pylint")]
    pylint: String,

    /// HTTP timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - don't print the conversation
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Print the final conversation state as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the coder/debugger loop on a task
    Run {
        /// The task description (prompted for when empty)
        #[arg(trailing_var_arg = true)]
        task: Vec<String>,
    },
    /// Execute and lint a Python file without an LLM
    Check {
        /// Path to the Python file
        file: String,
    },
    /// List the selected provider's known models
    Models,
}

impl Cli {
    fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig::default().with_interpreter(&self.python)
    }

    fn linter_config(&self) -> LinterConfig {
        LinterConfig::default().with_command(&self.pylint)
    }

    /// `--api-key`, then the provider's own environment variables
    fn api_key(&self) -> Option<String> {
        self.api_key.clone().or_else(|| {
            self.provider
                .key_env_vars()
                .iter()
                .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
        })
    }

    fn provider_config(&self) -> ProviderConfig {
        let mut config = ProviderConfig::for_type(self.provider, self.api_key());
        if let Some(model) = &self.model {
            config = config.with_model(model.clone());
        }
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url.clone());
        }
        if let Some(secs) = self.timeout {
            config = config.with_timeout(secs);
        }
        config
    }

    fn provider(&self) -> anyhow::Result<Arc<dyn LlmProvider>> {
        create_provider(self.provider_config())
            .with_context(|| format!("failed to set up {} provider", self.provider.as_str()))
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn read_task() -> anyhow::Result<String> {
    print!("📥 Enter your Python task: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("failed to read task from stdin")?;
    Ok(line.trim().to_string())
}

fn summary(state: &ConversationState) -> String {
    format!(
        "--- Finished: {} turns, {} messages, {} suppressed, {} LLM calls, {} tokens ({} prompt + {} completion) ---",
        state.transcript.len(),
        state.history.len(),
        state.suppressed_turns(),
        state.usage.total_calls,
        state.usage.total_tokens(),
        state.usage.total_prompt_tokens,
        state.usage.total_completion_tokens
    )
}

fn print_state(state: &ConversationState, cli: &Cli) -> anyhow::Result<()> {
    if cli.json {
        println!("{}", serde_json::to_string_pretty(state)?);
    } else if !cli.quiet {
        println!("\n{}", summary(state));
    }
    Ok(())
}

async fn run_task(cli: &Cli, task: &[String]) -> anyhow::Result<()> {
    let task = if task.is_empty() {
        read_task().await?
    } else {
        task.join(" ")
    };
    if task.is_empty() {
        bail!("no task given");
    }

    if cli.api_key().is_none() && cli.base_url.is_none() {
        bail!(
            "no API key for {}: pass --api-key or set {}",
            cli.provider.as_str(),
            cli.provider.key_env_vars().join(" or ")
        );
    }

    let provider = cli.provider()?;
    tracing::info!(provider = provider.name(), "provider selected");

    let agents: Vec<Box<dyn Agent>> = vec![
        Box::new(GeneratorAgent::new("Coder", provider)),
        Box::new(ToolRunnerAgent::new(
            "Debugger",
            debugger_tools(cli.executor_config(), cli.linter_config()),
        )),
    ];
    let config = ChatConfig {
        total_turns: cli.turns,
        verbose: !cli.quiet && !cli.json,
    };

    let state = RoundRobinChat::with_config(agents, config).run(&task).await?;
    print_state(&state, cli)
}

async fn check_file(cli: &Cli, file: &str) -> anyhow::Result<()> {
    let code = std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file))?;

    let debugger = ToolRunnerAgent::new(
        "Debugger",
        debugger_tools(cli.executor_config(), cli.linter_config()),
    );
    let report = debugger.reply(&code, &[]).await?;
    println!("{}", report);

    match extract_quality_score(&report) {
        Signal::Found(score) => println!("\nScore: {:.2}/10", score),
        Signal::NotFound => println!("\nScore: unknown"),
    }
    Ok(())
}

fn list_models(cli: &Cli) -> anyhow::Result<()> {
    let provider = cli.provider()?;
    println!("Models for {}:", provider.name());
    for model in provider.models() {
        let marker = if model == provider.default_model() { "*" } else { " " };
        println!("  {} {}", marker, model);
    }
    Ok(())
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Run { task }) => run_task(cli, task).await,
        Some(Commands::Check { file }) => check_file(cli, file).await,
        Some(Commands::Models) => list_models(cli),
        None => run_task(cli, &cli.task).await,
    }
}

#[tokio::main]
async fn main() {
    // Variables already set in the environment win over the file
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
