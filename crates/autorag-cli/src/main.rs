//! Command-line interface for autorag-agent

use anyhow::{Context, bail};
use async_trait::async_trait;
use autorag_runtime::AgentRuntime;
use autorag_search::{
    AiSearchRequest, AiSearchResponse, HttpSearchOracle, KnowledgeSearch, KnowledgeSource,
    SearchError, SearchOracle,
};
use autorag_tools::{Decision, Dispatch, Invocation, requires_confirmation};
use autorag_utils::{AppConfig, LogFormat, init_tracing_with_format};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::io::{BufRead, Write};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "autorag")]
#[command(about = "SuperBenefit knowledge assistant tools", long_about = None)]
struct Cli {
    /// Account that owns the AutoRAG instances
    #[arg(long, env = "AUTORAG_ACCOUNT_ID", global = true)]
    account_id: Option<String>,

    /// Bearer token for the AutoRAG API
    #[arg(long, env = "AUTORAG_API_TOKEN", hide_env_values = true, global = true)]
    api_token: Option<String>,

    /// API base URL
    #[arg(long, env = "AUTORAG_BASE_URL", global = true)]
    base_url: Option<String>,

    /// General knowledge source identifier
    #[arg(long, env = "AUTORAG_KNOWLEDGE_SOURCE", global = true)]
    knowledge_source: Option<String>,

    /// Governance knowledge source identifier
    #[arg(long, env = "AUTORAG_GOVERNANCE_SOURCE", global = true)]
    governance_source: Option<String>,

    /// HTTP timeout for search requests, in seconds
    #[arg(long, env = "AUTORAG_REQUEST_TIMEOUT_SECS", global = true)]
    timeout_secs: Option<u64>,

    /// Log output format (pretty or json)
    #[arg(long, env = "AUTORAG_LOG_FORMAT", default_value = "pretty", global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the tools offered to the model
    Tools,
    /// Search one knowledge source
    Search {
        #[arg(long, value_enum, default_value_t = Source::General)]
        source: Source,
        /// Free-text question
        query: String,
    },
    /// Invoke a tool through the dispatcher
    Invoke {
        /// Tool name
        tool: String,
        /// Arguments as a JSON object
        #[arg(default_value = "{}")]
        args: String,
        /// Decision for a confirmation-required tool ("Yes, confirmed.", "No, denied.", yes, no).
        /// Prompts on stdin when omitted.
        #[arg(long)]
        decision: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Source {
    General,
    Governance,
}

impl Cli {
    fn app_config(&self) -> anyhow::Result<AppConfig> {
        let mut builder = AppConfig::builder().log_format(self.log_format);
        if let Some(v) = &self.account_id {
            builder = builder.account_id(v);
        }
        if let Some(v) = &self.api_token {
            builder = builder.api_token(v);
        }
        if let Some(v) = &self.base_url {
            builder = builder.base_url(v);
        }
        if let Some(v) = &self.knowledge_source {
            builder = builder.knowledge_source(v);
        }
        if let Some(v) = &self.governance_source {
            builder = builder.governance_source(v);
        }
        if let Some(secs) = self.timeout_secs {
            builder = builder.request_timeout(Duration::from_secs(secs));
        }
        builder.build().context("invalid configuration")
    }
}

/// Stands in for the HTTP oracle when credentials are missing, so the
/// non-search tools stay usable
struct UnconfiguredOracle {
    reason: String,
}

#[async_trait]
impl SearchOracle for UnconfiguredOracle {
    async fn ai_search(
        &self,
        _source_id: &str,
        _request: &AiSearchRequest,
    ) -> autorag_search::Result<AiSearchResponse> {
        Err(SearchError::Configuration(self.reason.clone()))
    }
}

fn oracle_for(config: &AppConfig) -> anyhow::Result<Arc<dyn SearchOracle>> {
    match HttpSearchOracle::from_config(config) {
        Ok(oracle) => Ok(Arc::new(oracle)),
        Err(SearchError::Configuration(reason)) => Ok(Arc::new(UnconfiguredOracle { reason })),
        Err(e) => Err(e.into()),
    }
}

fn prompt_decision(tool: &str, args: &Value) -> anyhow::Result<Decision> {
    let mut stdout = std::io::stdout();
    write!(stdout, "Run {tool} with {args}? [yes/no] ")?;
    stdout.flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.parse()?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    init_tracing_with_format(cli.log_format);

    let config = cli.app_config()?;
    let oracle = oracle_for(&config)?;

    info!("Starting autorag");

    match cli.command {
        Commands::Tools => {
            let runtime = AgentRuntime::builder()
                .app_config(config)
                .oracle(oracle)
                .build()?;
            for tool in runtime.dispatcher().registry().iter() {
                let mode = if requires_confirmation(tool) { "confirm" } else { "auto" };
                println!("{:<22} {:<8} {}", tool.name(), mode, tool.description());
            }
        }

        Commands::Search { source, query } => {
            let source = match source {
                Source::General => KnowledgeSource::general(&config.knowledge_source),
                Source::Governance => KnowledgeSource::governance(&config.governance_source),
            };
            let search = KnowledgeSearch::new(oracle, source);
            let result = search.search(&query).await?;
            println!("{}", autorag_search::format_answer(&result));
        }

        Commands::Invoke {
            tool,
            args,
            decision,
        } => {
            let args: Value = serde_json::from_str(&args).context("arguments must be JSON")?;
            let runtime = AgentRuntime::builder()
                .app_config(config)
                .oracle(oracle)
                .build()?;
            let dispatcher = runtime.dispatcher();

            let result = match dispatcher
                .dispatch(Invocation::with_generated_id(&tool, args.clone()))
                .await
            {
                Dispatch::Resolved(result) => result,
                Dispatch::AwaitingConfirmation(pending) => {
                    let decision = match decision {
                        Some(raw) => raw.parse()?,
                        None => prompt_decision(&tool, &args)?,
                    };
                    dispatcher.resolve(pending, decision).await
                }
            };

            println!("{}", result.content);
            if result.is_error {
                bail!("{tool} did not complete ({:?})", result.kind);
            }
        }
    }

    Ok(())
}
