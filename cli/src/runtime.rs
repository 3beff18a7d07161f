//! Dependency wiring shared by the commands

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::{info, warn};
use zia_application::{ExecutionParams, ModelProvider, RunAgentUseCase};
use zia_infrastructure::{
    ConfigLoader, FileConfig, ProcessPool, RegistryToolExecutor, ServersFile, ToolRegistry,
    provider_from_config,
};

use crate::cli::{AgentArgs, Cli};

/// Load the merged config and print validation issues.
pub fn load_config(cli: &Cli) -> Result<FileConfig> {
    let config = ConfigLoader::load(cli.config.as_deref()).context("failed to load configuration")?;
    for issue in config.validate() {
        eprintln!("{} {}", "config".yellow(), issue);
    }
    Ok(config)
}

/// Build the provider pool from `--servers` or `[servers] config_path`.
pub fn build_pool(cli: &Cli, config: &FileConfig) -> Result<ProcessPool> {
    let path = cli
        .servers
        .clone()
        .or_else(|| config.servers.resolved_config_path());
    let pool = match path {
        Some(path) => {
            report_server_issues(&path);
            ProcessPool::from_file(path)?
        }
        None => {
            warn!("No config directory; starting without tool providers");
            ProcessPool::new(Default::default())
        }
    };
    Ok(pool.with_request_timeout(config.servers.request_timeout()))
}

fn report_server_issues(path: &Path) {
    if let Ok(file) = ServersFile::load(path) {
        for issue in file.validate() {
            eprintln!("{} {}", "servers".yellow(), issue);
        }
    }
}

/// Loop bounds from `[agent]`, overridden by flags.
pub fn execution_params(config: &FileConfig, args: &AgentArgs) -> ExecutionParams {
    let mut params = config.agent.to_execution_params();
    if let Some(max) = args.max_steps.filter(|n| *n > 0) {
        params = params.with_max_steps(max);
    }
    if let Some(secs) = args.time_budget.filter(|s| *s > 0) {
        params = params.with_time_budget(Duration::from_secs(secs));
    }
    params
}

/// System prompt from the flag, else from `[agent]`.
pub fn system_prompt(config: &FileConfig, args: &AgentArgs) -> Option<String> {
    args.system
        .clone()
        .or_else(|| config.agent.system_prompt.clone())
        .filter(|s| !s.trim().is_empty())
}

/// Everything one agent session needs
pub struct Runtime {
    pub pool: ProcessPool,
    pub registry: Arc<ToolRegistry>,
    pub agent: RunAgentUseCase<dyn ModelProvider, RegistryToolExecutor>,
}

impl Runtime {
    /// Start the providers, publish their tools and build the agent.
    pub async fn start(cli: &Cli, config: &FileConfig, args: &AgentArgs) -> Result<Self> {
        let provider = provider_from_config(config)?;
        let pool = build_pool(cli, config)?;
        let registry = Arc::new(ToolRegistry::new());

        for status in pool.start_all().await {
            if !status.state.is_connected() {
                eprintln!(
                    "{} provider '{}' is unavailable: {}",
                    "!".yellow(),
                    status.name,
                    status.state
                );
            }
        }
        let published = pool.register_tools(&registry);
        info!(tools = published, "Tool providers started");

        let executor = Arc::new(RegistryToolExecutor::new(Arc::clone(&registry)));
        let agent = RunAgentUseCase::new(provider, executor)
            .with_params(execution_params(config, args));

        Ok(Self {
            pool,
            registry,
            agent,
        })
    }

    pub async fn shutdown(&self) {
        self.pool.stop_all().await;
    }
}
