//! Command-line entry point: open a session, submit one query, print the
//! result as pretty JSON.

use anyhow::Context;
use clap::Parser;
use ondemand::{
    Client, ClientConfig, ContextField, ModelConfigs, QueryRequest, ResponseMode,
    DEFAULT_BASE_URL,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ondemand", about = "Submit a query to the OnDemand chat API")]
struct Cli {
    /// API key for the service
    #[arg(long, env = "ONDEMAND_API_KEY", hide_env_values = true)]
    api_key: String,

    /// The query to submit
    #[arg(long)]
    query: String,

    /// Response mode: 'sync' or 'stream'
    #[arg(long)]
    mode: String,

    /// Base URL of the chat API
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Agent identifier; repeat for multiple agents
    #[arg(long = "agent-id")]
    agent_ids: Vec<String>,

    /// Endpoint identifier
    #[arg(long, default_value = ondemand::config::DEFAULT_ENDPOINT_ID)]
    endpoint_id: String,

    /// Reasoning mode
    #[arg(long, default_value = ondemand::config::DEFAULT_REASONING_MODE)]
    reasoning_mode: String,

    /// External user identifier; generated when omitted
    #[arg(long)]
    external_user_id: Option<String>,

    /// Context metadata entry as key=value; repeat for multiple entries
    #[arg(long = "context", value_parser = parse_context_field)]
    context: Vec<ContextField>,

    /// Sampling temperature
    #[arg(long, default_value_t = 0.7)]
    temperature: f64,

    /// Top-p nucleus sampling
    #[arg(long, default_value_t = 1.0)]
    top_p: f64,

    /// Maximum tokens to generate
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Presence penalty
    #[arg(long, default_value_t = 0.0)]
    presence_penalty: f64,

    /// Frequency penalty
    #[arg(long, default_value_t = 0.0)]
    frequency_penalty: f64,

    /// Stop sequence; repeat for multiple sequences
    #[arg(long = "stop")]
    stop_sequences: Vec<String>,

    /// Fulfillment prompt override
    #[arg(long)]
    fulfillment_prompt: Option<String>,
}

fn parse_context_field(s: &str) -> Result<ContextField, String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid context entry '{}' (expected key=value)", s))?;
    Ok(ContextField::new(key, value))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mode: ResponseMode = cli.mode.parse()?;

    let mut config = ClientConfig::new(cli.api_key)
        .with_base_url(cli.base_url)
        .with_agent_ids(cli.agent_ids)
        .with_endpoint_id(cli.endpoint_id)
        .with_reasoning_mode(cli.reasoning_mode);
    if let Some(id) = cli.external_user_id {
        config = config.with_external_user_id(id);
    }

    let client = Client::with_config(config)?;

    let session_id = client
        .create_session(&cli.context)
        .await
        .context("failed to create chat session")?;

    let model_configs = ModelConfigs {
        fulfillment_prompt: cli.fulfillment_prompt,
        stop_sequences: cli.stop_sequences,
        temperature: Some(cli.temperature),
        top_p: Some(cli.top_p),
        max_tokens: cli.max_tokens,
        presence_penalty: Some(cli.presence_penalty),
        frequency_penalty: Some(cli.frequency_penalty),
    };

    let request = QueryRequest::builder()
        .query(cli.query)
        .response_mode(mode)
        .model_configs(model_configs)
        .try_build()?;

    let result = client
        .submit_query(&session_id, &request, &cli.context)
        .await
        .context("failed to submit query")?;

    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
