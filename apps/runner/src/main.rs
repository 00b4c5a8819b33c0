use std::{fs::File, path::PathBuf, sync::Arc};

use {
    anyhow::{Context, Result},
    clap::Parser,
    secrecy::ExposeSecret,
};

use {
    guildbeat_client::SerenityApi,
    guildbeat_connector::{Connector, ConnectorConfig, SoarHost},
    guildbeat_protocol::ActionRequest,
};

mod host;

use host::FileHost;

/// Standalone runner for the guildbeat Discord connector.
///
/// Executes one action per invocation against the configured guild and
/// prints the action result as JSON. The poll checkpoint is persisted in
/// a local state file between runs.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Path to the JSON asset configuration ({"token": ..., "guild_id": ...}).
    #[arg(long, env = "GUILDBEAT_CONFIG")]
    config: PathBuf,

    /// Path to the persisted connector state file.
    #[arg(long, default_value = "guildbeat-state.json")]
    state: PathBuf,

    /// Container that artifacts created outside polling attach to.
    #[arg(long, default_value = "container-0")]
    container_id: String,

    /// Action identifier to run (e.g. test_connectivity, on_poll).
    #[arg(long)]
    action: String,

    /// JSON object of action parameters.
    #[arg(long, default_value = "{}")]
    params: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config: ConnectorConfig = serde_json::from_reader(
        File::open(&args.config).context("failed to open config file")?,
    )
    .context("failed to parse config file")?;

    let parameters: serde_json::Value =
        serde_json::from_str(&args.params).context("invalid --params JSON")?;

    let api = Arc::new(SerenityApi::new(
        config.token.expose_secret(),
        config.guild_id_u64()?,
    ));
    let host = Arc::new(FileHost::new(config, args.state, args.container_id));

    let connector = Connector::initialize(api, host as Arc<dyn SoarHost>)
        .await
        .context("connector initialization failed")?;

    let request = ActionRequest::new(args.action, parameters);
    let result = connector.handle(&request).await;
    println!("{}", serde_json::to_string_pretty(&result)?);

    connector
        .finalize()
        .await
        .context("failed to persist connector state")?;

    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}
