/// Live Chat Client - Main entry point
///
/// A command-line client that mirrors a user's conversations by combining
/// REST snapshot pulls with a WebSocket push channel.
use clap::Parser;
use live_chat_client::{ChatClient, Result};
use log::info;

#[derive(Parser)]
#[command(name = "live-chat")]
#[command(about = "Live chat client - pull snapshots, push events")]
struct Args {
    /// Server URL (default: http://localhost:8000)
    #[arg(long, default_value = "http://localhost:8000")]
    server: String,

    /// Log in as this user at startup (requires --password)
    #[arg(long)]
    username: Option<String>,

    /// Password for --username
    #[arg(long)]
    password: Option<String>,

    /// Enable verbose logging (DEBUG level)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    info!("Starting live chat client");
    info!("Server: {}", args.server);

    let mut client = ChatClient::new(&args.server);

    if let (Some(username), Some(password)) = (args.username.as_deref(), args.password.as_deref())
    {
        client.login(username, password).await;
    }

    client.run().await?;

    Ok(())
}
