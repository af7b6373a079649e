use std::process::ExitCode;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;
use txs_client::{Client, PollingOptions, Transaction};

/// Broadcast a transaction and poll its status until it settles.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Endpoint accepting the transaction payload
    #[arg(long, env = "TXS_BROADCAST_URL")]
    broadcast_url: String,

    /// Base endpoint the transaction hash is appended to
    #[arg(long, env = "TXS_POLLING_URL")]
    polling_url: String,

    /// Milliseconds between status checks (0 uses the default of 5s)
    #[arg(long, env = "TXS_POLL_INTERVAL_MS", default_value_t = 0)]
    interval_ms: u64,

    /// Creation time in unix seconds, defaults to now
    #[arg(long)]
    timestamp: Option<u64>,

    /// Asset symbol, e.g. ETH
    symbol: String,

    price: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse().unwrap()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", report(e.as_ref()));
            ExitCode::FAILURE
        }
    }
}

/// Render an error followed by its chain of causes.
fn report(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let options = PollingOptions::default().with_interval(Duration::from_millis(args.interval_ms));
    let client = Client::new(&args.broadcast_url, &args.polling_url)?.with_options(options);

    let timestamp = match args.timestamp {
        Some(timestamp) => timestamp,
        None => SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs(),
    };
    let mut tx = Transaction::new(args.symbol, args.price, timestamp)?;
    println!("{tx}");

    client.broadcast(&mut tx).await?;
    println!("{tx}");

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, stopping polling");
            on_signal.cancel();
        }
    });

    client.poll(&cancel, &mut tx).await?;
    println!("{tx}");

    Ok(())
}
