mod cli;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::warn;
use ulid::Ulid;

use catalog_core::client;
use catalog_core::domain::{Request, Response};
use catalog_core::impls::JsonFileDocument;
use catalog_core::ports::DocumentStore;
use catalog_core::{ServerBuilder, ServerConfig};

use crate::cli::{Cli, Command, DumpArgs, ServeArgs, ServerArg};

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve(args) => serve(args).await?,
        Command::Insert(args) => {
            let request = Request::insert(&args.id, &args.name, args.price);
            send(&args.target, request).await?;
        }
        Command::Query(args) => {
            let request = Request::query(&args.id);
            send(&args.target, request).await?;
        }
        Command::Dump(args) => dump(args).await?,
    }

    Ok(())
}

async fn serve(args: ServeArgs) -> Result<()> {
    let config = ServerConfig {
        listen: args.listen,
        store_path: args.store,
        workers: args.workers,
        insert_delay: Duration::from_millis(args.insert_delay_ms),
        poll_interval: Duration::from_millis(args.poll_interval_ms),
        ..ServerConfig::default()
    };

    let running = ServerBuilder::from_config(config)
        .build()
        .context("invalid server configuration")?
        .start()
        .await
        .context("failed to start server")?;

    // Tests and scripts read the bound address from stdout.
    println!("listening on {}", running.local_addr());
    running.run_until_ctrl_c().await;
    Ok(())
}

async fn send(target: &ServerArg, request: Request) -> Result<()> {
    let client_id = target
        .client_id
        .clone()
        .unwrap_or_else(|| Ulid::new().to_string());
    let request = request.with_client_id(client_id);

    let response = client::call(target.server, &request)
        .await
        .with_context(|| format!("request to {} failed", target.server))?;
    print_response(&response)?;

    if !response.is_success() {
        warn!(message = ?response.message, "server reported an error");
    }
    Ok(())
}

fn print_response(response: &Response) -> Result<()> {
    println!("{}", serde_json::to_string(response)?);
    Ok(())
}

async fn dump(args: DumpArgs) -> Result<()> {
    let document = JsonFileDocument::new(&args.store);
    let records = document
        .load()
        .await
        .with_context(|| format!("failed to read {}", args.store.display()))?;

    println!("{} record(s) in {}", records.len(), args.store.display());
    for (position, record) in records.iter().enumerate() {
        println!(
            "{position:>4}  {:<16} {:<24} {}",
            record.id, record.name, record.price
        );
    }
    Ok(())
}
