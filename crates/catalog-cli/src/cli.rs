use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the catalog server.
    Serve(ServeArgs),
    /// Insert one record and print its position (-1 if the id exists).
    Insert(InsertArgs),
    /// Print the position of a record (-1 if absent).
    Query(QueryArgs),
    /// Print the persisted registry in position order.
    Dump(DumpArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Socket address to bind. Use port 0 for an ephemeral port.
    #[arg(long, env = "CATALOG_LISTEN", default_value = "127.0.0.1:8888")]
    pub listen: SocketAddr,

    /// Path of the JSON document holding the records.
    #[arg(long, env = "CATALOG_STORE", default_value = "catalog.json")]
    pub store: PathBuf,

    /// Number of workers draining the dispatch queue.
    #[arg(long, env = "CATALOG_WORKERS", default_value_t = 3)]
    pub workers: usize,

    /// Simulated processing time inside each insert, in milliseconds.
    #[arg(long, env = "CATALOG_INSERT_DELAY_MS", default_value_t = 3000)]
    pub insert_delay_ms: u64,

    /// How often idle workers check for shutdown, in milliseconds.
    #[arg(long, env = "CATALOG_POLL_INTERVAL_MS", default_value_t = 1000)]
    pub poll_interval_ms: u64,
}

#[derive(Args, Debug, Clone)]
pub struct ServerArg {
    /// Address of the catalog server.
    #[arg(long, env = "CATALOG_SERVER", default_value = "127.0.0.1:8888")]
    pub server: SocketAddr,

    /// Identifier sent as `client_id`. Generated when omitted.
    #[arg(long)]
    pub client_id: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct InsertArgs {
    #[arg(long)]
    pub id: String,

    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub price: f64,

    #[command(flatten)]
    pub target: ServerArg,
}

#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    #[arg(long)]
    pub id: String,

    #[command(flatten)]
    pub target: ServerArg,
}

#[derive(Args, Debug, Clone)]
pub struct DumpArgs {
    #[arg(long, env = "CATALOG_STORE", default_value = "catalog.json")]
    pub store: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_defaults() {
        let cli = Cli::try_parse_from(["catalog", "serve"]).unwrap();
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.workers, 3);
        assert_eq!(args.insert_delay_ms, 3000);
    }

    #[test]
    fn insert_requires_all_fields() {
        assert!(Cli::try_parse_from(["catalog", "insert", "--id", "A"]).is_err());
        let cli = Cli::try_parse_from([
            "catalog", "insert", "--id", "A", "--name", "Mouse", "--price", "10.5",
        ])
        .unwrap();
        let Command::Insert(args) = cli.command else {
            panic!("expected insert");
        };
        assert_eq!(args.price, 10.5);
    }
}
