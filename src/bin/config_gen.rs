use docdb_connect::ConfigBuilder;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "config-gen")]
#[command(about = "Generate document database configuration files")]
struct Args {
    /// Output file path
    #[arg(short, long, default_value = "docdb_config.json")]
    output: PathBuf,

    /// Output format (json, toml)
    #[arg(short, long, default_value = "json")]
    format: String,

    /// Seed list in format host:port,host:port
    #[arg(long, default_value = "localhost:27017")]
    seeds: String,

    /// Database name
    #[arg(long)]
    name: String,

    /// Replica set name
    #[arg(long)]
    replica_set: Option<String>,

    /// Database username
    #[arg(long)]
    username: Option<String>,

    /// Enable TLS
    #[arg(long)]
    ssl: bool,

    /// Require certificate verification
    #[arg(long)]
    verify_ssl: bool,

    /// CA bundle path
    #[arg(long)]
    ca_path: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut builder = ConfigBuilder::new()
        .seeds(args.seeds)
        .name(args.name)
        .ssl(args.ssl)
        .verify_ssl(args.verify_ssl)
        .log_level(args.log_level);

    if let Some(replica_set) = args.replica_set {
        builder = builder.replica_set(replica_set);
    }
    if let Some(username) = args.username {
        builder = builder.username(username);
    }
    if let Some(ca_path) = args.ca_path {
        builder = builder.ca_path(ca_path);
    }

    let config = builder.build();

    let mut output_path = args.output;
    if args.format == "toml" {
        output_path.set_extension("toml");
    } else if args.format == "json" {
        output_path.set_extension("json");
    }

    config.save_to_file(&output_path)?;

    println!("Configuration saved to: {}", output_path.display());
    println!("Set the password with DOCDB_DATABASE__PASSWORD or --prompt-password, then run:");
    println!("  cargo run --bin docdb-connect -- -c {}", output_path.display());

    Ok(())
}
