use clap::Parser;
use docdb_connect::{CommonArgs, ConnectError, ConnectionManager, MongoDriver};
use std::process;
use tracing::info;

#[tokio::main]
async fn main() {
    let args = CommonArgs::parse();

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("✗ Failed to load configuration: {e}");
            process::exit(1);
        }
    };

    let _guard = match args.init_logging(&config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("✗ Failed to initialize logging: {e}");
            process::exit(1);
        }
    };

    args.print_connection_info(&config);

    let mut manager = ConnectionManager::new(MongoDriver::new(), config.database);
    match manager.initialize(args.initialize_args()).await {
        Ok(()) => {
            info!(state = %manager.state(), "Database bootstrap finished");
            println!("✓ Connected to database '{}'", manager.config().name);
        }
        Err(e) => {
            handle_connection_error(&e);
            process::exit(1);
        }
    }
}

/// Print the failure with a hint about what to check
fn handle_connection_error(e: &ConnectError) {
    eprintln!("✗ Failed to initialize the database connection: {e}");

    match e {
        ConnectError::Authentication(_) => {
            eprintln!("  → Check the database username and password")
        }
        ConnectError::IncompatibleVersion { .. } | ConnectError::InvalidVersion(_) => {
            eprintln!("  → Upgrade the database server")
        }
        ConnectError::Configuration(_) => {
            eprintln!("  → Check the [database] section of the configuration")
        }
        _ => {}
    }
}
