//! Connect to the portal once and report how it went.
//!
//! ```sh
//! export PORTAL_API_URL='https://portal.example.com/api/'
//! export PORTAL_LOGIN='{"login": "ops", "password": "..."}'
//! cargo run --bin portal-api
//! ```

use std::time::Instant;

use portal_api::logging::{self, LogConfig};
use portal_api::{ClientConfig, LoginCredentials, PortalClient};
use tracing::info;

#[tokio::main]
async fn main() {
    let started = Instant::now();

    let log_config = LogConfig::from_env();
    logging::init(&log_config).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    let config = ClientConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    let credentials = LoginCredentials::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!();
        eprintln!("  Set PORTAL_LOGIN to the login JSON object, for example:");
        eprintln!("    export PORTAL_LOGIN='{{\"login\": \"ops\", \"password\": \"...\"}}'");
        eprintln!("  or PORTAL_LOGIN_FILE to the path of a file holding it.");
        std::process::exit(1);
    });

    let init_started = Instant::now();
    let client = PortalClient::connect(&credentials, config)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Error: {e}");
            std::process::exit(1);
        });
    let init_elapsed = init_started.elapsed();
    info!(elapsed_ms = init_elapsed.as_millis() as u64, "Api Init");

    println!("Api Init: {init_elapsed:?}");
    if client.is_authenticated() {
        println!("Session: authenticated");
    } else {
        println!(
            "Session: not authenticated (see {})",
            log_config.error_log.display()
        );
    }
    println!("Total: {:?}", started.elapsed());
}
