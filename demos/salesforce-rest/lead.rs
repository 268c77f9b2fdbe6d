//! Create a Lead, read it back and save it to a timestamped JSON file.
//!
//! This example demonstrates:
//! - Loading credentials from `credentials.json` (or the path in `SALESFORCE_CREDENTIALS`)
//! - Authenticating with the OAuth2 username-password flow
//! - Creating a Lead through the SObject endpoint
//! - Retrieving the full Lead record
//! - Writing the record to `lead-<timestamp>.json`
//!
//! Run with: `cargo run --example lead`

use salesforce_rest::client;
use salesforce_rest::config::DEFAULT_CREDENTIALS_FILE;
use salesforce_rest::lead::{self, Lead};
use salesforce_rest::persist;
use salesforce_rest::rest::Client as RestClient;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let credentials_path = env::var("SALESFORCE_CREDENTIALS")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CREDENTIALS_FILE));

    let auth_client = match client::Builder::new()
        .credentials_path(credentials_path)
        .build()?
        .connect()
        .await
    {
        Ok(client) => client,
        Err(client::Error::Config(e)) => {
            error!("{e}");
            eprintln!("{}", e.remediation());
            std::process::exit(1);
        }
        Err(e) => {
            error!("Authentication failed: {e}");
            std::process::exit(1);
        }
    };

    let rest_client = RestClient::new(&auth_client)?;

    info!("Creating a Lead");
    let created = rest_client
        .create(lead::OBJECT_NAME, &Lead::new("John", "Doe", "Doe Enterprises"))
        .await?;
    info!("Created Lead: {}", created.id);

    info!("Retrieving the Lead");
    let record = rest_client.get(lead::OBJECT_NAME, &created.id).await?;

    let path = persist::write_json(&record, Path::new("."), "lead")?;
    info!("Lead saved to {}", path.display());

    Ok(())
}
