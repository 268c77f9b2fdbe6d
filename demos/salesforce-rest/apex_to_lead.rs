//! Call a custom Apex REST resource and turn its answer into a new Lead.
//!
//! The Apex resource is expected at `/services/apexrest/<SALESFORCE_APEX_RESOURCE>`
//! (default `LeadInfo`). Fields missing from its response are filled with the
//! defaults documented on [`salesforce_rest::lead::from_apex`].
//!
//! Run with: `cargo run --example apex_to_lead`

use salesforce_rest::client;
use salesforce_rest::config::DEFAULT_CREDENTIALS_FILE;
use salesforce_rest::lead;
use salesforce_rest::rest::Client as RestClient;
use serde_json::json;
use std::env;
use std::path::PathBuf;
use tracing::{error, info, warn};
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
    let resource = env::var("SALESFORCE_APEX_RESOURCE").unwrap_or_else(|_| "LeadInfo".to_string());

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

    info!("Invoking Apex resource {resource}");
    let apex_result = rest_client
        .apex(&resource, Some(&json!({"source": "salesforce-rest"})))
        .await?;

    let new_lead = lead::from_apex(&apex_result);
    if new_lead.last_name == lead::DEFAULT_LAST_NAME {
        warn!("Apex response had no lastName, using placeholder");
    }

    match rest_client.create(lead::OBJECT_NAME, &new_lead).await {
        Ok(created) => info!("Created Lead: {}", created.id),
        Err(e) => {
            if let Some(errors) = e.api_errors() {
                for api_error in errors {
                    error!(
                        "{}: {} {:?}",
                        api_error.status_code,
                        api_error.message.unwrap_or_default(),
                        api_error.fields
                    );
                }
            }
            return Err(e.into());
        }
    }

    Ok(())
}
