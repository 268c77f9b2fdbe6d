//! Salesforce REST API client.
//!
//! This crate authenticates with the OAuth2 username-password flow and
//! issues authenticated calls against SObject and Apex REST resources.
//! Results can be written to timestamped JSON files.
//!
//! # Examples
//!
//! ```no_run
//! use salesforce_rest::client;
//! use salesforce_rest::lead::{self, Lead};
//! use salesforce_rest::persist;
//! use salesforce_rest::rest::Client as RestClient;
//! use std::path::{Path, PathBuf};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let auth_client = client::Builder::new()
//!     .credentials_path(PathBuf::from("credentials.json"))
//!     .build()?
//!     .connect()
//!     .await?;
//!
//! let rest_client = RestClient::new(&auth_client)?;
//! let created = rest_client
//!     .create(lead::OBJECT_NAME, &Lead::new("John", "Doe", "Doe Enterprises"))
//!     .await?;
//! let record = rest_client.get(lead::OBJECT_NAME, &created.id).await?;
//! persist::write_json(&record, Path::new("."), "lead")?;
//! # Ok(())
//! # }
//! ```

/// Default Salesforce API version used for resource calls.
pub const DEFAULT_API_VERSION: &str = "57.0";

/// Default login host for production orgs.
pub const DEFAULT_LOGIN_URL: &str = "https://login.salesforce.com";

/// Login host for sandbox orgs.
pub const SANDBOX_LOGIN_URL: &str = "https://test.salesforce.com";

/// Credentials loading and validation.
pub mod config;

/// OAuth2 username-password authentication and session management.
pub mod client;

/// Authenticated SObject and Apex REST calls.
pub mod rest;

/// Lead payloads.
pub mod lead;

/// Timestamped JSON output.
pub mod persist;
