//! Credentials for the OAuth2 username-password flow.
//!
//! Credentials are read from a JSON file (or passed in directly) and
//! validated before any request leaves the process.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// The only grant type this crate knows how to perform.
pub const PASSWORD_GRANT_TYPE: &str = "password";

/// Default file name looked up by the demos.
pub const DEFAULT_CREDENTIALS_FILE: &str = "credentials.json";

/// Shape of a valid credentials file, shown to the user when loading fails.
const EXPECTED_SHAPE: &str = r#"{
  "grant_type": "password",
  "client_id": "<Connected App consumer key>",
  "client_secret": "<Connected App consumer secret>",
  "username": "user@example.com",
  "password": "<password><security token>"
}"#;

/// Errors raised while loading or validating credentials.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to read credentials file from disk.
    #[error("Failed to read credentials file at {path}: {source}")]
    ReadCredentials {
        /// Path to the credentials file that failed to read.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Failed to parse credentials JSON.
    #[error("Failed to parse credentials JSON: {source}")]
    ParseCredentials {
        #[source]
        source: serde_json::Error,
    },
    /// A required field is absent or empty.
    #[error("Missing required credentials field: {field}")]
    MissingField {
        /// Name of the field as it appears in the JSON file.
        field: &'static str,
    },
    /// `grant_type` is set to something other than `password`.
    #[error("Unsupported grant_type `{0}`, only `password` is supported")]
    UnsupportedGrantType(String),
}

impl Error {
    /// Returns an instructional message describing how to fix the configuration.
    pub fn remediation(&self) -> String {
        let hint = match self {
            Error::ReadCredentials { path, .. } => {
                format!("Create {} with the following content:", path.display())
            }
            Error::ParseCredentials { .. } => {
                "The credentials file must be a JSON object shaped like:".to_string()
            }
            Error::MissingField { field } => {
                format!("Add a non-empty `{field}` to the credentials file:")
            }
            Error::UnsupportedGrantType(_) => {
                "Set `grant_type` to `password` in the credentials file:".to_string()
            }
        };
        format!("{hint}\n{EXPECTED_SHAPE}")
    }
}

/// Salesforce OAuth2 password-grant credentials.
///
/// Every field is optional at the serde layer so that [`Credentials::validate`]
/// can report exactly which one is missing.
///
/// # Examples
///
/// ```
/// use salesforce_rest::config::Credentials;
///
/// let creds: Credentials = serde_json::from_str(
///     r#"{
///         "grant_type": "password",
///         "client_id": "id",
///         "client_secret": "secret",
///         "username": "user@example.com",
///         "password": "passwordTOKEN"
///     }"#,
/// )
/// .unwrap();
/// assert!(creds.validate().is_ok());
/// ```
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct Credentials {
    /// OAuth2 grant type. Must be `password`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grant_type: Option<String>,
    /// Client ID from the Connected App (Consumer Key).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// Client Secret from the Connected App (Consumer Secret).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    /// Username for authentication (email address).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Password for authentication.
    ///
    /// **Note:** If your org requires a security token, append it to the password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Login host, e.g. `https://login.salesforce.com` or `https://test.salesforce.com`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_url: Option<String>,
    /// REST API version used for resource calls, e.g. `57.0`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("Credentials")
            .field("grant_type", &self.grant_type)
            .field("client_id", &self.client_id)
            .field("client_secret", &redacted(&self.client_secret))
            .field("username", &self.username)
            .field("password", &redacted(&self.password))
            .field("login_url", &self.login_url)
            .field("api_version", &self.api_version)
            .finish()
    }
}

impl Credentials {
    /// Builds password-grant credentials from their required parts.
    pub fn password(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            grant_type: Some(PASSWORD_GRANT_TYPE.to_string()),
            client_id: Some(client_id.into()),
            client_secret: Some(client_secret.into()),
            username: Some(username.into()),
            password: Some(password.into()),
            login_url: None,
            api_version: None,
        }
    }

    /// Reads credentials from a JSON file.
    ///
    /// Missing keys are not an error here; call [`validate`](Self::validate)
    /// to check completeness.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let content = fs::read_to_string(path).map_err(|source| Error::ReadCredentials {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| Error::ParseCredentials { source })
    }

    /// Checks that all password-grant fields are present and non-empty.
    ///
    /// Fields are checked in file order and the first gap is reported.
    pub fn validate(&self) -> Result<(), Error> {
        let grant_type = required("grant_type", &self.grant_type)?;
        required("client_id", &self.client_id)?;
        required("client_secret", &self.client_secret)?;
        required("username", &self.username)?;
        required("password", &self.password)?;

        if grant_type != PASSWORD_GRANT_TYPE {
            return Err(Error::UnsupportedGrantType(grant_type.to_string()));
        }
        Ok(())
    }

    /// Returns the configured API version or the crate default.
    pub fn api_version(&self) -> &str {
        self.api_version
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or(crate::DEFAULT_API_VERSION)
    }
}

/// Returns the value of a required field, or the error naming it.
pub(crate) fn required<'a>(field: &'static str, value: &'a Option<String>) -> Result<&'a str, Error> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::MissingField { field }),
    }
}

/// Source for loading credentials.
#[derive(Debug, Clone)]
pub enum CredentialsFrom {
    /// Load credentials from a JSON file.
    Path(PathBuf),
    /// Use credentials provided directly.
    Value(Credentials),
}

impl CredentialsFrom {
    /// Resolves the source into credentials.
    pub fn load(&self) -> Result<Credentials, Error> {
        match self {
            CredentialsFrom::Value(creds) => Ok(creds.clone()),
            CredentialsFrom::Path(path) => Credentials::from_path(path),
        }
    }
}
