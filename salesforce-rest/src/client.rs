use crate::config::{self, Credentials, CredentialsFrom};
use chrono::{DateTime, Utc};
use oauth2::basic::{
    BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
    BasicTokenType,
};
use oauth2::{
    AccessToken, AuthType, ClientId, ClientSecret, ExtraTokenFields, RequestTokenError,
    ResourceOwnerPassword, ResourceOwnerUsername, StandardRevocableToken, TokenResponse, TokenUrl,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default OAuth2 token endpoint path.
const DEFAULT_TOKEN_PATH: &str = "/services/oauth2/token";

/// Salesforce-specific fields returned next to the standard OAuth2 token fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesforceTokenFields {
    /// Base URL of the org; every resource call is made against it.
    pub instance_url: String,
    /// Identity URL of the authenticated user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Milliseconds since the Unix epoch, as a string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<String>,
    /// Base64 HMAC-SHA256 signature over `id` and `issued_at`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl ExtraTokenFields for SalesforceTokenFields {}

/// Type alias for the Salesforce OAuth2 token response.
pub type SalesforceTokenResponse =
    oauth2::StandardTokenResponse<SalesforceTokenFields, BasicTokenType>;

/// Errors that can occur while authenticating.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Credentials could not be loaded or are incomplete.
    #[error("Invalid configuration: {0}")]
    Config(#[from] config::Error),
    /// Invalid URL format for the login host.
    #[error("Invalid URL format: {source}")]
    ParseUrl {
        #[source]
        source: url::ParseError,
    },
    /// Failed to construct the underlying HTTP client.
    #[error("Failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },
    /// Salesforce rejected the grant.
    #[error(
        "OAuth2 token exchange rejected: {error} ({})",
        .description.as_deref().unwrap_or("no description")
    )]
    TokenExchange {
        /// Remote `error` code, e.g. `invalid_grant`.
        error: String,
        /// Remote `error_description`.
        description: Option<String>,
    },
    /// The token request failed for a reason other than a remote rejection.
    #[error("OAuth2 token request failed: {0}")]
    TokenRequest(Box<dyn std::error::Error + Send + Sync>),
    /// Required builder parameter was not provided.
    #[error("Missing required attribute: {}", _0)]
    MissingRequiredAttribute(String),
    /// No session is available yet.
    #[error("Client is not connected: call connect() first")]
    NotConnected,
}

/// An authenticated Salesforce session.
///
/// Created once per successful authentication and held for the lifetime
/// of the process. It is never refreshed.
#[derive(Debug, Clone)]
pub struct Session {
    access_token: AccessToken,
    token_type: String,
    instance_url: String,
    id: Option<String>,
    issued_at: Option<String>,
    signature: Option<String>,
}

impl Session {
    /// Builds a session from a token endpoint response.
    pub fn from_token_response(response: &SalesforceTokenResponse) -> Self {
        let extra = response.extra_fields();
        Self {
            access_token: response.access_token().clone(),
            token_type: response.token_type().as_ref().to_string(),
            instance_url: extra.instance_url.trim_end_matches('/').to_string(),
            id: extra.id.clone(),
            issued_at: extra.issued_at.clone(),
            signature: extra.signature.clone(),
        }
    }

    /// The bearer token presented on every resource call.
    pub fn access_token(&self) -> &str {
        self.access_token.secret()
    }

    /// Token type as reported by Salesforce (normally `bearer`).
    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// Base URL for resource calls, without a trailing slash.
    pub fn instance_url(&self) -> &str {
        &self.instance_url
    }

    /// Identity URL of the authenticated user.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Raw `issued_at` value.
    pub fn issued_at_raw(&self) -> Option<&str> {
        self.issued_at.as_deref()
    }

    /// Time the token was issued, if Salesforce reported a parseable value.
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.issued_at
            .as_deref()
            .and_then(|raw| raw.parse::<i64>().ok())
            .and_then(DateTime::from_timestamp_millis)
    }

    /// Signature over `id` and `issued_at`.
    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }
}

/// OAuth2 client for Salesforce API authentication.
///
/// Use [`Builder`] to construct a client instance, then call
/// [`connect`](Client::connect) to obtain a [`Session`].
///
/// # Examples
///
/// ```no_run
/// use salesforce_rest::client;
/// use std::path::PathBuf;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = client::Builder::new()
///     .credentials_path(PathBuf::from("credentials.json"))
///     .build()?
///     .connect()
///     .await?;
///
/// println!("Connected to {}", client.session()?.instance_url());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    /// Source of credentials (file path or direct value).
    credentials_from: CredentialsFrom,
    /// Overrides the login host from the credentials.
    login_url: Option<String>,
    /// Overrides the API version from the credentials.
    api_version: Option<String>,
    /// Shared HTTP client used for the token request and resource calls.
    http_client: reqwest::Client,
    /// Present once [`connect`](Self::connect) has succeeded.
    session: Option<Session>,
}

impl Client {
    /// Loads credentials from the configured source and authenticates.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Credentials cannot be read, parsed or are incomplete ([`Error::Config`])
    /// - The login URL is malformed ([`Error::ParseUrl`])
    /// - Salesforce rejects the grant ([`Error::TokenExchange`])
    /// - The token request fails otherwise ([`Error::TokenRequest`])
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn connect(mut self) -> Result<Self, Error> {
        let credentials = self.credentials_from.load()?;
        if self.api_version.is_none() {
            self.api_version = Some(credentials.api_version().to_string());
        }

        let session = self.authenticate(&credentials).await?;
        tracing::info!(instance_url = %session.instance_url(), "Authenticated with Salesforce");
        self.session = Some(session);

        Ok(self)
    }

    /// Exchanges password-grant credentials for a [`Session`].
    ///
    /// Validation happens before any request is made, so incomplete
    /// credentials never reach the network.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<Session, Error> {
        credentials.validate()?;

        let client_id = config::required("client_id", &credentials.client_id)?;
        let client_secret = config::required("client_secret", &credentials.client_secret)?;
        let username = config::required("username", &credentials.username)?;
        let password = config::required("password", &credentials.password)?;

        let token_url = self.token_url(credentials);
        tracing::debug!(%token_url, username, "Requesting OAuth2 password grant");

        let oauth2_client = oauth2::Client::<
            BasicErrorResponse,
            SalesforceTokenResponse,
            BasicTokenIntrospectionResponse,
            StandardRevocableToken,
            BasicRevocationErrorResponse,
        >::new(ClientId::new(client_id.to_string()))
        .set_client_secret(ClientSecret::new(client_secret.to_string()))
        .set_auth_type(AuthType::RequestBody)
        .set_token_uri(TokenUrl::new(token_url).map_err(|source| Error::ParseUrl { source })?);

        let token_response = oauth2_client
            .exchange_password(
                &ResourceOwnerUsername::new(username.to_string()),
                &ResourceOwnerPassword::new(password.to_string()),
            )
            .request_async(&self.http_client)
            .await
            .map_err(|e| match e {
                RequestTokenError::ServerResponse(response) => {
                    let error = response.error().as_ref().to_string();
                    let description = response.error_description().cloned();
                    tracing::warn!(
                        error = %error,
                        error_description = description.as_deref().unwrap_or_default(),
                        "Salesforce rejected the token request"
                    );
                    Error::TokenExchange { error, description }
                }
                other => Error::TokenRequest(Box::new(other)),
            })?;

        Ok(Session::from_token_response(&token_response))
    }

    /// Returns the session obtained by [`connect`](Self::connect).
    pub fn session(&self) -> Result<&Session, Error> {
        self.session.as_ref().ok_or(Error::NotConnected)
    }

    /// Returns the API version used for resource calls.
    pub fn api_version(&self) -> &str {
        self.api_version
            .as_deref()
            .unwrap_or(crate::DEFAULT_API_VERSION)
    }

    /// Returns the HTTP client shared with resource calls.
    pub fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    /// Resolves the token endpoint from the builder override, the credentials or the default host.
    fn token_url(&self, credentials: &Credentials) -> String {
        let login_url = self
            .login_url
            .as_deref()
            .or(credentials.login_url.as_deref())
            .filter(|u| !u.is_empty())
            .unwrap_or(crate::DEFAULT_LOGIN_URL);

        format!("{}{}", login_url.trim_end_matches('/'), DEFAULT_TOKEN_PATH)
    }
}

/// Builder for constructing a [`Client`].
///
/// No timeout is configured unless one is set here; the transport's own
/// behaviour applies otherwise.
#[derive(Default)]
pub struct Builder {
    credentials_from: Option<CredentialsFrom>,
    login_url: Option<String>,
    api_version: Option<String>,
    connect_timeout: Option<Duration>,
    request_timeout: Option<Duration>,
}

impl Builder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets credentials to load from a JSON file.
    ///
    /// The file should contain a JSON object like:
    ///
    /// ```json
    /// {
    ///   "grant_type": "password",
    ///   "client_id": "your_client_id",
    ///   "client_secret": "your_client_secret",
    ///   "username": "user@example.com",
    ///   "password": "your_password_and_security_token"
    /// }
    /// ```
    pub fn credentials_path(mut self, path: PathBuf) -> Self {
        self.credentials_from = Some(CredentialsFrom::Path(path));
        self
    }

    /// Sets credentials directly.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials_from = Some(CredentialsFrom::Value(credentials));
        self
    }

    /// Overrides the login host (e.g. `https://test.salesforce.com` for sandboxes).
    pub fn login_url(mut self, login_url: impl Into<String>) -> Self {
        self.login_url = Some(login_url.into());
        self
    }

    /// Overrides the REST API version.
    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    /// Sets the TCP connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the total per-request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns an error if credentials were not provided via either
    /// [`credentials_path`](Self::credentials_path) or [`credentials`](Self::credentials),
    /// or if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<Client, Error> {
        let credentials_from = self.credentials_from.ok_or_else(|| {
            Error::MissingRequiredAttribute("credentials or credentials_path".to_string())
        })?;

        // Redirects are disabled so the token request cannot be bounced elsewhere.
        let mut http_builder =
            reqwest::Client::builder().redirect(reqwest::redirect::Policy::none());
        if let Some(timeout) = self.connect_timeout {
            http_builder = http_builder.connect_timeout(timeout);
        }
        if let Some(timeout) = self.request_timeout {
            http_builder = http_builder.timeout(timeout);
        }
        let http_client = http_builder
            .build()
            .map_err(|source| Error::HttpClientBuild { source })?;

        Ok(Client {
            credentials_from,
            login_url: self.login_url,
            api_version: self.api_version,
            http_client,
            session: None,
        })
    }
}
