//! Authenticated REST resource calls: SObjects and Apex REST endpoints.

use crate::client::{self, Session};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// HTTP methods supported for resource calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Read a resource.
    Get,
    /// Create a record or call an Apex action.
    Post,
    /// Partially update a record.
    Patch,
    /// Delete a record.
    Delete,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One entry of the error array Salesforce returns on a rejected call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Error code such as `REQUIRED_FIELD_MISSING` (`errorCode` on REST responses).
    #[serde(alias = "errorCode")]
    pub status_code: String,
    /// Human readable message.
    #[serde(default)]
    pub message: Option<String>,
    /// Fields the error relates to.
    #[serde(default)]
    pub fields: Vec<String>,
}

/// Result of creating an SObject record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateResponse {
    /// Generated record id.
    pub id: String,
    /// Whether the record was created.
    pub success: bool,
    /// Errors reported alongside a successful create, normally empty.
    #[serde(default)]
    pub errors: Vec<Value>,
}

/// Errors raised by resource calls.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Authentication/client error.
    #[error("Authentication error: {source}")]
    Auth {
        #[source]
        source: client::Error,
    },
    /// Resource path is not relative to the instance URL.
    #[error("Invalid resource path `{0}`: must start with `/`")]
    InvalidPath(String),
    /// Request could not be sent or the response could not be read.
    #[error("Request failed: {source}")]
    Request {
        #[source]
        source: reqwest::Error,
    },
    /// Salesforce answered with a non-2xx status.
    #[error("Salesforce returned {status}: {body}")]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Response body as returned by Salesforce.
        body: Value,
    },
    /// Request payload could not be serialized to JSON.
    #[error("Failed to encode request body: {source}")]
    Encode {
        #[source]
        source: serde_json::Error,
    },
    /// Successful response body was not valid JSON of the expected shape.
    #[error("Failed to decode response: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Decodes the remote error array, if this is a [`Error::Remote`] in the standard shape.
    ///
    /// Salesforce returns either a bare array or an object with an `errors` array.
    pub fn api_errors(&self) -> Option<Vec<ApiError>> {
        let Error::Remote { body, .. } = self else {
            return None;
        };
        let errors = match body {
            Value::Array(_) => body,
            Value::Object(map) => map.get("errors")?,
            _ => return None,
        };
        serde_json::from_value(errors.clone()).ok()
    }
}

/// Client for Salesforce REST resources.
///
/// Wraps the session of a connected authentication client. Construction
/// fails when the client has not authenticated, so no resource call can be
/// made without a session.
///
/// # Example
///
/// ```no_run
/// use salesforce_rest::client;
/// use salesforce_rest::rest::Client as RestClient;
/// use std::path::PathBuf;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let auth_client = client::Builder::new()
///     .credentials_path(PathBuf::from("credentials.json"))
///     .build()?
///     .connect()
///     .await?;
///
/// let rest_client = RestClient::new(&auth_client)?;
/// let record = rest_client.get("Lead", "00Qxx0000001gP3EAI").await?;
/// println!("{record}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Client {
    session: Session,
    api_version: String,
    http_client: reqwest::Client,
}

impl Client {
    /// Creates a REST client from a connected authentication client.
    pub fn new(auth_client: &client::Client) -> Result<Self, Error> {
        let session = auth_client
            .session()
            .map_err(|source| Error::Auth { source })?
            .clone();
        Ok(Self {
            session,
            api_version: auth_client.api_version().to_string(),
            http_client: auth_client.http_client().clone(),
        })
    }

    /// Returns the session used for every call.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Returns the API version being used.
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Path of an SObject collection, or of one record when `id` is given.
    pub fn sobject_path(&self, object: &str, id: Option<&str>) -> String {
        let base = format!("/services/data/v{}/sobjects/{object}", self.api_version);
        match id {
            Some(id) => format!("{base}/{id}"),
            None => base,
        }
    }

    /// Path of a custom Apex REST resource.
    pub fn apex_path(resource: &str) -> String {
        format!("/services/apexrest/{}", resource.trim_start_matches('/'))
    }

    /// Issues an authenticated request against the instance URL.
    ///
    /// `path` is relative to the instance URL. A `Content-Type: application/json`
    /// header is sent only when `body` is present. Non-2xx responses are
    /// returned as [`Error::Remote`] with the body untouched; nothing is retried.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn invoke(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, Error> {
        if !path.starts_with('/') {
            return Err(Error::InvalidPath(path.to_string()));
        }

        let url = format!("{}{path}", self.session.instance_url());
        tracing::debug!(?method, %url, "Calling Salesforce resource");

        let mut request = self
            .http_client
            .request(method.into(), &url)
            .bearer_auth(self.session.access_token())
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(body) = body {
            // `json` also sets `Content-Type: application/json`.
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|source| Error::Request { source })?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|source| Error::Request { source })?;

        if !status.is_success() {
            let body = serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
            tracing::warn!(status = status.as_u16(), %body, %url, "Salesforce rejected the request");
            return Err(Error::Remote {
                status: status.as_u16(),
                body,
            });
        }

        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|source| Error::Decode { source })
    }

    /// Creates a record and returns the generated id.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn create<T: Serialize>(
        &self,
        object: &str,
        payload: &T,
    ) -> Result<CreateResponse, Error> {
        let body = serde_json::to_value(payload).map_err(|source| Error::Encode { source })?;
        let value = self
            .invoke(Method::Post, &self.sobject_path(object, None), Some(&body))
            .await?;
        let created: CreateResponse =
            serde_json::from_value(value).map_err(|source| Error::Decode { source })?;
        tracing::info!(object, id = %created.id, "Created record");
        Ok(created)
    }

    /// Retrieves a record with all of its fields.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn get(&self, object: &str, id: &str) -> Result<Value, Error> {
        self.invoke(Method::Get, &self.sobject_path(object, Some(id)), None)
            .await
    }

    /// POSTs to a custom Apex REST resource.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn apex(&self, resource: &str, body: Option<&Value>) -> Result<Value, Error> {
        self.invoke(Method::Post, &Self::apex_path(resource), body)
            .await
    }

    /// GETs a custom Apex REST resource.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn apex_get(&self, resource: &str) -> Result<Value, Error> {
        self.invoke(Method::Get, &Self::apex_path(resource), None)
            .await
    }
}
