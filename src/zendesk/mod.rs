//! Zendesk REST client
//!
//! Every call goes through [`ZendeskClient::request`], which attaches the
//! session's credentials and turns any non-2xx status into an error.

mod bulk;
mod search;

#[cfg(test)]
pub mod testing;

pub use bulk::BulkOperation;

use crate::config::Credentials;
use crate::error::{Error, Result};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

const USER_AGENT: &str = concat!("zendesk-cli/", env!("CARGO_PKG_VERSION"));

/// Sends one request and hands back the decoded JSON body.
pub trait Transport {
    async fn send(&self, method: Method, url: Url) -> Result<Value>;
}

/// Basic-auth HTTP session. Credentials are fixed for its lifetime.
pub struct HttpSession {
    client: Client,
    user: String,
    password: String,
}

impl HttpSession {
    pub fn new(user: String, password: String) -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            user,
            password,
        })
    }
}

impl Transport for HttpSession {
    async fn send(&self, method: Method, url: Url) -> Result<Value> {
        let resp = self
            .client
            .request(method, url.clone())
            .basic_auth(&self.user, Some(&self.password))
            .send()
            .await?;

        check_status(resp.status(), &url)?;

        let body: Value = resp.json().await?;
        Ok(body)
    }
}

/// Map a response status to the error the run should stop with.
pub fn check_status(status: StatusCode, url: &Url) -> Result<()> {
    match status.as_u16() {
        200..=299 => Ok(()),
        401 => Err(Error::Unauthorized(format!(
            "{} rejected the credentials",
            url.host_str().unwrap_or("server")
        ))),
        429 => Err(Error::RateLimited),
        500..=599 => Err(Error::Server(format!("{} returned {}", url, status))),
        _ => Err(Error::Status {
            status,
            url: url.to_string(),
        }),
    }
}

pub struct ZendeskClient<T = HttpSession> {
    api_url: Url,
    transport: T,
}

impl ZendeskClient<HttpSession> {
    pub fn new(credentials: Credentials) -> Result<Self> {
        let Credentials {
            user,
            password,
            api_url,
        } = credentials;
        let transport = HttpSession::new(user, password)?;
        Ok(Self::with_transport(api_url, transport))
    }
}

impl<T: Transport> ZendeskClient<T> {
    pub fn with_transport(api_url: Url, transport: T) -> Self {
        Self { api_url, transport }
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Resolve an endpoint path (or an absolute URL) against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.api_url
            .join(path)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", path, e)))
    }

    #[instrument(skip(self, url, params), fields(url = %url))]
    pub async fn request<R: DeserializeOwned>(
        &self,
        method: Method,
        mut url: Url,
        params: &[(&str, &str)],
    ) -> Result<R> {
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }

        debug!(%method, "Making Zendesk request");
        let body = self.transport.send(method, url).await?;
        Ok(serde_json::from_value(body)?)
    }
}
