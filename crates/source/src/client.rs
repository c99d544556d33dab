//! Odoo-style XML-RPC client.

use async_trait::async_trait;
use reqwest::header;
use thiserror::Error;

use stockbridge_core::ErpConfig;

use crate::xmlrpc::{self, Value, XmlRpcError};

#[derive(Debug, Error)]
pub enum SourceError {
    /// Credentials rejected; nothing can be read.
    #[error("ERP rejected the configured credentials")]
    Authentication,

    #[error("transport error: {0}")]
    Transport(String),

    #[error(transparent)]
    Rpc(#[from] XmlRpcError),

    /// Structurally unexpected RPC result.
    #[error("unexpected RPC payload: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Transport(err.to_string())
    }
}

/// The ERP remote-procedure interface the inventory source is written
/// against. Tests drive [`crate::InventorySource`] with an in-memory
/// implementation.
#[async_trait]
pub trait OdooRpc: Send + Sync {
    /// Log in; returns the numeric user id.
    async fn authenticate(&self) -> Result<i64, SourceError>;

    /// Generic `execute_kw` call against one model.
    ///
    /// `args` is the positional argument list (usually `[domain]`),
    /// `kwargs` the keyword struct (usually `{fields: [...]}`).
    async fn execute_kw(
        &self,
        uid: i64,
        model: &str,
        method: &str,
        args: Value,
        kwargs: Value,
    ) -> Result<Value, SourceError>;
}

/// XML-RPC client for the `/xmlrpc/2/{common,object}` endpoints.
pub struct OdooClient {
    http: reqwest::Client,
    config: ErpConfig,
}

impl OdooClient {
    pub fn new(config: ErpConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    async fn call(
        &self,
        endpoint: &str,
        method: &str,
        params: &[Value],
    ) -> Result<Value, SourceError> {
        let url = format!(
            "{}/xmlrpc/2/{endpoint}",
            self.config.url.trim_end_matches('/')
        );
        let body = xmlrpc::write_call(method, params);

        let response = self
            .http
            .post(&url)
            .header(header::CONTENT_TYPE, "text/xml")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Transport(format!("{url}: HTTP {status}")));
        }

        let text = response.text().await?;
        Ok(xmlrpc::parse_response(&text)?)
    }
}

#[async_trait]
impl OdooRpc for OdooClient {
    async fn authenticate(&self) -> Result<i64, SourceError> {
        let result = self
            .call(
                "common",
                "authenticate",
                &[
                    Value::from(self.config.database.as_str()),
                    Value::from(self.config.username.as_str()),
                    Value::from(self.config.password.as_str()),
                    Value::Struct(vec![]),
                ],
            )
            .await?;

        match result {
            Value::Int(uid) => Ok(uid),
            // The server answers `false` instead of a fault on bad
            // credentials.
            Value::Bool(false) => Err(SourceError::Authentication),
            other => Err(SourceError::Decode(format!(
                "authenticate returned {other:?}"
            ))),
        }
    }

    async fn execute_kw(
        &self,
        uid: i64,
        model: &str,
        method: &str,
        args: Value,
        kwargs: Value,
    ) -> Result<Value, SourceError> {
        self.call(
            "object",
            "execute_kw",
            &[
                Value::from(self.config.database.as_str()),
                Value::Int(uid),
                Value::from(self.config.password.as_str()),
                Value::from(model),
                Value::from(method),
                args,
                kwargs,
            ],
        )
        .await
    }
}
