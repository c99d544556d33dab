//! REST client for the target inventory system.
//!
//! Thin typed wrapper over the DCIM endpoints this sync touches. Reads
//! accept only 200 and report absence as [`Lookup::NotFound`]; writes
//! accept only 201. Everything else is an [`ReconcileError::Api`] carrying
//! the status and body.

use reqwest::{header, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stockbridge_core::{Lookup, NetboxConfig};

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-success status from the target system.
    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("could not decode API response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ReconcileError {
    fn from(err: reqwest::Error) -> Self {
        ReconcileError::Transport(err.to_string())
    }
}

/// Paginated list envelope returned by every collection endpoint.
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default)]
    pub count: Option<i64>,
    pub results: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct IdRecord {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct DeviceTypeRecord {
    pub id: i64,
    pub model: String,
}

#[derive(Debug, Serialize)]
pub struct NewManufacturer<'a> {
    pub name: &'a str,
    pub slug: String,
}

#[derive(Debug, Serialize)]
pub struct NewDeviceType<'a> {
    pub manufacturer: i64,
    pub model: &'a str,
    pub slug: String,
    pub u_height: u32,
}

/// Creation payload for a device. `name` and `role` are nullable and sent
/// as explicit nulls.
#[derive(Debug, Serialize)]
pub struct NewDevice<'a> {
    pub name: Option<&'a str>,
    pub device_type: i64,
    pub manufacturer: i64,
    pub site: i64,
    pub status: &'a str,
    pub role: Option<i64>,
    pub serial: &'a str,
}

pub struct NetboxClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl NetboxClient {
    pub fn new(config: &NetboxConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/dcim/{path}", self.base_url)
    }

    fn auth_header(&self) -> String {
        format!("Token {}", self.token)
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<ListResponse<T>, ReconcileError> {
        let response = self
            .http
            .get(self.url(path))
            .header(header::AUTHORIZATION, self.auth_header())
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ReconcileError::Api {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        response
            .json()
            .await
            .map_err(|err| ReconcileError::Decode(err.to_string()))
    }

    async fn post_created<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<i64, ReconcileError> {
        let response = self
            .http
            .post(self.url(path))
            .header(header::AUTHORIZATION, self.auth_header())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::CREATED {
            return Err(ReconcileError::Api {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let created: IdRecord = response
            .json()
            .await
            .map_err(|err| ReconcileError::Decode(err.to_string()))?;
        Ok(created.id)
    }

    /// Device role by exact name.
    pub async fn find_role(&self, name: &str) -> Result<Lookup<i64>, ReconcileError> {
        let list: ListResponse<IdRecord> =
            self.get_list("device-roles/", &[("name", name)]).await?;
        Ok(list.results.into_iter().next().map(|role| role.id).into())
    }

    /// Manufacturer by exact name.
    pub async fn find_manufacturer(&self, name: &str) -> Result<Lookup<i64>, ReconcileError> {
        let list: ListResponse<IdRecord> =
            self.get_list("manufacturers/", &[("name", name)]).await?;
        Ok(list.results.into_iter().next().map(|m| m.id).into())
    }

    pub async fn create_manufacturer(
        &self,
        name: &str,
        slug: String,
    ) -> Result<i64, ReconcileError> {
        self.post_created("manufacturers/", &NewManufacturer { name, slug })
            .await
    }

    /// Device types matching the model filter. The remote match may be
    /// loose; callers do their own exact comparison.
    pub async fn list_device_types(
        &self,
        model: &str,
    ) -> Result<Vec<DeviceTypeRecord>, ReconcileError> {
        let list: ListResponse<DeviceTypeRecord> =
            self.get_list("device-types/", &[("model", model)]).await?;
        Ok(list.results)
    }

    pub async fn create_device_type(
        &self,
        device_type: &NewDeviceType<'_>,
    ) -> Result<i64, ReconcileError> {
        self.post_created("device-types/", device_type).await
    }

    /// Device existence via the serial filter.
    pub async fn find_device_by_serial(
        &self,
        serial: &str,
    ) -> Result<Lookup<i64>, ReconcileError> {
        let list: ListResponse<IdRecord> =
            self.get_list("devices/", &[("serial", serial)]).await?;
        if list.count.unwrap_or(list.results.len() as i64) == 0 {
            return Ok(Lookup::NotFound);
        }
        Ok(list.results.into_iter().next().map(|d| d.id).into())
    }

    pub async fn create_device(&self, device: &NewDevice<'_>) -> Result<i64, ReconcileError> {
        self.post_created("devices/", device).await
    }
}
