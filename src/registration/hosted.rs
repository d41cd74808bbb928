//! Hosted backend: REST database for rows, object storage for photos
//! Rows:   {base}/rest/v1/{table}
//! Photos: {base}/storage/v1/object/{bucket}/{timestamp}-{uuid}.{ext}

use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Method, Request};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tracing::{debug, info};

use crate::registration::backend::{photo_object_name, RegistrationBackend};
use crate::registration::config::HostedConfig;
use crate::registration::error::{BackendError, RegistrationError};
use crate::registration::photo::PhotoUpload;
use crate::registration::submission::{NewRegistration, RegistrationRecord};

pub type HttpsClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

pub struct HostedBackend {
    client: HttpsClient,
    config: HostedConfig,
}

impl HostedBackend {
    pub fn new(config: HostedConfig) -> Result<Self, RegistrationError> {
        if config.base_url.is_empty() {
            return Err(RegistrationError::ConfigError(
                "hosted backend requires a base_url".to_string(),
            ));
        }

        let _ = rustls::crypto::ring::default_provider().install_default();

        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()
            .map_err(|e| {
                RegistrationError::ConfigError(format!("Failed to load native TLS roots: {}", e))
            })?
            .https_or_http()
            .enable_http1()
            .enable_http2()
            .build();

        let client = Client::builder(TokioExecutor::new()).build(connector);

        info!(
            "HostedBackend initialized: {} (table '{}', bucket '{}')",
            config.base_url, config.table, config.photo_bucket
        );

        Ok(Self { client, config })
    }

    fn request(&self, method: Method, url: &str) -> hyper::http::request::Builder {
        let key = self.config.api_key.as_str();
        Request::builder()
            .method(method)
            .uri(url)
            .header("apikey", key)
            .header("authorization", format!("Bearer {}", key))
    }

    /// Sends the request and returns the body of a 2xx response.
    async fn send(&self, request: Request<Full<Bytes>>) -> Result<Bytes, BackendError> {
        let uri = request.uri().clone();
        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| BackendError::Transport(format!("{} {}", uri, e)))?;

        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| BackendError::Transport(format!("reading body from {}: {}", uri, e)))?
            .to_bytes();

        debug!("{} -> {}", uri, status);

        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        Ok(body)
    }
}

fn build_error(e: hyper::http::Error) -> BackendError {
    BackendError::Transport(format!("invalid request: {}", e))
}

#[async_trait]
impl RegistrationBackend for HostedBackend {
    async fn upload_photo(&self, photo: &PhotoUpload) -> Result<String, BackendError> {
        let name = photo_object_name(photo);

        let request = self
            .request(Method::POST, &self.config.object_url(&name))
            .header("content-type", photo.content_type.as_str())
            .header("x-upsert", "false")
            .body(Full::new(Bytes::from(photo.data.clone())))
            .map_err(build_error)?;

        self.send(request).await?;

        info!("Uploaded photo '{}' as {}", photo.file_name, name);
        Ok(self.config.public_photo_url(&name))
    }

    async fn create_registration(
        &self,
        registration: NewRegistration,
    ) -> Result<RegistrationRecord, BackendError> {
        let payload = serde_json::to_vec(&registration)?;

        let request = self
            .request(Method::POST, &self.config.table_url())
            .header("content-type", "application/json")
            .header("prefer", "return=representation")
            .body(Full::new(Bytes::from(payload)))
            .map_err(build_error)?;

        let body = self.send(request).await?;
        let mut rows: Vec<RegistrationRecord> = serde_json::from_slice(&body)?;
        let record = rows.pop().ok_or_else(|| BackendError::Status {
            status: 200,
            body: "insert returned no rows".to_string(),
        })?;

        info!("Registered '{}' ({})", record.full_name, record.id);
        Ok(record)
    }

    async fn list_registrations(&self) -> Result<Vec<RegistrationRecord>, BackendError> {
        let url = format!("{}?select=*&order=full_name.asc", self.config.table_url());
        let request = self
            .request(Method::GET, &url)
            .header("accept", "application/json")
            .body(Full::new(Bytes::new()))
            .map_err(build_error)?;

        let body = self.send(request).await?;
        let records: Vec<RegistrationRecord> = serde_json::from_slice(&body)?;
        Ok(records)
    }
}
