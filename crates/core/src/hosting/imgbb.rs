//! imgbb.com image host.

use crate::hosting::{HostingError, ImageHost, ScreenshotUpload};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

pub struct ImgbbHost {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    success: bool,
    data: Option<UploadData>,
    error: Option<UploadError>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    url: String,
}

#[derive(Debug, Deserialize)]
struct UploadError {
    message: String,
}

impl ImgbbHost {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, HostingError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| HostingError::Request(e.to_string()))?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
        })
    }
}

fn parse_upload(response: UploadResponse) -> Result<String, HostingError> {
    match response {
        UploadResponse {
            success: true,
            data: Some(data),
            ..
        } => Ok(data.url),
        UploadResponse {
            error: Some(error), ..
        } => Err(HostingError::Rejected(error.message)),
        _ => Err(HostingError::Rejected("imgbb upload failed".to_string())),
    }
}

#[async_trait]
impl ImageHost for ImgbbHost {
    async fn upload(&self, image: &ScreenshotUpload) -> Result<String, HostingError> {
        let mut form = vec![("image", image.base64())];
        if let Some(name) = &image.file_name {
            form.push(("name", name.clone()));
        }

        let response = self
            .client
            .post(&self.api_url)
            .query(&[("key", self.api_key.as_str())])
            .form(&form)
            .send()
            .await
            .map_err(|e| HostingError::Request(e.to_string()))?;

        let parsed: UploadResponse = response
            .json()
            .await
            .map_err(|e| HostingError::Request(e.to_string()))?;

        let url = parse_upload(parsed)?;
        tracing::info!(url = %url, "Screenshot uploaded");
        Ok(url)
    }
}
