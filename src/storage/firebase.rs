//! Firebase Storage over its REST API.

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::{ObjectStore, StorageError, UploadObject};
use crate::config::AppConfig;

#[derive(Debug, Clone)]
pub struct FirebaseStorage {
    client: reqwest::Client,
    api_base: Url,
    bucket: String,
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    name: String,
    /// Comma-separated list; the first token is used for the public URL.
    download_tokens: Option<String>,
}

impl FirebaseStorage {
    pub fn new(
        api_base: &str,
        bucket: impl Into<String>,
        access_token: Option<String>,
    ) -> Result<Self, StorageError> {
        Ok(Self {
            client: reqwest::Client::new(),
            api_base: Url::parse(api_base.trim_end_matches('/'))?,
            bucket: bucket.into(),
            access_token,
        })
    }

    /// `None` when no bucket is configured.
    pub fn from_config(config: &AppConfig) -> Result<Option<Self>, StorageError> {
        config
            .storage_bucket
            .as_deref()
            .map(|bucket| {
                Self::new(
                    &config.storage_api_base,
                    bucket,
                    config.storage_access_token.clone(),
                )
            })
            .transpose()
    }

    /// `{base}/v0/b/{bucket}/o` with an optional encoded object segment.
    fn objects_url(&self, object: Option<&str>) -> Result<Url, StorageError> {
        let mut url = self.api_base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?;
            segments.pop_if_empty().extend(["v0", "b", self.bucket.as_str(), "o"]);
            if let Some(object) = object {
                // push() percent-encodes '/', as the download URL requires
                segments.push(object);
            }
        }
        Ok(url)
    }

    pub fn download_url(&self, object: &str, token: &str) -> Result<String, StorageError> {
        let mut url = self.objects_url(Some(object))?;
        url.query_pairs_mut()
            .append_pair("alt", "media")
            .append_pair("token", token);
        Ok(url.into())
    }
}

#[async_trait]
impl ObjectStore for FirebaseStorage {
    async fn upload(&self, object: UploadObject) -> Result<String, StorageError> {
        let mut url = self.objects_url(None)?;
        url.query_pairs_mut().append_pair("name", &object.name);

        let mut request = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, &object.content_type)
            .body(object.bytes);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Upstream {
                status,
                body: body.chars().take(200).collect(),
            });
        }

        let uploaded: UploadResponse = response.json().await?;
        let token = uploaded
            .download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').map(str::trim).find(|t| !t.is_empty()))
            .ok_or(StorageError::MissingDownloadToken)?;

        tracing::debug!(object = %uploaded.name, bucket = %self.bucket, "Stored object");
        self.download_url(&uploaded.name, token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_url_encodes_the_object_path() {
        let storage =
            FirebaseStorage::new("https://firebasestorage.googleapis.com/", "demo.appspot.com", None)
                .unwrap();

        let url = storage
            .download_url("brands/1f0e.png", "tok-123")
            .unwrap();
        assert_eq!(
            url,
            "https://firebasestorage.googleapis.com/v0/b/demo.appspot.com/o/brands%2F1f0e.png?alt=media&token=tok-123"
        );
    }

    #[test]
    fn from_config_requires_a_bucket() {
        let config = AppConfig::default();
        assert!(FirebaseStorage::from_config(&config).unwrap().is_none());

        let config = AppConfig {
            storage_bucket: Some("demo.appspot.com".into()),
            ..Default::default()
        };
        assert!(FirebaseStorage::from_config(&config).unwrap().is_some());
    }
}
