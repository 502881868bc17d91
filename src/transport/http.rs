//! HTTP transport for the translation service.
//!
//! Sends the image and its JSON config as a multipart form and hands the
//! streaming response back to the caller.
//!
//! # Example
//!
//! ```ignore
//! use imgtrans_client::transport::HttpTransport;
//!
//! let transport = HttpTransport::new(reqwest::Client::new(), &"http://127.0.0.1:8000/".parse()?)?;
//! let response = transport.open(&upload, config_json).await?;
//! let body = response.bytes_stream();
//! ```

use reqwest::multipart::{Form, Part};
use url::Url;

use crate::error::Result;
use crate::request::ImageUpload;

/// Path of the streaming endpoint, relative to the base URL.
pub const TRANSLATE_STREAM_PATH: &str = "translate/with-form/image/stream";

/// Opens streaming translation requests.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpTransport {
    /// Create a transport posting to `{base_url}translate/with-form/image/stream`.
    ///
    /// A missing trailing slash on `base_url` is added, so
    /// `http://host/api` and `http://host/api/` resolve the same way.
    pub fn new(client: reqwest::Client, base_url: &Url) -> Result<Self> {
        let mut base = base_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base.join(TRANSLATE_STREAM_PATH)?;
        Ok(Self { client, endpoint })
    }

    /// Full URL requests are sent to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Send the upload and return the response once its headers arrive.
    ///
    /// The body has not been read yet. Non-success statuses are returned as
    /// a normal response; only connection-level failures are errors.
    pub async fn open(
        &self,
        upload: &ImageUpload,
        config_json: String,
    ) -> reqwest::Result<reqwest::Response> {
        let image = Part::stream_with_length(upload.bytes().clone(), upload.len() as u64)
            .file_name(upload.file_name().to_string())
            .mime_str(upload.mime())?;

        let form = Form::new().part("image", image).text("config", config_json);

        tracing::debug!(
            endpoint = %self.endpoint,
            image_bytes = upload.len(),
            "Submitting translation request"
        );

        self.client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
    }
}
