//! Client builder and session launcher.
//!
//! The [`ClientBuilder`] provides a fluent API for configuring the HTTP
//! transport and per-session limits. The [`Client`] runs translations:
//! 1. Validate options
//! 2. Create a fresh session (never reused across submissions)
//! 3. Upload image + config
//! 4. Decode the streamed frames until a result or failure
//!
//! # Example
//!
//! ```ignore
//! use imgtrans_client::{Client, ImageUpload, SessionOutcome, TranslateOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::builder()
//!         .base_url("http://127.0.0.1:8000/")
//!         .max_stream_bytes(256 * 1024 * 1024)
//!         .build()?;
//!
//!     let upload = ImageUpload::from_path("page.png").await?;
//!     match client.translate(upload, &TranslateOptions::default()).await? {
//!         SessionOutcome::Finished(png) => std::fs::write("out.png", png)?,
//!         SessionOutcome::Failed(failure) => eprintln!("{}", failure.kind.description()),
//!     }
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use url::Url;

use crate::error::Result;
use crate::event::{Failure, FailureKind};
use crate::request::{ImageUpload, TranslateOptions};
use crate::session::{SessionConfig, SessionController, SessionOutcome, SessionState};
use crate::transport::HttpTransport;

/// Default service location.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/";

/// Default TCP connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builder for configuring and creating a [`Client`].
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    base_url: String,
    connect_timeout: Duration,
    session: SessionConfig,
}

impl ClientBuilder {
    /// Create a new client builder.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            session: SessionConfig::default(),
        }
    }

    /// Set the service base URL.
    ///
    /// Default: `http://127.0.0.1:8000/`
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the TCP connect timeout.
    ///
    /// There is no overall request timeout: translations can sit in the
    /// queue for a long time.
    /// Default: 10 seconds
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Cap the response body size of a single session.
    ///
    /// Default: unbounded
    pub fn max_stream_bytes(mut self, limit: u64) -> Self {
        self.session.max_stream_bytes = Some(limit);
        self
    }

    /// Set the initial frame decoder buffer capacity.
    ///
    /// Default: 64KB
    pub fn initial_buffer_capacity(mut self, capacity: usize) -> Self {
        self.session.initial_buffer_capacity = capacity;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<Client> {
        let base_url = Url::parse(&self.base_url)?;
        let http = reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .build()?;

        Ok(Client {
            transport: HttpTransport::new(http, &base_url)?,
            session: self.session,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Translation service client.
///
/// Cheap to clone. Every call creates its own [`SessionController`].
#[derive(Debug, Clone)]
pub struct Client {
    transport: HttpTransport,
    session: SessionConfig,
}

impl Client {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Transport used for requests.
    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    /// Session limits applied to each submission.
    pub fn session_config(&self) -> &SessionConfig {
        &self.session
    }

    /// Create an idle session bound to this client's limits.
    pub fn new_session(&self) -> SessionController {
        SessionController::new(self.session.clone())
    }

    /// Translate an image and wait for the outcome.
    pub async fn translate(
        &self,
        upload: ImageUpload,
        options: &TranslateOptions,
    ) -> Result<SessionOutcome> {
        let mut session = self.new_session();
        session.submit(&self.transport, upload, options).await
    }

    /// Start a translation in the background.
    ///
    /// Options are validated before anything is spawned. The returned
    /// handle exposes live state snapshots; aborting it drops the
    /// connection.
    pub fn start(&self, upload: ImageUpload, options: TranslateOptions) -> Result<SessionHandle> {
        options.validate()?;

        let mut session = self.new_session();
        let updates = session.subscribe();
        let transport = self.transport.clone();

        let task = tokio::spawn(async move {
            let outcome = session.submit(&transport, upload, &options).await;
            if let Err(e) = &outcome {
                tracing::error!("Translation session error: {}", e);
            }
            outcome
        });

        Ok(SessionHandle { updates, task })
    }
}

/// A translation running on the tokio runtime.
#[derive(Debug)]
pub struct SessionHandle {
    updates: watch::Receiver<SessionState>,
    task: JoinHandle<Result<SessionOutcome>>,
}

impl SessionHandle {
    /// Receiver of state snapshots; use `changed().await` to follow progress.
    pub fn updates(&mut self) -> &mut watch::Receiver<SessionState> {
        &mut self.updates
    }

    /// Latest state snapshot.
    pub fn state(&self) -> SessionState {
        self.updates.borrow().clone()
    }

    /// Cancel the session by dropping its connection.
    ///
    /// Once the task has been torn down, subscribers see a
    /// `Failed(Disconnected)` status and [`wait`](Self::wait) reports the
    /// same outcome. Has no effect on a session that already ended.
    pub fn abort(&self) {
        self.task.abort();
    }

    /// Wait for the outcome.
    pub async fn wait(self) -> Result<SessionOutcome> {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => Ok(SessionOutcome::Failed(Failure::with_detail(
                FailureKind::Disconnected,
                "aborted",
            ))),
            Err(e) => Err(e.into()),
        }
    }
}
