//! # imgtrans-client
//!
//! Rust client for the streaming image translation endpoint.
//!
//! A translation request answers with one long-lived response body carrying
//! progress updates and, finally, the translated image. This crate decodes
//! that body incrementally, before the response completes.
//!
//! ## Architecture
//!
//! - **Transport** (`transport`): multipart upload, raw body chunks
//! - **Protocol** (`protocol`): 5-byte framed stream, incremental decoder
//! - **Events** (`event`): typed frame interpretation, terminal latch
//! - **Session** (`session`): lifecycle of one submission, observable state
//!
//! ## Example
//!
//! ```ignore
//! use imgtrans_client::{Client, ImageUpload, TranslateOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::builder().base_url("http://127.0.0.1:8000/").build()?;
//!     let upload = ImageUpload::from_path("page.png").await?;
//!
//!     let mut handle = client.start(upload, TranslateOptions::default())?;
//!     while handle.updates().changed().await.is_ok() {
//!         eprintln!("{}", handle.updates().borrow().status_text());
//!     }
//!     let outcome = handle.wait().await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod event;
pub mod protocol;
pub mod request;
pub mod session;
pub mod transport;

mod client;

pub use client::{Client, ClientBuilder, SessionHandle, DEFAULT_BASE_URL, DEFAULT_CONNECT_TIMEOUT};
pub use error::TranslateError;
pub use request::{ImageUpload, TranslateOptions};
pub use session::{SessionOutcome, SessionState};
