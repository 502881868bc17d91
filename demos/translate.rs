//! Translate - submit one image and follow its progress.
//!
//! This example demonstrates:
//! - Building a client with the builder pattern
//! - Starting a session in the background
//! - Following state snapshots through the watch channel
//! - Writing the rendered result
//!
//! # Running
//!
//! ```text
//! IMGTRANS_URL=http://127.0.0.1:8000/ IMGTRANS_LANG=ENG \
//!     cargo run --example translate -- page.png out.png
//! ```
//!
//! Set `RUST_LOG=imgtrans_client=debug` to see frame-level logging.

use std::str::FromStr;

use imgtrans_client::request::Language;
use imgtrans_client::{Client, ImageUpload, SessionOutcome, TranslateOptions, DEFAULT_BASE_URL};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let Some(input) = args.next() else {
        eprintln!("usage: translate <image> [output.png]");
        std::process::exit(2);
    };
    let output = args.next().unwrap_or_else(|| "translated.png".to_string());

    let base_url = std::env::var("IMGTRANS_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    let mut options = TranslateOptions::default();
    if let Ok(lang) = std::env::var("IMGTRANS_LANG") {
        options.translator.target_lang = Language::from_str(&lang)?;
    }

    let client = Client::builder().base_url(base_url).build()?;
    let upload = ImageUpload::from_path(&input).await?;

    let mut handle = client.start(upload, options)?;

    // Print each distinct status line until the session drops its sender
    let mut updates = handle.updates().clone();
    let progress = tokio::spawn(async move {
        let mut last = String::new();
        while updates.changed().await.is_ok() {
            let text = updates.borrow_and_update().status_text();
            if !text.is_empty() && text != last {
                eprintln!("{}", text);
                last = text;
            }
        }
    });

    let outcome = handle.wait().await?;
    progress.await?;

    match outcome {
        SessionOutcome::Finished(png) => {
            tokio::fs::write(&output, &png).await?;
            eprintln!("Wrote {} ({} bytes)", output, png.len());
            Ok(())
        }
        SessionOutcome::Failed(failure) => {
            eprintln!("{}", failure);
            std::process::exit(1);
        }
    }
}
