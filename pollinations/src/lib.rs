//! Pollinations API SDK for Rust.
//!
//! This crate provides a client for the Pollinations text-to-image and
//! text generation hosts.
//!
//! # Example
//!
//! ```rust,no_run
//! use mimesis_pollinations::{Client, ImageRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new()?;
//!
//!     let image = client
//!         .image()
//!         .generate(&ImageRequest::new("a red fox in snow").with_size(1280, 720))
//!         .await;
//!     println!("{} (validated: {})", image.url, image.validated);
//!     Ok(())
//! }
//! ```

mod client;
mod error;
pub mod http;
mod image;
mod retry;
mod text;

pub use client::{
    Client, ClientBuilder, DEFAULT_IMAGE_HOST, DEFAULT_TEXT_HOST, DEFAULT_TIMEOUT, MAX_TIMEOUT,
};
pub use error::{Error, Result};
pub use image::{ImageRequest, ImageService, ImageUrl, DEFAULT_IMAGE_SIZE};
pub use retry::RetryPolicy;
pub use text::TextService;
