//! Resource fetching for workcrawl.
//!
//! Secondary resources (novel covers, per-work auxiliary metadata, image
//! assets) are pulled through [`RetryingFetcher`]. A fetch either returns the
//! decoded payload or resolves to [`FetchOutcome::Unavailable`] once the retry
//! budget is spent. It never returns an error: callers skip the resource and
//! keep the batch going.
//!
//! ## Pieces
//!
//! - [`ResourceTransport`]: one request, one response. [`HttpTransport`] is the
//!   reqwest-backed implementation; tests script their own.
//! - [`RetryPolicy`]: how many times a failed request is re-issued.
//! - [`RetryingFetcher`]: the bounded retry loop.
//! - [`OutputHandoff`] + [`CoverDownloader`]: hand a fetched blob to whatever
//!   saves files on the host side.
//!
//! ## Example
//!
//! ```no_run
//! use fetch::{DecodeMode, FetchOutcome, HttpTransport, RetryPolicy, RetryingFetcher};
//!
//! # async fn run() -> Result<(), fetch::TransportError> {
//! let transport = HttpTransport::builder()
//!     .origin("https://www.example.net")
//!     .build()?;
//! let fetcher = RetryingFetcher::new(transport, RetryPolicy::default());
//!
//! match fetcher.fetch("https://www.example.net/cover.jpg", DecodeMode::Blob).await {
//!     FetchOutcome::Fetched(payload) => println!("{} bytes", payload.len()),
//!     FetchOutcome::Unavailable => println!("skipped"),
//! }
//! # Ok(())
//! # }
//! ```

mod cover;
mod error;
mod fetcher;
mod handoff;
mod retry;
mod transport;

pub use crate::cover::{replace_suffix, CoverDownloader, CoverOutcome};
pub use crate::error::{FetchError, TransportError};
pub use crate::fetcher::{BlobHandle, DecodeMode, FetchOutcome, Fetched, RetryingFetcher};
pub use crate::handoff::{ConflictAction, OutputHandoff};
pub use crate::retry::{FetchAttempt, RetryPolicy, DEFAULT_MAX_RETRIES};
pub use crate::transport::{
    HttpTransport, HttpTransportBuilder, ResourceTransport, TransportResponse,
};
