//! J-Quants financial statements provider.
//!
//! - [`model`]: the `fins/statements` and `listed/info` payloads
//! - [`client`]: token authentication and paginated fetching

pub mod client;
pub mod model;

pub use client::{JQuantsClient, StatementsQuery};
pub use model::{ListedInfo, ListedInfoResponse, RawStatement, StatementsPage};
