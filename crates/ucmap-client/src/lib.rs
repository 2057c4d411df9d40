//! Backend client for the unit map: network list, unit list and the boundary
//! overlay.

pub mod client;
pub mod error;
pub(crate) mod retry;

pub use client::{BackendClient, ClientOptions};
pub use error::ClientError;
