//! Luxe HTTP client
//!
//! Typed bindings for the salon backend API with bearer-token authentication
//! and transparent, single-flight session refresh.

pub mod client;
pub mod config;
pub mod types;

pub use client::credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use client::error::{ClientError, RefreshError};
pub use client::{ApiCall, LuxeClient, LuxeClientBuilder};
pub use config::{ApiTarget, PaymentConfig};
pub use types::PaymentIntent;
