//! Fomio data layer.
//!
//! The dual-backend data access layer for the Fomio forum client: a uniform
//! [`client::DataClient`] contract with REST and GraphQL adapters, runtime
//! backend selection via a health probe, and a token-based session manager
//! that refreshes expired credentials transparently mid-request.

pub mod auth;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod model;

pub use auth::{SessionManager, TokenPair, TokenStore};
pub use client::{Backend, ClientProvider, DataClient, FetchPolicy, GraphQlClient, RestClient};
pub use config::Config;
pub use error::DataError;
