// fmc-api: Async Rust client for the firewall management center REST API

pub mod auth;
pub mod client;
pub mod deployment;
pub mod devices;
pub mod error;
pub mod interfaces;
pub mod login;
pub mod models;
pub mod objects;
pub mod policies;
pub mod routes;
pub mod transport;

pub use auth::{
    AuthToken, Credentials, DEFAULT_TOKEN_MAX_AGE, HttpTokenManager, Session, TokenGrant,
    TokenGuard, TokenSource,
};
pub use client::{FmcClient, GLOBAL_DOMAIN, ProbePolicy, Verb};
pub use error::Error;
pub use objects::ObjectKind;
pub use transport::{TlsMode, TransportConfig};
