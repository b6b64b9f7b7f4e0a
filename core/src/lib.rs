//! Threatlens Core Library
//!
//! Records, normalizers and clients shared by the Threatlens CLI and
//! backend server.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod normalize;
pub mod session;
pub mod types;
pub mod upstream;

pub use config::{Config, OsvMode};
pub use dispatch::{OsvEndpoint, OsvQuery, Query, QueryDispatcher, QueryOutcome};
pub use error::{Result, ThreatlensError};
pub use http::{HttpClient, HttpResponse, Transport};
pub use session::{QuerySession, QueryState, Sequencing};
pub use types::*;
pub use upstream::Upstreams;
