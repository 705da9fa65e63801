//! Algorithmia-Client: v1 API bindings for the algo-deploy pipeline
//!
//! This crate is the platform layer. It talks to the hosting platform's
//! data API (collections and files) and algorithm API (create, inspect,
//! publish, invoke).
//!
//! ## Layer 0 - Platform
//!
//! Capabilities are exposed as the [`DataStore`] and [`AlgorithmRegistry`]
//! traits so callers can swap in [`fakes::MemoryPlatform`] under test.

pub mod config;
pub mod error;
pub mod fakes;
pub mod http;
pub mod traits;
pub mod types;

pub use config::ClientConfig;
pub use error::{ApiError, ApiResult};
pub use http::AlgorithmiaClient;
pub use traits::{AlgorithmRegistry, DataStore};
pub use types::{
    parse_invocation, AlgoNamespace, AlgorithmDetails, AlgorithmInfo, AlgorithmSettings,
    AlgorithmVersionInfo, CreateVersionInfo, DataUri, Invocation, NewAlgorithm, VersionType,
    DATA_SCHEME,
};
