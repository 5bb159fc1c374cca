//! Bank Term Deposit Predictor Library
//!
//! This library provides the core functionality for the term deposit
//! prediction service: the frozen training-time schema, the feature
//! encoder, the classifier loaded from its serialized artifact, the data
//! models, and the HTTP handlers.
//!
//! # Modules
//!
//! - `config`: Configuration management.
//! - `encoder`: The feature-encoding pipeline (the core of the service).
//! - `errors`: Error handling types.
//! - `forest`: Random-forest classifier and artifact loading.
//! - `handlers`: HTTP request handlers.
//! - `models`: Request/response data models.
//! - `schema`: Frozen training-time schema and lookup tables.

// Re-export primary modules for shared use in tests and other binaries
pub mod config;
pub mod encoder;
pub mod errors;
pub mod forest;
pub mod handlers;
pub mod models;
pub mod schema;
