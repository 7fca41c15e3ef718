//! Secretlinks - self-destructing secret links
//!
//! A caller submits a secret and receives a URL. The secret can be read
//! through that URL a bounded number of times within a bounded window; after
//! either limit is reached the link is gone for good. Usage (creations and
//! views) is published on a message bus and folded into a usage ledger by an
//! independent aggregation pipeline.
//!
//! # Architecture
//! - `storage`: Link model and the [`LinkStore`](storage::LinkStore) seam
//! - `services`: Link lifecycle, creation and retrieval
//! - `crypto`: Symmetric encryption of stored secrets
//! - `analytics`: Usage events, message bus and the usage ledger
//! - `api`: HTTP services and middleware
//! - `config`: Configuration management
//! - `runtime`: Application lifecycle and execution modes
//! - `system`: Logging setup

pub mod analytics;
pub mod api;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
