//! Spendwise - personal expense tracking over a REST API
//!
//! This library provides the core functionality for Spendwise: users,
//! categories, expenses and monthly budgets in USD and NGN, with trend,
//! category and monthly reports and CSV export. The same services back the
//! HTTP API and the command-line interface.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (users, categories, expenses, budgets)
//! - `storage`: JSON document storage layer
//! - `audit`: Audit logging system
//! - `services`: Business logic layer
//! - `reports`: Trend, category and monthly aggregations
//! - `export`: CSV export
//! - `api`: axum HTTP API
//! - `cli` / `display`: command handlers and terminal formatting
//!
//! # Example
//!
//! ```rust,ignore
//! use spendwise::config::{paths::SpendwisePaths, settings::Settings};
//! use spendwise::storage::Storage;
//!
//! let paths = SpendwisePaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let storage = Storage::open(paths)?;
//! ```

pub mod api;
pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{SpendError, SpendResult};
