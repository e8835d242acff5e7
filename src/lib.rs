//! Filelinker - short links for files and folders on remote sources
//!
//! A short code maps to a file or folder that lives on an AList server,
//! in a repository tree or among release assets. Visitors browse folder
//! links and download through a streaming proxy; administrators manage
//! links from the command line.
//!
//! # Features
//! - **server**: HTTP access entry point (default)
//! - **cli**: Command-line administration
//!
//! # Architecture
//! - `sources`: Source adapters and the backend registry
//! - `storage`: Key-value backends and the link record store
//! - `services`: Code generation, resolution and link administration
//! - `api`: HTTP access handlers
//! - `interfaces`: Command-line interface
//! - `config`: Configuration management
//! - `runtime`: Application lifecycle and execution modes
//! - `system`: Logging setup

#[cfg(feature = "server")]
pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod runtime;
pub mod services;
pub mod sources;
pub mod storage;
pub mod system;
pub mod utils;
