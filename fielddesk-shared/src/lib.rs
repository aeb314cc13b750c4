//! # FieldDesk Shared Library
//!
//! This crate contains the data layer and business logic shared by the
//! FieldDesk API server and its tooling.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: Authentication, sessions, and the authorization gate
//! - `db`: Connection pool and migrations
//! - `notify`: Outbound notification trait and implementations
//! - `pagination`: Shared page-window arithmetic

pub mod auth;
pub mod db;
pub mod models;
pub mod notify;
pub mod pagination;

/// Current version of the FieldDesk shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
