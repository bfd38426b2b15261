//! Core types and trait definitions for the subtrack subscription tracker.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::SubscriptionStore`]; transport code
//! talks to [`service::SubscriptionService`].

pub mod error;
pub mod period;
pub mod service;
pub mod store;
pub mod subscription;

pub use error::{Classify, Error, ErrorKind, Result};
