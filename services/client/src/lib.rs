//! services/client/src/lib.rs
//!
//! Client library for the language-learning backend: the HTTP gateway, the
//! credential store, the session state store, and the terminal front end
//! built on top of them.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod error;
pub mod store;
