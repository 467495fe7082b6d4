//! ventas-server: HTTP backend for the WhatsApp sales assistant
//!
//! Exposes user lookup/registration plus the conversation, lead, product,
//! and order surfaces over a pooled relational store. Works against the
//! managed Postgres deployment or the zero-config SQLite fallback.

pub mod db;
pub mod http;
pub mod models;

pub use http::{run_server, AppState, ServerConfig};
