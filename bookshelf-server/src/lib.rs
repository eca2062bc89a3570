//! Bookshelf Server Library
//!
//! This module exports the server components for testing and reuse.

pub mod config;
pub mod handlers;
pub mod payload;
pub mod response;
pub mod routes;
pub mod state;
pub mod upload;
