//! # Folio Shared
//!
//! Request and response types for the HTTP API, free of server dependencies so
//! a client can compile against them.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
