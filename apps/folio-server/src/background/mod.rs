//! Background tasks spawned next to the HTTP server.

mod audit;

pub use audit::spawn_session_audit;
