//! # tracklink-api
//!
//! HTTP layer for TrackLink built on Axum.
//!
//! Serves the public `/download/{id}` endpoint and the authenticated
//! management API under `/api`, with CORS, request logging, cookie or
//! bearer session auth, admin guards, DTOs and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, build_state, run_server};
pub use error::ApiError;
pub use state::AppState;
