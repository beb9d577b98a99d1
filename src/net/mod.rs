//! HTTP access to the logistics backend.
//!
//! DESIGN
//! ======
//! `gateway` owns the `reqwest` client and credential injection; `auth_api`
//! and `api` are thin endpoint wrappers over it; `types` holds wire shapes.

pub mod api;
pub mod auth_api;
pub mod error;
pub mod gateway;
pub mod types;

pub use error::ApiError;
pub use gateway::Gateway;
