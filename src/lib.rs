//! # shiptornado
//!
//! Native client for the Ship Tornado logistics backend.
//!
//! This crate owns the client-side session: credential validation, the
//! persisted bearer token, the authenticated HTTP gateway, the session store
//! state machine, and role-gated route authorization. The `shiptornado`
//! binary is a thin command-line view layer on top of it.
//!
//! ARCHITECTURE
//! ============
//! `router` consults a `session::Session` snapshot, the session store's
//! validity depends on `auth::token`, and `net::Gateway` consults the same
//! validator before each call. On invalidity the store clears and the guard
//! redirects to login.

pub mod auth;
pub mod config;
pub mod net;
pub mod router;
pub mod session;
pub mod shipping;
pub mod storage;
pub mod views;

#[cfg(test)]
pub(crate) mod test_helpers;
