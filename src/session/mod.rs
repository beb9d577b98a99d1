//! Client session state.

pub mod store;

pub use store::{Session, SessionError, SessionPhase, SessionStore};
