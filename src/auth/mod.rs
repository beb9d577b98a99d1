//! Credential, identity, and role types.
//!
//! DESIGN
//! ======
//! Split by concern so the guard can depend on roles and identities without
//! pulling in token decoding, and the gateway can validate tokens without
//! knowing about identities.

pub mod identity;
pub mod role;
pub mod token;

pub use identity::{Company, Identity};
pub use role::Role;
