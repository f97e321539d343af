//! Session credentials: bearer secrets, opaque identities, and the validated credential payload.

pub mod credential;
pub mod secret;

pub use credential::*;
pub use secret::*;
