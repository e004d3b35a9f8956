//! Session credentials, token secrets, and the wire payloads of the token endpoints.

pub mod secret;
pub mod session;

pub use secret::*;
pub use session::*;
