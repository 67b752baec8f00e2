//! Authentication and authorization module

pub mod gate;
pub mod password;
pub mod token;

pub use gate::{authorize, extract_bearer, AuthContext, DenyReason};
pub use password::CredentialHasher;
pub use token::{Claims, TokenCodec, TokenError};
