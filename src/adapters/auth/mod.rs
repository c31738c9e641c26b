//! Authentication adapters implementing `SessionValidator`.
//!
//! - `jwt` - HS256 tokens signed with a shared secret
//! - `mock` - fixed token table for tests

mod jwt;
mod mock;

pub use jwt::{AccessClaims, JwtConfig, JwtSessionValidator};
pub use mock::MockSessionValidator;
