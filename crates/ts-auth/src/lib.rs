//! # ts-auth
//!
//! Authentication primitives for Timesheet RS:
//! - HS256 JWT issuing and validation (`jwt`)
//! - Argon2 password hashing and temp-password generation (`password`)

pub mod jwt;
pub mod password;

pub use jwt::{extract_bearer_token, Claims, JwtError, JwtService};
pub use password::{generate_temp_password, hash_password, verify_password, PasswordError};
