//! Core types for Qaima.

pub mod email;
pub mod error_code;
pub mod id;

pub use email::{Email, EmailError};
pub use error_code::ErrorCode;
pub use id::*;
