//! Shared types for feature modules
//!
//! - **user_id**: the caller identity taken from the `User-ID` header

pub mod user_id;

pub use user_id::{UserId, USER_ID_HEADER};
