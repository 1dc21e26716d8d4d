//! # social-auth
//!
//! Access-token handling for the social platform. Sign-up and login live in
//! the web front end; this crate only verifies the HS256 tokens it issues
//! and turns them into a [`Principal`](social_core::types::Principal).

pub mod jwt;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
