//! Core domain entities.
//!
//! # Entity Types
//!
//! - [`Account`] - A stored user account (carries the password hash)
//! - [`AccountView`] - The public projection of an account
//! - [`TokenClaims`] - Claims carried by a bearer token
//!
//! Creation and partial updates use dedicated input types:
//! [`NewAccount`] and [`AccountPatch`].

pub mod account;
pub mod claims;

pub use account::{Account, AccountPatch, AccountView, NewAccount, Role, normalize_email};
pub use claims::TokenClaims;
