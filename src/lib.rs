//! Core of the mockdeck HTTP client / mock-server authoring tool.
//!
//! Query parameters, headers, cookies, auth fields and context variables are
//! all edited as ordered rows with stable identities ([`rows`]). Any ordered
//! list can be reordered by dragging ([`reorder`]), and context variables move
//! between their grouped storage shape and the flat editing shape through
//! [`dictionary`].

pub mod config;
pub mod dictionary;
pub mod domain;
pub mod error;
pub mod filter;
pub mod flags;
pub mod persist;
pub mod reorder;
pub mod rows;
pub mod storage;

pub use error::{CoreError, Result};
