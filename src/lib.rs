//! Verdant Core Library
//!
//! Profile visibility and friend relationship engine for Verdant.
//! Decides whether a viewer may see a subject's profile data and drives
//! the friend request lifecycle over a durable relationship store.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![deny(unsafe_code)]

pub mod audit;
pub mod config;
pub mod directory;
pub mod engine;
mod error;
pub mod friendship;
pub mod relationship;
pub mod visibility;

pub use crate::config::EngineConfig;
pub use engine::{ProfileEngine, ProfileView};
pub use error::{EngineError, Result};
