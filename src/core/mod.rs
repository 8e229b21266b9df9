//! Core module - fundamental types and utilities

pub mod entity;
pub mod identity;

pub use entity::Entity;
pub use identity::{EntityId, EntityPrefix, IdParseError};
