//! Entity trait - common interface for persisted record types

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

use crate::core::identity::EntityId;

/// Common trait for all estrich-qc entities
pub trait Entity: Serialize + DeserializeOwned {
    /// The entity type prefix (e.g., "SMP", "CTRL")
    const PREFIX: &'static str;

    /// Get the entity's unique ID
    fn id(&self) -> &EntityId;

    /// Get the creation timestamp
    fn created(&self) -> DateTime<Utc>;

    /// Get the entity revision counter
    fn revision(&self) -> u32;
}
