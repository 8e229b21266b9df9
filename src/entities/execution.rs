//! FPC execution entity - one performed control check

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};

/// Review state of an execution record.
///
/// A state machine, not derived data: the executor completes the check,
/// a separate reviewer moves it onwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    #[default]
    Completed,
    PendingReview,
    Approved,
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionStatus::Completed => write!(f, "completed"),
            ExecutionStatus::PendingReview => write!(f, "pending_review"),
            ExecutionStatus::Approved => write!(f, "approved"),
        }
    }
}

/// One performed factory-production-control check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FpcExecution {
    /// Unique identifier (EXEC-...)
    pub id: EntityId,

    /// Control point this execution fulfils
    pub control_point_id: EntityId,

    /// Batch the check was performed on, if batch-bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<EntityId>,

    /// When the check was performed
    pub execution_date: DateTime<Utc>,

    /// Person who performed the check
    pub executed_by: String,

    /// Measured results by parameter name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub results: BTreeMap<String, f64>,

    /// Did the check pass its acceptance criteria?
    pub passed: bool,

    /// Deviations observed during the check
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deviations: Vec<String>,

    /// Review state
    #[serde(default)]
    pub status: ExecutionStatus,

    /// Person who approved the record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,

    /// When the record was approved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_date: Option<DateTime<Utc>>,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Revision counter
    #[serde(default = "default_revision")]
    pub revision: u32,
}

fn default_revision() -> u32 {
    1
}

impl Entity for FpcExecution {
    const PREFIX: &'static str = "EXEC";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn revision(&self) -> u32 {
        self.revision
    }
}

impl FpcExecution {
    /// Record a performed check
    pub fn new(control_point_id: EntityId, executed_by: impl Into<String>, passed: bool) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(EntityPrefix::Exec),
            control_point_id,
            batch_id: None,
            execution_date: now,
            executed_by: executed_by.into(),
            results: BTreeMap::new(),
            passed,
            deviations: Vec::new(),
            status: ExecutionStatus::default(),
            reviewed_by: None,
            reviewed_date: None,
            created: now,
            revision: 1,
        }
    }

    /// Hand the record to review
    pub fn submit_for_review(&mut self) -> Result<(), TransitionError> {
        match self.status {
            ExecutionStatus::Completed => {
                self.status = ExecutionStatus::PendingReview;
                Ok(())
            }
            from => Err(TransitionError::InvalidTransition {
                from,
                to: ExecutionStatus::PendingReview,
            }),
        }
    }

    /// Approve the record. The reviewer must differ from the executor;
    /// FPC review is a four-eyes check.
    pub fn approve(&mut self, reviewer: impl Into<String>) -> Result<(), TransitionError> {
        let reviewer = reviewer.into();
        if reviewer == self.executed_by {
            return Err(TransitionError::SelfApproval { reviewer });
        }
        match self.status {
            ExecutionStatus::PendingReview => {
                self.status = ExecutionStatus::Approved;
                self.reviewed_by = Some(reviewer);
                self.reviewed_date = Some(Utc::now());
                Ok(())
            }
            from => Err(TransitionError::InvalidTransition {
                from,
                to: ExecutionStatus::Approved,
            }),
        }
    }
}

/// Invalid execution review operation
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("invalid execution transition: {from} -> {to}")]
    InvalidTransition {
        from: ExecutionStatus,
        to: ExecutionStatus,
    },

    #[error("reviewer '{reviewer}' may not approve their own execution")]
    SelfApproval { reviewer: String },
}
