//! Entity type definitions
//!
//! - [`LabValueRecord`] - one sampling event with fresh/hardened measurements
//! - [`Evaluation`] - conformity verdict derived from a record
//! - [`SpcData`] - statistical snapshot for one (recipe, parameter, period)
//! - [`FpcControlPoint`] - a scheduled factory-production-control requirement
//! - [`FpcExecution`] - one performed control check

pub mod control_point;
pub mod evaluation;
pub mod execution;
pub mod lab_value;
pub mod spc_data;

pub use control_point::{ControlCategory, FpcControlPoint, Frequency, VolumeTier};
pub use evaluation::{Evaluation, Severity};
pub use execution::{ExecutionStatus, FpcExecution};
pub use lab_value::{BinderType, LabValueRecord, PropertyMeasurement, TestType};
pub use spc_data::{SpcData, Trend};
