//! Column operations and the engine that applies them.

mod engine;
mod operation;

pub use engine::ColumnEngine;
pub use operation::{ApplyReport, Operation, OperationChange, OperationRequest};
