pub mod engine;

pub use engine::{DragKind, DragReorderEngine, DragSession, DragState, DropOutcome};
