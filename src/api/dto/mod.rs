pub mod boards;

pub use boards::{MoveCardRequest, MoveStageRequest, ViewQuery};
