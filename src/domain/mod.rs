pub mod card;
pub mod error;
pub mod intent;
pub mod lookup;
pub mod stage;

pub use card::Card;
pub use error::KanbanError;
pub use intent::ChangeIntent;
pub use lookup::{FieldKind, FieldLookups, FieldOption};
pub use stage::{terminal_stage_id, Column};
