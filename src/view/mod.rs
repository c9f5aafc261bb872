mod filter;
pub mod group;
pub mod manager;
pub mod projection;
mod sort;
pub mod state;

pub use group::UNASSIGNED_COLUMN_ID;
pub use manager::ViewStateManager;
pub use projection::{project, ProjectedCard, ProjectedColumn, Projection, ProjectionContext};
pub use state::{FilterOption, GroupBy, Layout, SortColumn, SortDirection, ViewConfig, ViewState};
