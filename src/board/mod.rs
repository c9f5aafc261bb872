pub mod store;

pub use store::{BoardSnapshot, BoardStore};
