//! Board ordering and view engine for a stage-based kanban board.
//!
//! [`board::BoardStore`] holds the canonical column and card order,
//! [`view::project`] derives filtered, sorted and grouped views from it,
//! [`drag::DragReorderEngine`] turns drag gestures into store mutations and
//! [`sync`] carries the resulting change intents to durable storage.

pub mod api;
pub mod board;
pub mod config;
pub mod domain;
pub mod drag;
pub mod infrastructure;
pub mod services;
pub mod sync;
pub mod view;
