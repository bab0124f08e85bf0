pub mod config;
pub mod error;
pub mod graph;
pub mod layout;
pub mod render;
pub mod sequence;
pub mod store;
pub mod viewer;
