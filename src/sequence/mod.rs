pub mod name;
pub mod text;

pub use name::{ComponentKind, SequenceName};
pub use text::{no_call_mask, SequenceText, TileText};
