//! Text primitives shared by the shaping and view crates.

pub mod chars;
pub mod line_ending;
