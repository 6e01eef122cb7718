//! Rendering recognized tables to text artifacts.

mod csv;
mod json;

pub use csv::{escape_cell, to_csv};
pub use json::{to_json, JsonFormat};
