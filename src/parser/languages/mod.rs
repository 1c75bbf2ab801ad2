//! Per-language raw-kind classification tables.
//!
//! Each module maps the grammar's kind strings onto the closed
//! [`NodeKind`](crate::tree::NodeKind) set the detection rules consume.

pub mod javascript;
pub mod python;
pub mod typescript;
