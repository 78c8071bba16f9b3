//! Backing relational store boundary and the SQLite reference backend.

pub mod sqlite;
pub mod traits;

pub use sqlite::*;
pub use traits::*;
