//! Trait definitions for Metasys operations.
//!
//! Entity types that live behind paginated list endpoints implement
//! [`List`], encapsulating per-endpoint differences in the implementations.

mod list;

pub use list::List;
