//! Docsheet Core - shared data model and store abstraction
//!
//! This crate provides the types every other docsheet crate depends on:
//!
//! - `Value` - tagged union of the field values a document can hold
//! - `ObjectId` - the store-generated document identifier
//! - `Document` - an ordered mapping of field names to values
//! - `DocumentStore` - trait implemented by document store drivers
//! - `MemoryStore` - in-process `DocumentStore` used by tests

mod error;
pub mod memory;
mod store;
mod types;

pub use error::*;
pub use memory::MemoryStore;
pub use store::*;
pub use types::*;
