//! MongoDB driver for docsheet
//!
//! This crate implements `docsheet_core::DocumentStore` on top of the
//! official MongoDB driver:
//!
//! - Connection by URI with a `ping` reachability check
//! - Database and collection listing (system databases and views excluded)
//! - Cursor-based streaming of a collection's documents
//! - Bulk delete and insert for collection replacement
//! - BSON <-> `Value` conversion
//!
//! # Example
//!
//! ```ignore
//! use docsheet_driver_mongodb::MongoDbDriver;
//! use docsheet_core::DocumentStore;
//!
//! let conn = MongoDbDriver::new().connect("mongodb://localhost:27017/").await?;
//! for name in conn.list_databases().await? {
//!     println!("{name}: {:?}", conn.list_collections(&name).await?);
//! }
//! conn.close().await?;
//! ```

pub mod collections;
#[cfg(test)]
mod collections_tests;
mod conversion;
mod driver;
#[cfg(test)]
mod driver_tests;

pub use collections::*;
pub use conversion::{bson_to_value, document_from_bson, document_to_bson, value_to_bson};
pub use driver::*;
