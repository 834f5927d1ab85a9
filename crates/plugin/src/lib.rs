//! RapGen Plugin - Registry, catalog and built-in plugins.
//!
//! The registry owns installed plugins for a session. The catalog lists
//! what can be installed, and the marketplace puts a listing and
//! install surface on top of both.

pub mod builtin;
mod catalog;
mod marketplace;
mod registry;

pub use catalog::{Catalog, CatalogEntry};
pub use marketplace::{CategoryGroup, Listing, Marketplace};
pub use registry::PluginRegistry;
