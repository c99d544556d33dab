//! `stockbridge-core` — shared domain building blocks.
//!
//! This crate contains **pure domain** pieces (configuration model, item
//! types, name parsing). No IO, no HTTP.

pub mod config;
pub mod item;
pub mod lookup;
pub mod naming;

pub use config::{ConfigError, ErpConfig, NetboxConfig, SyncConfig, TagRule};
pub use item::{BrandInventory, InventoryItem};
pub use lookup::Lookup;
pub use naming::{brand_key, slugify, split_brand_and_model, BrandModel};
