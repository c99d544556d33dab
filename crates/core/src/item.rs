//! Inventory items as read from the ERP.

use serde::Serialize;

/// One serialized unit of stock, read once and reconciled once.
///
/// Not persisted anywhere by this system; the serial number is the natural
/// key used against the target system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryItem {
    /// Full product description (brand prefix + model tokens).
    pub product_name: String,

    /// User-assigned device identifier from the lot's property bag.
    ///
    /// The source property is optional; an absent value is forwarded as a
    /// null device name rather than dropping the item.
    pub device_name: Option<String>,

    /// Lot/serial display name; unique per physical unit.
    pub serial_number: String,

    /// Storage-location label. Filter predicate only, never persisted
    /// downstream.
    pub location: String,
}

/// Items grouped under one configured brand keyword.
///
/// Groups appear in configured brand order; a brand that matched nothing is
/// present with an empty item list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrandInventory {
    pub brand: String,
    pub items: Vec<InventoryItem>,
}

impl BrandInventory {
    pub fn empty(brand: impl Into<String>) -> Self {
        Self {
            brand: brand.into(),
            items: Vec::new(),
        }
    }
}
