//! Brand-filtered inventory retrieval.
//!
//! One pass: product search, stock-quant traversal, lot detail lookup,
//! grouping by brand. Transport failures while listing products or quants
//! abort the fetch; a failure while reading one lot skips that serial only.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use stockbridge_core::{naming, BrandInventory, InventoryItem, SyncConfig};

use crate::client::{OdooRpc, SourceError};
use crate::xmlrpc::Value;

/// Label of the lot property carrying the user-assigned device name.
const DEVICE_NAME_PROPERTY: &str = "Device Name";

/// Read side of the sync: produces the full item list up front.
pub struct InventorySource<'cfg, R> {
    rpc: R,
    config: &'cfg SyncConfig,
}

struct ProductRecord {
    id: i64,
    name: String,
}

struct LotDetails {
    serial: Option<String>,
    device_name: Option<String>,
}

impl<'cfg, R: OdooRpc> InventorySource<'cfg, R> {
    pub fn new(rpc: R, config: &'cfg SyncConfig) -> Self {
        Self { rpc, config }
    }

    /// Fetch all matching inventory items, grouped by configured brand.
    ///
    /// Every configured brand appears in the result, in configured order,
    /// possibly with an empty item list.
    pub async fn fetch_by_brand(&self) -> Result<Vec<BrandInventory>, SourceError> {
        let uid = self.rpc.authenticate().await?;
        info!(uid, "authenticated against the ERP");

        let products = self.matching_products(uid).await?;
        info!(count = products.len(), "products matched the brand filter");

        let mut groups: Vec<BrandInventory> = self
            .config
            .brands
            .iter()
            .map(BrandInventory::empty)
            .collect();
        let mut seen_lots: HashSet<i64> = HashSet::new();

        for product in &products {
            let quants = self.stock_quants(uid, product.id).await?;
            for quant in &quants {
                self.process_quant(uid, product, quant, &mut seen_lots, &mut groups)
                    .await;
            }
        }

        let total: usize = groups.iter().map(|g| g.items.len()).sum();
        info!(items = total, "inventory retrieval completed");
        Ok(groups)
    }

    /// Products whose name or display name matches any configured brand,
    /// re-checked locally against the keyword list.
    async fn matching_products(&self, uid: i64) -> Result<Vec<ProductRecord>, SourceError> {
        let result = self
            .rpc
            .execute_kw(
                uid,
                "product.product",
                "search_read",
                Value::Array(vec![brand_domain(&self.config.brands)]),
                fields_kwarg(&["id", "name", "default_code"]),
            )
            .await?;

        let records = result
            .as_array()
            .ok_or_else(|| SourceError::Decode("product search did not return an array".into()))?;

        let mut products = Vec::new();
        for record in records {
            let Some(id) = record.get("id").and_then(Value::as_i64) else {
                warn!("product record without an id, skipping");
                continue;
            };
            let name = record
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            products.push(ProductRecord { id, name });
        }

        // The remote filter also matches display_name; re-check the plain
        // name against the configured keywords.
        products.retain(|product| {
            let name = product.name.to_lowercase();
            self.config
                .brands
                .iter()
                .any(|brand| name.contains(&brand.to_lowercase()))
        });

        Ok(products)
    }

    async fn stock_quants(&self, uid: i64, product_id: i64) -> Result<Vec<Value>, SourceError> {
        let result = self
            .rpc
            .execute_kw(
                uid,
                "stock.quant",
                "search_read",
                Value::Array(vec![Value::Array(vec![condition(
                    "product_id",
                    "=",
                    Value::Int(product_id),
                )])]),
                fields_kwarg(&["id", "product_id", "location_id", "lot_id"]),
            )
            .await?;

        match result {
            Value::Array(records) => Ok(records),
            other => Err(SourceError::Decode(format!(
                "quant search returned {other:?}"
            ))),
        }
    }

    /// Handle one stock quant. Never fails the fetch: problems with a
    /// single lot are logged and skip that serial only.
    async fn process_quant(
        &self,
        uid: i64,
        product: &ProductRecord,
        quant: &Value,
        seen_lots: &mut HashSet<i64>,
        groups: &mut [BrandInventory],
    ) {
        let Some(location) = quant.get("location_id").and_then(many2one_label) else {
            debug!(product = %product.name, "quant without a location label, skipping");
            return;
        };
        if !self.location_matches(location) {
            return;
        }

        let Some(lot_id) = quant.get("lot_id").and_then(many2one_id) else {
            debug!(location, "quant is not serial-tracked, skipping");
            return;
        };
        // The same lot can surface at several nested location paths.
        if !seen_lots.insert(lot_id) {
            return;
        }

        let product_name = quant
            .get("product_id")
            .and_then(many2one_label)
            .unwrap_or(&product.name);

        let lot = match self.lot_details(uid, lot_id).await {
            Ok(Some(lot)) => lot,
            Ok(None) => {
                warn!(lot_id, "no details found for lot, skipping");
                return;
            }
            Err(err) => {
                warn!(lot_id, error = %err, "lot detail lookup failed, skipping");
                return;
            }
        };
        let Some(serial_number) = lot.serial else {
            warn!(lot_id, "lot has no serial name, skipping");
            return;
        };

        let Some(brand) = naming::brand_key(product_name, &self.config.brands) else {
            debug!(product = product_name, "no brand key for product, dropped");
            return;
        };

        if let Some(group) = groups.iter_mut().find(|group| group.brand == brand) {
            debug!(brand, serial = %serial_number, location, "collected inventory item");
            group.items.push(InventoryItem {
                product_name: product_name.to_string(),
                device_name: lot.device_name,
                serial_number,
                location: location.to_string(),
            });
        }
    }

    async fn lot_details(&self, uid: i64, lot_id: i64) -> Result<Option<LotDetails>, SourceError> {
        let result = self
            .rpc
            .execute_kw(
                uid,
                "stock.lot",
                "search_read",
                Value::Array(vec![Value::Array(vec![condition(
                    "id",
                    "=",
                    Value::Int(lot_id),
                )])]),
                fields_kwarg(&["id", "name", "lot_properties"]),
            )
            .await?;

        let records = result
            .as_array()
            .ok_or_else(|| SourceError::Decode("lot search did not return an array".into()))?;
        let Some(record) = records.first() else {
            return Ok(None);
        };

        let serial = record
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string);
        let device_name = record
            .get("lot_properties")
            .and_then(Value::as_array)
            .and_then(|properties| {
                properties
                    .iter()
                    .find(|property| {
                        property.get("string").and_then(Value::as_str)
                            == Some(DEVICE_NAME_PROPERTY)
                    })
                    .and_then(|property| property.get("value"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            });

        Ok(Some(LotDetails {
            serial,
            device_name,
        }))
    }

    fn location_matches(&self, location: &str) -> bool {
        self.config.locations.is_empty()
            || self
                .config
                .locations
                .iter()
                .any(|wanted| location.contains(wanted.as_str()))
    }
}

/// `[field, op, value]` domain term.
fn condition(field: &str, op: &str, value: Value) -> Value {
    Value::Array(vec![Value::from(field), Value::from(op), value])
}

/// OR-domain over all brands, each matched against `name` and
/// `display_name` (prefix `|` notation).
fn brand_domain(brands: &[String]) -> Value {
    let mut terms: Vec<Value> = Vec::new();
    for _ in 1..brands.len() {
        terms.push(Value::from("|"));
    }
    for brand in brands {
        terms.push(Value::from("|"));
        terms.push(condition("name", "ilike", Value::from(brand.as_str())));
        terms.push(condition(
            "display_name",
            "ilike",
            Value::from(brand.as_str()),
        ));
    }
    Value::Array(terms)
}

fn fields_kwarg(names: &[&str]) -> Value {
    Value::Struct(vec![(
        "fields".to_string(),
        Value::Array(names.iter().map(|name| Value::from(*name)).collect()),
    )])
}

fn many2one_id(value: &Value) -> Option<i64> {
    value.as_array()?.first()?.as_i64()
}

fn many2one_label(value: &Value) -> Option<&str> {
    value.as_array()?.get(1)?.as_str()
}
