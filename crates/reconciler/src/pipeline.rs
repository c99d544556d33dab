//! Per-item reconciliation pipeline.
//!
//! Items are processed strictly one at a time; each goes through
//! manufacturer → role → device-type → device, and any stage failure ends
//! that item only. Nothing is rolled back: entities created before a
//! failure stay.

use tracing::{error, info, warn};

use stockbridge_core::{BrandInventory, InventoryItem, SyncConfig};

use crate::client::{NetboxClient, ReconcileError};
use crate::device::{register_device, DeviceSpec, RegisterOutcome};
use crate::device_type::resolve_device_type;
use crate::manufacturer::resolve_manufacturer;
use crate::tag::resolve_tag;

/// Why an item was abandoned without touching the target system's device
/// table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No configured brand prefixes the product name.
    NoBrandPrefix,
    /// Model-name extraction came back empty (single-token product label).
    EmptyModel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    Created,
    AlreadyExists,
    Skipped(SkipReason),
}

/// Tallies for one full run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub created_devices: usize,
    pub existing_devices: usize,
    pub skipped: usize,
    pub failed: usize,
    pub created_manufacturers: usize,
    pub created_device_types: usize,
}

pub struct Reconciler<'cfg> {
    client: NetboxClient,
    config: &'cfg SyncConfig,
}

impl<'cfg> Reconciler<'cfg> {
    pub fn new(client: NetboxClient, config: &'cfg SyncConfig) -> Self {
        Self { client, config }
    }

    /// Reconcile the full brand-grouped inventory.
    ///
    /// Per-item failures are logged and tallied, never propagated: one bad
    /// item must not stop the rest of the run.
    pub async fn run(&self, inventory: &[BrandInventory]) -> RunSummary {
        let mut summary = RunSummary::default();

        for group in inventory {
            info!(brand = %group.brand, items = group.items.len(), "processing brand");
            for item in &group.items {
                summary.processed += 1;
                match self.reconcile_item(item, &mut summary).await {
                    Ok(ItemOutcome::Created) => summary.created_devices += 1,
                    Ok(ItemOutcome::AlreadyExists) => summary.existing_devices += 1,
                    Ok(ItemOutcome::Skipped(_)) => summary.skipped += 1,
                    Err(err) => {
                        summary.failed += 1;
                        error!(
                            serial = %item.serial_number,
                            product = %item.product_name,
                            error = %err,
                            "reconciliation failed for item"
                        );
                    }
                }
            }
        }

        info!(
            processed = summary.processed,
            created = summary.created_devices,
            existing = summary.existing_devices,
            skipped = summary.skipped,
            failed = summary.failed,
            new_manufacturers = summary.created_manufacturers,
            new_device_types = summary.created_device_types,
            "reconciliation finished"
        );
        summary
    }

    /// Run the stage chain for one item.
    async fn reconcile_item(
        &self,
        item: &InventoryItem,
        summary: &mut RunSummary,
    ) -> Result<ItemOutcome, ReconcileError> {
        let Some(manufacturer) =
            resolve_manufacturer(&self.client, &self.config.brands, &item.product_name).await?
        else {
            return Ok(ItemOutcome::Skipped(SkipReason::NoBrandPrefix));
        };
        if manufacturer.created {
            summary.created_manufacturers += 1;
        }

        if manufacturer.model.is_empty() {
            warn!(
                product = %item.product_name,
                serial = %item.serial_number,
                "model extraction yielded an empty name, skipping item"
            );
            return Ok(ItemOutcome::Skipped(SkipReason::EmptyModel));
        }

        let role = resolve_tag(&self.client, &self.config.tag_rules, &item.product_name).await?;

        let device_type = resolve_device_type(
            &self.client,
            &manufacturer.model,
            manufacturer.id,
            self.config.default_u_height,
        )
        .await?;
        if device_type.created {
            summary.created_device_types += 1;
        }

        let outcome = register_device(
            &self.client,
            DeviceSpec {
                name: item.device_name.as_deref(),
                device_type: device_type.id,
                manufacturer: manufacturer.id,
                site: self.config.site_id,
                role,
                serial: &item.serial_number,
            },
        )
        .await?;

        Ok(match outcome {
            RegisterOutcome::Created(_) => ItemOutcome::Created,
            RegisterOutcome::AlreadyExists => ItemOutcome::AlreadyExists,
        })
    }
}
