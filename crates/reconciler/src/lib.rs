//! `stockbridge-reconciler` — idempotent reconciliation against the
//! network source-of-truth.
//!
//! For each inventory item the pipeline resolves or creates, in dependency
//! order: manufacturer (by brand prefix), device role (by keyword rule),
//! device type (by model under the manufacturer), and finally the device
//! itself (by serial number). Records are only ever created, never
//! updated; a rerun over the same inventory creates nothing.

pub mod client;
pub mod device;
pub mod device_type;
pub mod manufacturer;
pub mod pipeline;
pub mod tag;

pub use client::{NetboxClient, ReconcileError};
pub use device::{register_device, DeviceSpec, RegisterOutcome};
pub use device_type::{resolve_device_type, ResolvedDeviceType};
pub use manufacturer::{resolve_manufacturer, ResolvedManufacturer};
pub use pipeline::{ItemOutcome, Reconciler, RunSummary, SkipReason};
pub use tag::resolve_tag;
