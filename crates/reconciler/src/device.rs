//! Device registration keyed by serial number.

use tracing::{debug, info};

use stockbridge_core::Lookup;

use crate::client::{NetboxClient, NewDevice, ReconcileError};

/// Everything needed to register one device.
#[derive(Debug, Clone)]
pub struct DeviceSpec<'a> {
    pub name: Option<&'a str>,
    pub device_type: i64,
    pub manufacturer: i64,
    pub site: i64,
    pub role: Option<i64>,
    pub serial: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    Created(i64),
    AlreadyExists,
}

/// Create the device unless a device with this serial already exists.
///
/// Existing devices are left untouched even when other fields differ —
/// there are no update semantics anywhere in this system.
pub async fn register_device(
    client: &NetboxClient,
    spec: DeviceSpec<'_>,
) -> Result<RegisterOutcome, ReconcileError> {
    if let Lookup::Found(id) = client.find_device_by_serial(spec.serial).await? {
        debug!(serial = spec.serial, id, "device already registered");
        return Ok(RegisterOutcome::AlreadyExists);
    }

    let id = client
        .create_device(&NewDevice {
            name: spec.name,
            device_type: spec.device_type,
            manufacturer: spec.manufacturer,
            site: spec.site,
            status: "active",
            role: spec.role,
            serial: spec.serial,
        })
        .await?;
    info!(serial = spec.serial, id, "registered device");

    Ok(RegisterOutcome::Created(id))
}
