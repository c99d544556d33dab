//! Device-type resolution under a manufacturer.

use tracing::{debug, info};

use stockbridge_core::naming;

use crate::client::{NetboxClient, NewDeviceType, ReconcileError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDeviceType {
    pub id: i64,
    pub created: bool,
}

/// Find the device type for `model`, creating it when absent.
///
/// The remote `model` filter may be case-sensitive or prefix-based, so the
/// result set is re-scanned locally with a case-insensitive exact match —
/// without it a case difference would create a duplicate type.
pub async fn resolve_device_type(
    client: &NetboxClient,
    model: &str,
    manufacturer_id: i64,
    u_height: u32,
) -> Result<ResolvedDeviceType, ReconcileError> {
    let existing = client.list_device_types(model).await?;

    let wanted = model.to_lowercase();
    if let Some(found) = existing
        .iter()
        .find(|device_type| device_type.model.to_lowercase() == wanted)
    {
        debug!(model, id = found.id, "device type already present");
        return Ok(ResolvedDeviceType {
            id: found.id,
            created: false,
        });
    }

    let id = client
        .create_device_type(&NewDeviceType {
            manufacturer: manufacturer_id,
            model,
            slug: naming::slugify(model),
            u_height,
        })
        .await?;
    info!(model, id, "created device type");

    Ok(ResolvedDeviceType { id, created: true })
}
