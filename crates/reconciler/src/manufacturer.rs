//! Manufacturer resolution by brand prefix.

use tracing::{debug, info, warn};

use stockbridge_core::{naming, Lookup};

use crate::client::{NetboxClient, ReconcileError};

/// Outcome of a successful manufacturer resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedManufacturer {
    pub id: i64,
    pub brand: String,
    /// Model name left over after stripping the brand and series word.
    /// May be empty (single-token remainder); callers decide how loudly
    /// that fails.
    pub model: String,
    pub created: bool,
}

/// Look up, or create, the manufacturer for a product label.
///
/// `Ok(None)` when no configured brand prefixes the label — the item
/// cannot be reconciled but the run goes on.
pub async fn resolve_manufacturer(
    client: &NetboxClient,
    brands: &[String],
    product_name: &str,
) -> Result<Option<ResolvedManufacturer>, ReconcileError> {
    let Some(parsed) = naming::split_brand_and_model(product_name, brands) else {
        warn!(product = product_name, "no configured brand prefixes the product name");
        return Ok(None);
    };

    let (id, created) = match client.find_manufacturer(parsed.brand).await? {
        Lookup::Found(id) => {
            debug!(manufacturer = parsed.brand, id, "manufacturer already present");
            (id, false)
        }
        Lookup::NotFound => {
            let id = client
                .create_manufacturer(parsed.brand, naming::slugify(parsed.brand))
                .await?;
            info!(manufacturer = parsed.brand, id, "created manufacturer");
            (id, true)
        }
    };

    Ok(Some(ResolvedManufacturer {
        id,
        brand: parsed.brand.to_string(),
        model: parsed.model,
        created,
    }))
}
