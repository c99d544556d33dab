//! Product-name parsing and slug derivation.
//!
//! The model-name extraction mirrors the source system's labeling
//! convention: `<brand> <series word> <model…>`, e.g.
//! `"Cisco Catalyst 9300"` → brand `"Cisco"`, model `"9300"`.

/// Brand prefix and extracted model name for one product label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandModel<'a> {
    pub brand: &'a str,
    pub model: String,
}

/// Derive a URL-safe slug: lowercase, spaces become hyphens.
pub fn slugify(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

/// Split a product label into its brand prefix and model name.
///
/// The first configured brand that is a *leading* substring of the label
/// wins. The model is everything after the brand once one connector word
/// has been discarded (split at the first space, keep the remainder).
///
/// Known fragility, kept deliberately: a remainder with no space — a
/// single token, or nothing at all — yields an **empty** model name.
/// Callers that need a model must reject the empty string themselves.
pub fn split_brand_and_model<'a>(
    product_name: &str,
    brands: &'a [String],
) -> Option<BrandModel<'a>> {
    let brand = brands
        .iter()
        .find(|brand| product_name.starts_with(brand.as_str()))?;

    let rest = product_name[brand.len()..].trim();
    let model = match rest.split_once(' ') {
        Some((_series, remainder)) => remainder.trim_start().to_string(),
        None => String::new(),
    };

    Some(BrandModel {
        brand: brand.as_str(),
        model,
    })
}

/// Grouping key: the first configured brand occurring anywhere in the
/// product label.
pub fn brand_key<'a>(product_name: &str, brands: &'a [String]) -> Option<&'a str> {
    brands
        .iter()
        .find(|brand| product_name.contains(brand.as_str()))
        .map(|brand| brand.as_str())
}
