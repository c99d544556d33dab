//! Device-role resolution from keyword rules.

use tracing::{debug, warn};

use stockbridge_core::{Lookup, TagRule};

use crate::client::{NetboxClient, ReconcileError};

/// First rule with a keyword occurring in the label. Rule order decides
/// ties, so the scan must not reorder.
pub fn match_rule<'a>(rules: &'a [TagRule], label: &str) -> Option<&'a TagRule> {
    rules.iter().find(|rule| {
        rule.keywords
            .iter()
            .any(|keyword| label.contains(keyword.as_str()))
    })
}

/// Resolve the device role for a product label.
///
/// `Ok(None)` is a soft miss: no rule matched, or the matched role does
/// not exist in the target system. Transport and API failures stay on the
/// error channel and must not be read as "no role".
pub async fn resolve_tag(
    client: &NetboxClient,
    rules: &[TagRule],
    label: &str,
) -> Result<Option<i64>, ReconcileError> {
    let Some(rule) = match_rule(rules, label) else {
        debug!(label, "no role rule matched");
        return Ok(None);
    };

    match client.find_role(&rule.name).await? {
        Lookup::Found(id) => {
            debug!(role = %rule.name, id, "resolved device role");
            Ok(Some(id))
        }
        Lookup::NotFound => {
            warn!(role = %rule.name, "role not present in target system, continuing without one");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str, keywords: &[&str]) -> TagRule {
        TagRule {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    #[test]
    fn first_matching_rule_wins() {
        let rules = vec![rule("A", &["x"]), rule("B", &["x", "y"])];
        assert_eq!(match_rule(&rules, "label with x").unwrap().name, "A");
    }

    #[test]
    fn specific_rules_shadow_catch_alls_in_order() {
        let rules = vec![
            rule("Access Point", &["Cisco AP", "Access Point"]),
            rule("Firewall", &["Netgate", "Firewall"]),
            rule("Switch", &["Cisco"]),
        ];

        assert_eq!(match_rule(&rules, "Cisco AP 9120").unwrap().name, "Access Point");
        assert_eq!(match_rule(&rules, "Netgate 6100").unwrap().name, "Firewall");
        assert_eq!(match_rule(&rules, "Cisco Catalyst 9300").unwrap().name, "Switch");
    }

    #[test]
    fn no_keyword_match_is_none() {
        let rules = vec![rule("Switch", &["Cisco"])];
        assert!(match_rule(&rules, "Juniper EX3400").is_none());
    }
}
