/// Header-rewrite rules that let provider pages render inside a frame
///
/// Each rule makes a framed request look like a top-level navigation to the
/// destination server and drops the response headers that forbid framing.
/// Rules serialize to the browser's declarative rule shape.
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::{extract_domain, host_matches};

/// Every rule shares one priority; they target disjoint domains
pub const RULE_PRIORITY: u32 = 1;

const DOMAIN_ANCHOR: &str = "||";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderOperation {
    Set,
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMutation {
    pub header: String,
    pub operation: HeaderOperation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl HeaderMutation {
    pub fn remove(header: &str) -> HeaderMutation {
        HeaderMutation {
            header: header.to_string(),
            operation: HeaderOperation::Remove,
            value: None,
        }
    }

    pub fn set(header: &str, value: &str) -> HeaderMutation {
        HeaderMutation {
            header: header.to_string(),
            operation: HeaderOperation::Set,
            value: Some(value.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    #[serde(rename = "modifyHeaders")]
    ModifyHeaders,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleAction {
    #[serde(rename = "type")]
    pub kind: ActionType,
    pub request_headers: Vec<HeaderMutation>,
    pub response_headers: Vec<HeaderMutation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    MainFrame,
    SubFrame,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleCondition {
    pub resource_types: Vec<ResourceType>,
    pub url_filter: String,
}

/// One header-rewrite rule for one domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderRule {
    pub id: u32,
    pub priority: u32,
    pub action: RuleAction,
    pub condition: RuleCondition,
}

impl HeaderRule {
    /// Build the framing rule for `domain`
    pub fn for_domain(id: u32, domain: &str) -> HeaderRule {
        HeaderRule {
            id,
            priority: RULE_PRIORITY,
            action: RuleAction {
                kind: ActionType::ModifyHeaders,
                request_headers: vec![
                    HeaderMutation::remove("referer"),
                    HeaderMutation::remove("origin"),
                    HeaderMutation::set("sec-fetch-dest", "document"),
                    HeaderMutation::set("sec-fetch-mode", "navigate"),
                    HeaderMutation::set("sec-fetch-site", "none"),
                    HeaderMutation::set("sec-fetch-user", "?1"),
                ],
                response_headers: vec![
                    HeaderMutation::remove("x-frame-options"),
                    HeaderMutation::remove("content-security-policy"),
                ],
            },
            condition: RuleCondition {
                resource_types: vec![ResourceType::SubFrame],
                url_filter: format!("{}{}", DOMAIN_ANCHOR, domain),
            },
        }
    }

    /// The domain this rule is anchored to
    pub fn target_domain(&self) -> &str {
        self.condition
            .url_filter
            .strip_prefix(DOMAIN_ANCHOR)
            .unwrap_or(&self.condition.url_filter)
    }

    /// Evaluate the rule's condition the way the browser does for `||domain` filters
    pub fn matches(&self, url: &str, resource_type: ResourceType) -> bool {
        if !self.condition.resource_types.contains(&resource_type) {
            return false;
        }

        extract_domain(url).is_some_and(|host| host_matches(&host, self.target_domain()))
    }
}

/// Compile one rule per domain, numbering them from 1 in set order
pub fn compile_rules(domains: &BTreeSet<String>) -> Vec<HeaderRule> {
    domains
        .iter()
        .zip(1u32..)
        .map(|(domain, id)| HeaderRule::for_domain(id, domain))
        .collect()
}

/// A full replacement of the installed rule set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleUpdate {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remove_rule_ids: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub add_rules: Vec<HeaderRule>,
}

impl RuleUpdate {
    /// Remove `installed_ids` and every id `rules` is about to take, then add `rules`
    ///
    /// The installed ids may be stale by the time the update lands; removing
    /// the new ids as well keeps a concurrent sync from causing a duplicate id.
    pub fn replace(installed_ids: Vec<u32>, rules: Vec<HeaderRule>) -> RuleUpdate {
        let remove_rule_ids: BTreeSet<u32> = installed_ids
            .into_iter()
            .chain(rules.iter().map(|rule| rule.id))
            .collect();

        RuleUpdate {
            remove_rule_ids: remove_rule_ids.into_iter().collect(),
            add_rules: rules,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.remove_rule_ids.is_empty() && self.add_rules.is_empty()
    }
}
