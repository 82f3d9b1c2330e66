//! Fallback selector chains for every logical field the pipeline touches.
//!
//! Each chain is ordered primary-first: the selector matching the current
//! marketplace markup, then older layouts, then generic attribute/role based
//! selectors. Keeping up with markup changes is an edit to this table or to a
//! `SELECTORS_PATH` override file, never to the locating code.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::bid::Upgrade;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalField {
    Title,
    Description,
    Skills,
    Budget,
    BidAmountInput,
    DeliveryTimeInput,
    SuggestedEarnings,
    ProposalTextarea,
    UpgradeSealed,
    UpgradeSponsored,
    UpgradeHighlighted,
}

impl LogicalField {
    pub fn for_upgrade(upgrade: Upgrade) -> Self {
        match upgrade {
            Upgrade::Sealed => LogicalField::UpgradeSealed,
            Upgrade::Sponsored => LogicalField::UpgradeSponsored,
            Upgrade::Highlighted => LogicalField::UpgradeHighlighted,
        }
    }

    /// Fields the form writer can change, in the order they are reported.
    pub const WRITABLE: [LogicalField; 6] = [
        LogicalField::ProposalTextarea,
        LogicalField::BidAmountInput,
        LogicalField::DeliveryTimeInput,
        LogicalField::UpgradeSealed,
        LogicalField::UpgradeSponsored,
        LogicalField::UpgradeHighlighted,
    ];
}

const TITLE: &[&str] = &[
    "h1.ProjectViewDetails-title",
    "[data-testid=\"project-title\"]",
    ".PageProjectViewLogout-header-title",
    "fl-heading h1",
    "h1",
];

const DESCRIPTION: &[&str] = &[
    ".ProjectDescription",
    "[data-testid=\"project-description\"]",
    "fl-project-details-description",
    ".project-description",
    "[itemprop=\"description\"]",
];

const SKILLS: &[&str] = &[
    ".ProjectViewDetailsSkills fl-tag",
    "[data-testid=\"project-skill\"]",
    ".ProjectSkills a",
    "[role=\"list\"].skills [role=\"listitem\"]",
];

const BUDGET: &[&str] = &[
    ".ProjectViewDetails-budget",
    "[data-testid=\"project-budget\"]",
    ".project-budget",
    "[aria-label=\"Project budget\"]",
];

const BID_AMOUNT_INPUT: &[&str] = &[
    "#bidAmountInput",
    "input[formcontrolname=\"bidAmount\"]",
    "input[name=\"bidAmount\"]",
    "input[aria-label=\"Bid amount\"]",
];

const DELIVERY_TIME_INPUT: &[&str] = &[
    "#periodInput",
    "input[formcontrolname=\"period\"]",
    "input[name=\"period\"]",
    "input[aria-label=\"This project will be delivered in\"]",
];

const SUGGESTED_EARNINGS: &[&str] = &[
    ".BidFormSuggestedEarnings",
    "[data-testid=\"suggested-earnings\"]",
    ".BidForm-paidToYou",
];

const PROPOSAL_TEXTAREA: &[&str] = &[
    "#descriptionTextArea",
    "textarea[formcontrolname=\"description\"]",
    "textarea[name=\"description\"]",
    "textarea[aria-label=\"Describe your proposal\"]",
    "form textarea",
];

const UPGRADE_SEALED: &[&str] = &[
    "input[formcontrolname=\"sealed\"]",
    "[data-testid=\"upgrade-sealed\"] input[type=\"checkbox\"]",
    "input[type=\"checkbox\"][value=\"sealed\"]",
];

const UPGRADE_SPONSORED: &[&str] = &[
    "input[formcontrolname=\"sponsored\"]",
    "[data-testid=\"upgrade-sponsored\"] input[type=\"checkbox\"]",
    "input[type=\"checkbox\"][value=\"sponsored\"]",
];

const UPGRADE_HIGHLIGHTED: &[&str] = &[
    "input[formcontrolname=\"highlight\"]",
    "[data-testid=\"upgrade-highlighted\"] input[type=\"checkbox\"]",
    "input[type=\"checkbox\"][value=\"highlighted\"]",
];

#[derive(Debug, Error)]
pub enum SelectorConfigError {
    #[error("Failed to read selector overrides from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid selector overrides JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Ordered selector chain per logical field.
#[derive(Debug, Clone)]
pub struct SelectorTable {
    chains: HashMap<LogicalField, Vec<String>>,
}

impl Default for SelectorTable {
    fn default() -> Self {
        let builtin: [(LogicalField, &[&str]); 11] = [
            (LogicalField::Title, TITLE),
            (LogicalField::Description, DESCRIPTION),
            (LogicalField::Skills, SKILLS),
            (LogicalField::Budget, BUDGET),
            (LogicalField::BidAmountInput, BID_AMOUNT_INPUT),
            (LogicalField::DeliveryTimeInput, DELIVERY_TIME_INPUT),
            (LogicalField::SuggestedEarnings, SUGGESTED_EARNINGS),
            (LogicalField::ProposalTextarea, PROPOSAL_TEXTAREA),
            (LogicalField::UpgradeSealed, UPGRADE_SEALED),
            (LogicalField::UpgradeSponsored, UPGRADE_SPONSORED),
            (LogicalField::UpgradeHighlighted, UPGRADE_HIGHLIGHTED),
        ];
        let chains = builtin
            .into_iter()
            .map(|(field, chain)| (field, chain.iter().map(|s| s.to_string()).collect()))
            .collect();
        Self { chains }
    }
}

impl SelectorTable {
    /// Selector chain for `field`; empty when the table has none.
    pub fn chain(&self, field: LogicalField) -> &[String] {
        self.chains.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replaces the chains of the fields named in `overrides`, keeping the rest.
    pub fn with_overrides(mut self, overrides: HashMap<LogicalField, Vec<String>>) -> Self {
        self.chains.extend(overrides);
        self
    }

    /// Built-in table with the overrides found in a JSON file of the form
    /// `{"proposal_textarea": ["#newTextArea", "textarea"]}`.
    pub fn from_json_file(path: &Path) -> Result<Self, SelectorConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SelectorConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, SelectorConfigError> {
        let overrides: HashMap<LogicalField, Vec<String>> = serde_json::from_str(raw)?;
        Ok(Self::default().with_overrides(overrides))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_covers_every_field() {
        let table = SelectorTable::default();
        for field in [
            LogicalField::Title,
            LogicalField::Description,
            LogicalField::Skills,
            LogicalField::Budget,
            LogicalField::SuggestedEarnings,
        ]
        .into_iter()
        .chain(LogicalField::WRITABLE)
        {
            assert!(!table.chain(field).is_empty(), "{field:?} has no selectors");
        }
    }

    #[test]
    fn test_overrides_replace_only_named_fields() {
        let table = SelectorTable::from_json_str(
            r##"{"proposal_textarea": ["#newProposal", "textarea"]}"##,
        )
        .unwrap();
        assert_eq!(table.chain(LogicalField::ProposalTextarea), ["#newProposal", "textarea"]);
        assert_eq!(table.chain(LogicalField::Title)[0], "h1.ProjectViewDetails-title");
    }

    #[test]
    fn test_unknown_field_in_overrides_is_rejected() {
        let err = SelectorTable::from_json_str(r#"{"nonexistent": ["a"]}"#).unwrap_err();
        assert!(matches!(err, SelectorConfigError::Parse(_)));
    }
}
