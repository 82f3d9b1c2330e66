use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Paid bid upgrades offered by the marketplace's bid form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Upgrade {
    Sealed,
    Sponsored,
    Highlighted,
}

/// What the user approved for insertion. Consumed once by the form writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidPayload {
    pub proposal_text: String,
    #[serde(default)]
    pub bid_amount: Option<f64>,
    #[serde(default, rename = "deliveryTime")]
    pub delivery_time_days: Option<u32>,
    #[serde(default)]
    pub upgrades: BTreeSet<Upgrade>,
}
