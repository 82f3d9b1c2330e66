//! FormWriter: puts an approved bid into the page's bid form.
//!
//! The proposal textarea is mandatory; amount, delivery time and upgrades are
//! written when their fields exist and reported as missing otherwise. Every
//! write is followed by `input`, `change` and `blur` so the page's own form
//! framework picks the new value up.

use scraper::{ElementRef, Html};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::models::bid::BidPayload;
use crate::models::generation::{ErrorKind, PipelineError};
use crate::page::document::{node_key, DomEventKind, PageDocument};
use crate::page::locator::FieldLocator;
use crate::page::selectors::{LogicalField, SelectorTable};

const NOTIFICATION_ORDER: [DomEventKind; 3] =
    [DomEventKind::Input, DomEventKind::Change, DomEventKind::Blur];

/// What a write touched. Optional fields that could not be located end up in
/// `missing`; their absence is not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WriteReport {
    pub written: Vec<LogicalField>,
    pub missing: Vec<LogicalField>,
}

impl WriteReport {
    pub fn is_partial(&self) -> bool {
        !self.missing.is_empty()
    }

    pub fn summary(&self) -> String {
        if self.missing.is_empty() {
            "Bid inserted".to_string()
        } else {
            let missing = self
                .missing
                .iter()
                .map(|f| format!("{f:?}"))
                .collect::<Vec<_>>()
                .join(", ");
            format!("Proposal inserted; could not find: {missing}")
        }
    }
}

/// Writes `payload` into the bid form.
pub fn write_bid(
    page: &mut PageDocument,
    table: &SelectorTable,
    payload: BidPayload,
) -> Result<WriteReport, PipelineError> {
    let html = page.parse();
    let locator = FieldLocator::new(table);
    let mut report = WriteReport::default();

    let proposal = require_proposal_field(&html, &locator)?;
    assign_value(page, &html, proposal, LogicalField::ProposalTextarea, &payload.proposal_text);
    report.written.push(LogicalField::ProposalTextarea);

    if let Some(amount) = payload.bid_amount {
        write_optional(page, &html, &locator, &mut report, LogicalField::BidAmountInput, |page, html, el| {
            assign_value(page, html, el, LogicalField::BidAmountInput, &format_amount(amount))
        });
    }

    if let Some(days) = payload.delivery_time_days {
        write_optional(page, &html, &locator, &mut report, LogicalField::DeliveryTimeInput, |page, html, el| {
            assign_value(page, html, el, LogicalField::DeliveryTimeInput, &days.to_string())
        });
    }

    for upgrade in &payload.upgrades {
        let field = LogicalField::for_upgrade(*upgrade);
        write_optional(page, &html, &locator, &mut report, field, |page, html, el| {
            tick(page, html, el, field)
        });
    }

    if report.is_partial() {
        warn!("Partial bid insert on {}: missing {:?}", page.url(), report.missing);
    } else {
        info!("Bid inserted on {}", page.url());
    }

    Ok(report)
}

/// Appends `text` to whatever the proposal field already holds, separated by a blank line.
pub fn append_to_proposal(
    page: &mut PageDocument,
    table: &SelectorTable,
    text: &str,
) -> Result<WriteReport, PipelineError> {
    let html = page.parse();
    let locator = FieldLocator::new(table);
    let proposal = require_proposal_field(&html, &locator)?;

    let current = page.live_value(&html, proposal).unwrap_or_default();
    let combined = if current.trim().is_empty() {
        text.to_string()
    } else {
        format!("{}\n\n{}", current.trim_end(), text)
    };
    assign_value(page, &html, proposal, LogicalField::ProposalTextarea, &combined);

    Ok(WriteReport {
        written: vec![LogicalField::ProposalTextarea],
        missing: Vec::new(),
    })
}

fn require_proposal_field<'a>(
    html: &'a Html,
    locator: &FieldLocator<'_>,
) -> Result<ElementRef<'a>, PipelineError> {
    locator
        .locate(html, LogicalField::ProposalTextarea)
        .found()
        .ok_or_else(|| {
            PipelineError::new(
                ErrorKind::FieldNotFound,
                "Could not find the proposal field. Open the bid form and try again.",
            )
        })
}

fn write_optional<F>(
    page: &mut PageDocument,
    html: &Html,
    locator: &FieldLocator<'_>,
    report: &mut WriteReport,
    field: LogicalField,
    write: F,
) where
    F: FnOnce(&mut PageDocument, &Html, ElementRef<'_>),
{
    match locator.locate(html, field).found() {
        Some(element) => {
            write(page, html, element);
            report.written.push(field);
        }
        None => {
            debug!("{field:?} not on page; skipping");
            report.missing.push(field);
        }
    }
}

fn assign_value(
    page: &mut PageDocument,
    html: &Html,
    element: ElementRef<'_>,
    field: LogicalField,
    value: &str,
) {
    if let Some(key) = node_key(html, element) {
        page.set_value(key, value);
        for kind in NOTIFICATION_ORDER {
            page.dispatch(field, key, kind);
        }
    }
}

fn tick(page: &mut PageDocument, html: &Html, element: ElementRef<'_>, field: LogicalField) {
    if let Some(key) = node_key(html, element) {
        page.set_checked(key, true);
        for kind in NOTIFICATION_ORDER {
            page.dispatch(field, key, kind);
        }
    }
}

fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{amount:.0}")
    } else {
        format!("{amount:.2}")
    }
}

/// Current values of the writable fields, for previews and diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct FieldValue {
    pub field: LogicalField,
    pub found: bool,
    pub value: Option<String>,
    pub checked: Option<bool>,
}

pub fn snapshot_form(page: &PageDocument, table: &SelectorTable) -> Vec<FieldValue> {
    let html = page.parse();
    let locator = FieldLocator::new(table);
    LogicalField::WRITABLE
        .into_iter()
        .map(|field| match locator.locate(&html, field).found() {
            Some(element) => {
                let is_checkbox = element.value().attr("type") == Some("checkbox");
                FieldValue {
                    field,
                    found: true,
                    value: (!is_checkbox).then(|| page.live_value(&html, element)).flatten(),
                    checked: is_checkbox.then(|| page.is_checked(&html, element)),
                }
            }
            None => FieldValue {
                field,
                found: false,
                value: None,
                checked: None,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::models::bid::Upgrade;

    const FULL_FORM: &str = r#"
        <form>
          <textarea id="descriptionTextArea"></textarea>
          <input id="bidAmountInput" value="">
          <input id="periodInput" value="">
          <input type="checkbox" formcontrolname="sealed">
          <input type="checkbox" formcontrolname="highlight">
        </form>"#;

    fn payload() -> BidPayload {
        BidPayload {
            proposal_text: "Hi, I can build this.".to_string(),
            bid_amount: Some(350.0),
            delivery_time_days: Some(5),
            upgrades: BTreeSet::new(),
        }
    }

    fn value_of(page: &PageDocument, field: LogicalField) -> Option<String> {
        snapshot_form(page, &SelectorTable::default())
            .into_iter()
            .find(|f| f.field == field)
            .and_then(|f| f.value)
    }

    #[test]
    fn test_full_write_sets_every_field() {
        let mut page = PageDocument::new("u", FULL_FORM);
        let report = write_bid(&mut page, &SelectorTable::default(), payload()).unwrap();
        assert!(!report.is_partial());
        assert_eq!(
            report.written,
            vec![
                LogicalField::ProposalTextarea,
                LogicalField::BidAmountInput,
                LogicalField::DeliveryTimeInput
            ]
        );
        assert_eq!(
            value_of(&page, LogicalField::ProposalTextarea).as_deref(),
            Some("Hi, I can build this.")
        );
        assert_eq!(value_of(&page, LogicalField::BidAmountInput).as_deref(), Some("350"));
        assert_eq!(value_of(&page, LogicalField::DeliveryTimeInput).as_deref(), Some("5"));
    }

    #[test]
    fn test_each_field_gets_input_change_blur_in_order() {
        let mut page = PageDocument::new("u", FULL_FORM);
        write_bid(&mut page, &SelectorTable::default(), payload()).unwrap();

        let events = page.events();
        assert_eq!(events.len(), 9);
        for chunk in events.chunks(3) {
            let kinds: Vec<_> = chunk.iter().map(|e| e.kind).collect();
            assert_eq!(kinds, NOTIFICATION_ORDER);
            assert!(chunk.iter().all(|e| e.field == chunk[0].field));
        }
    }

    #[test]
    fn test_proposal_only_page_is_partial_success() {
        let mut page = PageDocument::new("u", r#"<form><textarea name="description"></textarea></form>"#);
        let report = write_bid(&mut page, &SelectorTable::default(), payload()).unwrap();
        assert!(report.is_partial());
        assert_eq!(report.written, vec![LogicalField::ProposalTextarea]);
        assert_eq!(
            report.missing,
            vec![LogicalField::BidAmountInput, LogicalField::DeliveryTimeInput]
        );
        assert!(report.summary().contains("could not find"));
    }

    #[test]
    fn test_missing_proposal_field_fails_without_writing() {
        let mut page = PageDocument::new("u", r#"<input id="bidAmountInput">"#);
        let err = write_bid(&mut page, &SelectorTable::default(), payload()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::FieldNotFound);
        assert!(page.events().is_empty());
    }

    #[test]
    fn test_upgrades_ticked_when_present() {
        let mut page = PageDocument::new("u", FULL_FORM);
        let mut bid = payload();
        bid.upgrades = [Upgrade::Sealed, Upgrade::Sponsored, Upgrade::Highlighted]
            .into_iter()
            .collect();
        let report = write_bid(&mut page, &SelectorTable::default(), bid).unwrap();

        assert!(report.written.contains(&LogicalField::UpgradeSealed));
        assert!(report.written.contains(&LogicalField::UpgradeHighlighted));
        assert_eq!(report.missing, vec![LogicalField::UpgradeSponsored]);

        let sealed = snapshot_form(&page, &SelectorTable::default())
            .into_iter()
            .find(|f| f.field == LogicalField::UpgradeSealed)
            .unwrap();
        assert_eq!(sealed.checked, Some(true));
    }

    #[test]
    fn test_append_to_proposal_keeps_existing_text() {
        let mut page = PageDocument::new("u", FULL_FORM);
        write_bid(&mut page, &SelectorTable::default(), payload()).unwrap();
        append_to_proposal(&mut page, &SelectorTable::default(), "1. What is the deadline?").unwrap();
        assert_eq!(
            value_of(&page, LogicalField::ProposalTextarea).as_deref(),
            Some("Hi, I can build this.\n\n1. What is the deadline?")
        );
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(250.0), "250");
        assert_eq!(format_amount(99.5), "99.50");
    }
}
