//! Job data extraction: builds a `JobDetails` from the currently loaded page.
//!
//! Every field is read independently. A missing node or an unparseable number
//! leaves that one field absent; only a missing description makes the record
//! unusable, and that is decided downstream by `ProposalContext::from_job`.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use tracing::debug;

use crate::models::job::{JobDetails, ProjectBudget};
use crate::page::document::{collapsed_text, PageDocument};
use crate::page::locator::FieldLocator;
use crate::page::selectors::{LogicalField, SelectorTable};

/// Digits with optional thousands separators and an optional decimal part.
static CURRENCY_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?").expect("valid currency regex")
});

/// First run of digits (commas allowed) with an optional decimal part.
static NUMERIC_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d[\d,]*(?:\.\d+)?").expect("valid numeric regex"));

pub fn extract_job_details(page: &PageDocument, table: &SelectorTable) -> JobDetails {
    let html = page.parse();
    let locator = FieldLocator::new(table);

    let details = JobDetails {
        description: read_description(&html, &locator),
        project_budget: read_budget(&html, &locator),
        bid_amount: read_bid_amount(page, &html, &locator),
        delivery_time_days: read_delivery_days(page, &html, &locator),
    };

    debug!(
        "Extracted job from {}: description_chars={}, budget={:?}, bid={:?}, days={:?}",
        page.url(),
        details.description.as_ref().map(|d| d.len()).unwrap_or(0),
        details.project_budget.text,
        details.bid_amount,
        details.delivery_time_days
    );

    details
}

/// Title, body and skills joined by blank lines, in that order.
fn read_description(html: &Html, locator: &FieldLocator<'_>) -> Option<String> {
    let title = locator
        .locate(html, LogicalField::Title)
        .found()
        .map(collapsed_text);
    let body = locator
        .locate(html, LogicalField::Description)
        .found()
        .map(collapsed_text);
    let skills: Vec<String> = locator
        .locate_all(html, LogicalField::Skills)
        .into_iter()
        .map(collapsed_text)
        .filter(|s| !s.is_empty())
        .collect();
    let skills = (!skills.is_empty()).then(|| format!("Skills: {}", skills.join(", ")));

    let joined = [title, body, skills]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");
    let joined = joined.trim();

    (!joined.is_empty()).then(|| joined.to_string())
}

fn read_budget(html: &Html, locator: &FieldLocator<'_>) -> ProjectBudget {
    locator
        .locate(html, LogicalField::Budget)
        .found()
        .map(collapsed_text)
        .filter(|text| !text.is_empty())
        .map(|text| parse_budget(&text))
        .unwrap_or_default()
}

/// Parses every currency number out of a budget label.
///
/// `min` is the smallest and `max` the largest number found; a single number
/// is both. Text without numbers keeps the text and leaves the range absent.
pub fn parse_budget(text: &str) -> ProjectBudget {
    let numbers = currency_numbers(text);
    let min = numbers.iter().copied().reduce(f64::min);
    let max = numbers.iter().copied().reduce(f64::max);
    ProjectBudget {
        text: Some(text.trim().to_string()),
        min,
        max,
    }
}

pub fn currency_numbers(text: &str) -> Vec<f64> {
    CURRENCY_NUMBER
        .find_iter(text)
        .filter_map(|m| parse_amount(m.as_str()))
        .collect()
}

/// Parses a user-facing amount such as `"1,250.50"` or `" 300 "`.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '$')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn read_bid_amount(page: &PageDocument, html: &Html, locator: &FieldLocator<'_>) -> Option<f64> {
    let from_input = locator
        .locate(html, LogicalField::BidAmountInput)
        .found()
        .and_then(|input| page.live_value(html, input))
        .and_then(|value| parse_amount(&value));
    if from_input.is_some() {
        return from_input;
    }

    locator
        .locate(html, LogicalField::SuggestedEarnings)
        .found()
        .map(collapsed_text)
        .and_then(|hint| first_numeric_run(&hint))
}

fn first_numeric_run(text: &str) -> Option<f64> {
    NUMERIC_RUN
        .find(text)
        .and_then(|m| parse_amount(m.as_str()))
}

fn read_delivery_days(page: &PageDocument, html: &Html, locator: &FieldLocator<'_>) -> Option<u32> {
    locator
        .locate(html, LogicalField::DeliveryTimeInput)
        .found()
        .and_then(|input| page.live_value(html, input))
        .and_then(|value| value.trim().parse::<u32>().ok())
}
