//! FieldLocator: resolves a logical field to a DOM element via its fallback chain.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::page::selectors::{LogicalField, SelectorTable};

/// Result of resolving one logical field.
#[derive(Debug, Clone, Copy)]
pub enum Located<'a> {
    Found(ElementRef<'a>),
    NotFound,
}

impl<'a> Located<'a> {
    pub fn found(self) -> Option<ElementRef<'a>> {
        match self {
            Located::Found(element) => Some(element),
            Located::NotFound => None,
        }
    }
}

/// Read-only lookups against one parsed page.
pub struct FieldLocator<'t> {
    table: &'t SelectorTable,
}

impl<'t> FieldLocator<'t> {
    pub fn new(table: &'t SelectorTable) -> Self {
        Self { table }
    }

    pub fn locate<'a>(&self, html: &'a Html, field: LogicalField) -> Located<'a> {
        locate_in_chain(html, field, self.table.chain(field))
    }

    /// Every element matched by the first selector in the chain that matches anything.
    pub fn locate_all<'a>(&self, html: &'a Html, field: LogicalField) -> Vec<ElementRef<'a>> {
        for selector in parsed_chain(field, self.table.chain(field)) {
            let matches: Vec<_> = html.select(&selector).collect();
            if !matches.is_empty() {
                debug!("{field:?}: {} nodes", matches.len());
                return matches;
            }
        }
        Vec::new()
    }
}

/// Tries each selector in order. Malformed selectors and selectors that match
/// nothing are skipped; an exhausted chain yields `NotFound`.
pub fn locate_in_chain<'a, S: AsRef<str>>(
    html: &'a Html,
    field: LogicalField,
    chain: &[S],
) -> Located<'a> {
    for selector in parsed_chain(field, chain) {
        if let Some(element) = html.select(&selector).next() {
            return Located::Found(element);
        }
    }
    debug!("{field:?}: no selector matched ({} tried)", chain.len());
    Located::NotFound
}

fn parsed_chain<'c, S: AsRef<str>>(
    field: LogicalField,
    chain: &'c [S],
) -> impl Iterator<Item = Selector> + 'c {
    chain.iter().filter_map(move |raw| {
        let raw = raw.as_ref();
        match Selector::parse(raw) {
            Ok(selector) => Some(selector),
            Err(e) => {
                debug!("{field:?}: skipping malformed selector {raw:?}: {e:?}");
                None
            }
        }
    })
}
