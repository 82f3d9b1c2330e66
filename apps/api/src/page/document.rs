//! A loaded project page: the markup snapshot plus live form state.
//!
//! The markup is immutable for the lifetime of one page load. Everything a
//! user (or the form writer) changes afterwards lives in an overlay keyed by
//! the element's position in the parsed tree. Parsing is deterministic, so the
//! same key names the same element on every re-parse.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html};
use serde::Serialize;

use crate::page::selectors::LogicalField;

/// Stable handle to one element of the page, valid across re-parses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeKey(usize);

/// DOM notifications a reactive framework listens for after a value change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DomEventKind {
    Input,
    Change,
    Blur,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomEvent {
    pub field: LogicalField,
    pub node: NodeKey,
    pub kind: DomEventKind,
}

#[derive(Debug, Clone)]
pub struct PageDocument {
    url: String,
    source: String,
    loaded_at: DateTime<Utc>,
    values: HashMap<NodeKey, String>,
    checked: HashMap<NodeKey, bool>,
    events: Vec<DomEvent>,
}

impl PageDocument {
    pub fn new(url: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            source: source.into(),
            loaded_at: Utc::now(),
            values: HashMap::new(),
            checked: HashMap::new(),
            events: Vec::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Parses the markup snapshot. Callers keep the tree local to a synchronous
    /// scope; element handles are turned into `NodeKey`s before mutating.
    pub fn parse(&self) -> Html {
        Html::parse_document(&self.source)
    }

    /// Live value of a form control: a value the page has been given since load,
    /// otherwise the `value` attribute (inputs) or text content (textareas).
    pub fn live_value(&self, html: &Html, element: ElementRef<'_>) -> Option<String> {
        if let Some(value) = node_key(html, element).and_then(|key| self.values.get(&key)) {
            return Some(value.clone());
        }
        if element.value().name() == "textarea" {
            return Some(element.text().collect());
        }
        element.value().attr("value").map(str::to_string)
    }

    pub fn is_checked(&self, html: &Html, element: ElementRef<'_>) -> bool {
        node_key(html, element)
            .and_then(|key| self.checked.get(&key).copied())
            .unwrap_or_else(|| element.value().attr("checked").is_some())
    }

    pub fn set_value(&mut self, key: NodeKey, value: impl Into<String>) {
        self.values.insert(key, value.into());
    }

    pub fn set_checked(&mut self, key: NodeKey, checked: bool) {
        self.checked.insert(key, checked);
    }

    pub fn dispatch(&mut self, field: LogicalField, key: NodeKey, kind: DomEventKind) {
        self.events.push(DomEvent {
            field,
            node: key,
            kind,
        });
    }

    pub fn events(&self) -> &[DomEvent] {
        &self.events
    }
}

/// Position of `element` in the document tree.
pub fn node_key(html: &Html, element: ElementRef<'_>) -> Option<NodeKey> {
    let id = element.id();
    html.tree.nodes().position(|node| node.id() == id).map(NodeKey)
}

/// Element text with runs of whitespace collapsed to single spaces.
pub fn collapsed_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    const FORM: &str = r#"
        <html><body>
          <input id="amount" value="120">
          <textarea id="proposal">Draft text</textarea>
          <input id="sealed" type="checkbox">
          <p id="blurb">  Hello
             <b>world</b>  </p>
        </body></html>"#;

    fn first<'a>(html: &'a Html, css: &str) -> ElementRef<'a> {
        html.select(&Selector::parse(css).unwrap()).next().unwrap()
    }

    #[test]
    fn test_live_value_reads_markup_until_overwritten() {
        let mut page = PageDocument::new("https://example.test/projects/1", FORM);
        let html = page.parse();
        let amount = first(&html, "#amount");
        assert_eq!(page.live_value(&html, amount).as_deref(), Some("120"));

        let key = node_key(&html, amount).unwrap();
        page.set_value(key, "300");

        let reparsed = page.parse();
        let amount = first(&reparsed, "#amount");
        assert_eq!(page.live_value(&reparsed, amount).as_deref(), Some("300"));
    }

    #[test]
    fn test_textarea_value_is_text_content() {
        let page = PageDocument::new("u", FORM);
        let html = page.parse();
        let proposal = first(&html, "#proposal");
        assert_eq!(page.live_value(&html, proposal).as_deref(), Some("Draft text"));
    }

    #[test]
    fn test_checked_overlay() {
        let mut page = PageDocument::new("u", FORM);
        let html = page.parse();
        let sealed = first(&html, "#sealed");
        assert!(!page.is_checked(&html, sealed));
        page.set_checked(node_key(&html, sealed).unwrap(), true);
        assert!(page.is_checked(&html, sealed));
    }

    #[test]
    fn test_collapsed_text() {
        let page = PageDocument::new("u", FORM);
        let html = page.parse();
        assert_eq!(collapsed_text(first(&html, "#blurb")), "Hello world");
    }
}
