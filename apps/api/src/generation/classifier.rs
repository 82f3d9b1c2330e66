//! Specialization classifier: maps a job description to the profile angle the
//! proposal should lead with.
//!
//! CRITICAL: rule order is part of the contract. The first matching rule wins,
//! so narrower domains (AI/ML, scraping) sit above the broad ones (frontend,
//! backend) that would otherwise swallow them.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Specialization {
    AiMl,
    WebScraping,
    Blockchain,
    MobileApps,
    DevOps,
    DataAnalytics,
    WordPressEcommerce,
    Frontend,
    Backend,
    #[default]
    FullStack,
}

impl Specialization {
    pub fn label(self) -> &'static str {
        match self {
            Specialization::AiMl => "AI/ML Engineering",
            Specialization::WebScraping => "Web Scraping & Automation",
            Specialization::Blockchain => "Blockchain & Web3 Development",
            Specialization::MobileApps => "Mobile App Development",
            Specialization::DevOps => "DevOps & Cloud Infrastructure",
            Specialization::DataAnalytics => "Data Engineering & Analytics",
            Specialization::WordPressEcommerce => "WordPress & E-commerce",
            Specialization::Frontend => "Frontend Development",
            Specialization::Backend => "Backend & API Development",
            Specialization::FullStack => "Full-Stack Web Development",
        }
    }
}

/// (pattern, label) rules, highest precedence first. Patterns run against
/// lower-cased text.
const RULES: &[(&str, Specialization)] = &[
    (
        r"\b(ai|ml|machine learning|deep learning|artificial intelligence|llms?|gpt|openai|chatbot|nlp|computer vision|tensorflow|pytorch|langchain|rag)\b",
        Specialization::AiMl,
    ),
    (
        r"scrap(e|er|ers|ing)\b|\bcrawl|\bselenium\b|\bpuppeteer\b|\bplaywright\b|beautifulsoup|\bdata extraction\b|\bbot\b",
        Specialization::WebScraping,
    ),
    (
        r"\b(blockchain|smart contracts?|solidity|web3|ethereum|solana|nft|defi|crypto)\b",
        Specialization::Blockchain,
    ),
    (
        r"\b(android|ios|flutter|react native|swift|kotlin|mobile app)\b",
        Specialization::MobileApps,
    ),
    (
        r"\b(devops|docker|kubernetes|k8s|aws|azure|gcp|terraform|ci/cd|nginx|linux server)\b",
        Specialization::DevOps,
    ),
    (
        r"\b(data analy(st|sis|tics)|dashboard|power bi|tableau|etl|data pipeline|excel|pandas|sql reports?)\b",
        Specialization::DataAnalytics,
    ),
    (
        r"\b(wordpress|woocommerce|shopify|wix|elementor|magento)\b",
        Specialization::WordPressEcommerce,
    ),
    (
        r"\b(react|vue|angular|svelte|frontend|front-end|html|css|tailwind|ui/ux|figma)\b|next\.js",
        Specialization::Frontend,
    ),
    (
        r"\b(backend|back-end|api|rest|graphql|node|django|flask|fastapi|laravel|php|express|python|golang|rust|java|database|postgres|mysql|mongodb)\b",
        Specialization::Backend,
    ),
];

static COMPILED_RULES: Lazy<Vec<(Regex, Specialization)>> = Lazy::new(|| {
    RULES
        .iter()
        .map(|(pattern, label)| {
            (
                Regex::new(pattern).expect("classifier rule must compile"),
                *label,
            )
        })
        .collect()
});

/// Returns the first rule's specialization matching `description`, or
/// `FullStack` when nothing matches or no text is available.
pub fn classify(description: Option<&str>) -> Specialization {
    let Some(text) = description else {
        return Specialization::default();
    };
    let text = text.to_lowercase();
    COMPILED_RULES
        .iter()
        .find(|(pattern, _)| pattern.is_match(&text))
        .map(|(_, label)| *label)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scraper_description_is_scraping() {
        assert_eq!(
            classify(Some("Build a Python scraper using Selenium")),
            Specialization::WebScraping
        );
    }

    /// Python alone would match the backend rule; scraping sits above it.
    #[test]
    fn test_scraping_beats_backend() {
        let text = "Python developer to crawl e-commerce sites and store results in Postgres";
        assert_eq!(classify(Some(text)), Specialization::WebScraping);
    }

    #[test]
    fn test_ai_beats_backend_when_both_match() {
        let text = "Need a FastAPI backend that wraps an LLM chatbot";
        assert_eq!(classify(Some(text)), Specialization::AiMl);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify(Some("WORDPRESS theme fixes")), Specialization::WordPressEcommerce);
    }

    #[test]
    fn test_ai_does_not_match_inside_words() {
        // "email" and "maintain" contain "ai" but are not AI work
        assert_eq!(
            classify(Some("Maintain our email templates in HTML")),
            Specialization::Frontend
        );
    }

    #[test]
    fn test_no_match_defaults_to_full_stack() {
        assert_eq!(classify(Some("Help me move house")), Specialization::FullStack);
        assert_eq!(classify(None), Specialization::FullStack);
        assert_eq!(classify(Some("")), Specialization::FullStack);
    }

    #[test]
    fn test_deterministic() {
        let text = "Flutter app with a Firebase backend";
        let first = classify(Some(text));
        for _ in 0..10 {
            assert_eq!(classify(Some(text)), first);
        }
        assert_eq!(first, Specialization::MobileApps);
    }

    #[test]
    fn test_every_rule_compiles() {
        assert_eq!(COMPILED_RULES.len(), RULES.len());
    }

    #[test]
    fn test_labels_are_unique() {
        let labels: std::collections::HashSet<_> = RULES
            .iter()
            .map(|(_, s)| s.label())
            .chain([Specialization::FullStack.label()])
            .collect();
        assert_eq!(labels.len(), RULES.len() + 1);
    }
}
