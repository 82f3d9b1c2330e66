//! Prompt builder: pure functions from a job to the text sent to the provider.
//!
//! The structure of the output (opening line, length bounds, closing line) is
//! enforced through the instructions here rather than by post-processing the
//! model's reply.

use crate::generation::classifier::Specialization;
use crate::generation::prompts::{
    CLOSING_TEMPLATE, MAX_PROPOSAL_LINES, MIN_PROPOSAL_LINES, OPENING_TEMPLATE,
    PROFILE_EXPERIENCE, PROFILE_NAME, PROFILE_STRENGTHS, PROPOSAL_PROMPT_TEMPLATE,
    QUESTIONS_PROMPT_TEMPLATE,
};
use crate::models::job::ProposalContext;

pub fn opening_sentence(specialization: Specialization) -> String {
    render(OPENING_TEMPLATE, &[("specialization", specialization.label())])
}

/// Builds the proposal prompt. The description is embedded verbatim.
pub fn build_proposal_prompt(ctx: &ProposalContext<'_>, specialization: Specialization) -> String {
    let opening = opening_sentence(specialization);
    let min_lines = MIN_PROPOSAL_LINES.to_string();
    let max_lines = MAX_PROPOSAL_LINES.to_string();
    let facts = project_facts(ctx);
    render(
        PROPOSAL_PROMPT_TEMPLATE,
        &[
            ("profile_name", PROFILE_NAME),
            ("profile_experience", PROFILE_EXPERIENCE),
            ("profile_strengths", PROFILE_STRENGTHS),
            ("specialization", specialization.label()),
            ("opening", &opening),
            ("closing", CLOSING_TEMPLATE),
            ("min_lines", &min_lines),
            ("max_lines", &max_lines),
            ("project_facts", &facts),
            ("description", ctx.description),
        ],
    )
}

pub fn build_questions_prompt(ctx: &ProposalContext<'_>) -> String {
    render(QUESTIONS_PROMPT_TEMPLATE, &[("description", ctx.description)])
}

/// Fills `{name}` placeholders in one left-to-right pass. Substituted text is
/// never scanned again, and unknown `{...}` runs are copied through.
fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let placeholder = tail
            .find('}')
            .map(|end| &tail[1..end])
            .and_then(|name| values.iter().find(|(key, _)| *key == name));

        match placeholder {
            Some((name, value)) => {
                out.push_str(value);
                rest = &tail[name.len() + 2..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn project_facts(ctx: &ProposalContext<'_>) -> String {
    let job = ctx.job;
    let mut facts = Vec::new();

    if let Some(text) = &job.project_budget.text {
        facts.push(format!("- Client budget: {text}"));
    }
    if let Some(amount) = job.bid_amount {
        facts.push(format!("- Planned bid amount: {amount}"));
    }
    if let Some(days) = job.delivery_time_days {
        facts.push(format!("- Planned delivery time: {days} days"));
    }

    if facts.is_empty() {
        "- No budget or timeline details were provided.".to_string()
    } else {
        facts.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::classifier::classify;
    use crate::models::job::{JobDetails, ProjectBudget};

    fn job(description: &str) -> JobDetails {
        JobDetails {
            description: Some(description.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_scraper_round_trip_contains_label_and_description() {
        let description = "Build a Python scraper using Selenium";
        let job = job(description);
        let ctx = ProposalContext::from_job(&job).unwrap();
        let specialization = classify(Some(ctx.description));
        assert_ne!(specialization, Specialization::FullStack);

        let prompt = build_proposal_prompt(&ctx, specialization);
        assert!(prompt.contains(specialization.label()));
        assert!(prompt.contains(description));
    }

    #[test]
    fn test_prompt_enforces_structure() {
        let job = job("Set up CI for a Rust monorepo");
        let ctx = ProposalContext::from_job(&job).unwrap();
        let prompt = build_proposal_prompt(&ctx, Specialization::DevOps);

        assert!(prompt.contains(&opening_sentence(Specialization::DevOps)));
        assert!(prompt.contains(CLOSING_TEMPLATE));
        assert!(prompt.contains(&format!(
            "between {MIN_PROPOSAL_LINES} and {MAX_PROPOSAL_LINES} lines"
        )));
        assert!(!prompt.contains("{opening}"));
        assert!(!prompt.contains("{project_facts}"));
    }

    #[test]
    fn test_description_with_braces_is_kept_verbatim() {
        let description = "Template engine must render {specialization} and {closing} literally";
        let job = job(description);
        let ctx = ProposalContext::from_job(&job).unwrap();
        let prompt = build_proposal_prompt(&ctx, Specialization::Backend);
        assert!(prompt.contains(description));
    }

    #[test]
    fn test_page_text_is_substituted_once() {
        let job = JobDetails {
            description: Some("Fix the {project_facts} section of our docs".to_string()),
            project_budget: ProjectBudget {
                text: Some("{description} $50".to_string()),
                min: Some(50.0),
                max: Some(50.0),
            },
            ..Default::default()
        };
        let ctx = ProposalContext::from_job(&job).unwrap();
        let prompt = build_proposal_prompt(&ctx, Specialization::FullStack);

        assert!(prompt.contains("- Client budget: {description} $50"));
        assert!(prompt.contains("Fix the {project_facts} section of our docs"));
        assert_eq!(prompt.matches("Fix the").count(), 1);
    }

    #[test]
    fn test_render_copies_unknown_braces() {
        assert_eq!(
            render("{a} {b} {a}{", &[("a", "x{b}")]),
            "x{b} {b} x{b}{"
        );
    }

    #[test]
    fn test_project_facts_listed_when_present() {
        let job = JobDetails {
            description: Some("Logo design".to_string()),
            project_budget: ProjectBudget {
                text: Some("$30 - $250 USD".to_string()),
                min: Some(30.0),
                max: Some(250.0),
            },
            bid_amount: Some(120.0),
            delivery_time_days: Some(3),
        };
        let ctx = ProposalContext::from_job(&job).unwrap();
        let prompt = build_proposal_prompt(&ctx, Specialization::FullStack);
        assert!(prompt.contains("Client budget: $30 - $250 USD"));
        assert!(prompt.contains("Planned bid amount: 120"));
        assert!(prompt.contains("Planned delivery time: 3 days"));
    }

    #[test]
    fn test_questions_prompt_contains_description() {
        let job = job("Migrate a Django app to Postgres");
        let ctx = ProposalContext::from_job(&job).unwrap();
        let prompt = build_questions_prompt(&ctx);
        assert!(prompt.contains("Migrate a Django app to Postgres"));
        assert!(prompt.contains("between 3 and 5"));
    }
}
