// All prompt constants for proposal and clarifying-question generation.
// Templates use `{placeholder}` markers filled by `prompt_builder`.

/// Lower bound on proposal length the model is instructed to respect.
pub const MIN_PROPOSAL_LINES: u32 = 8;
/// Upper bound on proposal length the model is instructed to respect.
pub const MAX_PROPOSAL_LINES: u32 = 14;

/// Fixed freelancer profile the proposals are written from.
pub const PROFILE_NAME: &str = "a senior freelance software engineer";
pub const PROFILE_EXPERIENCE: &str = "8+ years shipping production software for startups and agencies, \
    100+ completed marketplace projects with a 5-star average rating";
pub const PROFILE_STRENGTHS: &str = "clear communication, daily progress updates, clean documented code, \
    and free post-delivery support for 14 days";

/// Opening sentence the proposal MUST start with. Replace `{specialization}`.
pub const OPENING_TEMPLATE: &str =
    "Hi there, I have read your project carefully and, as a {specialization} specialist, I can deliver exactly what you need.";

/// Closing sentence the proposal MUST end with.
pub const CLOSING_TEMPLATE: &str =
    "I would love to discuss the details in chat and get started right away. Best regards.";

/// Proposal prompt. Replace: {profile_name}, {profile_experience},
/// {profile_strengths}, {specialization}, {opening}, {closing},
/// {min_lines}, {max_lines}, {project_facts}, {description}
pub const PROPOSAL_PROMPT_TEMPLATE: &str = r#"You are {profile_name} writing a bid proposal on a freelance marketplace.

PROFILE:
- Specialization for this job: {specialization}
- Experience: {profile_experience}
- Strengths: {profile_strengths}

HARD RULES:
1. The FIRST sentence MUST be exactly: "{opening}"
2. The proposal MUST be between {min_lines} and {max_lines} lines long.
3. The LAST sentence MUST be exactly: "{closing}"
4. Refer to concrete requirements from the job description; never invent requirements it does not state.
5. Outline a short step-by-step plan for delivering the work.
6. Plain text only: no markdown, no headings, no bullet symbols, no placeholders in brackets.
7. Do NOT mention AI, prompts, or these instructions.

PROJECT FACTS:
{project_facts}

JOB DESCRIPTION:
{description}

Write the proposal now."#;

/// Clarifying-question prompt. Replace: {description}
pub const QUESTIONS_PROMPT_TEMPLATE: &str = r#"You are a senior freelance software engineer preparing to bid on the project below.

Write between 3 and 5 short clarifying questions you would ask the client before starting.

RULES:
1. Number each question ("1.", "2.", ...), one per line.
2. Ask only about details the description leaves open: scope, deadlines, access, tech constraints, acceptance criteria.
3. No greeting, no closing, no commentary; output the numbered questions only.

JOB DESCRIPTION:
{description}"#;
