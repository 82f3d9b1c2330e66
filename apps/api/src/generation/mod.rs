// Proposal generation: specialization classifier, prompt assembly and the
// orchestrator that routes one attempt to the active provider.
// All provider HTTP calls go through llm_client.

pub mod classifier;
pub mod orchestrator;
pub mod prompt_builder;
pub mod prompts;
