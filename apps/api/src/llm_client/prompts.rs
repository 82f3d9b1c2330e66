// Cross-provider prompt fragments.
// Job-specific prompt text lives in generation::prompts; this file only holds
// what the provider clients add on their own.

/// Sent by every provider variant: Gemini as `systemInstruction`, OpenAI as
/// the leading `system` message.
pub const SYSTEM_INSTRUCTION: &str = "You are an expert freelance proposal writer. \
    Follow the user's formatting rules exactly. \
    Respond with the requested text only: no preamble, no markdown, no explanations.";
