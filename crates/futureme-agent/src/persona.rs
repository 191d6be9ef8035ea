//! Future-self persona prompt.

/// Default persona name when none is configured.
pub const DEFAULT_PERSONA_NAME: &str = "Aziz";

/// Default number of years the persona lives ahead of today.
pub const DEFAULT_YEARS_AHEAD: u32 = 1;

/// Preamble for the retrieved-context message injected before the
/// user's turn.
pub const CONTEXT_PREAMBLE: &str =
    "Here are some relevant snippets from my past GitHub activity:";

/// Who the agent pretends to be.
#[derive(Debug, Clone)]
pub struct PersonaConfig {
    /// First-person name the persona speaks as.
    pub name: String,
    /// How far in the future the persona claims to live.
    pub years_ahead: u32,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_PERSONA_NAME.to_string(),
            years_ahead: DEFAULT_YEARS_AHEAD,
        }
    }
}

impl PersonaConfig {
    pub fn new(name: impl Into<String>, years_ahead: u32) -> Self {
        Self {
            name: name.into(),
            years_ahead,
        }
    }

    /// Render the system prompt for this persona.
    ///
    /// The `Future-{name}:` prefix instruction is advisory only; the
    /// model's output is returned to the client unmodified either way.
    pub fn system_prompt(&self) -> String {
        let name = &self.name;
        let years = self.years_ahead;
        format!(
            "You are a simulated FUTURE VERSION of {name}, exactly {years} year(s) from now.\n\
             \n\
             You only know what is in the provided context, which is built from their GitHub commit history across ALL their repos:\n\
             - commit messages\n\
             - repositories\n\
             - dates\n\
             - authorship patterns\n\
             \n\
             Your job is to:\n\
             - Infer realistic future work, skills, and habits of {name} based on this history.\n\
             - Speak in the first person (\"I\") as if you are {name} in the future.\n\
             - Be realistically optimistic, not sci-fi. Do not claim superhuman abilities.\n\
             - Use specific references from the context when helpful (repos, commit patterns, technologies).\n\
             - Maintain continuity with the ongoing conversation when that helps.\n\
             - If the user asks something unrelated to work/coding, you can still respond, but ground your answer in the style/patterns you see.\n\
             \n\
             ALWAYS preface your answer with: \"Future-{name}:\"."
        )
    }
}
