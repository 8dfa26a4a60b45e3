//! Assistant roles and their system-prompt presets.

use std::fmt;

/// The role an assistant node runs under.
///
/// Each role maps to a fixed system prompt.  Parsing is infallible: any
/// string that isn't a known role falls back to [`AssistantRole::General`],
/// so a typo in a workflow definition degrades instead of failing the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssistantRole {
    Research,
    Writing,
    Marketing,
    CustomerSupport,
    CodeReview,
    General,
    Custom,
}

impl AssistantRole {
    /// Parse a wire-format role name, defaulting to `General` for anything
    /// unrecognised.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "research" => Self::Research,
            "writing" => Self::Writing,
            "marketing" => Self::Marketing,
            "customer_support" => Self::CustomerSupport,
            "code_review" => Self::CodeReview,
            "general" => Self::General,
            "custom" => Self::Custom,
            _ => Self::General,
        }
    }

    /// Wire-format name (snake_case, matches the authoring frontend).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Research => "research",
            Self::Writing => "writing",
            Self::Marketing => "marketing",
            Self::CustomerSupport => "customer_support",
            Self::CodeReview => "code_review",
            Self::General => "general",
            Self::Custom => "custom",
        }
    }

    /// The system prompt sent alongside every completion for this role.
    pub fn system_prompt(&self) -> &'static str {
        match self {
            Self::Research => {
                "You are a research assistant. Gather the relevant facts, \
                 weigh conflicting sources, and answer with a concise, \
                 well-organised summary of what is known."
            }
            Self::Writing => {
                "You are a writing assistant. Produce clear, well-structured \
                 prose in the tone the prompt asks for, and keep the output \
                 ready to publish without further editing."
            }
            Self::Marketing => {
                "You are a marketing assistant. Write persuasive, on-brand \
                 copy focused on the audience and the action you want them \
                 to take."
            }
            Self::CustomerSupport => {
                "You are a customer support assistant. Be empathetic and \
                 precise, resolve the customer's problem step by step, and \
                 never invent product behaviour."
            }
            Self::CodeReview => {
                "You are a code review assistant. Point out correctness \
                 issues first, then style, and suggest concrete fixes with \
                 short code examples."
            }
            Self::General => {
                "You are a helpful assistant. Answer the prompt directly and \
                 completely."
            }
            Self::Custom => {
                "Follow the instructions in the prompt exactly as written."
            }
        }
    }
}

impl fmt::Display for AssistantRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
