//! Answer generation capability contract.
//!
//! The orchestrator assembles the prompts; the capability only turns a
//! (system instruction, user prompt, temperature) triple into a completion.

use crate::error::GenerateError;

/// Capability that produces a grounded natural-language completion.
pub trait AnswerGenerator: Send + Sync {
    /// Generate a completion for the given system instruction and user prompt.
    fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> Result<String, GenerateError>;
}
