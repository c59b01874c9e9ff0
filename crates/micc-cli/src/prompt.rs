//! Interactive parameter entry on the terminal.

use dialoguer::{Confirm, Input};

use micc_core::application::ports::Prompter;
use micc_core::domain::{DomainError, ParameterSpec, ParameterType};
use micc_core::error::MiccResult;

/// Asks for template parameters that have neither an override nor a default.
#[derive(Debug, Default)]
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for DialoguerPrompter {
    fn ask(&self, spec: &ParameterSpec) -> MiccResult<String> {
        let unresolved = |e: dialoguer::Error| {
            tracing::debug!("Prompt for '{}' failed: {e}", spec.name);
            DomainError::UnresolvedParameter {
                name: spec.name.clone(),
            }
        };
        let answer = match spec.kind {
            ParameterType::Bool => Confirm::new()
                .with_prompt(spec.prompt_text())
                .interact()
                .map(|yes| yes.to_string())
                .map_err(unresolved)?,
            ParameterType::String | ParameterType::Int => Input::<String>::new()
                .with_prompt(spec.prompt_text())
                .interact_text()
                .map_err(unresolved)?,
        };
        Ok(answer)
    }
}
