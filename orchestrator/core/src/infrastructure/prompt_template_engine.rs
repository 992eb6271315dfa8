// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Prompt Template Engine
//!
//! Renders the rewrite and analyze prompts handed to the provider layer,
//! using Handlebars for placeholder substitution.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Turn validated requests into prompt strings
//! - **Integration:** `StandardMessageService` → `CallRequest`
//!
//! # Supported Placeholders
//!
//! - `{{text}}` - The user's message, verbatim
//! - `{{tone}}` - Requested target tone (rewrite only)
//! - `{{audience}}` - Human description of the recipient
//! - `{{tones}}` - Allowed tone labels (analyze only)

use anyhow::{Context, Result};
use handlebars::Handlebars;
use serde::Serialize;

use crate::domain::analysis::Tone;
use crate::domain::message::{AnalyzeInput, RewriteInput};

const REWRITE_TEMPLATE: &str = "rewrite";
const ANALYZE_TEMPLATE: &str = "analyze";

const REWRITE_PROMPT: &str = "\
You are an assistant that rewrites short business messages.
Rewrite the message below so it reads as {{tone}} and is appropriate for {{audience}}.
Keep the original meaning and language. Reply with the rewritten message only, without quotes or commentary.

Message:
{{text}}";

const ANALYZE_PROMPT: &str = "\
You are an assistant that reviews the tone of short business messages written to {{audience}}.
Respond with a single JSON object and nothing else, using exactly these fields:
  \"tone\": one of {{tones}}
  \"score\": integer from 0 to 100 rating how well the message suits the audience
  \"suggestions\": array of at most 3 short improvement suggestions

Message:
{{text}}";

/// Context data for prompt template rendering
#[derive(Debug, Clone, Serialize)]
struct PromptContext<'a> {
    text: &'a str,
    audience: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tone: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tones: Option<String>,
}

pub struct PromptTemplateEngine {
    handlebars: Handlebars<'static>,
}

impl PromptTemplateEngine {
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();

        // Prompts are plain text; HTML escaping would mangle quotes and ampersands
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.set_strict_mode(true);

        handlebars
            .register_template_string(REWRITE_TEMPLATE, REWRITE_PROMPT)
            .context("Invalid rewrite prompt template")?;
        handlebars
            .register_template_string(ANALYZE_TEMPLATE, ANALYZE_PROMPT)
            .context("Invalid analyze prompt template")?;

        Ok(Self { handlebars })
    }

    pub fn render_rewrite(&self, input: &RewriteInput) -> Result<String> {
        let context = PromptContext {
            text: &input.text,
            audience: input.context.audience(),
            tone: Some(&input.tone),
            tones: None,
        };
        self.handlebars
            .render(REWRITE_TEMPLATE, &context)
            .context("Failed to render rewrite prompt")
    }

    pub fn render_analyze(&self, input: &AnalyzeInput) -> Result<String> {
        let context = PromptContext {
            text: &input.text,
            audience: input.context.audience(),
            tone: None,
            tones: Some(Tone::catalog()),
        };
        self.handlebars
            .render(ANALYZE_TEMPLATE, &context)
            .context("Failed to render analyze prompt")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::message::MessageContext;

    #[test]
    fn test_rewrite_prompt_keeps_text_verbatim() {
        let engine = PromptTemplateEngine::new().unwrap();
        let prompt = engine
            .render_rewrite(&RewriteInput {
                text: "Q&A <today> \"asap\"".to_string(),
                tone: "friendly".to_string(),
                context: MessageContext::Client,
            })
            .unwrap();

        assert!(prompt.contains("Q&A <today> \"asap\""));
        assert!(prompt.contains("reads as friendly"));
        assert!(prompt.contains("a client or customer"));
    }

    #[test]
    fn test_analyze_prompt_lists_tones() {
        let engine = PromptTemplateEngine::new().unwrap();
        let prompt = engine
            .render_analyze(&AnalyzeInput {
                text: "Per my last email".to_string(),
                context: MessageContext::Manager,
            })
            .unwrap();

        assert!(prompt.contains("Passive-Aggressive"));
        assert!(prompt.contains("\"suggestions\""));
        assert!(prompt.ends_with("Per my last email"));
    }
}
