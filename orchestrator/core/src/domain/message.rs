// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Inbound rewrite/analyze requests and their validation rules

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_TONE: &str = "neutral";
const MAX_TONE_CHARS: usize = 40;

/// Who the message is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageContext {
    #[default]
    Colleague,
    Manager,
    Client,
    Team,
    External,
}

impl MessageContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageContext::Colleague => "colleague",
            MessageContext::Manager => "manager",
            MessageContext::Client => "client",
            MessageContext::Team => "team",
            MessageContext::External => "external",
        }
    }

    /// Audience description used inside prompts
    pub fn audience(&self) -> &'static str {
        match self {
            MessageContext::Colleague => "a peer colleague",
            MessageContext::Manager => "the sender's manager",
            MessageContext::Client => "a client or customer",
            MessageContext::Team => "the sender's whole team",
            MessageContext::External => "an external partner",
        }
    }
}

impl fmt::Display for MessageContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageContext {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "colleague" => Ok(MessageContext::Colleague),
            "manager" => Ok(MessageContext::Manager),
            "client" => Ok(MessageContext::Client),
            "team" => Ok(MessageContext::Team),
            "external" => Ok(MessageContext::External),
            _ => Err(ValidationError::InvalidContext),
        }
    }
}

/// Client-side input problems, surfaced as a short fixed code
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("TEXT_REQUIRED")]
    TextRequired,

    #[error("TEXT_TOO_LONG")]
    TextTooLong,

    #[error("INVALID_CONTEXT")]
    InvalidContext,

    #[error("INVALID_TONE")]
    InvalidTone,
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::TextRequired => "TEXT_REQUIRED",
            ValidationError::TextTooLong => "TEXT_TOO_LONG",
            ValidationError::InvalidContext => "INVALID_CONTEXT",
            ValidationError::InvalidTone => "INVALID_TONE",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteInput {
    pub text: String,
    pub tone: String,
    pub context: MessageContext,
}

impl RewriteRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: None,
            context: None,
        }
    }

    pub fn with_tone(mut self, tone: impl Into<String>) -> Self {
        self.tone = Some(tone.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn validate(&self, max_text_chars: usize) -> Result<RewriteInput, ValidationError> {
        let text = validate_text(&self.text, max_text_chars)?;
        let tone = match self.tone.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_TONE.to_string(),
            Some(tone) => {
                let allowed = tone
                    .chars()
                    .all(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'));
                if !allowed || tone.chars().count() > MAX_TONE_CHARS {
                    return Err(ValidationError::InvalidTone);
                }
                tone.to_string()
            }
        };
        let context = parse_context(self.context.as_deref())?;
        Ok(RewriteInput {
            text,
            tone,
            context,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeInput {
    pub text: String,
    pub context: MessageContext,
}

impl AnalyzeRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn validate(&self, max_text_chars: usize) -> Result<AnalyzeInput, ValidationError> {
        Ok(AnalyzeInput {
            text: validate_text(&self.text, max_text_chars)?,
            context: parse_context(self.context.as_deref())?,
        })
    }
}

fn validate_text(text: &str, max_text_chars: usize) -> Result<String, ValidationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationError::TextRequired);
    }
    if text.chars().count() > max_text_chars {
        return Err(ValidationError::TextTooLong);
    }
    Ok(text.to_string())
}

fn parse_context(context: Option<&str>) -> Result<MessageContext, ValidationError> {
    match context.map(str::trim) {
        None | Some("") => Ok(MessageContext::default()),
        Some(value) => value.parse(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_defaults() {
        let input = RewriteRequest::new("  send me the report  ").validate(100).unwrap();
        assert_eq!(input.text, "send me the report");
        assert_eq!(input.tone, "neutral");
        assert_eq!(input.context, MessageContext::Colleague);
    }

    #[test]
    fn test_rewrite_validation_codes() {
        assert_eq!(
            RewriteRequest::new(" ").validate(100).unwrap_err(),
            ValidationError::TextRequired
        );
        assert_eq!(
            RewriteRequest::new("hello").validate(3).unwrap_err(),
            ValidationError::TextTooLong
        );
        assert_eq!(
            RewriteRequest::new("hello").with_context("boss").validate(100).unwrap_err(),
            ValidationError::InvalidContext
        );
        assert_eq!(
            RewriteRequest::new("hello").with_tone("{{evil}}").validate(100).unwrap_err(),
            ValidationError::InvalidTone
        );
        assert_eq!(ValidationError::TextRequired.code(), "TEXT_REQUIRED");
    }

    #[test]
    fn test_analyze_accepts_known_context() {
        let input = AnalyzeRequest::new("Per my last email")
            .with_context("Manager")
            .validate(100)
            .unwrap();
        assert_eq!(input.context, MessageContext::Manager);
    }

    #[test]
    fn test_missing_text_deserializes_as_blank() {
        let request: AnalyzeRequest = serde_json::from_str(r#"{"context":"client"}"#).unwrap();
        assert_eq!(request.validate(100).unwrap_err(), ValidationError::TextRequired);
    }
}
