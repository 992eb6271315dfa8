// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Analysis
//!
//! Structured tone analysis returned by the analyze endpoint.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Always well-formed result shape; coercion lives in
//!   `application::normalizer`

use serde::{Serialize, Serializer};
use std::fmt;

pub const MAX_SCORE: u8 = 100;
pub const MAX_SUGGESTIONS: usize = 3;

/// Closed set of tones an analysis may report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tone {
    #[default]
    Neutral,
    Friendly,
    Formal,
    Direct,
    Assertive,
    Aggressive,
    PassiveAggressive,
    Apologetic,
}

impl Tone {
    pub const ALL: [Tone; 8] = [
        Tone::Neutral,
        Tone::Friendly,
        Tone::Formal,
        Tone::Direct,
        Tone::Assertive,
        Tone::Aggressive,
        Tone::PassiveAggressive,
        Tone::Apologetic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Neutral => "Neutral",
            Tone::Friendly => "Friendly",
            Tone::Formal => "Formal",
            Tone::Direct => "Direct",
            Tone::Assertive => "Assertive",
            Tone::Aggressive => "Aggressive",
            Tone::PassiveAggressive => "Passive-Aggressive",
            Tone::Apologetic => "Apologetic",
        }
    }

    /// Case-insensitive lookup; `passive aggressive`, `passive_aggressive`
    /// and `Passive-Aggressive` are all accepted.
    pub fn parse(value: &str) -> Option<Tone> {
        let wanted = canonical_key(value);
        Tone::ALL
            .into_iter()
            .find(|tone| canonical_key(tone.as_str()) == wanted)
    }

    /// Comma separated list, used in the analyze prompt
    pub fn catalog() -> String {
        Tone::ALL.map(|t| t.as_str()).join(", ")
    }
}

fn canonical_key(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| match c {
            '_' | ' ' => '-',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Tone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    pub tone: Tone,
    /// Always within 0..=100
    pub score: u8,
    /// At most three entries
    pub suggestions: Vec<String>,
}

impl AnalysisResult {
    pub fn new(tone: Tone, score: i64, suggestions: Vec<String>) -> Self {
        let score = score.clamp(0, i64::from(MAX_SCORE)) as u8;
        let mut suggestions = suggestions;
        suggestions.truncate(MAX_SUGGESTIONS);
        Self {
            tone,
            score,
            suggestions,
        }
    }
}
