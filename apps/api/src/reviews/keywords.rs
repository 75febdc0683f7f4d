//! Keyword tables for the content heuristics of the extended review score.
//!
//! Matching is a plain case-insensitive substring check: no stemming, no
//! locale awareness. Bump `version` whenever a table changes so score shifts
//! can be traced back to a table revision.

use serde::{Deserialize, Serialize};

/// Tables loaded from a file may omit fields; missing ones take the version 1 defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentKeywords {
    pub version: u32,
    /// Any hit → +5.
    pub topics: Vec<String>,
    /// Both must be present → +10.
    pub pros_marker: String,
    pub cons_marker: String,
    /// Any hit → +3.
    pub endorsements: Vec<String>,
    /// Any hit (or an all-caps text) → −5.
    pub hype_markers: Vec<String>,
    /// Any hit on a short text → −10.
    pub generic_phrases: Vec<String>,
    /// One of each → +8.
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

impl Default for ContentKeywords {
    fn default() -> Self {
        Self {
            version: 1,
            topics: words(&["gameplay", "graphics", "story"]),
            pros_marker: "pros".to_string(),
            cons_marker: "cons".to_string(),
            endorsements: words(&["recommend", "worth"]),
            hype_markers: words(&["10/10", "100%"]),
            generic_phrases: words(&[
                "good game",
                "great game",
                "best game",
                "fun game",
                "nice game",
                "love it",
                "bad game",
                "worst game",
                "trash",
                "garbage",
                "waste of money",
            ]),
            positive: words(&[
                "great",
                "good",
                "love",
                "excellent",
                "amazing",
                "fun",
                "enjoy",
                "beautiful",
            ]),
            negative: words(&[
                "bad",
                "boring",
                "bug",
                "crash",
                "issue",
                "problem",
                "disappoint",
                "annoying",
                "lacks",
            ]),
        }
    }
}

impl ContentKeywords {
    /// `text` must already be lowercased.
    pub fn any_in(table: &[String], text: &str) -> bool {
        table.iter().any(|kw| text.contains(kw.as_str()))
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}
