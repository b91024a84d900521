//! Fenced-section scanning of raw model replies.
//!
//! Replies are expected to answer in named fenced blocks
//! (```` ```name ``` ````). The scan is line-oriented: a fence line
//! opens a section named by the rest of the line, a bare ``` line closes
//! it. Unclosed sections are dropped; when a name repeats, the last
//! occurrence wins.

use std::collections::BTreeMap;

/// The named sections found in one reply, keyed by section name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segments {
    sections: BTreeMap<String, String>,
}

impl Segments {
    pub fn scan(text: &str) -> Segments {
        let mut sections = BTreeMap::new();
        let mut current: Option<(String, Vec<&str>)> = None;
        for line in text.lines() {
            let trimmed = line.trim();
            match &mut current {
                None => {
                    if let Some(rest) = trimmed.strip_prefix("```") {
                        current = Some((rest.trim().to_string(), Vec::new()));
                    }
                }
                Some((name, lines)) => {
                    if trimmed == "```" {
                        sections
                            .insert(std::mem::take(name), lines.join("\n").trim().to_string());
                        current = None;
                    } else {
                        lines.push(line);
                    }
                }
            }
        }
        Segments { sections }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.sections.get(name).map(String::as_str)
    }

    /// The trimmed content of the `output` section, when present.
    pub fn output(&self) -> Option<&str> {
        self.get("output")
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.sections
    }
}
