//! Planner configuration: intent→template candidates and tunable thresholds.

use crate::types::{IntentLabel, TemplateId};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Template used when neither the intent nor `point` has candidates.
pub const FALLBACK_CANDIDATES: &[TemplateId] = &[TemplateId::Bullets];

/// Ordered acceptable templates for each intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateMap {
    map: BTreeMap<IntentLabel, Vec<TemplateId>>,
}

impl Default for CandidateMap {
    fn default() -> Self {
        use TemplateId::*;

        let map = [
            (IntentLabel::Recap, vec![Recap]),
            (IntentLabel::Point, vec![Bullets, Definition]),
            (IntentLabel::Example, vec![Bullets, Illustration]),
            (IntentLabel::Comparison, vec![Comparison]),
            (IntentLabel::Process, vec![Process]),
            (IntentLabel::Intro, vec![TitleCard, StrongTitle]),
            (IntentLabel::Cta, vec![Cta]),
        ];

        Self {
            map: map.into_iter().collect(),
        }
    }
}

impl CandidateMap {
    /// An empty map; every intent resolves to [`FALLBACK_CANDIDATES`].
    pub fn empty() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }

    pub fn with(mut self, intent: IntentLabel, candidates: Vec<TemplateId>) -> Self {
        self.map.insert(intent, candidates);
        self
    }

    /// Parse a mapping such as `{"point": ["bullets", "definition"]}`.
    ///
    /// Unknown intent or template names are rejected.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(json)?;
        let mut map = BTreeMap::new();

        for (intent_name, template_names) in raw {
            let intent = IntentLabel::from_name(&intent_name).ok_or_else(|| {
                Error::InvalidConfig(format!("unknown intent '{}'", intent_name))
            })?;

            let templates = template_names
                .iter()
                .map(|name| {
                    TemplateId::from_name(name).ok_or_else(|| {
                        Error::InvalidConfig(format!(
                            "unknown template '{}' for intent '{}'",
                            name, intent_name
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            map.insert(intent, templates);
        }

        Ok(Self { map })
    }

    /// Load a mapping file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Candidates for `intent`, falling back to the `point` list, then to
    /// [`FALLBACK_CANDIDATES`].
    pub fn candidates(&self, intent: IntentLabel) -> &[TemplateId] {
        self.map
            .get(&intent)
            .or_else(|| self.map.get(&IntentLabel::Point))
            .map(Vec::as_slice)
            .unwrap_or(FALLBACK_CANDIDATES)
    }
}

/// Everything the planner needs besides the document itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerConfig {
    pub candidates: CandidateMap,

    /// Sections with at most this many sentences count as short content.
    pub short_content_max_sentences: usize,

    /// List slides with fewer items than this are flagged by the tuner.
    pub min_list_items: usize,

    /// Character cap for section summaries.
    pub summary_max_chars: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            candidates: CandidateMap::default(),
            short_content_max_sentences: 2,
            min_list_items: 3,
            summary_max_chars: 30,
        }
    }
}

impl PlannerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_candidates(mut self, candidates: CandidateMap) -> Self {
        self.candidates = candidates;
        self
    }

    pub fn with_short_content_max_sentences(mut self, sentences: usize) -> Self {
        self.short_content_max_sentences = sentences;
        self
    }

    pub fn with_min_list_items(mut self, items: usize) -> Self {
        self.min_list_items = items;
        self
    }

    pub fn with_summary_max_chars(mut self, chars: usize) -> Self {
        self.summary_max_chars = chars.max(1);
        self
    }
}
