//! Template selection as an ordered list of heuristics.
//!
//! Structural intents (comparison, process) are hard overrides and are never
//! displaced by a content-shape heuristic.

use crate::config::PlannerConfig;
use crate::rules::{first_match, Rule};
use crate::types::{IntentLabel, Section, TemplateId};

/// Selected when a candidate list is empty.
pub const DEFAULT_TEMPLATE: TemplateId = TemplateId::TitleCard;

/// Heading fragments marking a table of contents (matched case-insensitively).
const TOC_MARKERS: &[&str] = &["目次", "table of contents", "agenda"];

/// What the selection rules look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionContext {
    pub intent: IntentLabel,
    pub summary: String,
    pub sentence_count: usize,
    pub candidates: Vec<TemplateId>,
    pub short_content_max_sentences: usize,
}

impl SelectionContext {
    fn offers(&self, template: TemplateId) -> bool {
        self.candidates.contains(&template)
    }
}

fn intent_override(ctx: &SelectionContext) -> Option<TemplateId> {
    match ctx.intent {
        IntentLabel::Comparison => Some(TemplateId::Comparison),
        IntentLabel::Process => Some(TemplateId::Process),
        _ => None,
    }
}

fn toc_heading(ctx: &SelectionContext) -> Option<TemplateId> {
    let summary = ctx.summary.to_lowercase();
    let is_toc = TOC_MARKERS.iter().any(|marker| summary.contains(marker));
    (is_toc && ctx.offers(TemplateId::ListToc)).then_some(TemplateId::ListToc)
}

fn list_intent(ctx: &SelectionContext) -> Option<TemplateId> {
    let list_like = matches!(ctx.intent, IntentLabel::Point | IntentLabel::Recap);
    (list_like && ctx.offers(TemplateId::ListToc)).then_some(TemplateId::ListToc)
}

fn short_content(ctx: &SelectionContext) -> Option<TemplateId> {
    if ctx.sentence_count > ctx.short_content_max_sentences {
        return None;
    }
    [TemplateId::StrongTitle, TemplateId::Definition]
        .into_iter()
        .find(|t| ctx.offers(*t))
}

fn generic_default(ctx: &SelectionContext) -> Option<TemplateId> {
    if ctx.offers(TemplateId::Bullets) {
        return Some(TemplateId::Bullets);
    }
    Some(ctx.candidates.first().copied().unwrap_or(DEFAULT_TEMPLATE))
}

/// Built-in selection rules, evaluated in order.
pub const SELECTION_RULES: &[Rule<SelectionContext, TemplateId>] = &[
    Rule::new("intent_override", intent_override),
    Rule::new("toc_heading", toc_heading),
    Rule::new("list_intent", list_intent),
    Rule::new("short_content", short_content),
    Rule::new("generic_default", generic_default),
];

/// Maps a section to exactly one template.
#[derive(Debug, Clone)]
pub struct TemplateSelector {
    rules: Vec<Rule<SelectionContext, TemplateId>>,
}

impl Default for TemplateSelector {
    fn default() -> Self {
        Self {
            rules: SELECTION_RULES.to_vec(),
        }
    }
}

impl TemplateSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom rule order.
    pub fn with_rules(rules: Vec<Rule<SelectionContext, TemplateId>>) -> Self {
        Self { rules }
    }

    /// Build the rule context for a section.
    pub fn context(&self, section: &Section, config: &PlannerConfig) -> SelectionContext {
        SelectionContext {
            intent: section.intent,
            summary: section.summary.clone(),
            sentence_count: section.lines.len(),
            candidates: config.candidates.candidates(section.intent).to_vec(),
            short_content_max_sentences: config.short_content_max_sentences,
        }
    }

    /// Select the template for `section`.
    pub fn select(&self, section: &Section, config: &PlannerConfig) -> TemplateId {
        let ctx = self.context(section, config);
        match first_match(&self.rules, &ctx) {
            Some((rule, template)) => {
                log::debug!("{}: rule '{}' selected {}", section.id, rule, template);
                template
            }
            None => DEFAULT_TEMPLATE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CandidateMap;

    fn section(intent: IntentLabel, summary: &str, sentences: usize) -> Section {
        Section {
            id: "S001".to_string(),
            summary: summary.to_string(),
            intent,
            lines: (0..sentences).map(|i| format!("Sentence {}.", i)).collect(),
        }
    }

    fn config_with(intent: IntentLabel, candidates: Vec<TemplateId>) -> PlannerConfig {
        PlannerConfig::new().with_candidates(CandidateMap::empty().with(intent, candidates))
    }

    #[test]
    fn test_comparison_always_wins() {
        let selector = TemplateSelector::new();
        let config = config_with(
            IntentLabel::Comparison,
            vec![TemplateId::Definition, TemplateId::Bullets, TemplateId::ListToc],
        );

        for sentences in [1, 2, 10] {
            let s = section(IntentLabel::Comparison, "目次", sentences);
            assert_eq!(selector.select(&s, &config), TemplateId::Comparison);
        }
    }

    #[test]
    fn test_process_override_ignores_candidates() {
        let selector = TemplateSelector::new();
        let config = config_with(IntentLabel::Process, vec![TemplateId::Definition]);
        let s = section(IntentLabel::Process, "How", 1);
        assert_eq!(selector.select(&s, &config), TemplateId::Process);
    }

    #[test]
    fn test_toc_heading_prefers_list_toc() {
        let selector = TemplateSelector::new();
        let config = config_with(
            IntentLabel::Example,
            vec![TemplateId::Bullets, TemplateId::ListToc],
        );

        let s = section(IntentLabel::Example, "本日の目次", 4);
        assert_eq!(selector.select(&s, &config), TemplateId::ListToc);

        let s = section(IntentLabel::Example, "Today's Agenda", 4);
        assert_eq!(selector.select(&s, &config), TemplateId::ListToc);

        let s = section(IntentLabel::Example, "Examples", 4);
        assert_eq!(selector.select(&s, &config), TemplateId::Bullets);
    }

    #[test]
    fn test_list_intent_beats_short_content() {
        let selector = TemplateSelector::new();
        let config = config_with(
            IntentLabel::Point,
            vec![TemplateId::Definition, TemplateId::ListToc],
        );
        let s = section(IntentLabel::Point, "Tips", 1);
        assert_eq!(selector.select(&s, &config), TemplateId::ListToc);
    }

    #[test]
    fn test_short_content() {
        let selector = TemplateSelector::new();
        let config = PlannerConfig::new();

        let s = section(IntentLabel::Point, "Intro", 1);
        assert_eq!(selector.select(&s, &config), TemplateId::Definition);

        let s = section(IntentLabel::Point, "Intro", 2);
        assert_eq!(selector.select(&s, &config), TemplateId::Definition);

        let s = section(IntentLabel::Point, "Intro", 3);
        assert_eq!(selector.select(&s, &config), TemplateId::Bullets);

        // Strong statement is preferred when offered.
        let s = section(IntentLabel::Intro, "Hello", 1);
        assert_eq!(selector.select(&s, &config), TemplateId::StrongTitle);
    }

    #[test]
    fn test_short_content_threshold_is_configurable() {
        let selector = TemplateSelector::new();
        let config = PlannerConfig::new().with_short_content_max_sentences(3);
        let s = section(IntentLabel::Point, "Intro", 3);
        assert_eq!(selector.select(&s, &config), TemplateId::Definition);
    }

    #[test]
    fn test_generic_default_path() {
        let selector = TemplateSelector::new();

        let config = config_with(IntentLabel::Cta, vec![TemplateId::Cta, TemplateId::Bullets]);
        let s = section(IntentLabel::Cta, "Subscribe", 5);
        assert_eq!(selector.select(&s, &config), TemplateId::Bullets);

        let config = config_with(IntentLabel::Cta, vec![TemplateId::Cta]);
        assert_eq!(selector.select(&s, &config), TemplateId::Cta);

        let config = config_with(IntentLabel::Cta, vec![]);
        assert_eq!(selector.select(&s, &config), DEFAULT_TEMPLATE);
    }

    #[test]
    fn test_custom_rule_order() {
        let selector = TemplateSelector::with_rules(vec![
            Rule::new("short_content", short_content),
            Rule::new("intent_override", intent_override),
        ]);
        let config = config_with(IntentLabel::Process, vec![TemplateId::Definition]);
        let s = section(IntentLabel::Process, "How", 1);
        assert_eq!(selector.select(&s, &config), TemplateId::Definition);

        let s = section(IntentLabel::Point, "How", 5);
        assert_eq!(selector.select(&s, &config), DEFAULT_TEMPLATE);
    }
}
