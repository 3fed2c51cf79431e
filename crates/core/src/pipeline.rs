//! The planning pipeline: segment, classify, select, extract, estimate.
//!
//! Sections are planned one at a time in document order. A failed oracle
//! call only affects its own section, which falls back to deterministic
//! fields and is recorded as a [`Diagnostic`].

use crate::catalog::TemplateCatalog;
use crate::config::PlannerConfig;
use crate::estimate::estimate;
use crate::extract::{Extraction, FieldExtractor};
use crate::intent::IntentClassifier;
use crate::segment::Segmenter;
use crate::select::TemplateSelector;
use crate::tune::{TuneReport, Tuner};
use crate::types::{Section, SlidePlan, TemplateId};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Note attached to slides within budget.
pub const NOTE_OK: &str = "OK";

/// Note attached to slides estimated to overflow.
pub const NOTE_OVERFLOW: &str = "文字が多いかも。短文化/分割を検討";

/// A recovered extraction failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub section_id: String,
    pub template: TemplateId,
    /// Machine-readable reason, e.g. `timeout`.
    pub code: String,
    pub message: String,
}

/// Sections artifact written by the segmentation stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionsDocument {
    pub sections: Vec<Section>,
}

/// Plan artifact consumed by the renderers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanDocument {
    pub slides: Vec<SlidePlan>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tuning: Option<TuneReport>,
}

impl PlanDocument {
    /// Load a plan artifact from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Attach a tuning report, leaving the slides untouched.
    pub fn with_tuning(mut self, report: TuneReport) -> Self {
        self.tuning = Some(report);
        self
    }
}

/// Drives every stage for a document.
#[derive(Debug)]
pub struct Planner {
    config: PlannerConfig,
    catalog: TemplateCatalog,
    segmenter: Segmenter,
    selector: TemplateSelector,
    extractor: FieldExtractor,
}

impl Default for Planner {
    fn default() -> Self {
        Self::new(PlannerConfig::default())
    }
}

impl Planner {
    /// Create a planner with the standard catalog and no oracle.
    pub fn new(config: PlannerConfig) -> Self {
        let segmenter = Segmenter::new().with_summary_max_chars(config.summary_max_chars);
        Self {
            config,
            catalog: TemplateCatalog::standard(),
            segmenter,
            selector: TemplateSelector::new(),
            extractor: FieldExtractor::new(),
        }
    }

    pub fn with_catalog(mut self, catalog: TemplateCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_classifier(mut self, classifier: IntentClassifier) -> Self {
        self.segmenter = self.segmenter.with_classifier(classifier);
        self
    }

    pub fn with_selector(mut self, selector: TemplateSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_extractor(mut self, extractor: FieldExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// A tuner using this planner's thresholds.
    pub fn tuner(&self) -> Tuner {
        Tuner::new().with_min_list_items(self.config.min_list_items)
    }

    /// Split a document into classified sections.
    pub fn segment(&self, document: &str) -> Vec<Section> {
        self.segmenter.segment(document)
    }

    /// Plan one section.
    pub fn plan_section(&self, section: &Section) -> (SlidePlan, Option<Diagnostic>) {
        let template = self.selector.select(section, &self.config);
        let budget = self.catalog.budget(template);

        let extraction = self.extractor.extract(section, template, &budget);
        let diagnostic = extraction.fallback_reason().map(|reason| Diagnostic {
            section_id: section.id.clone(),
            template,
            code: reason.code().to_string(),
            message: reason.to_string(),
        });
        if let Extraction::Oracle(_) = extraction {
            log::debug!("{}: using oracle fields", section.id);
        }

        let fields = extraction.into_fields();
        let constraints_result = estimate(&fields, &budget);
        let notes = if constraints_result.overflows() {
            NOTE_OVERFLOW
        } else {
            NOTE_OK
        };

        log::debug!(
            "{}: intent={} template={} est={}/{} score={}",
            section.id,
            section.intent,
            template,
            constraints_result.estimated_lines,
            constraints_result.max_lines,
            constraints_result.visual_score
        );

        (
            SlidePlan::new(section.id.clone(), fields, constraints_result, notes),
            diagnostic,
        )
    }

    /// Plan already-segmented sections, one slide per section, in order.
    pub fn plan_sections(&self, sections: &[Section]) -> PlanDocument {
        let mut document = PlanDocument::default();

        for section in sections {
            let (plan, diagnostic) = self.plan_section(section);
            document.slides.push(plan);
            document.diagnostics.extend(diagnostic);
        }

        log::info!(
            "Planned {} slides ({} extraction fallbacks)",
            document.slides.len(),
            document.diagnostics.len()
        );
        document
    }

    /// Plan a whole document.
    ///
    /// Fails only when the document yields no sections at all.
    pub fn plan(&self, document: &str) -> Result<PlanDocument> {
        let sections = self.segment(document);
        if sections.is_empty() {
            return Err(Error::EmptyDocument);
        }
        Ok(self.plan_sections(&sections))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CandidateMap;
    use crate::extract::{Oracle, OracleError, OracleRequest};
    use crate::tune::TuneStatus;
    use crate::types::{IntentLabel, ListFields, SlideFields};
    use std::time::Duration;

    const SCRIPT: &str = "## Intro\nWelcome to the show.\n\
                          ## Steps\nFirst boil water. Then add rice. Finally simmer.";

    const LONG_SCRIPT: &str = "\
## はじめに
今日は料理の話です。
短い導入です。

## 手順
材料を洗う → 切る → 煮る

## 比較してみよう
速い、安い、うまい
遅い、高い

## まとめ
一つ目。二つ目。三つ目。四つ目。
---
チャンネル登録お願いします。

## 空のセクション

";

    struct FailingOracle;

    impl Oracle for FailingOracle {
        fn name(&self) -> &str {
            "failing"
        }

        fn complete(&self, _request: &OracleRequest) -> std::result::Result<String, OracleError> {
            Err(OracleError::Timeout(Duration::from_millis(10)))
        }
    }

    struct EchoOracle;

    impl Oracle for EchoOracle {
        fn name(&self) -> &str {
            "echo"
        }

        fn complete(&self, request: &OracleRequest) -> std::result::Result<String, OracleError> {
            Ok(format!(
                "{{\"title\": \"{}\", \"items\": [\"a\", \"b\", \"c\"], \
                 \"points\": [\"p\"], \"subtitle\": \"s\"}}",
                request.section_id
            ))
        }
    }

    #[test]
    fn test_two_section_scenario() {
        let plan = Planner::default().plan(SCRIPT).unwrap();
        assert_eq!(plan.slides.len(), 2);

        let intro = &plan.slides[0];
        assert_eq!(intro.section_id, "S001");
        assert_eq!(intro.template(), TemplateId::Definition);

        let steps = &plan.slides[1];
        assert_eq!(steps.template(), TemplateId::Bullets);
        assert_eq!(
            steps.fields(),
            &SlideFields::Bullets(ListFields {
                title: "Steps".to_string(),
                items: vec![
                    "First boil water.".to_string(),
                    "Then add rice.".to_string(),
                    "Finally simmer.".to_string(),
                ],
            })
        );
        assert_eq!(steps.constraints_result.estimated_lines, 4);
        assert_eq!(steps.constraints_result.visual_score, 100);
        assert_eq!(steps.notes, NOTE_OK);
        assert!(plan.diagnostics.is_empty());
    }

    #[test]
    fn test_one_plan_per_section_in_order() {
        let planner = Planner::default();
        let sections = planner.segment(LONG_SCRIPT);
        let plan = planner.plan(LONG_SCRIPT).unwrap();

        assert_eq!(sections.len(), 5);
        assert_eq!(plan.slides.len(), sections.len());
        for (section, slide) in sections.iter().zip(&plan.slides) {
            assert_eq!(section.id, slide.section_id);
        }
    }

    #[test]
    fn test_long_script_templates() {
        let plan = Planner::default().plan(LONG_SCRIPT).unwrap();
        let templates: Vec<_> = plan.slides.iter().map(|s| s.template()).collect();

        assert_eq!(
            templates,
            vec![
                TemplateId::StrongTitle,
                TemplateId::Process,
                TemplateId::Comparison,
                TemplateId::Recap,
                TemplateId::Cta,
            ]
        );

        let SlideFields::Process(process) = plan.slides[1].fields() else {
            panic!("expected process fields");
        };
        assert_eq!(process.steps, vec!["材料を洗う", "切る", "煮る"]);
    }

    #[test]
    fn test_deterministic_without_oracle() {
        let a = serde_json::to_string(&Planner::default().plan(LONG_SCRIPT).unwrap()).unwrap();
        let b = serde_json::to_string(&Planner::default().plan(LONG_SCRIPT).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_failing_oracle_matches_no_oracle() {
        let baseline = Planner::default().plan(LONG_SCRIPT).unwrap();
        let failing = Planner::default()
            .with_extractor(FieldExtractor::new().with_oracle(Box::new(FailingOracle)))
            .plan(LONG_SCRIPT)
            .unwrap();

        assert_eq!(baseline.slides, failing.slides);
        // Only the recap slide is oracle-supported in this script.
        assert_eq!(failing.diagnostics.len(), 1);
        assert_eq!(failing.diagnostics[0].section_id, "S004");
        assert_eq!(failing.diagnostics[0].code, "timeout");
    }

    #[test]
    fn test_failing_oracle_on_every_supported_template() {
        let script = "\
## はじめに
今日は料理の話です。
## ポイント
一つ目。二つ目。三つ目。
## まとめ
全体の振り返り。要点の確認。最後の一言。
";
        let candidates =
            CandidateMap::default().with(IntentLabel::Intro, vec![TemplateId::TitleCard]);
        let config = PlannerConfig::new().with_candidates(candidates);

        let baseline = Planner::new(config.clone()).plan(script).unwrap();
        let failing = Planner::new(config)
            .with_extractor(FieldExtractor::new().with_oracle(Box::new(FailingOracle)))
            .plan(script)
            .unwrap();

        let templates: Vec<_> = failing.slides.iter().map(|s| s.template()).collect();
        assert_eq!(
            templates,
            vec![TemplateId::TitleCard, TemplateId::Bullets, TemplateId::Recap]
        );
        assert_eq!(baseline.slides, failing.slides);
        assert!(baseline.diagnostics.is_empty());

        let ids: Vec<_> = failing
            .diagnostics
            .iter()
            .map(|d| d.section_id.as_str())
            .collect();
        assert_eq!(ids, vec!["S001", "S002", "S003"]);
        assert!(failing.diagnostics.iter().all(|d| d.code == "timeout"));
    }

    #[test]
    fn test_title_card_and_cta_use_fixed_estimate() {
        let planner = Planner::new(PlannerConfig::new().with_short_content_max_sentences(0));
        let plan = planner
            .plan("## はじめに\n今日は料理の話です。\n---\nチャンネル登録お願いします。")
            .unwrap();

        let title = &plan.slides[0];
        assert_eq!(title.template(), TemplateId::TitleCard);
        assert_eq!(title.constraints_result.estimated_lines, 4);
        assert_eq!(title.constraints_result.max_lines, 3);
        assert_eq!(title.constraints_result.visual_score, 90);
        assert_eq!(title.notes, NOTE_OVERFLOW);

        let cta = &plan.slides[1];
        assert_eq!(cta.template(), TemplateId::Cta);
        assert_eq!(cta.constraints_result.estimated_lines, 4);
        assert_eq!(cta.constraints_result.visual_score, 100);

        let report = planner.tuner().validate(&plan.slides);
        assert_eq!(report.results[0].status, TuneStatus::Warn);
        assert_eq!(report.results[0].issues, vec!["行数超過 est=4 > max=3"]);
        assert_eq!(report.results[1].status, TuneStatus::Ok);
    }

    #[test]
    fn test_oracle_fields_are_used() {
        let plan = Planner::default()
            .with_extractor(FieldExtractor::new().with_oracle(Box::new(EchoOracle)))
            .plan(SCRIPT)
            .unwrap();

        assert_eq!(
            plan.slides[1].fields(),
            &SlideFields::Bullets(ListFields {
                title: "S002".to_string(),
                items: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            })
        );
        // Definition is not oracle-supported.
        assert!(matches!(plan.slides[0].fields(), SlideFields::Definition(_)));
    }

    #[test]
    fn test_comparison_override_regardless_of_mapping() {
        let candidates = CandidateMap::empty().with(
            IntentLabel::Comparison,
            vec![TemplateId::Definition, TemplateId::StrongTitle],
        );
        let planner = Planner::new(PlannerConfig::new().with_candidates(candidates));
        let plan = planner.plan("## AとBの比較\n短い。").unwrap();
        assert_eq!(plan.slides[0].template(), TemplateId::Comparison);
    }

    #[test]
    fn test_score_bounds_over_pipeline() {
        let script = format!("## 長文\n{}", "とても長い文章です。".repeat(40));
        let plan = Planner::default().plan(&script).unwrap();
        for slide in &plan.slides {
            let cr = slide.constraints_result;
            assert!((50..=100).contains(&cr.visual_score));
            assert_eq!(cr.visual_score == 100, cr.estimated_lines <= cr.max_lines);
            if cr.overflows() {
                assert_eq!(slide.notes, NOTE_OVERFLOW);
            }
        }
    }

    #[test]
    fn test_tuning_is_additive() {
        let planner = Planner::default();
        let plan = planner.plan(LONG_SCRIPT).unwrap();
        let slides_before = plan.slides.clone();

        let report = planner.tuner().validate(&plan.slides);
        let again = planner.tuner().validate(&plan.slides);
        let tuned = plan.with_tuning(report.clone());

        assert_eq!(tuned.slides, slides_before);
        assert_eq!(report, again);
        assert_eq!(report.summary.total, 5);
        assert_eq!(report.results.len(), 5);
        assert!(report
            .results
            .iter()
            .all(|r| r.status == TuneStatus::Ok || !r.issues.is_empty()));
    }

    #[test]
    fn test_plan_document_round_trips() {
        let planner = Planner::default();
        let plan = planner.plan(LONG_SCRIPT).unwrap();
        let tuned = plan.clone().with_tuning(planner.tuner().validate(&plan.slides));

        let json = serde_json::to_string_pretty(&tuned).unwrap();
        let parsed: PlanDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, tuned);
    }

    #[test]
    fn test_empty_document_is_an_error() {
        let planner = Planner::default();
        assert!(matches!(planner.plan(""), Err(Error::EmptyDocument)));
        assert!(matches!(planner.plan("## A\n\n## B\n"), Err(Error::EmptyDocument)));
    }
}
