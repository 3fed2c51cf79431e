//! Scoring a predicted plan against a hand-checked reference plan.

use crate::types::{SlidePlan, TemplateId};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Points lost per slide of count difference.
const SLIDE_COUNT_WEIGHT: usize = 5;

/// Points lost per position whose template differs.
const TYPE_MISMATCH_WEIGHT: usize = 10;

/// Points lost per bullet slide with an out-of-range item count.
const ITEMS_LENGTH_WEIGHT: usize = 2;

/// Item counts a bullet slide should stay within.
pub const BULLET_ITEM_RANGE: RangeInclusive<usize> = 2..=5;

/// Deductions and final score of one comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalReport {
    pub slide_count_diff: usize,
    pub type_mismatch: usize,
    pub items_length_penalty: usize,
    /// `100` minus all deductions, never below `0`.
    pub score: usize,
}

/// Compare `pred` against `gold`.
///
/// Templates are compared position by position over the shorter plan; the
/// item-count check only looks at `bullets` slides in `pred`.
pub fn evaluate(pred: &[SlidePlan], gold: &[SlidePlan]) -> EvalReport {
    let slide_count_diff = pred.len().abs_diff(gold.len());

    let type_mismatch = pred
        .iter()
        .zip(gold)
        .filter(|(p, g)| p.template() != g.template())
        .count();

    let items_length_penalty = pred
        .iter()
        .filter(|slide| slide.template() == TemplateId::Bullets)
        .filter(|slide| {
            let count = slide.fields().list_items().map_or(0, <[String]>::len);
            !BULLET_ITEM_RANGE.contains(&count)
        })
        .count();

    let deductions = slide_count_diff
        .saturating_mul(SLIDE_COUNT_WEIGHT)
        .saturating_add(type_mismatch.saturating_mul(TYPE_MISMATCH_WEIGHT))
        .saturating_add(items_length_penalty.saturating_mul(ITEMS_LENGTH_WEIGHT));

    let report = EvalReport {
        slide_count_diff,
        type_mismatch,
        items_length_penalty,
        score: 100usize.saturating_sub(deductions),
    };
    log::debug!("Evaluation: {:?}", report);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ConstraintResult, DefinitionFields, ListFields, SlideFields, TitleFields};

    fn result() -> ConstraintResult {
        ConstraintResult {
            estimated_lines: 4,
            max_lines: 6,
            max_chars_per_line: 26,
            visual_score: 100,
        }
    }

    fn bullets(id: &str, items: usize) -> SlidePlan {
        let fields = SlideFields::Bullets(ListFields {
            title: "T".to_string(),
            items: (0..items).map(|i| format!("item {}", i)).collect(),
        });
        SlidePlan::new(id, fields, result(), "OK")
    }

    fn title(id: &str) -> SlidePlan {
        SlidePlan::new(
            id,
            SlideFields::TitleCard(TitleFields::default()),
            result(),
            "OK",
        )
    }

    fn definition(id: &str) -> SlidePlan {
        SlidePlan::new(
            id,
            SlideFields::Definition(DefinitionFields::default()),
            result(),
            "OK",
        )
    }

    #[test]
    fn test_identical_plans_score_full() {
        let plan = vec![title("S001"), bullets("S002", 3)];
        assert_eq!(
            evaluate(&plan, &plan),
            EvalReport {
                slide_count_diff: 0,
                type_mismatch: 0,
                items_length_penalty: 0,
                score: 100,
            }
        );
    }

    #[test]
    fn test_slide_count_difference() {
        let pred = vec![title("S001")];
        let gold = vec![title("S001"), bullets("S002", 3), bullets("S003", 3)];

        let report = evaluate(&pred, &gold);
        assert_eq!(report.slide_count_diff, 2);
        assert_eq!(report.type_mismatch, 0);
        assert_eq!(report.score, 90);

        // Symmetric in which side is longer.
        assert_eq!(evaluate(&gold, &pred).slide_count_diff, 2);
    }

    #[test]
    fn test_type_mismatch_by_position() {
        let pred = vec![definition("S001"), bullets("S002", 3), title("S003")];
        let gold = vec![title("S001"), bullets("S002", 3), bullets("S003", 3)];

        let report = evaluate(&pred, &gold);
        assert_eq!(report.type_mismatch, 2);
        assert_eq!(report.score, 80);
    }

    #[test]
    fn test_bullet_item_range() {
        let pred = vec![
            bullets("S001", 1),
            bullets("S002", 2),
            bullets("S003", 5),
            bullets("S004", 6),
        ];

        let report = evaluate(&pred, &pred);
        assert_eq!(report.items_length_penalty, 2);
        assert_eq!(report.score, 96);
    }

    #[test]
    fn test_item_range_ignores_other_templates_and_gold() {
        let pred = vec![title("S001")];
        let gold = vec![bullets("S001", 0)];

        let report = evaluate(&pred, &gold);
        assert_eq!(report.items_length_penalty, 0);
        assert_eq!(report.type_mismatch, 1);
    }

    #[test]
    fn test_score_floors_at_zero() {
        let pred: Vec<SlidePlan> = (0..12).map(|i| bullets(&format!("S{:03}", i), 0)).collect();
        let gold: Vec<SlidePlan> = (0..30).map(|i| title(&format!("S{:03}", i))).collect();

        let report = evaluate(&pred, &gold);
        assert_eq!(report.slide_count_diff, 18);
        assert_eq!(report.type_mismatch, 12);
        assert_eq!(report.items_length_penalty, 12);
        assert_eq!(report.score, 0);
    }

    #[test]
    fn test_report_wire_format() {
        let value = serde_json::to_value(EvalReport {
            slide_count_diff: 1,
            type_mismatch: 2,
            items_length_penalty: 3,
            score: 69,
        })
        .unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "slide_count_diff": 1,
                "type_mismatch": 2,
                "items_length_penalty": 3,
                "score": 69
            })
        );
    }
}
