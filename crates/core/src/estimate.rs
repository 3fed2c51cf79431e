//! Line-count estimation and visual-fit scoring.

use crate::types::{ConstraintResult, LayoutBudget, SlideFields};

/// Lines assumed for a comparison table.
const COMPARISON_LINES: usize = 5;

/// Lines assumed for templates without list or description slots.
const DEFAULT_LINES: usize = 4;

/// Lines taken by a slide heading.
const HEADING_LINES: usize = 1;

/// Lowest score any slide can get.
pub const SCORE_FLOOR: u32 = 50;

/// Score lost per line of overflow.
const PENALTY_PER_LINE: u32 = 10;

/// Lines `text` wraps to at `max_chars` characters per line.
fn measure(text: &str, max_chars: usize) -> usize {
    text.chars().count().div_ceil(max_chars.max(1))
}

fn measure_all(items: &[String], max_chars: usize) -> usize {
    items.iter().map(|item| measure(item, max_chars)).sum()
}

/// Estimated on-slide line count of `fields`.
pub fn estimate_lines(fields: &SlideFields, budget: &LayoutBudget) -> usize {
    let chars = budget.max_chars_per_line;

    match fields {
        SlideFields::Bullets(f) | SlideFields::ListToc(f) => {
            measure_all(&f.items, chars) + HEADING_LINES
        }
        SlideFields::Process(f) => measure_all(&f.steps, chars) + HEADING_LINES,
        SlideFields::Recap(f) => measure_all(&f.points, chars) + HEADING_LINES,
        SlideFields::Definition(f) => measure(&f.desc, chars) + HEADING_LINES,
        SlideFields::Comparison(_) => COMPARISON_LINES,
        SlideFields::TitleCard(_)
        | SlideFields::StrongTitle(_)
        | SlideFields::Cta(_)
        | SlideFields::Diagram(_)
        | SlideFields::Illustration(_)
        | SlideFields::Illustrations(_)
        | SlideFields::Screenshots(_) => DEFAULT_LINES,
    }
}

/// Score for a slide: 100 within budget, minus 10 per extra line, never below 50.
pub fn visual_score(estimated_lines: usize, max_lines: usize) -> u32 {
    let overflow = estimated_lines.saturating_sub(max_lines);
    let penalty = u32::try_from(overflow)
        .unwrap_or(u32::MAX)
        .saturating_mul(PENALTY_PER_LINE);
    100u32.saturating_sub(penalty).max(SCORE_FLOOR)
}

/// Estimate how `fields` fit into `budget`.
pub fn estimate(fields: &SlideFields, budget: &LayoutBudget) -> ConstraintResult {
    let estimated_lines = estimate_lines(fields, budget);
    ConstraintResult {
        estimated_lines,
        max_lines: budget.max_lines,
        max_chars_per_line: budget.max_chars_per_line,
        visual_score: visual_score(estimated_lines, budget.max_lines),
    }
}
