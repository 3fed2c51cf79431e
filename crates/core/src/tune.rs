//! Post-planning validation.
//!
//! The tuner only reads plans; its findings live in a separate report keyed
//! by section id.

use crate::types::{SlidePlan, TemplateId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Verdict for one slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TuneStatus {
    Ok,
    Warn,
}

impl fmt::Display for TuneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => f.write_str("OK"),
            Self::Warn => f.write_str("WARN"),
        }
    }
}

/// Findings for one slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TuneResult {
    pub section_id: String,
    pub template: TemplateId,
    pub status: TuneStatus,
    pub issues: Vec<String>,
}

/// Aggregate counts over a plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuneSummary {
    pub total: usize,
    pub ok: usize,
    pub warn: usize,
}

/// One result per plan, in plan order, plus the counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuneReport {
    pub results: Vec<TuneResult>,
    pub summary: TuneSummary,
}

impl TuneReport {
    /// Results flagged WARN.
    pub fn warnings(&self) -> impl Iterator<Item = &TuneResult> {
        self.results.iter().filter(|r| r.status == TuneStatus::Warn)
    }
}

/// Checks planned slides against minimum-content and budget rules.
#[derive(Debug, Clone)]
pub struct Tuner {
    min_list_items: usize,
}

impl Default for Tuner {
    fn default() -> Self {
        Self { min_list_items: 3 }
    }
}

impl Tuner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_list_items(mut self, min_list_items: usize) -> Self {
        self.min_list_items = min_list_items;
        self
    }

    /// Issues found on a single slide.
    pub fn issues(&self, plan: &SlidePlan) -> Vec<String> {
        let mut issues = Vec::new();

        if let Some(items) = plan.fields().list_items() {
            if items.len() < self.min_list_items {
                issues.push(format!(
                    "{} 項目{} (<{})",
                    plan.template(),
                    items.len(),
                    self.min_list_items
                ));
            }
        }

        let cr = &plan.constraints_result;
        if cr.overflows() {
            issues.push(format!(
                "行数超過 est={} > max={}",
                cr.estimated_lines, cr.max_lines
            ));
        }

        issues
    }

    /// Validate every plan.
    pub fn validate(&self, plans: &[SlidePlan]) -> TuneReport {
        let mut summary = TuneSummary::default();

        let results = plans
            .iter()
            .map(|plan| {
                let issues = self.issues(plan);
                let status = if issues.is_empty() {
                    summary.ok += 1;
                    TuneStatus::Ok
                } else {
                    summary.warn += 1;
                    TuneStatus::Warn
                };
                summary.total += 1;

                TuneResult {
                    section_id: plan.section_id.clone(),
                    template: plan.template(),
                    status,
                    issues,
                }
            })
            .collect();

        TuneReport { results, summary }
    }
}
