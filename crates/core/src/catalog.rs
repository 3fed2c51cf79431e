//! Static layout budgets per template.

use crate::types::{LayoutBudget, TemplateId};
use crate::{Error, Result};
use std::collections::BTreeMap;

/// Budget used for any template the catalog has no entry for.
pub const DEFAULT_BUDGET: LayoutBudget = LayoutBudget::new(26, 6);

/// Immutable table of layout budgets, built once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateCatalog {
    budgets: BTreeMap<TemplateId, LayoutBudget>,
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl TemplateCatalog {
    /// The built-in budgets for every template.
    pub fn standard() -> Self {
        use TemplateId::*;

        let budgets = [
            (TitleCard, LayoutBudget::new(26, 3)),
            (Definition, LayoutBudget::new(26, 4)),
            (Bullets, LayoutBudget::new(26, 6).with_max_items(5)),
            (Comparison, LayoutBudget::new(24, 6)),
            (Process, LayoutBudget::new(24, 6).with_max_items(5)),
            (Diagram, LayoutBudget::new(22, 6)),
            (Illustration, LayoutBudget::new(26, 4)),
            (Recap, LayoutBudget::new(26, 6).with_max_items(5)),
            (Cta, LayoutBudget::new(24, 4)),
            (StrongTitle, LayoutBudget::new(26, 3)),
            (ListToc, LayoutBudget::new(26, 6).with_max_items(5)),
            (Illustrations, LayoutBudget::new(26, 4)),
            (Screenshots, LayoutBudget::new(26, 4)),
        ];

        Self {
            budgets: budgets.into_iter().collect(),
        }
    }

    /// Replace the budget of one template.
    ///
    /// Every limit must be positive.
    pub fn with_budget(mut self, template: TemplateId, budget: LayoutBudget) -> Result<Self> {
        if budget.max_chars_per_line == 0 || budget.max_lines == 0 || budget.max_items == Some(0) {
            return Err(Error::InvalidConfig(format!(
                "budget for '{}' must have positive limits",
                template
            )));
        }
        self.budgets.insert(template, budget);
        Ok(self)
    }

    /// Budget for `template`, or [`DEFAULT_BUDGET`] if it has none.
    pub fn budget(&self, template: TemplateId) -> LayoutBudget {
        self.budgets
            .get(&template)
            .copied()
            .unwrap_or(DEFAULT_BUDGET)
    }
}
