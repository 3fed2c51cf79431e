//! Domain types for sections, templates and planned slides.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Communicative intent of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentLabel {
    Recap,
    #[default]
    Point,
    Example,
    Comparison,
    Process,
    Intro,
    Cta,
}

impl IntentLabel {
    /// All labels, in declaration order.
    pub const ALL: [IntentLabel; 7] = [
        Self::Recap,
        Self::Point,
        Self::Example,
        Self::Comparison,
        Self::Process,
        Self::Intro,
        Self::Cta,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recap => "recap",
            Self::Point => "point",
            Self::Example => "example",
            Self::Comparison => "comparison",
            Self::Process => "process",
            Self::Intro => "intro",
            Self::Cta => "cta",
        }
    }

    /// Parse a label from its configuration name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.as_str() == name)
    }
}

impl fmt::Display for IntentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A slide layout archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateId {
    TitleCard,
    Definition,
    Bullets,
    Process,
    Comparison,
    Recap,
    Cta,
    Diagram,
    Illustration,
    StrongTitle,
    ListToc,
    Illustrations,
    Screenshots,
}

impl TemplateId {
    /// All templates, in declaration order.
    pub const ALL: [TemplateId; 13] = [
        Self::TitleCard,
        Self::Definition,
        Self::Bullets,
        Self::Process,
        Self::Comparison,
        Self::Recap,
        Self::Cta,
        Self::Diagram,
        Self::Illustration,
        Self::StrongTitle,
        Self::ListToc,
        Self::Illustrations,
        Self::Screenshots,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TitleCard => "title_card",
            Self::Definition => "definition",
            Self::Bullets => "bullets",
            Self::Process => "process",
            Self::Comparison => "comparison",
            Self::Recap => "recap",
            Self::Cta => "cta",
            Self::Diagram => "diagram",
            Self::Illustration => "illustration",
            Self::StrongTitle => "strong_title",
            Self::ListToc => "list_toc",
            Self::Illustrations => "illustrations",
            Self::Screenshots => "screenshots",
        }
    }

    /// Parse a template from its configuration name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    /// Whether this template is a bulleted list of items.
    pub fn is_list(&self) -> bool {
        matches!(self, Self::Bullets | Self::ListToc)
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Character, line and item limits of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutBudget {
    pub max_chars_per_line: usize,
    pub max_lines: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
}

impl LayoutBudget {
    pub const fn new(max_chars_per_line: usize, max_lines: usize) -> Self {
        Self {
            max_chars_per_line,
            max_lines,
            max_items: None,
        }
    }

    pub const fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }
}

/// One planning unit cut from the narration script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Ordinal identifier (`S001`, `S002`, ...).
    pub id: String,

    /// Short display string from the heading or first sentence.
    pub summary: String,

    pub intent: IntentLabel,

    /// Sentences in source order, trimmed and non-empty.
    pub lines: Vec<String>,
}

impl Section {
    /// All sentences joined with a single space.
    pub fn text(&self) -> String {
        self.lines.join(" ")
    }
}

/// Slots of the title-card and strong-statement templates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleFields {
    pub title: String,
    pub subtitle: String,
}

/// Slots of the definition template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefinitionFields {
    pub term: String,
    pub desc: String,
}

/// Slots of the bulleted-list templates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListFields {
    pub title: String,
    pub items: Vec<String>,
}

/// Slots of the process/steps template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessFields {
    pub title: String,
    pub steps: Vec<String>,
}

/// Slots of the comparison table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonFields {
    pub title: String,
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub criteria: Vec<String>,
}

/// Slots of the recap template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecapFields {
    pub title: String,
    pub points: Vec<String>,
}

/// Slots of the call-to-action template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CtaFields {
    pub message: String,
    pub link: String,
}

/// Slots of the image and diagram templates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlainFields {
    pub title: String,
    pub body: String,
}

/// Template-specific slot values, one variant per template.
///
/// Serialized as a flat object of slot names; the template identifier travels
/// next to it in [`SlidePlan`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SlideFields {
    TitleCard(TitleFields),
    Definition(DefinitionFields),
    Bullets(ListFields),
    Process(ProcessFields),
    Comparison(ComparisonFields),
    Recap(RecapFields),
    Cta(CtaFields),
    Diagram(PlainFields),
    Illustration(PlainFields),
    StrongTitle(TitleFields),
    ListToc(ListFields),
    Illustrations(PlainFields),
    Screenshots(PlainFields),
}

impl SlideFields {
    /// The template these fields belong to.
    pub fn template(&self) -> TemplateId {
        match self {
            Self::TitleCard(_) => TemplateId::TitleCard,
            Self::Definition(_) => TemplateId::Definition,
            Self::Bullets(_) => TemplateId::Bullets,
            Self::Process(_) => TemplateId::Process,
            Self::Comparison(_) => TemplateId::Comparison,
            Self::Recap(_) => TemplateId::Recap,
            Self::Cta(_) => TemplateId::Cta,
            Self::Diagram(_) => TemplateId::Diagram,
            Self::Illustration(_) => TemplateId::Illustration,
            Self::StrongTitle(_) => TemplateId::StrongTitle,
            Self::ListToc(_) => TemplateId::ListToc,
            Self::Illustrations(_) => TemplateId::Illustrations,
            Self::Screenshots(_) => TemplateId::Screenshots,
        }
    }

    /// Build the slot set of `template` from a JSON object.
    ///
    /// Missing slots become empty; slots of the wrong type are an error.
    pub fn from_value(template: TemplateId, value: serde_json::Value) -> Result<Self> {
        let fields = match template {
            TemplateId::TitleCard => Self::TitleCard(from_object(template, value)?),
            TemplateId::Definition => Self::Definition(from_object(template, value)?),
            TemplateId::Bullets => Self::Bullets(from_object(template, value)?),
            TemplateId::Process => Self::Process(from_object(template, value)?),
            TemplateId::Comparison => Self::Comparison(from_object(template, value)?),
            TemplateId::Recap => Self::Recap(from_object(template, value)?),
            TemplateId::Cta => Self::Cta(from_object(template, value)?),
            TemplateId::Diagram => Self::Diagram(from_object(template, value)?),
            TemplateId::Illustration => Self::Illustration(from_object(template, value)?),
            TemplateId::StrongTitle => Self::StrongTitle(from_object(template, value)?),
            TemplateId::ListToc => Self::ListToc(from_object(template, value)?),
            TemplateId::Illustrations => Self::Illustrations(from_object(template, value)?),
            TemplateId::Screenshots => Self::Screenshots(from_object(template, value)?),
        };
        Ok(fields)
    }

    /// Items of a bulleted-list template, if this is one.
    pub fn list_items(&self) -> Option<&[String]> {
        match self {
            Self::Bullets(f) | Self::ListToc(f) => Some(&f.items),
            _ => None,
        }
    }
}

fn from_object<T: serde::de::DeserializeOwned>(
    template: TemplateId,
    value: serde_json::Value,
) -> Result<T> {
    if !value.is_object() {
        return Err(Error::FieldMismatch {
            template: template.to_string(),
            reason: "expected a JSON object".to_string(),
        });
    }
    serde_json::from_value(value).map_err(|e| Error::FieldMismatch {
        template: template.to_string(),
        reason: e.to_string(),
    })
}

/// Estimated fit of a slide within its layout budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintResult {
    pub estimated_lines: usize,
    pub max_lines: usize,
    pub max_chars_per_line: usize,
    /// Always within `50..=100`.
    pub visual_score: u32,
}

impl ConstraintResult {
    pub fn overflows(&self) -> bool {
        self.estimated_lines > self.max_lines
    }
}

/// The planned slide for one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawSlidePlan")]
pub struct SlidePlan {
    pub section_id: String,
    template: TemplateId,
    fields: SlideFields,
    pub constraints_result: ConstraintResult,
    pub notes: String,
}

impl SlidePlan {
    pub fn new(
        section_id: impl Into<String>,
        fields: SlideFields,
        constraints_result: ConstraintResult,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            section_id: section_id.into(),
            template: fields.template(),
            fields,
            constraints_result,
            notes: notes.into(),
        }
    }

    pub fn template(&self) -> TemplateId {
        self.template
    }

    pub fn fields(&self) -> &SlideFields {
        &self.fields
    }
}

/// Wire form of a [`SlidePlan`], with fields still untyped.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSlidePlan {
    section_id: String,
    template: TemplateId,
    #[serde(default)]
    fields: Option<serde_json::Value>,
    constraints_result: ConstraintResult,
    #[serde(default)]
    notes: String,
}

impl TryFrom<RawSlidePlan> for SlidePlan {
    type Error = Error;

    fn try_from(raw: RawSlidePlan) -> Result<Self> {
        let value = raw
            .fields
            .unwrap_or_else(|| serde_json::Value::Object(Default::default()));
        let fields = SlideFields::from_value(raw.template, value)?;
        Ok(Self::new(
            raw.section_id,
            fields,
            raw.constraints_result,
            raw.notes,
        ))
    }
}
