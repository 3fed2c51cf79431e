//! Field extraction: an optional generation oracle with a deterministic
//! fallback that always succeeds.

use crate::segment::cut;
use crate::types::{
    ComparisonFields, CtaFields, DefinitionFields, LayoutBudget, ListFields, PlainFields,
    ProcessFields, RecapFields, Section, SlideFields, TemplateId, TitleFields,
};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;
use thiserror::Error;

/// Delimiters between process steps.
static STEP_DELIMITER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"→|=>|＞|>").unwrap());

/// Delimiters between comparison cells.
static CELL_DELIMITER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"、|,|・").unwrap());

/// Item cap when a template's budget does not set one.
const DEFAULT_MAX_ITEMS: usize = 5;

/// Column cap for comparison tables.
const MAX_COMPARISON_CELLS: usize = 3;

/// Row labels for comparison tables.
const COMPARISON_CRITERIA: [&str; 3] = ["特徴", "強み", "弱み"];

const RECAP_TITLE: &str = "まとめ";

/// Character caps for deterministic slots.
mod caps {
    pub const SUBTITLE: usize = 40;
    pub const TERM: usize = 16;
    pub const DESC: usize = 100;
    pub const BULLET: usize = 30;
    pub const RECAP_POINT: usize = 28;
    pub const CTA_MESSAGE: usize = 40;
    pub const BODY: usize = 100;
}

/// Templates the oracle is asked to fill.
pub const ORACLE_TEMPLATES: &[TemplateId] =
    &[TemplateId::Bullets, TemplateId::TitleCard, TemplateId::Recap];

/// Failure of a single oracle call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// The call did not finish within its time limit.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// The service could not be reached.
    #[error("Service unreachable: {0}")]
    Unreachable(String),

    /// The service answered with a non-success status.
    #[error("Service error {status}: {message}")]
    Status { status: u16, message: String },

    /// The service answered, but not with usable text.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// One request to the generation oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleRequest {
    pub section_id: String,
    pub template: TemplateId,
    /// Natural-language instruction with the section text embedded.
    pub instruction: String,
    pub max_chars_per_line: usize,
    pub max_items: usize,
}

/// An external text-generation service.
///
/// Implementations make exactly one attempt per call and should enforce
/// their own timeout, reporting it as [`OracleError::Timeout`].
pub trait Oracle: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Return the raw response text for `request`.
    fn complete(&self, request: &OracleRequest) -> std::result::Result<String, OracleError>;
}

/// Why the deterministic fallback replaced an oracle answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// The call itself failed.
    Oracle(OracleError),
    /// The response held no well-formed JSON object.
    NoStructuredContent,
    /// The JSON object did not fit the template's slots.
    InvalidFields(String),
}

impl FallbackReason {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Oracle(OracleError::Timeout(_)) => "timeout",
            Self::Oracle(OracleError::Unreachable(_)) => "unreachable",
            Self::Oracle(OracleError::Status { .. }) => "error_status",
            Self::Oracle(OracleError::InvalidResponse(_)) => "invalid_response",
            Self::NoStructuredContent => "no_structured_content",
            Self::InvalidFields(_) => "invalid_fields",
        }
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Oracle(e) => write!(f, "{}", e),
            Self::NoStructuredContent => f.write_str("no JSON object in response"),
            Self::InvalidFields(reason) => write!(f, "unusable fields: {}", reason),
        }
    }
}

/// Outcome of extracting fields for one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Fields produced by the oracle.
    Oracle(SlideFields),
    /// Fields produced without consulting the oracle.
    Deterministic(SlideFields),
    /// The oracle was consulted and failed; fields are deterministic.
    Fallback {
        fields: SlideFields,
        reason: FallbackReason,
    },
}

impl Extraction {
    pub fn fields(&self) -> &SlideFields {
        match self {
            Self::Oracle(fields) | Self::Deterministic(fields) => fields,
            Self::Fallback { fields, .. } => fields,
        }
    }

    pub fn into_fields(self) -> SlideFields {
        match self {
            Self::Oracle(fields) | Self::Deterministic(fields) => fields,
            Self::Fallback { fields, .. } => fields,
        }
    }

    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match self {
            Self::Fallback { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// Produces the slot set a template requires.
pub struct FieldExtractor {
    oracle: Option<Box<dyn Oracle>>,
    supported: Vec<TemplateId>,
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self {
            oracle: None,
            supported: ORACLE_TEMPLATES.to_vec(),
        }
    }
}

impl fmt::Debug for FieldExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldExtractor")
            .field("oracle", &self.oracle.as_ref().map(|o| o.name().to_string()))
            .field("supported", &self.supported)
            .finish()
    }
}

impl FieldExtractor {
    /// An extractor that never calls out.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_oracle(mut self, oracle: Box<dyn Oracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Restrict or widen the templates sent to the oracle.
    ///
    /// Templates without an instruction are still handled deterministically.
    pub fn with_supported(mut self, templates: Vec<TemplateId>) -> Self {
        self.supported = templates;
        self
    }

    pub fn has_oracle(&self) -> bool {
        self.oracle.is_some()
    }

    /// Extract fields for `section` laid out as `template`.
    pub fn extract(
        &self,
        section: &Section,
        template: TemplateId,
        budget: &LayoutBudget,
    ) -> Extraction {
        let oracle = match &self.oracle {
            Some(oracle) if self.supported.contains(&template) => oracle,
            _ => return Extraction::Deterministic(deterministic_fields(section, template, budget)),
        };

        let Some(request) = build_request(section, template, budget) else {
            return Extraction::Deterministic(deterministic_fields(section, template, budget));
        };

        match call_oracle(oracle.as_ref(), &request) {
            Ok(fields) => {
                log::info!("{}: fields extracted by {}", section.id, oracle.name());
                Extraction::Oracle(fields)
            }
            Err(reason) => {
                log::warn!(
                    "{}: {} extraction failed ({}), using fallback",
                    section.id,
                    template,
                    reason
                );
                Extraction::Fallback {
                    fields: deterministic_fields(section, template, budget),
                    reason,
                }
            }
        }
    }
}

fn call_oracle(
    oracle: &dyn Oracle,
    request: &OracleRequest,
) -> std::result::Result<SlideFields, FallbackReason> {
    let response = oracle.complete(request).map_err(FallbackReason::Oracle)?;
    let value = first_json_object(&response).ok_or(FallbackReason::NoStructuredContent)?;
    SlideFields::from_value(request.template, value)
        .map_err(|e| FallbackReason::InvalidFields(e.to_string()))
}

/// Find the first well-formed JSON object embedded in `text`.
///
/// Handles answers wrapped in prose or code fences.
pub fn first_json_object(text: &str) -> Option<serde_json::Value> {
    text.char_indices()
        .filter(|(_, c)| *c == '{')
        .find_map(|(start, _)| {
            let mut stream =
                serde_json::Deserializer::from_str(&text[start..]).into_iter::<serde_json::Value>();
            match stream.next() {
                Some(Ok(value)) if value.is_object() => Some(value),
                _ => None,
            }
        })
}

/// Build the oracle request for templates that have an instruction.
pub fn build_request(
    section: &Section,
    template: TemplateId,
    budget: &LayoutBudget,
) -> Option<OracleRequest> {
    let max_chars = budget.max_chars_per_line;
    let max_items = budget.max_items.unwrap_or(DEFAULT_MAX_ITEMS);
    let text = section.lines.join("\n");

    let (task, rules, shape) = match template {
        TemplateId::Bullets => (
            "Extract the key points of the text below as bullet items for a slide.",
            format!(
                "- At most {} characters per item\n\
                 - At most {} items\n\
                 - Keep only the important points, concise and clear\n\
                 - End every item in the same style",
                max_chars, max_items
            ),
            r#"{"title": "slide title (max 30 characters)", "items": ["item 1", "item 2"]}"#,
        ),
        TemplateId::TitleCard => (
            "Extract a title slide from the text below.",
            "- Title: at most 30 characters\n\
             - Subtitle: at most 40 characters\n\
             - Short and memorable"
                .to_string(),
            r#"{"title": "title", "subtitle": "subtitle"}"#,
        ),
        TemplateId::Recap => (
            "Extract the takeaways of the text below for a recap slide.",
            format!(
                "- At most {} characters per point\n\
                 - At most {} points\n\
                 - Summarize the whole text",
                max_chars, max_items
            ),
            r#"{"title": "recap title", "points": ["point 1", "point 2"]}"#,
        ),
        _ => return None,
    };

    let instruction = format!(
        "{}\n\n[Constraints]\n{}\n- Answer in the language of the text\n\n\
         [Text]\n{}\n\n\
         [Output]\nReply with JSON only, shaped like:\n{}",
        task, rules, text, shape
    );

    Some(OracleRequest {
        section_id: section.id.clone(),
        template,
        instruction,
        max_chars_per_line: max_chars,
        max_items,
    })
}

/// Oracle-free slots for `template`, derived from the section text alone.
///
/// Every expected slot is present even for a section without lines.
pub fn deterministic_fields(
    section: &Section,
    template: TemplateId,
    budget: &LayoutBudget,
) -> SlideFields {
    let text = section.text();
    let max_items = budget.max_items.unwrap_or(DEFAULT_MAX_ITEMS);
    let title = section.summary.clone();

    let first_lines = |cap: usize| -> Vec<String> {
        section
            .lines
            .iter()
            .take(max_items)
            .map(|line| cut(line, cap))
            .collect()
    };

    match template {
        TemplateId::TitleCard => SlideFields::TitleCard(TitleFields {
            title,
            subtitle: cut(&text, caps::SUBTITLE),
        }),
        TemplateId::StrongTitle => SlideFields::StrongTitle(TitleFields {
            title,
            subtitle: cut(&text, caps::SUBTITLE),
        }),
        TemplateId::Definition => SlideFields::Definition(DefinitionFields {
            term: cut(&section.summary, caps::TERM),
            desc: cut(&text, caps::DESC),
        }),
        TemplateId::Bullets => SlideFields::Bullets(ListFields {
            title,
            items: first_lines(caps::BULLET),
        }),
        TemplateId::ListToc => SlideFields::ListToc(ListFields {
            title,
            items: first_lines(caps::BULLET),
        }),
        TemplateId::Process => {
            let mut steps: Vec<String> = section
                .lines
                .iter()
                .flat_map(|line| STEP_DELIMITER_REGEX.split(line))
                .map(str::trim)
                .filter(|step| !step.is_empty())
                .take(max_items)
                .map(String::from)
                .collect();
            if steps.is_empty() {
                steps = section.lines.iter().take(max_items).cloned().collect();
            }
            SlideFields::Process(ProcessFields { title, steps })
        }
        TemplateId::Comparison => {
            let cells = |line: Option<&String>| -> Vec<String> {
                line.map(|l| {
                    CELL_DELIMITER_REGEX
                        .split(l)
                        .map(str::trim)
                        .filter(|cell| !cell.is_empty())
                        .take(MAX_COMPARISON_CELLS)
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default()
            };
            let left = cells(section.lines.first());
            let right = cells(section.lines.get(1));
            let rows = left.len().max(right.len());
            let criteria = COMPARISON_CRITERIA
                .iter()
                .take(rows)
                .map(|c| c.to_string())
                .collect();
            SlideFields::Comparison(ComparisonFields {
                title,
                left,
                right,
                criteria,
            })
        }
        TemplateId::Recap => SlideFields::Recap(RecapFields {
            title: RECAP_TITLE.to_string(),
            points: first_lines(caps::RECAP_POINT),
        }),
        TemplateId::Cta => SlideFields::Cta(CtaFields {
            message: cut(&text, caps::CTA_MESSAGE),
            link: String::new(),
        }),
        TemplateId::Diagram => SlideFields::Diagram(plain(title, &text)),
        TemplateId::Illustration => SlideFields::Illustration(plain(title, &text)),
        TemplateId::Illustrations => SlideFields::Illustrations(plain(title, &text)),
        TemplateId::Screenshots => SlideFields::Screenshots(plain(title, &text)),
    }
}

fn plain(title: String, text: &str) -> PlainFields {
    PlainFields {
        title,
        body: cut(text, caps::BODY),
    }
}
