//! Core planning pipeline for turning narration scripts into slide plans:
//! segmentation, intent classification, template selection, field
//! extraction and overflow estimation, plus tuning and evaluation passes.

pub mod catalog;
pub mod config;
pub mod error;
pub mod estimate;
pub mod eval;
pub mod extract;
pub mod intent;
pub mod pipeline;
pub mod rules;
pub mod segment;
pub mod select;
pub mod tune;
pub mod types;

pub use catalog::TemplateCatalog;
pub use config::{CandidateMap, PlannerConfig};
pub use error::{Error, Result};
pub use eval::{evaluate, EvalReport};
pub use extract::{Extraction, FallbackReason, FieldExtractor, Oracle, OracleError, OracleRequest};
pub use intent::IntentClassifier;
pub use pipeline::{Diagnostic, PlanDocument, Planner, SectionsDocument};
pub use segment::Segmenter;
pub use select::TemplateSelector;
pub use tune::{TuneReport, TuneStatus, Tuner};
pub use types::{
    ConstraintResult, IntentLabel, LayoutBudget, Section, SlideFields, SlidePlan, TemplateId,
};
