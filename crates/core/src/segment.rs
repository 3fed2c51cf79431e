//! Splitting a narration script into sections and sentences.
//!
//! A `## ` heading starts a new titled section, a `---` line closes the
//! current one without a title. Blocks whose body is empty are dropped.

use crate::intent::IntentClassifier;
use crate::types::Section;
use regex::Regex;
use std::sync::LazyLock;

/// Regex for a section heading line; captures the title.
static HEADING_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^##\s+(.*)$").unwrap());

/// Regex for an explicit section break.
static SEPARATOR_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^---\s*$").unwrap());

/// Regex to collapse runs of spaces and tabs into one.
static WHITESPACE_COLLAPSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());

/// Marks that always end a sentence.
const FULLWIDTH_TERMINALS: &[char] = &['。', '！', '？', '．'];

/// Marks that end a sentence when followed by whitespace or end of text.
const ASCII_TERMINALS: &[char] = &['.', '!', '?'];

/// Appended to text cut at a character cap.
pub const ELLIPSIS: char = '…';

/// Collapse space/tab runs and trim.
pub fn normalize_spaces(text: &str) -> String {
    WHITESPACE_COLLAPSE_REGEX
        .replace_all(text, " ")
        .trim()
        .to_string()
}

/// Cut `text` to at most `max_chars` characters, appending `…` when cut.
pub fn cut(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push(ELLIPSIS);
    out
}

/// Normalized, soft-truncated display form of `text`.
pub fn summarize(text: &str, max_chars: usize) -> String {
    cut(&normalize_spaces(text), max_chars)
}

/// Split text into sentences, keeping terminal marks attached.
///
/// Line breaks also end a sentence. Empty pieces are dropped and every
/// sentence is whitespace-normalized.
pub fn split_sentences(text: &str) -> Vec<String> {
    let text = text.replace('\r', "");
    let chars: Vec<char> = text.chars().collect();
    let mut sentences = Vec::new();
    let mut current = String::new();

    let mut flush = |current: &mut String| {
        let sentence = normalize_spaces(current);
        if !sentence.is_empty() {
            sentences.push(sentence);
        }
        current.clear();
    };

    for (i, &c) in chars.iter().enumerate() {
        if c == '\n' {
            flush(&mut current);
            continue;
        }

        current.push(c);

        if FULLWIDTH_TERMINALS.contains(&c) {
            flush(&mut current);
        } else if ASCII_TERMINALS.contains(&c) {
            let at_boundary = chars.get(i + 1).map_or(true, |next| next.is_whitespace());
            if at_boundary {
                flush(&mut current);
            }
        }
    }
    flush(&mut current);

    sentences
}

/// Splits a script into [`Section`]s, classifying each one.
#[derive(Debug, Clone)]
pub struct Segmenter {
    classifier: IntentClassifier,
    summary_max_chars: usize,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self {
            classifier: IntentClassifier::default(),
            summary_max_chars: 30,
        }
    }
}

/// Accumulator for the section being read.
#[derive(Default)]
struct PendingSection {
    title: String,
    body: Vec<String>,
}

impl Segmenter {
    /// Create a segmenter with the built-in classifier and a 30-character summary cap.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_classifier(mut self, classifier: IntentClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_summary_max_chars(mut self, max_chars: usize) -> Self {
        self.summary_max_chars = max_chars.max(1);
        self
    }

    /// Split a whole document into sections, in source order.
    pub fn segment(&self, document: &str) -> Vec<Section> {
        let mut sections = Vec::new();
        let mut pending = PendingSection::default();

        for raw in document.split('\n') {
            let line = raw.strip_suffix('\r').unwrap_or(raw);

            if let Some(caps) = HEADING_REGEX.captures(line) {
                self.flush(&mut pending, &mut sections);
                pending.title = caps[1].trim().to_string();
                continue;
            }

            if SEPARATOR_REGEX.is_match(line) {
                self.flush(&mut pending, &mut sections);
                continue;
            }

            pending.body.push(line.to_string());
        }
        self.flush(&mut pending, &mut sections);

        log::debug!("Segmented document into {} sections", sections.len());
        sections
    }

    /// Emit the pending section if its body has any text, then reset it.
    fn flush(&self, pending: &mut PendingSection, sections: &mut Vec<Section>) {
        let PendingSection { title, body } = std::mem::take(pending);
        let text = normalize_spaces(&body.join("\n"));
        if text.is_empty() {
            if !title.is_empty() {
                log::debug!("Dropping empty section '{}'", title);
            }
            return;
        }

        let lines = split_sentences(&text);
        let first = if title.is_empty() {
            lines.first().map(String::as_str).unwrap_or_default()
        } else {
            title.as_str()
        };

        sections.push(Section {
            id: format!("S{:03}", sections.len() + 1),
            summary: summarize(first, self.summary_max_chars),
            intent: self.classifier.classify(&title, &text),
            lines,
        });
    }
}
