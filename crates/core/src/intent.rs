//! Keyword-based intent classification.
//!
//! An ordered rule list is applied to the section title and body; the first
//! rule whose pattern matches decides the label.

use crate::types::IntentLabel;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// A single classification rule.
#[derive(Debug, Clone)]
pub struct IntentRule {
    pub label: IntentLabel,
    pub pattern: Regex,
}

impl IntentRule {
    pub fn new(label: IntentLabel, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            label,
            pattern: Regex::new(pattern)?,
        })
    }
}

/// Built-in rules, most specific first.
const DEFAULT_RULES: &[(IntentLabel, &str)] = &[
    (IntentLabel::Recap, r"まとめ|結論|要点"),
    (IntentLabel::Point, r"注意|ポイント|コツ|留意"),
    (IntentLabel::Example, r"例|事例|ケース|例えば"),
    (IntentLabel::Comparison, r"(?i)比較|対比|vs|ＶＳ"),
    (IntentLabel::Process, r"手順|方法|ステップ|やり方"),
    (IntentLabel::Intro, r"導入|はじめに|イントロ|概要"),
    (IntentLabel::Cta, r"登録|行動|CTA|チャンネル"),
];

/// Deterministic, side-effect-free intent classifier.
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    rules: Vec<IntentRule>,
    fallback: IntentLabel,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        let rules = DEFAULT_RULES
            .iter()
            .map(|(label, pattern)| {
                IntentRule::new(*label, pattern).expect("built-in intent patterns are valid")
            })
            .collect();
        Self {
            rules,
            fallback: IntentLabel::default(),
        }
    }
}

impl IntentClassifier {
    /// Create a classifier with the built-in rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a classifier with a custom rule order.
    pub fn with_rules(rules: Vec<IntentRule>) -> Self {
        Self {
            rules,
            fallback: IntentLabel::default(),
        }
    }

    pub fn rules(&self) -> &[IntentRule] {
        &self.rules
    }

    /// Classify a section from its title and body text.
    ///
    /// Full-width and half-width forms are folded (NFKC) before matching, so
    /// `ｽﾃｯﾌﾟ` and `ステップ` classify alike.
    pub fn classify(&self, title: &str, body: &str) -> IntentLabel {
        let haystack: String = format!("{} {}", title, body).nfkc().collect();

        self.rules
            .iter()
            .find(|rule| rule.pattern.is_match(&haystack))
            .map(|rule| rule.label)
            .unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_point() {
        let classifier = IntentClassifier::new();
        assert_eq!(classifier.classify("", "Welcome to the show."), IntentLabel::Point);
        assert_eq!(classifier.classify("", ""), IntentLabel::Point);
    }

    #[test]
    fn test_each_rule() {
        let classifier = IntentClassifier::new();
        assert_eq!(classifier.classify("今日のまとめ", ""), IntentLabel::Recap);
        assert_eq!(classifier.classify("", "ここがコツです。"), IntentLabel::Point);
        assert_eq!(classifier.classify("事例紹介", ""), IntentLabel::Example);
        assert_eq!(classifier.classify("", "Rust VS Go"), IntentLabel::Comparison);
        assert_eq!(classifier.classify("作り方の手順", ""), IntentLabel::Process);
        assert_eq!(classifier.classify("はじめに", ""), IntentLabel::Intro);
        assert_eq!(
            classifier.classify("", "チャンネル登録お願いします"),
            IntentLabel::Cta
        );
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let classifier = IntentClassifier::new();
        // Both recap and process vocabulary: recap comes first.
        assert_eq!(classifier.classify("手順のまとめ", ""), IntentLabel::Recap);
        // Example precedes comparison.
        assert_eq!(classifier.classify("比較の例", ""), IntentLabel::Example);
    }

    #[test]
    fn test_rule_order_is_configuration() {
        let classifier = IntentClassifier::with_rules(vec![
            IntentRule::new(IntentLabel::Process, "手順").unwrap(),
            IntentRule::new(IntentLabel::Recap, "まとめ").unwrap(),
        ]);
        assert_eq!(classifier.classify("手順のまとめ", ""), IntentLabel::Process);
    }

    #[test]
    fn test_halfwidth_katakana_is_folded() {
        let classifier = IntentClassifier::new();
        assert_eq!(classifier.classify("ｽﾃｯﾌﾟ", ""), IntentLabel::Process);
        assert_eq!(classifier.classify("", "ＶＳ"), IntentLabel::Comparison);
    }

    #[test]
    fn test_english_headings_fall_to_default() {
        let classifier = IntentClassifier::new();
        assert_eq!(
            classifier.classify("Steps", "First boil water. Then add rice."),
            IntentLabel::Point
        );
    }
}
