//! `{{key}}` substitution for the document title.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::geometry::{effective_progress, percent};

/// Values a title template may reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateValues {
    pub percent: String,
    pub max: String,
    pub progress: String,
}

impl TemplateValues {
    /// Computes the substitutions for the raw `progress` and `max`.
    pub fn new(progress: f64, max: f64) -> Self {
        let effective = effective_progress(progress, max);
        Self {
            percent: format!("{}%", format_number(percent(effective, max))),
            max: format_number(max),
            progress: format_number(progress),
        }
    }

    /// Unknown keys resolve to the empty string.
    pub fn lookup(&self, key: &str) -> &str {
        match key {
            "percent" => &self.percent,
            "max" => &self.max,
            "progress" => &self.progress,
            _ => "",
        }
    }
}

/// Replaces every `{{key}}` placeholder in `template`.
///
/// Matching is non-greedy and a key never spans a line break, so `{{a}}{{b}}`
/// holds two placeholders and `{{a\nb}}` holds none.
pub fn expand(template: &str, values: &TemplateValues) -> String {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    let placeholder = PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{(.*?)\}\}").unwrap_or_else(|err| panic!("invalid placeholder regex: {err}"))
    });
    placeholder
        .replace_all(template, |caps: &Captures<'_>| values.lookup(&caps[1]).to_string())
        .into_owned()
}

/// Formats a number the way a browser prints it in a template literal.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        // Also folds negative zero.
        return "0".to_string();
    }
    let magnitude = value.abs();
    if !(1e-6..1e21).contains(&magnitude) {
        return exponent_form(value);
    }
    value.to_string()
}

/// `1e+21`, `1.5e-7`: shortest mantissa, explicit exponent sign.
fn exponent_form(value: f64) -> String {
    let formatted = format!("{value:e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => formatted,
    }
}
