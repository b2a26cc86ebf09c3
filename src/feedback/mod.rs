//! Structured Feedback Module
//!
//! Machine-readable output for the command line:
//! - JSON error reports with fix suggestions
//! - One report type per query

use serde::{Deserialize, Serialize};

use crate::utils::{Error, Span};

// ==================== Structured Error Report ====================

/// A structured error report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Error code (e.g., "E0101")
    pub code: String,

    /// Error severity
    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    /// Location information
    pub location: Option<Location>,

    /// Suggested fixes, most likely first
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub start: usize,
    pub end: usize,
}

impl Location {
    pub fn from_span(span: Span, file_name: &str) -> Self {
        Self {
            file: file_name.to_string(),
            start: span.start,
            end: span.end,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Description of the fix
    pub message: String,

    /// The replacement text
    pub replacement: Option<String>,

    /// Confidence in this suggestion (0.0 - 1.0)
    pub confidence: f64,
}

impl Suggestion {
    fn new(message: String, replacement: Option<String>, confidence: f64) -> Self {
        Self {
            message,
            replacement,
            confidence,
        }
    }
}

impl ErrorReport {
    /// Create an error report from a resolution error.
    ///
    /// `known_names` are the class names in scope; an unknown type gets the
    /// close ones as suggestions.
    pub fn from_error(error: &Error, file_name: &str, known_names: &[String]) -> Self {
        let (code, suggestions) = generate_error_info(error, known_names);
        let mut report = Self {
            code: code.to_string(),
            severity: Severity::Error,
            message: error.to_string(),
            location: error.span().map(|s| Location::from_span(s, file_name)),
            suggestions,
        };
        report.sort_suggestions();
        report
    }

    /// Create a warning report
    pub fn warning(code: &str, message: &str, location: Option<Location>) -> Self {
        Self {
            code: code.to_string(),
            severity: Severity::Warning,
            message: message.to_string(),
            location,
            suggestions: vec![],
        }
    }

    /// Sort suggestions by confidence (highest first)
    pub fn sort_suggestions(&mut self) {
        self.suggestions.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }
}

fn generate_error_info(error: &Error, known_names: &[String]) -> (&'static str, Vec<Suggestion>) {
    match error {
        // ========== Type Graph ==========
        Error::ClassCircularity { class, .. } => (
            "E0101",
            vec![Suggestion::new(
                format!("Change the superclass of {} so the chain ends at java.lang.Object", class),
                None,
                0.8,
            )],
        ),
        Error::InterfaceCircularity { class, .. } => (
            "E0102",
            vec![Suggestion::new(
                format!("Remove the interface of {} that extends it again", class),
                None,
                0.8,
            )],
        ),

        // ========== Registry ==========
        Error::DuplicateType { descriptor, .. } => (
            "E0201",
            vec![Suggestion::new(
                format!("Declare {} only once", crate::types::descriptor::to_class_name(descriptor)),
                None,
                0.9,
            )],
        ),
        Error::UnknownType { name, .. } => {
            let mut suggestions: Vec<Suggestion> = similar_names(name, known_names)
                .into_iter()
                .map(|(candidate, distance)| {
                    Suggestion::new(
                        format!("Did you mean '{}'?", candidate),
                        Some(candidate.to_string()),
                        0.9 - 0.1 * distance as f64,
                    )
                })
                .collect();
            suggestions.push(Suggestion::new(
                format!("Add {} to the class-path model", name),
                None,
                0.5,
            ));
            ("E0202", suggestions)
        }
        Error::InvalidDescriptor { .. } => (
            "E0203",
            vec![Suggestion::new(
                "Spell types as in source code, e.g. java.lang.String[] or int".to_string(),
                None,
                0.6,
            )],
        ),

        // ========== Members ==========
        Error::SyntheticFieldConflict { field, .. } => (
            "E0301",
            vec![Suggestion::new(
                format!("Give both definitions of {} the same type", field),
                None,
                0.7,
            )],
        ),

        // ========== Collaborators ==========
        Error::Io(_) => ("E0901", vec![]),
        Error::Model(_) => ("E0902", vec![]),
    }
}

/// Known names within edit distance 2 of `name`, closest first
fn similar_names<'a>(name: &str, known_names: &'a [String]) -> Vec<(&'a str, usize)> {
    let mut close: Vec<(&str, usize)> = known_names
        .iter()
        .map(|known| (known.as_str(), edit_distance(name, known)))
        .filter(|&(_, distance)| distance > 0 && distance <= 2)
        .collect();
    close.sort_by_key(|&(_, distance)| distance);
    close
}

fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut current = vec![i + 1];
        for (j, cb) in b.iter().enumerate() {
            let substitute = previous[j] + usize::from(ca != *cb);
            current.push(substitute.min(previous[j + 1] + 1).min(current[j] + 1));
        }
        previous = current;
    }
    previous[b.len()]
}

// ==================== Query Reports ====================

/// Result of validating every class of a model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    pub success: bool,
    pub model: String,
    pub classes: usize,
    pub diagnostics: Vec<ErrorReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignabilityReport {
    pub target: String,
    pub source: String,
    pub assignable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodsReport {
    pub class: String,
    pub methods: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberTypesReport {
    pub class: String,
    pub name: Option<String>,
    pub member_types: Vec<String>,
    /// A simple name that matched more than one distinct type
    pub ambiguous: bool,
}

impl MemberTypesReport {
    /// Build a report from raw search hits. A type reached along several
    /// inheritance paths is listed once.
    pub fn new(class: String, name: Option<&str>, hits: Vec<String>) -> Self {
        let mut member_types: Vec<String> = Vec::with_capacity(hits.len());
        for hit in hits {
            if !member_types.contains(&hit) {
                member_types.push(hit);
            }
        }
        Self {
            class,
            name: name.map(str::to_string),
            ambiguous: name.is_some() && member_types.len() > 1,
            member_types,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Resolved,
    Ambiguous,
    NotFound,
}

/// Caller-side overload resolution of one invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionReport {
    pub class: String,
    pub method: String,
    pub arguments: Vec<String>,
    pub applicable: Vec<String>,
    pub most_specific: Vec<String>,
    pub outcome: Outcome,
}

impl ResolutionReport {
    pub fn outcome_for(most_specific: usize) -> Outcome {
        match most_specific {
            0 => Outcome::NotFound,
            1 => Outcome::Resolved,
            _ => Outcome::Ambiguous,
        }
    }
}

/// Output as JSON
pub fn to_json<T: Serialize>(report: &T) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
}

/// Output as compact JSON (for programmatic use)
pub fn to_json_compact<T: Serialize>(report: &T) -> String {
    serde_json::to_string(report).unwrap_or_else(|_| "{}".to_string())
}
