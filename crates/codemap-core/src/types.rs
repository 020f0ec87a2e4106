//! Value types shared by the client, the renderer and the workflow.

use crate::error::AnalysisError;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// A single analysis call, built fresh for every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub source_text: String,
    pub target_function: Option<String>,
}

impl AnalysisRequest {
    /// Request covering the whole submitted program.
    pub fn whole_program(source_text: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            target_function: None,
        }
    }

    /// Request scoped to a single named function.
    pub fn per_function(source_text: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            target_function: Some(function.into()),
        }
    }

    pub fn mode(&self) -> AnalysisMode {
        match &self.target_function {
            Some(name) => AnalysisMode::PerFunction(name.clone()),
            None => AnalysisMode::WholeProgram,
        }
    }
}

/// Which flavour of analysis a request performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisMode {
    WholeProgram,
    PerFunction(String),
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisMode::WholeProgram => write!(f, "whole program"),
            AnalysisMode::PerFunction(name) => write!(f, "function '{name}'"),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FunctionSummary {
    #[serde(default)]
    count: Option<usize>,
    #[serde(default)]
    names: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct ReportFields {
    #[serde(default)]
    functions: Option<FunctionSummary>,
    #[serde(default)]
    flowchart: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// The decoded response of the analysis service.
///
/// Only a handful of fields drive the workflow; the full object is kept so
/// it can be displayed as received.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    raw: Value,
    function_names: Vec<String>,
    function_count: Option<usize>,
    flowchart: Option<String>,
    service_error: Option<String>,
}

impl AnalysisReport {
    /// Decodes a report from a JSON value.
    ///
    /// The value must be an object, and the fields the workflow reads must
    /// have the expected types when present.
    pub fn from_value(raw: Value) -> Result<Self, AnalysisError> {
        if !raw.is_object() {
            return Err(AnalysisError::malformed(format!(
                "expected a JSON object, got {}",
                json_kind(&raw)
            )));
        }

        let fields: ReportFields = serde_json::from_value(raw.clone())
            .map_err(|e| AnalysisError::malformed(e.to_string()))?;
        let (function_names, function_count) = match fields.functions {
            Some(summary) => (summary.names.unwrap_or_default(), summary.count),
            None => (Vec::new(), None),
        };

        Ok(Self {
            raw,
            function_names,
            function_count,
            flowchart: fields.flowchart,
            service_error: fields.error,
        })
    }

    /// Function names in the order the service returned them.
    pub fn function_names(&self) -> &[String] {
        &self.function_names
    }

    /// The `functions.count` field, falling back to the number of names.
    pub fn function_count(&self) -> usize {
        self.function_count.unwrap_or(self.function_names.len())
    }

    /// The diagram description, if the service produced a non-blank one.
    pub fn diagram_description(&self) -> Option<&str> {
        self.flowchart
            .as_deref()
            .filter(|description| !description.trim().is_empty())
    }

    /// In-band error reported by the service inside a successful response.
    pub fn service_error(&self) -> Option<&str> {
        self.service_error.as_deref()
    }

    /// Pretty-printed JSON for the report panel.
    pub fn pretty(&self) -> String {
        serde_json::to_string_pretty(&self.raw).unwrap_or_else(|_| self.raw.to_string())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Tag attached to every asynchronous operation the workflow issues.
///
/// Tickets only grow, so comparing a completion's ticket against the latest
/// one issued tells whether the completion is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out strictly increasing tickets.
#[derive(Debug, Default)]
pub struct TicketCounter {
    last: u64,
}

impl TicketCounter {
    pub fn issue(&mut self) -> Ticket {
        self.last += 1;
        Ticket(self.last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_report_extracts_names_in_order() {
        let report = AnalysisReport::from_value(json!({
            "functions": {"count": 3, "names": ["b", "a", "c"]},
            "flowchart": null
        }))
        .unwrap();

        assert_eq!(report.function_names(), ["b", "a", "c"]);
        assert_eq!(report.function_count(), 3);
        assert_eq!(report.diagram_description(), None);
        assert_eq!(report.service_error(), None);
    }

    #[test]
    fn test_report_without_functions_field() {
        let report =
            AnalysisReport::from_value(json!({"error": "Failed to parse code: bad"})).unwrap();

        assert!(report.function_names().is_empty());
        assert_eq!(report.function_count(), 0);
        assert_eq!(report.service_error(), Some("Failed to parse code: bad"));
    }

    #[test]
    fn test_blank_flowchart_is_absent() {
        let report = AnalysisReport::from_value(json!({"flowchart": "   \n"})).unwrap();
        assert_eq!(report.diagram_description(), None);
    }

    #[test]
    fn test_non_object_is_malformed() {
        let err = AnalysisReport::from_value(json!(["f"])).unwrap_err();
        assert!(matches!(err, AnalysisError::Malformed(msg) if msg.contains("an array")));
    }

    #[test]
    fn test_wrongly_typed_names_are_malformed() {
        let err = AnalysisReport::from_value(json!({"functions": {"names": [1, 2]}})).unwrap_err();
        assert!(matches!(err, AnalysisError::Malformed(_)));
    }

    #[test]
    fn test_pretty_keeps_unknown_fields() {
        let report = AnalysisReport::from_value(json!({
            "functions": {"count": 1, "names": ["f"]},
            "complexity": 4
        }))
        .unwrap();
        assert!(report.pretty().contains("\"complexity\": 4"));
    }

    #[test]
    fn test_tickets_increase() {
        let mut counter = TicketCounter::default();
        let first = counter.issue();
        let second = counter.issue();
        assert!(second > first);
        assert_eq!(first.to_string(), "#1");
    }

    #[test]
    fn test_request_mode() {
        assert_eq!(
            AnalysisRequest::whole_program("x = 1").mode(),
            AnalysisMode::WholeProgram
        );
        assert_eq!(
            AnalysisRequest::per_function("def f(): pass", "f").mode(),
            AnalysisMode::PerFunction("f".to_string())
        );
    }
}
