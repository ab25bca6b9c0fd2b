#![forbid(unsafe_code)]

//! Parser for Online Wardley Map (OWM) sources.
//!
//! OWM is line oriented. Each trimmed line is classified by a cheap prefix or
//! substring test, handed to the parser for that statement kind, and folded
//! into a [`WardleyMap`]. A line that does not parse never aborts the run; it
//! becomes one entry in [`WardleyMap::warnings`] and parsing moves on.
//!
//! ```
//! let map = owm_parser::parse("component Kettle [0.43, 0.35]\nKettle -> Power");
//! assert_eq!(map.nodes.len(), 1);
//! assert_eq!(map.edges.len(), 1);
//! assert!(map.warnings.is_empty());
//! ```

mod classifier;
mod map_builder;
mod statement;

use owm_core::{Diagnostic, DiagnosticCode, ParserConfig, WardleyMap};
use serde::Serialize;
use serde_json::json;
use tracing::trace;

pub use classifier::{LineClass, classify};
pub use statement::{Statement, StatementError, parse_line};

use crate::map_builder::{MapBuilder, span_for};

/// A parsed map together with the located diagnostics behind its warnings.
///
/// `diagnostics[i].message == map.warnings[i]` for every `i`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseReport {
    pub map: WardleyMap,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse an OWM source with the default [`ParserConfig`].
#[must_use]
pub fn parse(input: &str) -> WardleyMap {
    parse_with_config(input, &ParserConfig::default()).map
}

/// Parse an OWM source under explicit resource limits.
#[must_use]
pub fn parse_with_config(input: &str, config: &ParserConfig) -> ParseReport {
    let mut builder = MapBuilder::new();
    let (content, truncated) = clamp_input(input, config.max_input_bytes);

    for (line_number, line) in classifier::significant_lines(content) {
        let length = line.chars().count();
        if length > config.max_line_chars {
            builder.add_warning(
                DiagnosticCode::LineTooLong,
                format!(
                    "Line {line_number} exceeds {} characters; skipped",
                    config.max_line_chars
                ),
                Some(span_for(line_number, line)),
            );
            continue;
        }

        let class = classify(line);
        trace!(line_number, ?class, "classified line");
        match statement::parse_classified(class, line) {
            Ok(statement) => builder.apply(statement),
            Err(error) => builder.reject(&error, line_number),
        }
    }

    if truncated {
        builder.add_warning(
            DiagnosticCode::InputTruncated,
            format!(
                "Input exceeds {} bytes; ignoring the remainder",
                config.max_input_bytes
            ),
            None,
        );
    }

    builder.finish()
}

/// Cut `input` to at most `max_bytes`, ending on a line boundary.
fn clamp_input(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }
    let mut cut = max_bytes;
    while !input.is_char_boundary(cut) {
        cut -= 1;
    }
    let head = &input[..cut];
    if input.as_bytes()[cut] == b'\n' {
        return (head, true);
    }
    let content = head.rfind('\n').map_or("", |index| &head[..index]);
    (content, true)
}

/// Compact JSON summary of a parsed map, for tooling and logs.
#[must_use]
pub fn parse_summary_json(map: &WardleyMap) -> String {
    json!({
        "title": map.title,
        "style": map.style,
        "node_count": map.nodes.len(),
        "edge_count": map.edges.len(),
        "blueline_count": map.bluelines.len(),
        "evolution_count": map.evolutions.len(),
        "note_count": map.notes.len(),
        "warning_count": map.warnings.len(),
        "warnings": map.warnings.clone(),
    })
    .to_string()
}
