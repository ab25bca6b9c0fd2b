use owm_core::{Diagnostic, DiagnosticCode, Span, WardleyMap};
use tracing::debug;

use crate::ParseReport;
use crate::statement::{Statement, StatementError};

pub(crate) struct MapBuilder {
    map: WardleyMap,
    diagnostics: Vec<Diagnostic>,
}

impl MapBuilder {
    pub(crate) fn new() -> Self {
        Self {
            map: WardleyMap::empty(),
            diagnostics: Vec::new(),
        }
    }

    pub(crate) fn apply(&mut self, statement: Statement) {
        match statement {
            Statement::Title(title) => self.map.title = Some(title),
            Statement::Style(style) => self.map.style = Some(style),
            Statement::Node(node) => {
                self.map.nodes.insert(node.title.clone(), node);
            }
            Statement::Edge(edge) => self.map.edges.push(edge),
            Statement::Blueline(edge) => self.map.bluelines.push(edge),
            Statement::Evolve(evolution) => {
                self.map
                    .evolutions
                    .insert(evolution.title.clone(), evolution);
            }
            Statement::Note(note) => self.map.notes.push(note),
        }
    }

    pub(crate) fn reject(&mut self, error: &StatementError, line_number: usize) {
        self.add_warning(
            error.code(),
            error.to_string(),
            Some(span_for(line_number, error.line())),
        );
    }

    pub(crate) fn add_warning(
        &mut self,
        code: DiagnosticCode,
        message: impl Into<String>,
        span: Option<Span>,
    ) {
        let message = message.into();
        debug!(code = code.as_str(), line = span.map(|s| s.start.line), "{message}");

        let mut diagnostic = Diagnostic::new(code, message.clone());
        if let Some(span) = span {
            diagnostic = diagnostic.with_span(span);
        }
        self.map.warnings.push(message);
        self.diagnostics.push(diagnostic);
    }

    pub(crate) fn finish(self) -> ParseReport {
        ParseReport {
            map: self.map,
            diagnostics: self.diagnostics,
        }
    }
}

pub(crate) fn span_for(line_number: usize, line: &str) -> Span {
    Span::at_line(line_number, line.chars().count())
}
