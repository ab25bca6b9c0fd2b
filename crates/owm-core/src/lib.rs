#![forbid(unsafe_code)]

mod config;
mod references;

pub use config::{ConfigError, ParserConfig};
pub use references::{RelationKind, UnresolvedReference};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Label offset applied when a statement has no `label [x, y]` clause.
pub const DEFAULT_LABEL_OFFSET: f64 = 2.0;

/// Note coordinate applied when a note has no trailing `[maturity, visibility]`.
pub const DEFAULT_NOTE_COORDINATE: f64 = 0.2;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn at_line(line: usize, line_len: usize) -> Self {
        let start = Position { line, col: 1 };
        let end = Position {
            line,
            col: line_len.max(1),
        };
        Self::new(start, end)
    }
}

/// Which part of the parser rejected a line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum DiagnosticCode {
    #[default]
    UnrecognizedLine,
    Component,
    Edge,
    Blueline,
    Evolve,
    Note,
    LineTooLong,
    InputTruncated,
}

impl DiagnosticCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnrecognizedLine => "owm/warn/unrecognized-line",
            Self::Component => "owm/warn/component",
            Self::Edge => "owm/warn/edge",
            Self::Blueline => "owm/warn/blueline",
            Self::Evolve => "owm/warn/evolve",
            Self::Note => "owm/warn/note",
            Self::LineTooLong => "owm/warn/line-too-long",
            Self::InputTruncated => "owm/warn/input-truncated",
        }
    }
}

/// A warning with its source location. `message` is the text that also lands
/// in [`WardleyMap::warnings`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub message: String,
    pub span: Option<Span>,
}

impl Diagnostic {
    #[must_use]
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            span: None,
        }
    }

    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    #[must_use]
    pub fn line(&self) -> Option<usize> {
        self.span.map(|span| span.start.line)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[default]
    Component,
    Anchor,
}

impl NodeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Component => "component",
            Self::Anchor => "anchor",
        }
    }
}

/// Pixel offset of a label relative to the point it annotates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LabelOffset {
    pub x: f64,
    pub y: f64,
}

impl LabelOffset {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Builds an offset from independently optional axes; a missing axis
    /// falls back to [`DEFAULT_LABEL_OFFSET`].
    #[must_use]
    pub fn from_parts(x: Option<f64>, y: Option<f64>) -> Self {
        Self {
            x: x.unwrap_or(DEFAULT_LABEL_OFFSET),
            y: y.unwrap_or(DEFAULT_LABEL_OFFSET),
        }
    }
}

impl Default for LabelOffset {
    fn default() -> Self {
        Self::new(DEFAULT_LABEL_OFFSET, DEFAULT_LABEL_OFFSET)
    }
}

/// A component or anchor. Coordinates are stored exactly as written; values
/// outside `[0, 1]` are accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapNode {
    pub kind: NodeKind,
    pub title: String,
    pub visibility: f64,
    pub maturity: f64,
    pub label_offset: LabelOffset,
}

/// A directed relation between two node titles. Used for both dependency
/// edges and bluelines; endpoints are not checked against the node table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MapEdge {
    pub from: String,
    pub to: String,
}

impl MapEdge {
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapEvolution {
    pub title: String,
    pub target_maturity: f64,
    pub label_offset: LabelOffset,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NotePosition {
    pub maturity: f64,
    pub visibility: f64,
}

impl NotePosition {
    #[must_use]
    pub const fn new(maturity: f64, visibility: f64) -> Self {
        Self {
            maturity,
            visibility,
        }
    }
}

impl Default for NotePosition {
    fn default() -> Self {
        Self::new(DEFAULT_NOTE_COORDINATE, DEFAULT_NOTE_COORDINATE)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapNote {
    pub text: String,
    pub position: NotePosition,
}

/// The parsed map. Built once per parse and handed to consumers read-only.
///
/// `nodes` and `evolutions` keep first-insertion order; a later statement for
/// the same title replaces the value in place. `edges`, `bluelines`, `notes`
/// and `warnings` follow source line order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WardleyMap {
    pub title: Option<String>,
    pub style: Option<String>,
    pub nodes: IndexMap<String, MapNode>,
    pub edges: Vec<MapEdge>,
    pub bluelines: Vec<MapEdge>,
    pub evolutions: IndexMap<String, MapEvolution>,
    pub notes: Vec<MapNote>,
    pub warnings: Vec<String>,
}

impl WardleyMap {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn node(&self, title: &str) -> Option<&MapNode> {
        self.nodes.get(title)
    }

    #[must_use]
    pub fn contains_node(&self, title: &str) -> bool {
        self.nodes.contains_key(title)
    }

    /// Nodes of one kind, in map order.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &MapNode> {
        self.nodes.values().filter(move |node| node.kind == kind)
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// True when no statement contributed anything drawable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
            && self.edges.is_empty()
            && self.bluelines.is_empty()
            && self.evolutions.is_empty()
            && self.notes.is_empty()
    }
}
