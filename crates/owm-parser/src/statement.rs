use chumsky::prelude::*;
use owm_core::{
    DiagnosticCode, LabelOffset, MapEdge, MapEvolution, MapNode, MapNote, NodeKind, NotePosition,
};
use thiserror::Error;

use crate::classifier::{LineClass, classify, is_comment};

type Extra<'a> = extra::Err<Rich<'a, char>>;

/// One successfully parsed source line.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Title(String),
    Style(String),
    Node(MapNode),
    Edge(MapEdge),
    Blueline(MapEdge),
    Evolve(MapEvolution),
    Note(MapNote),
}

/// A line that could not be turned into a [`Statement`]. The `Display` text is
/// the warning recorded on the map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatementError {
    #[error("Could not parse line: {0}")]
    Unrecognized(String),
    #[error("Could not parse component line: {0}")]
    Component(String),
    #[error("Could not parse edge line: {0}")]
    Edge(String),
    #[error("Could not parse blueline line: {0}")]
    Blueline(String),
    #[error("Could not parse evolve line: {0}")]
    Evolve(String),
    #[error("Could not parse note line: {0}")]
    Note(String),
}

impl StatementError {
    #[must_use]
    pub const fn code(&self) -> DiagnosticCode {
        match self {
            Self::Unrecognized(_) => DiagnosticCode::UnrecognizedLine,
            Self::Component(_) => DiagnosticCode::Component,
            Self::Edge(_) => DiagnosticCode::Edge,
            Self::Blueline(_) => DiagnosticCode::Blueline,
            Self::Evolve(_) => DiagnosticCode::Evolve,
            Self::Note(_) => DiagnosticCode::Note,
        }
    }

    /// The offending line, trimmed.
    #[must_use]
    pub fn line(&self) -> &str {
        match self {
            Self::Unrecognized(line)
            | Self::Component(line)
            | Self::Edge(line)
            | Self::Blueline(line)
            | Self::Evolve(line)
            | Self::Note(line) => line,
        }
    }
}

/// Parse a single source line. Returns `None` for blank and `#` comment lines.
#[must_use]
pub fn parse_line(line: &str) -> Option<Result<Statement, StatementError>> {
    let line = line.trim();
    if line.is_empty() || is_comment(line) {
        return None;
    }
    Some(parse_classified(classify(line), line))
}

pub(crate) fn parse_classified(class: LineClass, line: &str) -> Result<Statement, StatementError> {
    match class {
        LineClass::Title => rest_after_keyword(line)
            .map(Statement::Title)
            .ok_or_else(|| StatementError::Unrecognized(line.to_string())),
        LineClass::Style => rest_after_keyword(line)
            .map(Statement::Style)
            .ok_or_else(|| StatementError::Unrecognized(line.to_string())),
        LineClass::Node => parse_node(line).map(Statement::Node),
        LineClass::Edge => split_relation(line, "->")
            .map(Statement::Edge)
            .ok_or_else(|| StatementError::Edge(line.to_string())),
        LineClass::Blueline => split_relation(line, "+<>")
            .map(Statement::Blueline)
            .ok_or_else(|| StatementError::Blueline(line.to_string())),
        LineClass::Evolve => parse_evolve(line).map(Statement::Evolve),
        LineClass::Note => parse_note(line).map(Statement::Note),
        LineClass::Unrecognized => Err(StatementError::Unrecognized(line.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Grammar pieces
// ---------------------------------------------------------------------------

fn is_title_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | ' ' | '.' | '/' | '&' | '\'' | '(' | ')' | '-')
}

fn inline_ws<'a>() -> impl Parser<'a, &'a str, (), Extra<'a>> + Clone {
    any()
        .filter(|c: &char| *c == ' ' || *c == '\t')
        .repeated()
        .to(())
}

fn required_ws<'a>() -> impl Parser<'a, &'a str, (), Extra<'a>> + Clone {
    any()
        .filter(|c: &char| *c == ' ' || *c == '\t')
        .repeated()
        .at_least(1)
        .to(())
}

/// A run of digits, `.` and `-` that must read as a float.
fn number<'a>() -> impl Parser<'a, &'a str, f64, Extra<'a>> + Clone {
    any()
        .filter(|c: &char| c.is_ascii_digit() || matches!(*c, '.' | '-'))
        .repeated()
        .at_least(1)
        .to_slice()
        .try_map(|raw: &str, span| {
            raw.parse::<f64>()
                .map_err(|_| Rich::custom(span, format!("'{raw}' is not a number")))
        })
}

/// `[a, b]` with optional padding inside the brackets.
fn coordinate_pair<'a>() -> impl Parser<'a, &'a str, (f64, f64), Extra<'a>> + Clone {
    just('[')
        .ignore_then(number().padded_by(inline_ws()))
        .then_ignore(just(','))
        .then(number().padded_by(inline_ws()))
        .then_ignore(just(']'))
}

/// `[a, b]` where either slot may be left empty and the second may be absent.
fn partial_coordinate_pair<'a>()
-> impl Parser<'a, &'a str, (Option<f64>, Option<f64>), Extra<'a>> + Clone {
    let slot = number().or_not().padded_by(inline_ws());
    just('[')
        .ignore_then(slot.clone())
        .then(just(',').ignore_then(slot).or_not().map(Option::flatten))
        .then_ignore(just(']'))
}

/// `anchor|component <title> [<visibility>, <maturity>] (label [<x>, <y>])?`
///
/// Anything after the coordinates (or a well-formed label clause) is ignored,
/// so decorators such as `(inertia)` and a broken `label [..]` leave the node
/// intact with the default label offset.
fn node_statement_parser<'a>() -> impl Parser<'a, &'a str, MapNode, Extra<'a>> {
    let kind = choice((
        just("anchor").to(NodeKind::Anchor),
        just("component").to(NodeKind::Component),
    ));

    let title = any()
        .filter(|c: &char| is_title_char(*c))
        .repeated()
        .at_least(1)
        .to_slice()
        .try_map(|raw: &str, span| {
            let title = raw.trim();
            if title.is_empty() {
                Err(Rich::custom(span, "node title is empty"))
            } else {
                Ok(title.to_string())
            }
        });

    let label = required_ws()
        .then(just("label"))
        .then(inline_ws())
        .ignore_then(coordinate_pair())
        .map(|(x, y)| LabelOffset::new(x, y));

    kind.then_ignore(required_ws())
        .then(title)
        .then_ignore(inline_ws())
        .then(coordinate_pair())
        .then(label.or_not())
        .then_ignore(any().repeated())
        .map(
            |(((kind, title), (visibility, maturity)), label)| MapNode {
                kind,
                title,
                visibility,
                maturity,
                label_offset: label.unwrap_or_default(),
            },
        )
}

// ---------------------------------------------------------------------------
// Statement parsers
// ---------------------------------------------------------------------------

fn rest_after_keyword(line: &str) -> Option<String> {
    line.split_once(' ').map(|(_, rest)| rest.to_string())
}

fn parse_node(line: &str) -> Result<MapNode, StatementError> {
    node_statement_parser()
        .parse(line)
        .into_result()
        .map_err(|_| StatementError::Component(line.to_string()))
}

fn split_relation(line: &str, operator: &str) -> Option<MapEdge> {
    let mut sides = line.split(operator).map(str::trim);
    let (Some(from), Some(to), None) = (sides.next(), sides.next(), sides.next()) else {
        return None;
    };
    (!from.is_empty() && !to.is_empty()).then(|| MapEdge::new(from, to))
}

/// ` label [<x>?, <y>?]` at the start of `rest`, plus whatever follows it.
fn leading_label_clause(rest: &str) -> Option<(LabelOffset, &str)> {
    required_ws()
        .then(just("label"))
        .then(inline_ws())
        .ignore_then(partial_coordinate_pair())
        .then(any().repeated().to_slice())
        .parse(rest)
        .into_result()
        .ok()
        .map(|((x, y), trailing)| (LabelOffset::from_parts(x, y), trailing))
}

/// `evolve <title> <target> (label [..])?`, matched from the left.
///
/// Titles may contain numeric words, so every word that reads as a number is a
/// candidate target. The longest title whose remainder is blank or a label
/// clause wins; otherwise the shortest title is taken and trailing text is
/// ignored.
fn parse_evolve(line: &str) -> Result<MapEvolution, StatementError> {
    let reject = || StatementError::Evolve(line.to_string());
    let body = keyword_body(line, "evolve").ok_or_else(reject)?;

    let candidates: Vec<(&str, f64, &str)> = word_spans(body)
        .into_iter()
        .skip(1)
        .filter_map(|(start, word)| {
            let title = body[..start].trim();
            if !title.chars().all(is_title_char) {
                return None;
            }
            let target = number().then_ignore(end()).parse(word).into_result().ok()?;
            Some((title, target, &body[start + word.len()..]))
        })
        .collect();

    let is_clean = |rest: &str| {
        rest.trim().is_empty()
            || leading_label_clause(rest).is_some_and(|(_, trailing)| trailing.trim().is_empty())
    };
    let &(title, target_maturity, rest) = candidates
        .iter()
        .rev()
        .find(|(_, _, rest)| is_clean(*rest))
        .or_else(|| candidates.first())
        .ok_or_else(reject)?;

    let label_offset = leading_label_clause(rest)
        .map(|(offset, _)| offset)
        .unwrap_or_default();

    Ok(MapEvolution {
        title: title.to_string(),
        target_maturity,
        label_offset,
    })
}

fn parse_note(line: &str) -> Result<MapNote, StatementError> {
    let reject = || StatementError::Note(line.to_string());
    let body = keyword_body(line, "note").ok_or_else(reject)?;

    let (text, position) = if body.ends_with(']') {
        let open = body.rfind('[').ok_or_else(reject)?;
        let (maturity, visibility) = coordinate_pair()
            .then_ignore(end())
            .parse(&body[open..])
            .into_result()
            .map_err(|_| reject())?;
        (body[..open].trim(), NotePosition::new(maturity, visibility))
    } else {
        (body, NotePosition::default())
    };

    if text.is_empty() {
        return Err(reject());
    }
    Ok(MapNote {
        text: text.to_string(),
        position,
    })
}

/// Text after `keyword`, which must be followed by whitespace.
fn keyword_body<'l>(line: &'l str, keyword: &str) -> Option<&'l str> {
    let rest = line.strip_prefix(keyword)?;
    rest.starts_with(char::is_whitespace).then(|| rest.trim())
}

/// Whitespace-separated words of `text` with their byte offsets.
fn word_spans(text: &str) -> Vec<(usize, &str)> {
    let mut spans = Vec::new();
    let mut start = None;
    for (index, ch) in text.char_indices().chain(std::iter::once((text.len(), ' '))) {
        match (ch.is_whitespace(), start) {
            (false, None) => start = Some(index),
            (true, Some(begin)) => {
                spans.push((begin, &text[begin..index]));
                start = None;
            }
            _ => {}
        }
    }
    spans
}
