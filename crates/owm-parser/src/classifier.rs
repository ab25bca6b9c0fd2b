/// Statement kind chosen for a trimmed, non-comment line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    Title,
    Style,
    Node,
    Edge,
    Blueline,
    Evolve,
    Note,
    Unrecognized,
}

/// First matching rule wins. The `->` and `+<>` substring tests run before
/// the `evolve`/`note` keyword tests, so an evolve line whose title contains
/// `->` is treated as an edge.
#[must_use]
pub fn classify(line: &str) -> LineClass {
    if line.starts_with("title ") {
        LineClass::Title
    } else if line.starts_with("style ") {
        LineClass::Style
    } else if line.starts_with("anchor ") || line.starts_with("component ") {
        LineClass::Node
    } else if line.contains("->") {
        LineClass::Edge
    } else if line.contains("+<>") {
        LineClass::Blueline
    } else if line.starts_with("evolve ") {
        LineClass::Evolve
    } else if line.starts_with("note") {
        LineClass::Note
    } else {
        LineClass::Unrecognized
    }
}

pub(crate) fn is_comment(line: &str) -> bool {
    line.starts_with('#')
}

/// Trimmed lines worth classifying, paired with their 1-based line number.
///
/// `\n` and `\r\n` end a line. A lone `\r` also splits, but the pieces keep
/// the number of the line they came from.
pub(crate) fn significant_lines(input: &str) -> impl Iterator<Item = (usize, &str)> {
    input
        .lines()
        .enumerate()
        .flat_map(|(index, line)| line.split('\r').map(move |piece| (index + 1, piece.trim())))
        .filter(|(_, line)| !line.is_empty() && !is_comment(line))
}

#[cfg(test)]
mod tests {
    use super::{LineClass, classify, significant_lines};

    #[test]
    fn classifies_keyword_statements() {
        assert_eq!(classify("title Tea Shop"), LineClass::Title);
        assert_eq!(classify("style wardley"), LineClass::Style);
        assert_eq!(classify("anchor Business [0.95, 0.63]"), LineClass::Node);
        assert_eq!(classify("component Cup [0.73, 0.78]"), LineClass::Node);
        assert_eq!(classify("evolve Kettle 0.62"), LineClass::Evolve);
        assert_eq!(classify("note Standardising [0.2, 0.9]"), LineClass::Note);
    }

    #[test]
    fn classifies_relations_by_operator() {
        assert_eq!(classify("Business->Cup of Tea"), LineClass::Edge);
        assert_eq!(classify("Kettle +<> Power"), LineClass::Blueline);
    }

    #[test]
    fn keyword_needs_trailing_space() {
        assert_eq!(classify("titles are here"), LineClass::Unrecognized);
        assert_eq!(classify("componentX [0.1, 0.2]"), LineClass::Unrecognized);
        assert_eq!(classify("evolveKettle 0.5"), LineClass::Unrecognized);
    }

    #[test]
    fn note_prefix_needs_no_space() {
        assert_eq!(classify("notes"), LineClass::Note);
    }

    #[test]
    fn edge_test_runs_before_evolve_and_note() {
        assert_eq!(classify("evolve A->B 0.5"), LineClass::Edge);
        assert_eq!(classify("note a -> b"), LineClass::Edge);
        assert_eq!(classify("evolve A +<> B"), LineClass::Blueline);
    }

    #[test]
    fn node_keywords_win_over_operators() {
        assert_eq!(classify("component A->B [0.1, 0.2]"), LineClass::Node);
        assert_eq!(classify("title A -> B"), LineClass::Title);
    }

    #[test]
    fn significant_lines_skip_blanks_and_comments() {
        let input = "title X\n\n   \n# a comment\n  component A [0.1, 0.2]  \r\nA->B";
        let lines: Vec<(usize, &str)> = significant_lines(input).collect();
        assert_eq!(
            lines,
            vec![(1, "title X"), (5, "component A [0.1, 0.2]"), (6, "A->B")]
        );
    }

    #[test]
    fn lone_carriage_returns_split_lines() {
        let lines: Vec<(usize, &str)> = significant_lines("A->B\rC->D\nE->F").collect();
        assert_eq!(lines, vec![(1, "A->B"), (1, "C->D"), (2, "E->F")]);
    }

    #[test]
    fn commented_relations_are_ignored() {
        assert_eq!(significant_lines("# A -> B").count(), 0);
    }
}
