//! Endpoint checks for consumers that draw relations between named nodes.
//!
//! The parser never resolves names; edges, bluelines and evolutions may name
//! nodes that were never declared. Renderers call
//! [`WardleyMap::unresolved_references`] to find those before drawing.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::WardleyMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Edge,
    Blueline,
    Evolution,
}

impl RelationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Edge => "edge",
            Self::Blueline => "blueline",
            Self::Evolution => "evolution",
        }
    }
}

/// A node title referenced by a relation but absent from the node table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnresolvedReference {
    pub relation: RelationKind,
    pub name: String,
}

impl fmt::Display for UnresolvedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Could not find a component called '{}'", self.name)
    }
}

impl WardleyMap {
    /// Every missing endpoint: edges first, then bluelines, then evolutions,
    /// each in source order with `from` reported before `to`.
    #[must_use]
    pub fn unresolved_references(&self) -> Vec<UnresolvedReference> {
        let mut missing = Vec::new();

        let relations = self
            .edges
            .iter()
            .map(|edge| (RelationKind::Edge, edge))
            .chain(
                self.bluelines
                    .iter()
                    .map(|edge| (RelationKind::Blueline, edge)),
            );
        for (relation, edge) in relations {
            for name in [&edge.from, &edge.to] {
                if !self.contains_node(name) {
                    missing.push(UnresolvedReference {
                        relation,
                        name: name.clone(),
                    });
                }
            }
        }

        for title in self.evolutions.keys() {
            if !self.contains_node(title) {
                missing.push(UnresolvedReference {
                    relation: RelationKind::Evolution,
                    name: title.clone(),
                });
            }
        }

        missing
    }
}
