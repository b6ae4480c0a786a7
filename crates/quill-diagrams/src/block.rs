//! Diagram blocks and their content identity.
//!
//! Provides [`DiagramBlock`], the immutable unit produced from a template tag,
//! and [`DiagramKey`] for computing the content hash it is identified by.

use sha2::{Digest, Sha256};

use crate::consts::DOM_ID_HASH_LEN;
use crate::encode::{Token, encode};
use crate::language::{Dialect, RenderStrategy};

/// Parameters that make two diagrams interchangeable.
#[derive(Debug)]
pub struct DiagramKey<'a> {
    /// Diagram source exactly as written in the tag body.
    pub source: &'a str,
    /// Service endpoint of the dialect (e.g., "plantuml", "mermaid").
    pub endpoint: &'a str,
}

impl DiagramKey<'_> {
    /// Compute a content hash for this key.
    ///
    /// SHA-256 of `"{endpoint}:{source}"`, hex-encoded.
    #[must_use]
    pub fn compute_hash(&self) -> String {
        let content = format!("{}:{}", self.endpoint, self.source);
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        let result = hasher.finalize();
        hex::encode(result)
    }
}

/// A diagram lifted from content at build time.
///
/// Immutable once created. The identity is used both to deduplicate encoding
/// work and to name the DOM element the diagram lands in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramBlock {
    dialect: Dialect,
    source: String,
    identity: String,
}

impl DiagramBlock {
    #[must_use]
    pub fn new(dialect: Dialect, source: impl Into<String>) -> Self {
        let source = source.into();
        let identity = DiagramKey {
            source: &source,
            endpoint: dialect.endpoint(),
        }
        .compute_hash();

        Self {
            dialect,
            source,
            identity,
        }
    }

    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Hex SHA-256 identity of dialect and source.
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Element id for the placeholder, e.g. `kroki-plantuml-1a2b3c4d`.
    #[must_use]
    pub fn dom_id(&self) -> String {
        let prefix = match self.dialect.strategy() {
            RenderStrategy::Remote => "kroki",
            RenderStrategy::Local => "mermaid",
        };
        let short = &self.identity[..DOM_ID_HASH_LEN];
        format!("{prefix}-{}-{short}", self.dialect.endpoint())
    }

    /// Encode this block's source for a service URL.
    #[must_use]
    pub fn token(&self) -> Token {
        encode(&self.source, self.dialect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagram_key_hash() {
        let key1 = DiagramKey {
            source: "A -> B",
            endpoint: "plantuml",
        };
        let key2 = DiagramKey {
            source: "A -> B",
            endpoint: "plantuml",
        };
        let key3 = DiagramKey {
            source: "C -> D",
            endpoint: "plantuml",
        };

        assert_eq!(key1.compute_hash(), key2.compute_hash());
        assert_ne!(key1.compute_hash(), key3.compute_hash());
        assert_eq!(key1.compute_hash().len(), 64);
    }

    #[test]
    fn test_diagram_key_hash_endpoint_matters() {
        let plantuml = DiagramKey {
            source: "a -> b",
            endpoint: "plantuml",
        };
        let graphviz = DiagramKey {
            endpoint: "graphviz",
            ..plantuml
        };

        assert_ne!(plantuml.compute_hash(), graphviz.compute_hash());
    }

    #[test]
    fn test_identity_is_hex() {
        let block = DiagramBlock::new(Dialect::GraphViz, "digraph { a -> b }");
        assert!(block.identity().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_dom_id_remote() {
        let block = DiagramBlock::new(Dialect::PlantUml, "A -> B");
        let id = block.dom_id();

        assert!(id.starts_with("kroki-plantuml-"));
        assert_eq!(id.len(), "kroki-plantuml-".len() + 8);
        assert!(block.identity().starts_with(&id["kroki-plantuml-".len()..]));
    }

    #[test]
    fn test_dom_id_local() {
        let block = DiagramBlock::new(Dialect::Mermaid, "graph TD; A-->B");
        assert!(block.dom_id().starts_with("mermaid-mermaid-"));
    }

    #[test]
    fn test_same_content_same_identity() {
        let a = DiagramBlock::new(Dialect::Svgbob, "+--+\n|  |\n+--+");
        let b = DiagramBlock::new(Dialect::Svgbob, "+--+\n|  |\n+--+");

        assert_eq!(a, b);
        assert_eq!(a.dom_id(), b.dom_id());
        assert_eq!(a.token(), b.token());
    }
}
