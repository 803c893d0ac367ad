use log::warn;

use crate::dom::{Document, NodeId};

/// Ordered list of selectors. The first selector that finds anything
/// wins; later ones are broader fallbacks.
#[derive(Debug, Clone)]
pub struct SelectorChain {
    selectors: Vec<String>,
}

impl SelectorChain {
    pub fn new(selectors: Vec<String>) -> Self {
        SelectorChain { selectors }
    }

    pub fn selectors(&self) -> &[String] {
        &self.selectors
    }

    /// All matches of the first selector with at least one hit, with its
    /// index. Malformed selectors are skipped.
    pub fn first_all(&self, doc: &Document, scope: NodeId) -> Option<(usize, Vec<NodeId>)> {
        self.selectors
            .iter()
            .enumerate()
            .find_map(|(i, sel)| match doc.select_within(scope, sel) {
                Ok(hits) if !hits.is_empty() => Some((i, hits)),
                Ok(_) => None,
                Err(e) => {
                    warn!("Skipping selector: {}", e);
                    None
                }
            })
    }

    /// First element matched by the first successful selector.
    pub fn first_one(&self, doc: &Document) -> Option<NodeId> {
        self.first_all(doc, doc.root())
            .and_then(|(_, hits)| hits.into_iter().next())
    }
}
