//! OSC 8 hyperlink registry
//!
//! Cells reference hyperlinks through shared handles. The registry itself
//! only keeps weak entries for deduplication, so a hyperlink record is
//! destroyed as soon as the last cell referencing it is overwritten.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

/// A single hyperlink record, shared by every cell it covers
#[derive(Debug, PartialEq, Eq)]
pub struct Hyperlink {
    /// The `id=` parameter from OSC 8, possibly empty
    pub id: String,
    /// Target URI
    pub uri: String,
}

/// Registry of live hyperlinks, keyed by their OSC 8 id
#[derive(Debug, Default)]
pub struct HyperlinkRegistry {
    entries: HashMap<String, Weak<Hyperlink>>,
}

impl HyperlinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up or create the hyperlink for the given id/uri pair.
    ///
    /// Links sharing a non-empty id resolve to the same record, so that
    /// multi-cell links highlight as one unit. Anonymous links (empty id)
    /// are always distinct records.
    pub fn register(&mut self, id: &str, uri: &str) -> Arc<Hyperlink> {
        if !id.is_empty() {
            if let Some(existing) = self.entries.get(id).and_then(Weak::upgrade) {
                return existing;
            }
        }

        let link = Arc::new(Hyperlink {
            id: id.to_string(),
            uri: uri.to_string(),
        });
        if !id.is_empty() {
            self.entries.insert(id.to_string(), Arc::downgrade(&link));
        }
        link
    }

    /// Drop registry entries whose last referencing cell is gone.
    pub fn purge(&mut self) {
        self.entries.retain(|_, weak| weak.strong_count() > 0);
    }

    /// Number of ids with at least one live referent.
    pub fn live_count(&self) -> usize {
        self.entries
            .values()
            .filter(|w| w.strong_count() > 0)
            .count()
    }
}
