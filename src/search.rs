use crate::model::ResourceKind;
use tracing::debug;

/// Validated search the caller should hand to the selection controller.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SearchQuery {
    pub kind: ResourceKind,
    pub namespace: String,
    pub name: String,
}

/// Direct lookup of one resource by kind, namespace and name, bypassing the
/// list panes.
#[derive(Debug, Clone, Default)]
pub struct SearchController {
    searching: bool,
}

impl SearchController {
    pub fn is_searching(&self) -> bool {
        self.searching
    }

    /// Trims the inputs and starts a search. Blank namespace or name is a
    /// silent no-op.
    pub fn search(&mut self, kind: ResourceKind, namespace: &str, name: &str) -> Option<SearchQuery> {
        let namespace = namespace.trim();
        let name = name.trim();
        if namespace.is_empty() || name.is_empty() {
            debug!("ignoring search with blank namespace or name");
            return None;
        }

        self.searching = true;
        Some(SearchQuery {
            kind,
            namespace: namespace.to_string(),
            name: name.to_string(),
        })
    }

    /// Marks the underlying detail fetch as settled, whether or not its result
    /// was applied.
    pub fn settle(&mut self) {
        self.searching = false;
    }
}
