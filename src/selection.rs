use crate::error::ApiError;
use crate::generation::{Generation, Ticket};
use crate::model::{ResourceKind, SelectedResource};
use tracing::debug;

/// Detail fetch the selection controller wants issued.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DetailRequest {
    pub ticket: Ticket,
    pub kind: ResourceKind,
    pub namespace: String,
    pub name: String,
}

/// At most one selected resource plus its detail loading state.
///
/// Unlike the list controllers, selection is last-write-wins: issuing a new
/// fetch does not invalidate older ones. Only `clear()` advances the
/// generation, so completions issued before a close are dropped.
#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    selected: Option<SelectedResource>,
    loading: bool,
    error: Option<String>,
    generation: Generation,
}

impl SelectionController {
    pub fn selected(&self) -> Option<&SelectedResource> {
        self.selected.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn select_pod(&mut self, namespace: &str, name: &str) -> DetailRequest {
        self.begin(ResourceKind::Pod, namespace, name)
    }

    pub fn select_service(&mut self, namespace: &str, name: &str) -> DetailRequest {
        self.begin(ResourceKind::Service, namespace, name)
    }

    pub fn begin(&mut self, kind: ResourceKind, namespace: &str, name: &str) -> DetailRequest {
        self.loading = true;
        self.error = None;
        let ticket = self.generation.ticket();
        debug!("{kind} detail requested for {namespace}/{name}");
        DetailRequest {
            ticket,
            kind,
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    /// Applies a finished detail fetch. Returns `false` when a `clear()`
    /// happened after the fetch was issued.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        result: Result<SelectedResource, ApiError>,
    ) -> bool {
        if !self.generation.is_current(ticket) {
            debug!("detail completion dropped after close ({ticket:?})");
            return false;
        }

        self.loading = false;
        match result {
            Ok(resource) => {
                debug!(
                    "{} detail loaded for {}/{}",
                    resource.kind(),
                    resource.namespace(),
                    resource.resource_name()
                );
                self.selected = Some(resource);
                self.error = None;
            }
            Err(error) => {
                debug!("detail fetch failed: {error}");
                self.selected = None;
                self.error = Some(error.to_string());
            }
        }
        true
    }

    pub fn clear(&mut self) {
        self.generation.advance();
        self.selected = None;
        self.error = None;
        self.loading = false;
    }
}
