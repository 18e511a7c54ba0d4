use crate::error::ApiError;
use crate::generation::{Generation, Ticket};
use crate::model::{BulkResult, DiagnosedResource};
use chrono::{DateTime, Local};
use tracing::debug;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ListStatus {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// A fetch the controller wants issued: which namespace, under which ticket.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ListRequest {
    pub ticket: Ticket,
    pub namespace: String,
}

/// Bulk listing of one resource kind for the active namespace.
///
/// Completions are matched against the ticket of the latest request; anything
/// older is dropped without touching data, error or status.
#[derive(Debug, Clone)]
pub struct ResourceListController<T> {
    label: &'static str,
    status: ListStatus,
    target: Option<String>,
    data: Option<BulkResult<T>>,
    error: Option<String>,
    generation: Generation,
    last_refreshed: Option<DateTime<Local>>,
}

impl<T: DiagnosedResource> ResourceListController<T> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            status: ListStatus::Idle,
            target: None,
            data: None,
            error: None,
            generation: Generation::default(),
            last_refreshed: None,
        }
    }

    pub fn status(&self) -> ListStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == ListStatus::Loading
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn data(&self) -> Option<&BulkResult<T>> {
        self.data.as_ref()
    }

    pub fn items(&self) -> &[T] {
        self.data
            .as_ref()
            .map(|data| data.results.as_slice())
            .unwrap_or_default()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn last_refreshed(&self) -> Option<DateTime<Local>> {
        self.last_refreshed
    }

    pub fn on_namespace_changed(&mut self, namespace: impl Into<String>) -> ListRequest {
        let namespace = namespace.into();
        self.target = Some(namespace.clone());
        self.data = None;
        self.begin(namespace)
    }

    /// Re-fetches the current target, keeping the previous listing visible
    /// until the new one lands.
    pub fn refresh(&mut self) -> Option<ListRequest> {
        let namespace = self.target.clone()?;
        Some(self.begin(namespace))
    }

    fn begin(&mut self, namespace: String) -> ListRequest {
        self.error = None;
        self.status = ListStatus::Loading;
        let ticket = self.generation.advance();
        debug!("{} listing requested for {namespace} ({ticket:?})", self.label);
        ListRequest { ticket, namespace }
    }

    /// Applies a finished fetch. Returns `false` when the completion was stale.
    pub fn complete(&mut self, ticket: Ticket, result: Result<BulkResult<T>, ApiError>) -> bool {
        if !self.generation.is_current(ticket) {
            debug!("{} listing discarded as stale ({ticket:?})", self.label);
            return false;
        }

        self.last_refreshed = Some(Local::now());
        match result {
            Ok(data) => {
                debug!(
                    "{} listing ready for {} ({} items)",
                    self.label,
                    data.namespace,
                    data.results.len()
                );
                self.data = Some(data.normalized());
                self.error = None;
                self.status = ListStatus::Ready;
            }
            Err(error) => {
                debug!("{} listing failed: {error}", self.label);
                self.data = None;
                self.error = Some(error.to_string());
                self.status = ListStatus::Failed;
            }
        }
        true
    }
}
