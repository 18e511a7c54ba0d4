use crate::error::ApiError;
use crate::model::NamespaceList;
use tracing::{info, warn};

pub const DEFAULT_NAMESPACE: &str = "default";

/// Known namespaces plus the active one.
#[derive(Debug, Clone)]
pub struct NamespaceStore {
    namespaces: Vec<String>,
    selected: Option<String>,
    preferred: String,
    loading: bool,
    error: Option<String>,
}

impl NamespaceStore {
    pub fn new(preferred: impl Into<String>) -> Self {
        Self {
            namespaces: Vec::new(),
            selected: None,
            preferred: preferred.into(),
            loading: false,
            error: None,
        }
    }

    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn begin_load(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Applies the namespace listing. Returns the namespace picked by the
    /// default policy, if the policy fired; the caller fans it out.
    pub fn finish_load(&mut self, result: Result<NamespaceList, ApiError>) -> Option<String> {
        self.loading = false;
        match result {
            Ok(list) => {
                info!("loaded {} namespaces", list.namespaces.len());
                self.namespaces = list.namespaces;
                if self.selected.is_some() {
                    return None;
                }
                let choice = default_choice(&self.namespaces, &self.preferred)?;
                self.selected = Some(choice.clone());
                Some(choice)
            }
            Err(error) => {
                warn!("namespace listing failed: {error}");
                self.error = Some(error.to_string());
                None
            }
        }
    }

    /// Sets the active namespace. Any value is accepted, including names the
    /// backend did not list.
    pub fn select(&mut self, namespace: impl Into<String>) -> String {
        let namespace = namespace.into();
        self.selected = Some(namespace.clone());
        namespace
    }
}

fn default_choice(namespaces: &[String], preferred: &str) -> Option<String> {
    if namespaces.iter().any(|namespace| namespace == preferred) {
        return Some(preferred.to_string());
    }
    namespaces.first().cloned()
}
