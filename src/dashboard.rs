use crate::api::{ApiResult, DiagnosticGateway};
use crate::generation::Ticket;
use crate::listing::{ListRequest, ResourceListController};
use crate::model::{
    BulkResult, NamespaceList, PodDiagnosticResult, ResourceKind, SelectedResource,
    ServiceDiagnosticResult,
};
use crate::namespaces::NamespaceStore;
use crate::search::SearchController;
use crate::selection::{DetailRequest, SelectionController};
use futures::future::BoxFuture;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Completion of a spawned gateway call, carrying the ticket captured when it
/// was issued.
#[derive(Debug)]
pub enum FetchEvent {
    Namespaces(ApiResult<NamespaceList>),
    Pods {
        ticket: Ticket,
        result: ApiResult<BulkResult<PodDiagnosticResult>>,
    },
    Services {
        ticket: Ticket,
        result: ApiResult<BulkResult<ServiceDiagnosticResult>>,
    },
    Detail {
        ticket: Ticket,
        from_search: bool,
        result: ApiResult<SelectedResource>,
    },
}

/// Owns every controller and wires the flows between them.
///
/// All mutation happens on the caller's task. Gateway calls run as spawned
/// tasks and come back through the `FetchEvent` channel, to be fed into
/// [`Dashboard::apply`].
pub struct Dashboard {
    gateway: Arc<dyn DiagnosticGateway>,
    events: mpsc::UnboundedSender<FetchEvent>,
    namespaces: NamespaceStore,
    pods: ResourceListController<PodDiagnosticResult>,
    services: ResourceListController<ServiceDiagnosticResult>,
    selection: SelectionController,
    search: SearchController,
}

impl Dashboard {
    pub fn new(
        gateway: Arc<dyn DiagnosticGateway>,
        events: mpsc::UnboundedSender<FetchEvent>,
        preferred_namespace: &str,
    ) -> Self {
        Self {
            gateway,
            events,
            namespaces: NamespaceStore::new(preferred_namespace),
            pods: ResourceListController::new("pod"),
            services: ResourceListController::new("service"),
            selection: SelectionController::default(),
            search: SearchController::default(),
        }
    }

    pub fn namespaces(&self) -> &NamespaceStore {
        &self.namespaces
    }

    pub fn pods(&self) -> &ResourceListController<PodDiagnosticResult> {
        &self.pods
    }

    pub fn services(&self) -> &ResourceListController<ServiceDiagnosticResult> {
        &self.services
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn is_searching(&self) -> bool {
        self.search.is_searching()
    }

    pub fn active_namespace(&self) -> Option<&str> {
        self.namespaces.selected()
    }

    pub fn load_namespaces(&mut self) {
        self.namespaces.begin_load();
        let future = self.gateway.list_namespaces();
        self.dispatch(future, FetchEvent::Namespaces);
    }

    /// Switches the active namespace, closing any open detail and reloading
    /// both listings. Selecting the current namespace again re-fetches.
    pub fn select_namespace(&mut self, namespace: &str) {
        let namespace = self.namespaces.select(namespace);
        info!("namespace selected: {namespace}");
        self.selection.clear();
        self.fan_out(&namespace);
    }

    /// Re-fetches both listings for the current namespace. Returns `false`
    /// when no namespace is active.
    pub fn refresh(&mut self) -> bool {
        let pods = self.pods.refresh();
        let services = self.services.refresh();
        let issued = pods.is_some() || services.is_some();
        if let Some(request) = pods {
            self.fetch_pods(request);
        }
        if let Some(request) = services {
            self.fetch_services(request);
        }
        issued
    }

    pub fn select_pod(&mut self, namespace: &str, name: &str) {
        let request = self.selection.select_pod(namespace, name);
        self.fetch_detail(request, false);
    }

    pub fn select_service(&mut self, namespace: &str, name: &str) {
        let request = self.selection.select_service(namespace, name);
        self.fetch_detail(request, false);
    }

    /// Looks up one resource directly. Returns `false` when the inputs were
    /// blank and nothing was issued.
    pub fn search(&mut self, kind: ResourceKind, namespace: &str, name: &str) -> bool {
        let Some(query) = self.search.search(kind, namespace, name) else {
            return false;
        };
        info!("searching {} {}/{}", query.kind, query.namespace, query.name);
        let request = self
            .selection
            .begin(query.kind, &query.namespace, &query.name);
        self.fetch_detail(request, true);
        true
    }

    pub fn close_detail(&mut self) {
        self.selection.clear();
    }

    pub fn apply(&mut self, event: FetchEvent) {
        match event {
            FetchEvent::Namespaces(result) => {
                if let Some(namespace) = self.namespaces.finish_load(result) {
                    info!("namespace defaulted to {namespace}");
                    self.fan_out(&namespace);
                }
            }
            FetchEvent::Pods { ticket, result } => {
                self.pods.complete(ticket, result);
            }
            FetchEvent::Services { ticket, result } => {
                self.services.complete(ticket, result);
            }
            FetchEvent::Detail {
                ticket,
                from_search,
                result,
            } => {
                if from_search {
                    self.search.settle();
                }
                self.selection.complete(ticket, result);
            }
        }
    }

    fn fan_out(&mut self, namespace: &str) {
        let pods = self.pods.on_namespace_changed(namespace);
        let services = self.services.on_namespace_changed(namespace);
        self.fetch_pods(pods);
        self.fetch_services(services);
    }

    fn fetch_pods(&self, request: ListRequest) {
        let ListRequest { ticket, namespace } = request;
        let future = self.gateway.list_pods(&namespace);
        self.dispatch(future, move |result| FetchEvent::Pods { ticket, result });
    }

    fn fetch_services(&self, request: ListRequest) {
        let ListRequest { ticket, namespace } = request;
        let future = self.gateway.list_services(&namespace);
        self.dispatch(future, move |result| FetchEvent::Services { ticket, result });
    }

    fn fetch_detail(&self, request: DetailRequest, from_search: bool) {
        let DetailRequest {
            ticket,
            kind,
            namespace,
            name,
        } = request;
        match kind {
            ResourceKind::Pod => {
                let future = self.gateway.pod_detail(&namespace, &name);
                self.dispatch(future, move |result| FetchEvent::Detail {
                    ticket,
                    from_search,
                    result: result.map(SelectedResource::Pod),
                });
            }
            ResourceKind::Service => {
                let future = self.gateway.service_detail(&namespace, &name);
                self.dispatch(future, move |result| FetchEvent::Detail {
                    ticket,
                    from_search,
                    result: result.map(SelectedResource::Service),
                });
            }
        }
    }

    fn dispatch<T, F>(&self, future: BoxFuture<'static, ApiResult<T>>, into_event: F)
    where
        T: Send + 'static,
        F: FnOnce(ApiResult<T>) -> FetchEvent + Send + 'static,
    {
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = future.await;
            if events.send(into_event(result)).is_err() {
                debug!("fetch completed after the event loop shut down");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::{Dashboard, FetchEvent};
    use crate::api::{ApiResult, DiagnosticGateway};
    use crate::error::ApiError;
    use crate::listing::ListStatus;
    use crate::model::{
        BulkResult, NamespaceList, PodDiagnosticResult, ResourceKind, SelectedResource,
        ServiceDiagnosticResult,
    };
    use futures::FutureExt;
    use futures::future::BoxFuture;
    use serde::de::DeserializeOwned;
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};
    use tokio::sync::{mpsc, oneshot};

    type Reply = oneshot::Sender<ApiResult<Value>>;

    /// Gateway whose requests stay pending until the test answers them, in
    /// whatever order the test chooses.
    #[derive(Default)]
    struct ScriptedGateway {
        pending: Mutex<Vec<(String, Reply)>>,
    }

    impl ScriptedGateway {
        fn request<T>(&self, path: String) -> BoxFuture<'static, ApiResult<T>>
        where
            T: DeserializeOwned + Send + 'static,
        {
            let (tx, rx) = oneshot::channel();
            self.pending.lock().expect("pending lock").push((path, tx));
            async move {
                let value = rx.await.map_err(|_| ApiError::Network)??;
                serde_json::from_value::<T>(value)
                    .map_err(|error| ApiError::Decode(error.to_string()))
            }
            .boxed()
        }

        fn paths(&self) -> Vec<String> {
            self.pending
                .lock()
                .expect("pending lock")
                .iter()
                .map(|(path, _)| path.clone())
                .collect()
        }

        fn reply(&self, path: &str, result: ApiResult<Value>) {
            let mut pending = self.pending.lock().expect("pending lock");
            let index = pending
                .iter()
                .position(|(pending_path, _)| pending_path == path)
                .unwrap_or_else(|| panic!("no pending request for {path}"));
            let (_, tx) = pending.remove(index);
            let _ = tx.send(result);
        }
    }

    impl DiagnosticGateway for ScriptedGateway {
        fn list_namespaces(&self) -> BoxFuture<'static, ApiResult<NamespaceList>> {
            self.request("/namespaces".to_string())
        }

        fn list_pods(
            &self,
            namespace: &str,
        ) -> BoxFuture<'static, ApiResult<BulkResult<PodDiagnosticResult>>> {
            self.request(format!("/debug/pods/{namespace}"))
        }

        fn list_services(
            &self,
            namespace: &str,
        ) -> BoxFuture<'static, ApiResult<BulkResult<ServiceDiagnosticResult>>> {
            self.request(format!("/debug/services/{namespace}"))
        }

        fn pod_detail(
            &self,
            namespace: &str,
            name: &str,
        ) -> BoxFuture<'static, ApiResult<PodDiagnosticResult>> {
            self.request(format!("/debug/pod/{namespace}/{name}"))
        }

        fn service_detail(
            &self,
            namespace: &str,
            name: &str,
        ) -> BoxFuture<'static, ApiResult<ServiceDiagnosticResult>> {
            self.request(format!("/debug/service/{namespace}/{name}"))
        }
    }

    struct Harness {
        gateway: Arc<ScriptedGateway>,
        dashboard: Dashboard,
        events: mpsc::UnboundedReceiver<FetchEvent>,
    }

    impl Harness {
        fn new() -> Self {
            let gateway = Arc::new(ScriptedGateway::default());
            let (tx, events) = mpsc::unbounded_channel();
            let dashboard = Dashboard::new(gateway.clone(), tx, "default");
            Self {
                gateway,
                dashboard,
                events,
            }
        }

        async fn answer(&mut self, path: &str, result: ApiResult<Value>) {
            self.gateway.reply(path, result);
            let event = self.events.recv().await.expect("fetch event");
            self.dashboard.apply(event);
        }
    }

    fn pod(namespace: &str, name: &str, status: &str) -> Value {
        json!({
            "summary": {
                "diagnosticTime": "2026-01-01T00:00:00Z",
                "resourceType": "Pod",
                "overallHealth": status,
                "message": "diagnosed"
            },
            "resourceName": name,
            "namespace": namespace,
            "status": status,
            "phase": "Running",
            "probableCauses": [],
            "evidence": [],
            "suggestedActions": [],
            "containerStatuses": [],
            "restartCount": 0
        })
    }

    fn service(namespace: &str, name: &str) -> Value {
        json!({
            "resourceName": name,
            "namespace": namespace,
            "status": "Healthy",
            "serviceType": "ClusterIP",
            "selector": {"app": name},
            "ports": [{"name": "http", "protocol": "TCP", "port": 80, "targetPort": 8080}],
            "endpointInfo": {"readyEndpoints": 1, "notReadyEndpoints": 0, "addresses": ["10.0.0.4"]},
            "coreDnsExists": true,
            "probableCauses": [],
            "evidence": [],
            "suggestedActions": []
        })
    }

    fn pod_listing(namespace: &str, names: &[&str]) -> Value {
        let results = names
            .iter()
            .map(|name| pod(namespace, name, "Healthy"))
            .collect::<Vec<_>>();
        json!({
            "summary": {"diagnosticTime": "t", "resourceType": "Pods (Bulk)", "overallHealth": "Healthy", "message": "ok"},
            "namespace": namespace,
            "totalPods": results.len(),
            "criticalCount": 0,
            "warningCount": 0,
            "healthyCount": results.len(),
            "results": results
        })
    }

    fn service_listing(namespace: &str, names: &[&str]) -> Value {
        let results = names
            .iter()
            .map(|name| service(namespace, name))
            .collect::<Vec<_>>();
        json!({
            "summary": {"diagnosticTime": "t", "resourceType": "Services (Bulk)", "overallHealth": "Healthy", "message": "ok"},
            "namespace": namespace,
            "totalServices": results.len(),
            "criticalCount": 0,
            "warningCount": 0,
            "healthyCount": results.len(),
            "results": results
        })
    }

    #[tokio::test]
    async fn startup_defaults_namespace_and_loads_both_listings_in_parallel() {
        let mut harness = Harness::new();
        harness.dashboard.load_namespaces();
        assert!(harness.dashboard.namespaces().loading());

        harness
            .answer(
                "/namespaces",
                Ok(json!({"namespaces": ["kube-system", "default", "app-ns"], "total": 3})),
            )
            .await;

        assert_eq!(harness.dashboard.active_namespace(), Some("default"));
        assert_eq!(
            harness.gateway.paths(),
            vec!["/debug/pods/default", "/debug/services/default"]
        );
        assert_eq!(harness.dashboard.pods().status(), ListStatus::Loading);
        assert_eq!(harness.dashboard.services().status(), ListStatus::Loading);

        harness
            .answer("/debug/services/default", Ok(service_listing("default", &["web"])))
            .await;
        harness
            .answer("/debug/pods/default", Ok(pod_listing("default", &["nginx-1"])))
            .await;

        assert_eq!(harness.dashboard.pods().items().len(), 1);
        assert_eq!(harness.dashboard.services().items()[0].resource_name, "web");
    }

    #[tokio::test]
    async fn namespace_failure_is_kept_on_the_store() {
        let mut harness = Harness::new();
        harness.dashboard.load_namespaces();
        harness.answer("/namespaces", Err(ApiError::Network)).await;

        assert_eq!(harness.dashboard.active_namespace(), None);
        assert_eq!(
            harness.dashboard.namespaces().error(),
            Some("Unable to connect to the server. Is the backend running?")
        );
        assert!(harness.gateway.paths().is_empty());
    }

    #[tokio::test]
    async fn rapid_namespace_switches_converge_on_the_last_one() {
        let mut harness = Harness::new();
        for namespace in ["kube-system", "app-ns", "default"] {
            harness.dashboard.select_namespace(namespace);
        }

        for namespace in ["default", "app-ns", "kube-system"] {
            harness
                .answer(
                    &format!("/debug/pods/{namespace}"),
                    Ok(pod_listing(namespace, &["p"])),
                )
                .await;
            harness
                .answer(
                    &format!("/debug/services/{namespace}"),
                    Ok(service_listing(namespace, &["s"])),
                )
                .await;
        }

        let pods = harness.dashboard.pods();
        assert_eq!(pods.status(), ListStatus::Ready);
        assert_eq!(pods.data().map(|data| data.namespace.as_str()), Some("default"));
        let services = harness.dashboard.services();
        assert_eq!(
            services.data().map(|data| data.namespace.as_str()),
            Some("default")
        );
    }

    #[tokio::test]
    async fn selecting_a_pod_loads_its_detail() {
        let mut harness = Harness::new();
        harness.dashboard.select_pod("default", "nginx-1");
        assert!(harness.dashboard.selection().is_loading());

        harness
            .answer("/debug/pod/default/nginx-1", Ok(pod("default", "nginx-1", "Healthy")))
            .await;

        let selection = harness.dashboard.selection();
        assert!(!selection.is_loading());
        assert_eq!(selection.error(), None);
        let Some(SelectedResource::Pod(detail)) = selection.selected() else {
            panic!("expected a pod selection");
        };
        assert_eq!(detail.resource_name, "nginx-1");
        assert_eq!(detail.phase, "Running");
    }

    #[tokio::test]
    async fn missing_pod_surfaces_server_message() {
        let mut harness = Harness::new();
        harness.dashboard.select_pod("default", "nginx-2");
        harness
            .answer(
                "/debug/pod/default/nginx-2",
                Err(ApiError::server(404, "pod not found")),
            )
            .await;

        let selection = harness.dashboard.selection();
        assert!(selection.selected().is_none());
        assert_eq!(selection.error(), Some("pod not found"));
        assert!(!selection.is_loading());
    }

    #[tokio::test]
    async fn blank_namespace_search_issues_nothing() {
        let mut harness = Harness::new();
        assert!(!harness.dashboard.search(ResourceKind::Service, "  ", "web"));

        assert!(harness.gateway.paths().is_empty());
        assert!(!harness.dashboard.is_searching());
        assert!(!harness.dashboard.selection().is_loading());
        assert!(harness.dashboard.selection().selected().is_none());
    }

    #[tokio::test]
    async fn search_bypasses_listings_and_settles_flag() {
        let mut harness = Harness::new();
        assert!(harness.dashboard.search(ResourceKind::Service, " app-ns ", "web"));
        assert!(harness.dashboard.is_searching());
        assert_eq!(harness.gateway.paths(), vec!["/debug/service/app-ns/web"]);

        harness
            .answer("/debug/service/app-ns/web", Ok(service("app-ns", "web")))
            .await;

        assert!(!harness.dashboard.is_searching());
        let selected = harness.dashboard.selection().selected().expect("selected");
        assert!(selected.is(ResourceKind::Service, "app-ns", "web"));
        assert_eq!(harness.dashboard.pods().status(), ListStatus::Idle);
    }

    #[tokio::test]
    async fn failed_search_still_settles_flag() {
        let mut harness = Harness::new();
        harness.dashboard.search(ResourceKind::Pod, "default", "ghost");
        harness
            .answer("/debug/pod/default/ghost", Err(ApiError::server(404, "pod not found")))
            .await;

        assert!(!harness.dashboard.is_searching());
        assert_eq!(harness.dashboard.selection().error(), Some("pod not found"));
    }

    #[tokio::test]
    async fn closing_detail_drops_late_completion() {
        let mut harness = Harness::new();
        harness.dashboard.select_service("default", "web");
        harness.dashboard.close_detail();
        assert!(!harness.dashboard.selection().is_loading());

        harness
            .answer("/debug/service/default/web", Ok(service("default", "web")))
            .await;

        assert!(harness.dashboard.selection().selected().is_none());
        assert_eq!(harness.dashboard.selection().error(), None);
    }

    #[tokio::test]
    async fn namespace_change_closes_open_detail() {
        let mut harness = Harness::new();
        harness.dashboard.select_pod("default", "nginx-1");
        harness
            .answer("/debug/pod/default/nginx-1", Ok(pod("default", "nginx-1", "Healthy")))
            .await;
        assert!(harness.dashboard.selection().selected().is_some());

        harness.dashboard.select_namespace("app-ns");
        assert!(harness.dashboard.selection().selected().is_none());
    }

    #[tokio::test]
    async fn refresh_keeps_listing_visible_until_new_data_arrives() {
        let mut harness = Harness::new();
        assert!(!harness.dashboard.refresh());

        harness.dashboard.select_namespace("default");
        harness
            .answer("/debug/pods/default", Ok(pod_listing("default", &["nginx-1"])))
            .await;
        harness
            .answer("/debug/services/default", Ok(service_listing("default", &[])))
            .await;

        assert!(harness.dashboard.refresh());
        assert_eq!(harness.dashboard.pods().status(), ListStatus::Loading);
        assert_eq!(harness.dashboard.pods().items().len(), 1);

        harness
            .answer(
                "/debug/pods/default",
                Ok(pod_listing("default", &["nginx-1", "nginx-2"])),
            )
            .await;
        assert_eq!(harness.dashboard.pods().items().len(), 2);
    }

    #[tokio::test]
    async fn reselecting_same_namespace_refetches() {
        let mut harness = Harness::new();
        harness.dashboard.select_namespace("default");
        harness.dashboard.select_namespace("default");
        assert_eq!(
            harness.gateway.paths(),
            vec![
                "/debug/pods/default",
                "/debug/services/default",
                "/debug/pods/default",
                "/debug/services/default",
            ]
        );
    }

    #[tokio::test]
    async fn failed_pod_listing_leaves_services_and_selection_alone() {
        let mut harness = Harness::new();
        harness.dashboard.select_namespace("default");
        harness.dashboard.select_pod("default", "nginx-1");
        harness
            .answer(
                "/debug/pod/default/nginx-1",
                Ok(pod("default", "nginx-1", "Healthy")),
            )
            .await;

        harness
            .answer(
                "/debug/pods/default",
                Err(ApiError::server(500, "Internal Server Error")),
            )
            .await;
        harness
            .answer("/debug/services/default", Ok(service_listing("default", &["web"])))
            .await;

        let pods = harness.dashboard.pods();
        assert_eq!(pods.status(), ListStatus::Failed);
        assert_eq!(pods.error(), Some("Internal Server Error"));

        let services = harness.dashboard.services();
        assert_eq!(services.status(), ListStatus::Ready);
        assert_eq!(services.items().len(), 1);
        assert_eq!(services.error(), None);

        let selection = harness.dashboard.selection();
        let selected = selection.selected().expect("pod stays selected");
        assert!(selected.is(ResourceKind::Pod, "default", "nginx-1"));
        assert_eq!(selection.error(), None);
        assert!(!selection.is_loading());
    }

    #[tokio::test]
    async fn list_click_landing_after_search_result_wins() {
        let mut harness = Harness::new();
        harness.dashboard.select_namespace("default");
        assert!(harness.dashboard.search(ResourceKind::Service, "default", "web"));
        harness.dashboard.select_pod("default", "nginx-1");

        harness
            .answer("/debug/service/default/web", Ok(service("default", "web")))
            .await;
        assert!(!harness.dashboard.is_searching());
        let selected = harness.dashboard.selection().selected().expect("service shown");
        assert!(selected.is(ResourceKind::Service, "default", "web"));

        harness
            .answer(
                "/debug/pod/default/nginx-1",
                Ok(pod("default", "nginx-1", "Warning")),
            )
            .await;
        let selection = harness.dashboard.selection();
        let selected = selection.selected().expect("pod shown");
        assert!(selected.is(ResourceKind::Pod, "default", "nginx-1"));
        assert!(!selection.is_loading());
        assert!(!harness.dashboard.is_searching());
    }
}
