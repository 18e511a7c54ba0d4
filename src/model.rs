use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use tracing::warn;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ResourceKind {
    Pod,
    Service,
}

impl ResourceKind {
    pub fn title(self) -> &'static str {
        match self {
            Self::Pod => "Pod",
            Self::Service => "Service",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "po" | "pod" | "pods" => Some(Self::Pod),
            "svc" | "service" | "services" => Some(Self::Service),
            _ => None,
        }
    }

    pub fn short_token(self) -> &'static str {
        match self {
            Self::Pod => "po",
            Self::Service => "svc",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Pod => Self::Service,
            Self::Service => Self::Pod,
        }
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pod => write!(f, "pod"),
            Self::Service => write!(f, "service"),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, Default)]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
    Completed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl HealthStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Healthy => "Healthy",
            Self::Warning => "Warning",
            Self::Critical => "Critical",
            Self::Unknown => "Unknown",
            Self::Completed => "Completed",
        }
    }
}

impl Display for HealthStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticSummary {
    #[serde(default, deserialize_with = "null_as_default")]
    pub diagnostic_time: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub resource_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overall_health: HealthStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContainerStatus {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub restart_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ready: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PodDiagnosticResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<DiagnosticSummary>,
    pub resource_name: String,
    pub namespace: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: HealthStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phase: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub probable_causes: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub evidence: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub suggested_actions: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub container_statuses: Vec<ContainerStatus>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub restart_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ServicePort {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub protocol: String,
    pub port: u16,
    #[serde(default)]
    pub target_port: Option<u16>,
    #[serde(default)]
    pub node_port: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EndpointInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub ready_endpoints: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub not_ready_endpoints: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub addresses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDiagnosticResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<DiagnosticSummary>,
    pub resource_name: String,
    pub namespace: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: HealthStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub service_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub selector: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ports: Vec<ServicePort>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub probable_causes: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub evidence: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub suggested_actions: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub endpoint_info: EndpointInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub core_dns_exists: bool,
}

/// Reads an explicit `null` the same as a missing field. The backend copies
/// optional Kubernetes values straight through, e.g. a selector-less service.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Common view over the two diagnostic result shapes, used by bulk
/// normalization and by the list panes.
pub trait DiagnosedResource {
    fn resource_name(&self) -> &str;
    fn namespace(&self) -> &str;
    fn status(&self) -> HealthStatus;
}

impl DiagnosedResource for PodDiagnosticResult {
    fn resource_name(&self) -> &str {
        &self.resource_name
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn status(&self) -> HealthStatus {
        self.status
    }
}

impl DiagnosedResource for ServiceDiagnosticResult {
    fn resource_name(&self) -> &str {
        &self.resource_name
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn status(&self) -> HealthStatus {
        self.status
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkResult<T> {
    pub summary: DiagnosticSummary,
    #[serde(default)]
    pub namespace: String,
    #[serde(default, alias = "totalPods", alias = "totalServices")]
    pub total_count: usize,
    #[serde(default)]
    pub critical_count: usize,
    #[serde(default)]
    pub warning_count: usize,
    #[serde(default)]
    pub healthy_count: usize,
    #[serde(default)]
    pub results: Vec<T>,
}

impl<T: DiagnosedResource> BulkResult<T> {
    pub fn counts_consistent(&self) -> bool {
        let bucketed = self
            .critical_count
            .checked_add(self.warning_count)
            .and_then(|sum| sum.checked_add(self.healthy_count));
        self.total_count == self.results.len()
            && bucketed.is_some_and(|sum| sum <= self.total_count)
    }

    /// Recomputes the counters from `results` when the payload disagrees with
    /// itself, so a displayed listing always satisfies the bucket invariants.
    pub fn normalized(mut self) -> Self {
        if self.counts_consistent() {
            return self;
        }

        warn!(
            "bulk listing for {} has inconsistent counts (total={} critical={} warning={} healthy={} results={}), recounting",
            self.namespace,
            self.total_count,
            self.critical_count,
            self.warning_count,
            self.healthy_count,
            self.results.len()
        );
        self.total_count = self.results.len();
        self.critical_count = self.count_with(HealthStatus::Critical);
        self.warning_count = self.count_with(HealthStatus::Warning);
        self.healthy_count = self.count_with(HealthStatus::Healthy);
        self
    }

    fn count_with(&self, status: HealthStatus) -> usize {
        self.results
            .iter()
            .filter(|item| item.status() == status)
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceList {
    #[serde(default)]
    pub total: Option<usize>,
    #[serde(default)]
    pub namespaces: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectedResource {
    Pod(PodDiagnosticResult),
    Service(ServiceDiagnosticResult),
}

impl SelectedResource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Pod(_) => ResourceKind::Pod,
            Self::Service(_) => ResourceKind::Service,
        }
    }

    pub fn resource_name(&self) -> &str {
        match self {
            Self::Pod(pod) => &pod.resource_name,
            Self::Service(service) => &service.resource_name,
        }
    }

    pub fn namespace(&self) -> &str {
        match self {
            Self::Pod(pod) => &pod.namespace,
            Self::Service(service) => &service.namespace,
        }
    }

    pub fn is(&self, kind: ResourceKind, namespace: &str, name: &str) -> bool {
        self.kind() == kind && self.namespace() == namespace && self.resource_name() == name
    }
}

#[cfg(test)]
mod tests {
    use super::{
        BulkResult, HealthStatus, NamespaceList, PodDiagnosticResult, ResourceKind,
        ServiceDiagnosticResult,
    };
    use serde_json::json;

    #[test]
    fn resource_aliases_map_to_expected_kinds() {
        assert_eq!(ResourceKind::from_token("po"), Some(ResourceKind::Pod));
        assert_eq!(ResourceKind::from_token("Pods"), Some(ResourceKind::Pod));
        assert_eq!(ResourceKind::from_token("svc"), Some(ResourceKind::Service));
        assert_eq!(
            ResourceKind::from_token("services"),
            Some(ResourceKind::Service)
        );
        assert_eq!(ResourceKind::from_token("deploy"), None);
    }

    #[test]
    fn bulk_pod_payload_decodes_total_pods_alias() {
        let bulk: BulkResult<PodDiagnosticResult> = serde_json::from_value(json!({
            "summary": {
                "diagnosticTime": "2026-01-01T00:00:00Z",
                "resourceType": "Pods (Bulk)",
                "overallHealth": "Warning",
                "message": "1 pod needs attention"
            },
            "namespace": "default",
            "totalPods": 2,
            "criticalCount": 0,
            "warningCount": 1,
            "healthyCount": 1,
            "results": [
                {
                    "resourceName": "nginx-1",
                    "namespace": "default",
                    "status": "Healthy",
                    "phase": "Running",
                    "probableCauses": [],
                    "evidence": [],
                    "suggestedActions": [],
                    "containerStatuses": [
                        {"name": "nginx", "state": "Running", "reason": null, "message": null, "restartCount": 0, "ready": true}
                    ],
                    "restartCount": 0
                },
                {
                    "resourceName": "worker-0",
                    "namespace": "default",
                    "status": "Warning",
                    "phase": "Running",
                    "probableCauses": ["High restart count"],
                    "evidence": ["restartCount=7"],
                    "suggestedActions": ["kubectl logs worker-0 --previous"],
                    "containerStatuses": [],
                    "restartCount": 7
                }
            ]
        }))
        .expect("bulk pods should decode");

        assert_eq!(bulk.total_count, 2);
        assert_eq!(bulk.summary.overall_health, HealthStatus::Warning);
        assert_eq!(bulk.results[1].restart_count, 7);
        assert!(bulk.counts_consistent());
    }

    #[test]
    fn bulk_service_payload_decodes_total_services_alias() {
        let bulk: BulkResult<ServiceDiagnosticResult> = serde_json::from_value(json!({
            "summary": {"diagnosticTime": "t", "resourceType": "Services (Bulk)", "overallHealth": "Critical", "message": "m"},
            "namespace": "app-ns",
            "totalServices": 1,
            "criticalCount": 1,
            "warningCount": 0,
            "healthyCount": 0,
            "results": [{
                "resourceName": "svc-a",
                "namespace": "app-ns",
                "status": "Critical",
                "serviceType": "ClusterIP",
                "selector": {"app": "a"},
                "ports": [{"name": null, "protocol": "TCP", "port": 80, "targetPort": 8080, "nodePort": null}],
                "endpointInfo": {"readyEndpoints": 0, "notReadyEndpoints": 0, "addresses": []},
                "coreDnsExists": true,
                "probableCauses": ["No endpoints"],
                "evidence": [],
                "suggestedActions": []
            }]
        }))
        .expect("bulk services should decode");

        assert_eq!(bulk.total_count, 1);
        assert_eq!(bulk.results[0].ports[0].target_port, Some(8080));
        assert_eq!(bulk.results[0].selector.get("app").map(String::as_str), Some("a"));
    }

    #[test]
    fn unknown_health_value_decodes_as_unknown() {
        let pod: PodDiagnosticResult = serde_json::from_value(json!({
            "resourceName": "p",
            "namespace": "n",
            "status": "Degraded"
        }))
        .expect("pod should decode");
        assert_eq!(pod.status, HealthStatus::Unknown);
    }

    #[test]
    fn normalization_recounts_inconsistent_payloads() {
        let bulk: BulkResult<PodDiagnosticResult> = serde_json::from_value(json!({
            "summary": {"diagnosticTime": "t", "resourceType": "Pods (Bulk)", "overallHealth": "Critical", "message": "m"},
            "namespace": "default",
            "totalPods": 5,
            "criticalCount": 4,
            "warningCount": 4,
            "healthyCount": 4,
            "results": [
                {"resourceName": "a", "namespace": "default", "status": "Critical"},
                {"resourceName": "b", "namespace": "default", "status": "Completed"}
            ]
        }))
        .expect("bulk pods should decode");
        assert!(!bulk.counts_consistent());

        let bulk = bulk.normalized();
        assert_eq!(bulk.total_count, 2);
        assert_eq!(bulk.critical_count, 1);
        assert_eq!(bulk.warning_count, 0);
        assert_eq!(bulk.healthy_count, 0);
        assert!(bulk.counts_consistent());
    }

    #[test]
    fn namespace_list_decodes_with_total() {
        let list: NamespaceList = serde_json::from_value(json!({
            "total": 2,
            "namespaces": ["kube-system", "default"]
        }))
        .expect("namespace list should decode");
        assert_eq!(list.namespaces, vec!["kube-system", "default"]);
    }

    #[test]
    fn selector_less_service_decodes_inside_bulk_listing() {
        let bulk: BulkResult<ServiceDiagnosticResult> = serde_json::from_value(json!({
            "summary": {"diagnosticTime": "t", "resourceType": "Services (Bulk)", "overallHealth": "Healthy", "message": "m"},
            "namespace": "default",
            "totalServices": 1,
            "criticalCount": 0,
            "warningCount": 0,
            "healthyCount": 1,
            "results": [{
                "resourceName": "kubernetes",
                "namespace": "default",
                "status": "Healthy",
                "serviceType": "ClusterIP",
                "selector": null,
                "ports": [{"name": "https", "protocol": null, "port": 443, "targetPort": 6443, "nodePort": null}],
                "endpointInfo": {"readyEndpoints": 1, "notReadyEndpoints": 0, "addresses": null},
                "coreDnsExists": true,
                "probableCauses": null,
                "evidence": [],
                "suggestedActions": []
            }]
        }))
        .expect("selector-less service should decode");

        let service = &bulk.results[0];
        assert!(service.selector.is_empty());
        assert!(service.probable_causes.is_empty());
        assert!(service.endpoint_info.addresses.is_empty());
        assert_eq!(service.ports[0].protocol, "");
        assert!(bulk.counts_consistent());
    }

    #[test]
    fn null_container_state_and_phase_decode_as_empty() {
        let pod: PodDiagnosticResult = serde_json::from_value(json!({
            "resourceName": "pending-0",
            "namespace": "default",
            "status": null,
            "phase": null,
            "containerStatuses": [
                {"name": "app", "state": null, "reason": null, "message": null, "restartCount": 0, "ready": false}
            ]
        }))
        .expect("pod with null fields should decode");

        assert_eq!(pod.status, HealthStatus::Unknown);
        assert_eq!(pod.phase, "");
        assert_eq!(pod.container_statuses[0].state, "");
    }

    #[test]
    fn completed_status_still_decodes() {
        let pod: PodDiagnosticResult = serde_json::from_value(json!({
            "resourceName": "job-1",
            "namespace": "batch",
            "status": "Completed"
        }))
        .expect("pod should decode");
        assert_eq!(pod.status, HealthStatus::Completed);
    }

    #[test]
    fn overflowing_bucket_counts_are_inconsistent() {
        let bulk: BulkResult<PodDiagnosticResult> = serde_json::from_value(json!({
            "summary": {"diagnosticTime": "t", "resourceType": "Pods (Bulk)", "overallHealth": "Healthy", "message": "m"},
            "namespace": "default",
            "totalPods": 0,
            "criticalCount": u64::MAX,
            "warningCount": 1,
            "healthyCount": 0,
            "results": []
        }))
        .expect("bulk pods should decode");
        assert!(!bulk.counts_consistent());

        let bulk = bulk.normalized();
        assert_eq!(bulk.total_count, 0);
        assert_eq!(bulk.critical_count, 0);
        assert_eq!(bulk.warning_count, 0);
        assert!(bulk.counts_consistent());
    }
}
