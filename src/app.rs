use crate::dashboard::Dashboard;
use crate::input::Action;
use crate::model::{DiagnosedResource, ResourceKind};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum InputMode {
    Normal,
    NamespacePicker,
    Search,
    Command,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FocusPane {
    Pods,
    Detail,
    Services,
}

impl FocusPane {
    fn next(self) -> Self {
        match self {
            Self::Pods => Self::Detail,
            Self::Detail => Self::Services,
            Self::Services => Self::Pods,
        }
    }

    fn previous(self) -> Self {
        match self {
            Self::Pods => Self::Services,
            Self::Detail => Self::Pods,
            Self::Services => Self::Detail,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SearchField {
    Kind,
    Namespace,
    Name,
}

impl SearchField {
    fn next(self) -> Self {
        match self {
            Self::Kind => Self::Namespace,
            Self::Namespace => Self::Name,
            Self::Name => Self::Kind,
        }
    }

    fn previous(self) -> Self {
        match self {
            Self::Kind => Self::Name,
            Self::Namespace => Self::Kind,
            Self::Name => Self::Namespace,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SearchForm {
    pub kind: ResourceKind,
    pub namespace: String,
    pub name: String,
    pub field: SearchField,
}

impl Default for SearchForm {
    fn default() -> Self {
        Self {
            kind: ResourceKind::Pod,
            namespace: String::new(),
            name: String::new(),
            field: SearchField::Name,
        }
    }
}

/// Work the event loop must run against the dashboard after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    None,
    SelectNamespace(String),
    Refresh,
    OpenPod {
        namespace: String,
        name: String,
    },
    OpenService {
        namespace: String,
        name: String,
    },
    Search {
        kind: ResourceKind,
        namespace: String,
        name: String,
    },
    CloseDetail,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ResourceRef {
    pub namespace: String,
    pub name: String,
}

/// What the interaction layer needs to know about dashboard state: list
/// lengths for cursors, item identities for `Enter`, and a few flags.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ListingSnapshot {
    pub active_namespace: Option<String>,
    pub namespaces: Vec<String>,
    pub pods: Vec<ResourceRef>,
    pub services: Vec<ResourceRef>,
    pub detail: Option<(ResourceKind, ResourceRef)>,
    pub searching: bool,
}

impl ListingSnapshot {
    pub fn capture(dashboard: &Dashboard) -> Self {
        Self {
            active_namespace: dashboard.active_namespace().map(str::to_string),
            namespaces: dashboard.namespaces().namespaces().to_vec(),
            pods: resource_refs(dashboard.pods().items()),
            services: resource_refs(dashboard.services().items()),
            detail: dashboard.selection().selected().map(|selected| {
                (
                    selected.kind(),
                    ResourceRef {
                        namespace: selected.namespace().to_string(),
                        name: selected.resource_name().to_string(),
                    },
                )
            }),
            searching: dashboard.is_searching(),
        }
    }
}

fn resource_refs<T: DiagnosedResource>(items: &[T]) -> Vec<ResourceRef> {
    items
        .iter()
        .map(|item| ResourceRef {
            namespace: item.namespace().to_string(),
            name: item.resource_name().to_string(),
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct App {
    running: bool,
    endpoint: String,
    mode: InputMode,
    focus: FocusPane,
    snapshot: ListingSnapshot,
    pod_cursor: usize,
    service_cursor: usize,
    namespace_cursor: usize,
    detail_scroll: u16,
    detail_lines: u16,
    detail_height: u16,
    list_page_size: usize,
    input: String,
    search: SearchForm,
    status: String,
    show_help: bool,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            running: true,
            endpoint: "-".to_string(),
            mode: InputMode::Normal,
            focus: FocusPane::Pods,
            snapshot: ListingSnapshot::default(),
            pod_cursor: 0,
            service_cursor: 0,
            namespace_cursor: 0,
            detail_scroll: 0,
            detail_lines: 0,
            detail_height: 1,
            list_page_size: 10,
            input: String::new(),
            search: SearchForm::default(),
            status: "Ready".to_string(),
            show_help: false,
        }
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn set_endpoint(&mut self, endpoint: impl Into<String>) {
        self.endpoint = endpoint.into();
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn focus(&self) -> FocusPane {
        self.focus
    }

    pub fn pod_cursor(&self) -> Option<usize> {
        (!self.snapshot.pods.is_empty()).then_some(self.pod_cursor)
    }

    pub fn service_cursor(&self) -> Option<usize> {
        (!self.snapshot.services.is_empty()).then_some(self.service_cursor)
    }

    pub fn namespace_cursor(&self) -> Option<usize> {
        (!self.snapshot.namespaces.is_empty()).then_some(self.namespace_cursor)
    }

    pub fn detail_scroll(&self) -> u16 {
        self.detail_scroll
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn search_form(&self) -> &SearchForm {
        &self.search
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = normalize_status_text(status.into());
    }

    pub fn set_list_page_size(&mut self, rows: usize) {
        self.list_page_size = rows.max(1);
    }

    /// Records the rendered detail extent so scrolling stops at the last line.
    pub fn set_detail_extent(&mut self, lines: u16, height: u16) {
        self.detail_lines = lines;
        self.detail_height = height.max(1);
        self.detail_scroll = self.detail_scroll.min(self.detail_max_scroll());
    }

    /// Replaces the dashboard view and clamps every cursor into range.
    pub fn sync(&mut self, snapshot: ListingSnapshot) {
        if snapshot.detail != self.snapshot.detail {
            self.detail_scroll = 0;
        }
        self.snapshot = snapshot;
        self.pod_cursor = clamp_cursor(self.pod_cursor, self.snapshot.pods.len());
        self.service_cursor = clamp_cursor(self.service_cursor, self.snapshot.services.len());
        self.namespace_cursor =
            clamp_cursor(self.namespace_cursor, self.snapshot.namespaces.len());
    }

    pub fn apply_action(&mut self, action: Action) -> AppCommand {
        if self.show_help && !matches!(action, Action::ToggleHelp) {
            self.show_help = false;
            if matches!(action, Action::CloseDetail | Action::CancelInput) {
                return AppCommand::None;
            }
        }

        match self.mode {
            InputMode::Normal => self.apply_normal_action(action),
            InputMode::NamespacePicker => self.apply_picker_action(action),
            InputMode::Search => self.apply_search_action(action),
            InputMode::Command => self.apply_command_action(action),
        }
    }

    fn apply_normal_action(&mut self, action: Action) -> AppCommand {
        match action {
            Action::Quit => {
                self.running = false;
                self.status = "Exit requested".to_string();
                AppCommand::None
            }
            Action::NextFocus => {
                self.focus = self.focus.next();
                AppCommand::None
            }
            Action::PrevFocus => {
                self.focus = self.focus.previous();
                AppCommand::None
            }
            Action::Down => {
                self.move_focused(1);
                AppCommand::None
            }
            Action::Up => {
                self.move_focused(-1);
                AppCommand::None
            }
            Action::PageDown => {
                self.move_focused(self.page_step());
                AppCommand::None
            }
            Action::PageUp => {
                self.move_focused(-self.page_step());
                AppCommand::None
            }
            Action::Top => {
                match self.focus {
                    FocusPane::Pods => self.pod_cursor = 0,
                    FocusPane::Services => self.service_cursor = 0,
                    FocusPane::Detail => self.detail_scroll = 0,
                }
                AppCommand::None
            }
            Action::Bottom => {
                match self.focus {
                    FocusPane::Pods => {
                        self.pod_cursor = self.snapshot.pods.len().saturating_sub(1);
                    }
                    FocusPane::Services => {
                        self.service_cursor = self.snapshot.services.len().saturating_sub(1);
                    }
                    FocusPane::Detail => self.detail_scroll = self.detail_max_scroll(),
                }
                AppCommand::None
            }
            Action::OpenSelected => self.open_focused(),
            Action::CloseDetail => {
                if self.snapshot.detail.is_none() {
                    return AppCommand::None;
                }
                self.status = "Detail closed".to_string();
                if self.focus == FocusPane::Detail {
                    self.focus = FocusPane::Pods;
                }
                AppCommand::CloseDetail
            }
            Action::Refresh => self.request_refresh(),
            Action::OpenNamespacePicker => self.open_namespace_picker(),
            Action::StartSearch => {
                self.mode = InputMode::Search;
                self.search = SearchForm {
                    kind: if self.focus == FocusPane::Services {
                        ResourceKind::Service
                    } else {
                        ResourceKind::Pod
                    },
                    namespace: self.snapshot.active_namespace.clone().unwrap_or_default(),
                    ..SearchForm::default()
                };
                self.status = "Search: Tab switches field, Enter submits".to_string();
                AppCommand::None
            }
            Action::StartCommand => {
                self.mode = InputMode::Command;
                self.input.clear();
                self.status = "Command mode (ns, po, svc, refresh, quit)".to_string();
                AppCommand::None
            }
            Action::ToggleHelp => {
                self.show_help = !self.show_help;
                AppCommand::None
            }
            _ => AppCommand::None,
        }
    }

    fn apply_picker_action(&mut self, action: Action) -> AppCommand {
        let len = self.snapshot.namespaces.len();
        match action {
            Action::Down => self.namespace_cursor = step_cursor(self.namespace_cursor, len, 1),
            Action::Up => self.namespace_cursor = step_cursor(self.namespace_cursor, len, -1),
            Action::PageDown => {
                self.namespace_cursor = step_cursor(self.namespace_cursor, len, self.page_step());
            }
            Action::PageUp => {
                self.namespace_cursor = step_cursor(self.namespace_cursor, len, -self.page_step());
            }
            Action::Top => self.namespace_cursor = 0,
            Action::Bottom => self.namespace_cursor = len.saturating_sub(1),
            Action::SubmitInput => {
                self.mode = InputMode::Normal;
                let Some(namespace) = self.snapshot.namespaces.get(self.namespace_cursor).cloned()
                else {
                    return AppCommand::None;
                };
                return self.switch_namespace(namespace);
            }
            Action::CancelInput => {
                self.mode = InputMode::Normal;
                self.status = "Namespace unchanged".to_string();
            }
            _ => {}
        }
        AppCommand::None
    }

    fn apply_search_action(&mut self, action: Action) -> AppCommand {
        match action {
            Action::NextField => self.search.field = self.search.field.next(),
            Action::PrevField => self.search.field = self.search.field.previous(),
            Action::ToggleKind => {
                if self.search.field == SearchField::Kind {
                    self.search.kind = self.search.kind.toggled();
                }
            }
            Action::InputChar(c) => match self.search.field {
                SearchField::Kind => {
                    if c == ' ' {
                        self.search.kind = self.search.kind.toggled();
                    }
                }
                SearchField::Namespace => self.search.namespace.push(c),
                SearchField::Name => self.search.name.push(c),
            },
            Action::Backspace => match self.search.field {
                SearchField::Kind => {}
                SearchField::Namespace => {
                    self.search.namespace.pop();
                }
                SearchField::Name => {
                    self.search.name.pop();
                }
            },
            Action::SubmitInput => return self.submit_search(),
            Action::CancelInput => {
                self.mode = InputMode::Normal;
                self.status = "Search cancelled".to_string();
            }
            _ => {}
        }
        AppCommand::None
    }

    fn submit_search(&mut self) -> AppCommand {
        if self.snapshot.searching {
            self.status = "A search is already in progress".to_string();
            return AppCommand::None;
        }

        let namespace = self.search.namespace.trim().to_string();
        let name = self.search.name.trim().to_string();
        if namespace.is_empty() || name.is_empty() {
            self.status = "Search needs a namespace and a name".to_string();
            return AppCommand::None;
        }

        let kind = self.search.kind;
        self.mode = InputMode::Normal;
        self.focus = FocusPane::Detail;
        self.status = format!("Searching {kind} {namespace}/{name}");
        AppCommand::Search {
            kind,
            namespace,
            name,
        }
    }

    fn apply_command_action(&mut self, action: Action) -> AppCommand {
        match action {
            Action::InputChar(c) => self.input.push(c),
            Action::Backspace => {
                self.input.pop();
            }
            Action::CancelInput => {
                self.mode = InputMode::Normal;
                self.input.clear();
                self.status = "Command cancelled".to_string();
            }
            Action::SubmitInput => {
                self.mode = InputMode::Normal;
                let line = std::mem::take(&mut self.input);
                return self.execute_command_line(&line);
            }
            _ => {}
        }
        AppCommand::None
    }

    fn execute_command_line(&mut self, line: &str) -> AppCommand {
        let line = line.trim().trim_start_matches(':').trim();
        let mut parts = line.split_whitespace();
        let Some(head) = parts.next() else {
            return AppCommand::None;
        };
        let argument = parts.collect::<Vec<_>>().join(" ");
        let head = head.to_ascii_lowercase();

        match head.as_str() {
            "q" | "quit" | "exit" => {
                self.running = false;
                self.status = "Exit requested".to_string();
                AppCommand::None
            }
            "refresh" | "reload" => self.request_refresh(),
            "help" => {
                self.show_help = true;
                AppCommand::None
            }
            "ns" | "namespace" | "namespaces" => {
                if argument.is_empty() {
                    return self.open_namespace_picker();
                }
                self.switch_namespace(argument)
            }
            token => match ResourceKind::from_token(token) {
                Some(kind) => self.open_by_name(kind, &argument),
                None => {
                    self.status = format!("Unknown command: {token}");
                    AppCommand::None
                }
            },
        }
    }

    fn open_by_name(&mut self, kind: ResourceKind, argument: &str) -> AppCommand {
        let argument = argument.trim();
        if argument.is_empty() {
            let token = kind.short_token();
            self.status = format!("Usage: {token} <name> or {token} <namespace>/<name>");
            return AppCommand::None;
        }

        let target = match parse_namespaced_target(argument) {
            Some((namespace, name)) => ResourceRef {
                namespace: namespace.to_string(),
                name,
            },
            None => {
                let Some(namespace) = self.snapshot.active_namespace.clone() else {
                    self.status = format!(
                        "No namespace selected; use {} <namespace>/<name>",
                        kind.short_token()
                    );
                    return AppCommand::None;
                };
                ResourceRef {
                    namespace,
                    name: argument.to_string(),
                }
            }
        };

        self.focus = FocusPane::Detail;
        self.open_resource(kind, target)
    }

    fn open_focused(&mut self) -> AppCommand {
        let (kind, target) = match self.focus {
            FocusPane::Pods => (
                ResourceKind::Pod,
                self.snapshot.pods.get(self.pod_cursor).cloned(),
            ),
            FocusPane::Services => (
                ResourceKind::Service,
                self.snapshot.services.get(self.service_cursor).cloned(),
            ),
            FocusPane::Detail => return AppCommand::None,
        };

        match target {
            Some(target) => self.open_resource(kind, target),
            None => {
                self.status = format!("No {kind} to open");
                AppCommand::None
            }
        }
    }

    fn open_resource(&mut self, kind: ResourceKind, target: ResourceRef) -> AppCommand {
        self.status = format!("Loading {kind} {}/{}", target.namespace, target.name);
        let ResourceRef { namespace, name } = target;
        match kind {
            ResourceKind::Pod => AppCommand::OpenPod { namespace, name },
            ResourceKind::Service => AppCommand::OpenService { namespace, name },
        }
    }

    fn request_refresh(&mut self) -> AppCommand {
        let Some(namespace) = self.snapshot.active_namespace.as_deref() else {
            self.status = "No namespace selected".to_string();
            return AppCommand::None;
        };
        self.status = format!("Refreshing pods and services in '{namespace}'");
        AppCommand::Refresh
    }

    fn open_namespace_picker(&mut self) -> AppCommand {
        if self.snapshot.namespaces.is_empty() {
            self.status = "No namespaces loaded; use :ns <name>".to_string();
            return AppCommand::None;
        }
        self.namespace_cursor = self
            .snapshot
            .active_namespace
            .as_ref()
            .and_then(|active| {
                self.snapshot
                    .namespaces
                    .iter()
                    .position(|namespace| namespace == active)
            })
            .unwrap_or(0);
        self.mode = InputMode::NamespacePicker;
        self.status = "Select a namespace".to_string();
        AppCommand::None
    }

    fn switch_namespace(&mut self, namespace: String) -> AppCommand {
        self.status = format!("Switched to namespace '{namespace}'");
        self.pod_cursor = 0;
        self.service_cursor = 0;
        if self.focus == FocusPane::Detail {
            self.focus = FocusPane::Pods;
        }
        AppCommand::SelectNamespace(namespace)
    }

    fn move_focused(&mut self, delta: isize) {
        match self.focus {
            FocusPane::Pods => {
                self.pod_cursor = step_cursor(self.pod_cursor, self.snapshot.pods.len(), delta);
            }
            FocusPane::Services => {
                self.service_cursor =
                    step_cursor(self.service_cursor, self.snapshot.services.len(), delta);
            }
            FocusPane::Detail => {
                let next = (self.detail_scroll as isize)
                    .saturating_add(delta)
                    .clamp(0, self.detail_max_scroll() as isize);
                self.detail_scroll = u16::try_from(next).unwrap_or(u16::MAX);
            }
        }
    }

    fn page_step(&self) -> isize {
        isize::try_from(self.list_page_size.max(1)).unwrap_or(isize::MAX)
    }

    fn detail_max_scroll(&self) -> u16 {
        self.detail_lines.saturating_sub(self.detail_height)
    }
}

fn step_cursor(current: usize, len: usize, delta: isize) -> usize {
    if len == 0 {
        return 0;
    }
    let next = current as isize + delta;
    next.clamp(0, len as isize - 1) as usize
}

fn clamp_cursor(current: usize, len: usize) -> usize {
    current.min(len.saturating_sub(1))
}

fn parse_namespaced_target(input: &str) -> Option<(&str, String)> {
    let (namespace, name) = input.split_once('/')?;
    let namespace = namespace.trim();
    let name = name.trim();
    if namespace.is_empty() || name.is_empty() {
        return None;
    }
    Some((namespace, name.to_string()))
}

fn normalize_status_text(status: String) -> String {
    const MAX_STATUS_LEN: usize = 180;
    if status.chars().count() <= MAX_STATUS_LEN {
        return status;
    }

    let mut shortened = status
        .chars()
        .take(MAX_STATUS_LEN.saturating_sub(1))
        .collect::<String>();
    shortened.push('…');
    shortened
}
