use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState, Wrap};

use crate::app::{App, FocusPane, InputMode, SearchField};
use crate::dashboard::Dashboard;
use crate::listing::{ListStatus, ResourceListController};
use crate::model::{
    BulkResult, DiagnosedResource, HealthStatus, PodDiagnosticResult, SelectedResource,
    ServiceDiagnosticResult,
};

const BG: Color = Color::Rgb(9, 15, 25);
const PANEL: Color = Color::Rgb(16, 27, 44);
const ACCENT: Color = Color::Rgb(52, 211, 153);
const MUTED: Color = Color::Rgb(140, 156, 178);
const WARN: Color = Color::Rgb(251, 191, 36);
const ERROR: Color = Color::Rgb(248, 113, 113);
const INFO: Color = Color::Rgb(125, 211, 252);
const PL_A: Color = Color::Rgb(17, 94, 89);
const PL_B: Color = Color::Rgb(30, 64, 175);
const PL_C: Color = Color::Rgb(55, 48, 163);
const PL_D: Color = Color::Rgb(82, 24, 124);
const HIGHLIGHT: Color = Color::Rgb(24, 36, 58);

pub fn render(frame: &mut Frame, app: &mut App, dashboard: &Dashboard) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(6),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, root[0], app, dashboard);
    render_body(frame, root[1], app, dashboard);
    render_footer(frame, root[2], app);

    match app.mode() {
        InputMode::NamespacePicker => render_namespace_picker(frame, app, dashboard),
        InputMode::Search => render_search_modal(frame, app, dashboard),
        InputMode::Normal | InputMode::Command => {}
    }

    if app.show_help() {
        render_help_modal(frame, app);
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &App, dashboard: &Dashboard) {
    let left_line = build_left_header_line(app, dashboard);
    let right_line = build_right_header_line(dashboard);
    let right_width = spans_width(&right_line.spans) as u16;
    if area.width < 42 || right_width == 0 || right_width >= area.width {
        frame.render_widget(
            Paragraph::new(left_line).style(Style::default().bg(BG).fg(Color::White)),
            area,
        );
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(right_width)])
        .split(area);
    frame.render_widget(
        Paragraph::new(left_line).style(Style::default().bg(BG).fg(Color::White)),
        chunks[0],
    );
    frame.render_widget(
        Paragraph::new(right_line)
            .style(Style::default().bg(BG).fg(MUTED))
            .alignment(Alignment::Right),
        chunks[1],
    );
}

fn build_left_header_line(app: &App, dashboard: &Dashboard) -> Line<'static> {
    let namespaces = dashboard.namespaces();
    let namespace_label = match dashboard.active_namespace() {
        Some(namespace) => namespace.to_string(),
        None if namespaces.loading() => "loading…".to_string(),
        None if namespaces.error().is_some() => "unavailable".to_string(),
        None => "-".to_string(),
    };

    let mut spans = Vec::new();
    push_powerline_segment(&mut spans, " KUBEDIAG ", Color::Black, ACCENT, PL_A);
    push_powerline_segment(
        &mut spans,
        format!(" 󰒍 {} ", compact_text(&display_endpoint(app.endpoint()), 32)),
        Color::White,
        PL_A,
        PL_B,
    );
    push_powerline_segment(
        &mut spans,
        format!(" 󰉖 {} ", compact_text(&namespace_label, 20)),
        Color::White,
        PL_B,
        PL_C,
    );
    push_powerline_segment(
        &mut spans,
        format!(" 󰋊 {} ns ", namespaces.namespaces().len()),
        Color::White,
        PL_C,
        PL_D,
    );
    let detail = match dashboard.selection().selected() {
        Some(selected) => format!(
            " {} {} ",
            selected.kind().short_token(),
            compact_text(selected.resource_name(), 24)
        ),
        None => " - ".to_string(),
    };
    push_powerline_segment(&mut spans, detail, Color::White, PL_D, BG);
    Line::from(spans)
}

fn build_right_header_line(dashboard: &Dashboard) -> Line<'static> {
    let refreshed = [
        dashboard.pods().last_refreshed(),
        dashboard.services().last_refreshed(),
    ]
    .into_iter()
    .flatten()
    .max();
    match refreshed {
        Some(at) => Line::from(format!(" refreshed {} ", at.format("%H:%M:%S"))),
        None => Line::from(""),
    }
}

fn render_body(frame: &mut Frame, area: Rect, app: &mut App, dashboard: &Dashboard) {
    let panes = if area.width >= 100 {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(30),
                Constraint::Percentage(40),
                Constraint::Percentage(30),
            ])
            .split(area)
    } else {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(30),
                Constraint::Percentage(40),
                Constraint::Percentage(30),
            ])
            .split(area)
    };

    app.set_list_page_size(list_rows_visible(panes[0]));
    render_pods(frame, panes[0], app, dashboard.pods());
    render_detail(frame, panes[1], app, dashboard);
    render_services(frame, panes[2], app, dashboard.services());
}

fn render_pods(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    pods: &ResourceListController<PodDiagnosticResult>,
) {
    let focused = app.focus() == FocusPane::Pods;
    let rows = pods.items().iter().map(|pod| {
        Row::new(vec![
            Cell::from(pod.resource_name.clone()),
            Cell::from(pod.status.label()).style(Style::default().fg(health_color(pod.status))),
            Cell::from(pod.phase.clone()),
            Cell::from(pod.restart_count.to_string()),
        ])
    });
    render_listing(
        frame,
        area,
        ListingPane {
            title: "Pods",
            headers: &["NAME", "STATUS", "PHASE", "RESTARTS"],
            widths: &[
                Constraint::Percentage(45),
                Constraint::Percentage(20),
                Constraint::Percentage(20),
                Constraint::Percentage(15),
            ],
            focused,
            selected: app.pod_cursor(),
        },
        pods,
        rows,
    );
}

fn render_services(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    services: &ResourceListController<ServiceDiagnosticResult>,
) {
    let focused = app.focus() == FocusPane::Services;
    let rows = services.items().iter().map(|service| {
        let endpoints = &service.endpoint_info;
        Row::new(vec![
            Cell::from(service.resource_name.clone()),
            Cell::from(service.service_type.clone()),
            Cell::from(service.status.label())
                .style(Style::default().fg(health_color(service.status))),
            Cell::from(format!(
                "{}/{}",
                endpoints.ready_endpoints,
                endpoints
                    .ready_endpoints
                    .saturating_add(endpoints.not_ready_endpoints)
            )),
        ])
    });
    render_listing(
        frame,
        area,
        ListingPane {
            title: "Services",
            headers: &["NAME", "TYPE", "STATUS", "EP"],
            widths: &[
                Constraint::Percentage(40),
                Constraint::Percentage(22),
                Constraint::Percentage(22),
                Constraint::Percentage(16),
            ],
            focused,
            selected: app.service_cursor(),
        },
        services,
        rows,
    );
}

struct ListingPane<'a> {
    title: &'static str,
    headers: &'a [&'static str],
    widths: &'a [Constraint],
    focused: bool,
    selected: Option<usize>,
}

fn render_listing<'a, T: DiagnosedResource>(
    frame: &mut Frame,
    area: Rect,
    pane: ListingPane<'_>,
    listing: &ResourceListController<T>,
    rows: impl Iterator<Item = Row<'a>>,
) {
    if let Some(error) = listing.error() {
        let panel = Paragraph::new(Text::from(error.to_string()))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title(format!("{} Error", pane.title))
                    .borders(Borders::ALL)
                    .border_style(if pane.focused {
                        Style::default().fg(ERROR)
                    } else {
                        Style::default().fg(MUTED)
                    })
                    .style(Style::default().bg(PANEL)),
            )
            .style(Style::default().fg(ERROR));
        frame.render_widget(panel, area);
        return;
    }

    let block = Block::default()
        .title(listing_title(pane.title, listing))
        .borders(Borders::ALL)
        .border_style(if pane.focused {
            Style::default().fg(ACCENT)
        } else {
            Style::default().fg(MUTED)
        })
        .style(Style::default().bg(PANEL));

    if listing.items().is_empty() {
        let hint = match listing.status() {
            ListStatus::Idle => "Select a namespace with n",
            ListStatus::Loading => "Loading…",
            ListStatus::Ready | ListStatus::Failed => "Nothing found in this namespace",
        };
        frame.render_widget(
            Paragraph::new(hint)
                .block(block)
                .style(Style::default().fg(MUTED)),
            area,
        );
        return;
    }

    let header_row = Row::new(pane.headers.iter().map(|header| {
        Cell::from(*header).style(Style::default().add_modifier(Modifier::BOLD))
    }))
    .height(1)
    .style(Style::default().fg(ACCENT));

    let table = Table::new(rows, pane.widths.to_vec())
        .header(header_row)
        .block(block)
        .style(Style::default().fg(Color::White))
        .column_spacing(1)
        .row_highlight_style(Style::default().bg(HIGHLIGHT).add_modifier(Modifier::BOLD))
        .highlight_symbol("󰜴 ");

    let mut state = TableState::default();
    state.select(pane.selected);
    frame.render_stateful_widget(table, area, &mut state);
}

fn listing_title<T: DiagnosedResource>(title: &str, listing: &ResourceListController<T>) -> Line<'static> {
    let mut spans = vec![Span::raw(format!(" {title} "))];
    if let Some(data) = listing.data() {
        spans.extend(count_spans(data));
    }
    if listing.is_loading() {
        spans.push(Span::styled(" loading… ", Style::default().fg(INFO)));
    }
    Line::from(spans)
}

fn count_spans<T>(data: &BulkResult<T>) -> Vec<Span<'static>> {
    vec![
        Span::styled(format!("{} ", data.total_count), Style::default().fg(Color::White)),
        Span::styled(
            format!("●{} ", data.critical_count),
            Style::default().fg(ERROR),
        ),
        Span::styled(format!("●{} ", data.warning_count), Style::default().fg(WARN)),
        Span::styled(
            format!("●{} ", data.healthy_count),
            Style::default().fg(ACCENT),
        ),
    ]
}

fn render_detail(frame: &mut Frame, area: Rect, app: &mut App, dashboard: &Dashboard) {
    let focused = app.focus() == FocusPane::Detail;
    let selection = dashboard.selection();
    let (title, lines) = if selection.is_loading() {
        (
            "Detail".to_string(),
            vec![Line::styled(
                "Loading resource details…",
                Style::default().fg(INFO),
            )],
        )
    } else if let Some(error) = selection.error() {
        (
            "Detail Error".to_string(),
            vec![
                Line::styled(
                    "Failed to load resource details",
                    Style::default().fg(ERROR).add_modifier(Modifier::BOLD),
                ),
                Line::from(""),
                Line::styled(error.to_string(), Style::default().fg(ERROR)),
            ],
        )
    } else if let Some(selected) = selection.selected() {
        (
            format!(
                "{} {}/{}",
                selected.kind().title(),
                selected.namespace(),
                selected.resource_name()
            ),
            detail_lines(selected),
        )
    } else {
        (
            "Detail".to_string(),
            vec![
                Line::styled(
                    "Select a pod or service and press Enter,",
                    Style::default().fg(MUTED),
                ),
                Line::styled(
                    "or press / to search by name.",
                    Style::default().fg(MUTED),
                ),
            ],
        )
    };

    let inner_width = area.width.saturating_sub(2).max(1) as usize;
    let inner_height = area.height.saturating_sub(2).max(1);
    let total = lines
        .iter()
        .map(|line| visual_line_count(line, inner_width))
        .sum::<usize>();
    app.set_detail_extent(total.min(u16::MAX as usize) as u16, inner_height);

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(if focused {
            Style::default().fg(ACCENT)
        } else {
            Style::default().fg(MUTED)
        })
        .style(Style::default().bg(PANEL));
    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .style(Style::default().fg(Color::White))
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll(), 0));
    frame.render_widget(paragraph, area);
}

fn detail_lines(selected: &SelectedResource) -> Vec<Line<'static>> {
    match selected {
        SelectedResource::Pod(pod) => pod_detail_lines(pod),
        SelectedResource::Service(service) => service_detail_lines(service),
    }
}

fn pod_detail_lines(pod: &PodDiagnosticResult) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(vec![
            label_span("Status "),
            health_span(pod.status),
            label_span("   Phase "),
            Span::raw(pod.phase.clone()),
            label_span("   Restarts "),
            Span::raw(pod.restart_count.to_string()),
        ]),
    ];
    push_summary(&mut lines, pod.summary.as_ref());

    lines.push(Line::from(""));
    lines.push(section_line("Containers"));
    if pod.container_statuses.is_empty() {
        lines.push(none_line());
    }
    for container in &pod.container_statuses {
        let mut spans = vec![
            Span::raw(format!("  {} ", container.name)),
            Span::styled(
                container.state.clone(),
                Style::default().fg(if container.ready { ACCENT } else { WARN }),
            ),
            Span::styled(
                format!(
                    "  {}  restarts {}",
                    if container.ready { "ready" } else { "not ready" },
                    container.restart_count
                ),
                Style::default().fg(MUTED),
            ),
        ];
        if let Some(reason) = &container.reason {
            spans.push(Span::styled(format!("  {reason}"), Style::default().fg(WARN)));
        }
        lines.push(Line::from(spans));
        if let Some(message) = container.message.as_deref().filter(|m| !m.is_empty()) {
            lines.push(Line::styled(format!("    {message}"), Style::default().fg(MUTED)));
        }
    }

    push_findings(
        &mut lines,
        &pod.probable_causes,
        &pod.evidence,
        &pod.suggested_actions,
    );
    lines
}

fn service_detail_lines(service: &ServiceDiagnosticResult) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(vec![
        label_span("Status "),
        health_span(service.status),
        label_span("   Type "),
        Span::raw(service.service_type.clone()),
    ])];
    push_summary(&mut lines, service.summary.as_ref());

    lines.push(Line::from(""));
    lines.push(section_line("Ports"));
    if service.ports.is_empty() {
        lines.push(none_line());
    }
    for port in &service.ports {
        let mut text = format!("  {}", port.name.as_deref().unwrap_or("-"));
        text.push_str(&format!(" {}", port.port));
        if let Some(target) = port.target_port {
            text.push_str(&format!("→{target}"));
        }
        text.push_str(&format!("/{}", port.protocol));
        if let Some(node_port) = port.node_port {
            text.push_str(&format!("  nodePort {node_port}"));
        }
        lines.push(Line::from(text));
    }

    let endpoints = &service.endpoint_info;
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(
            "Endpoints ",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{} ready", endpoints.ready_endpoints),
            Style::default().fg(if endpoints.ready_endpoints > 0 { ACCENT } else { ERROR }),
        ),
        Span::raw(format!(", {} not ready", endpoints.not_ready_endpoints)),
    ]));
    for address in &endpoints.addresses {
        lines.push(Line::from(format!("  {address}")));
    }

    lines.push(Line::from(""));
    lines.push(section_line("Selector"));
    if service.selector.is_empty() {
        lines.push(none_line());
    }
    for (key, value) in &service.selector {
        lines.push(Line::from(format!("  {key}={value}")));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        label_span("CoreDNS "),
        if service.core_dns_exists {
            Span::styled("present", Style::default().fg(ACCENT))
        } else {
            Span::styled("missing", Style::default().fg(ERROR))
        },
    ]));

    push_findings(
        &mut lines,
        &service.probable_causes,
        &service.evidence,
        &service.suggested_actions,
    );
    lines
}

fn push_summary(lines: &mut Vec<Line<'static>>, summary: Option<&crate::model::DiagnosticSummary>) {
    let Some(summary) = summary else {
        return;
    };
    if !summary.message.is_empty() {
        lines.push(Line::from(vec![
            label_span("Summary "),
            Span::raw(summary.message.clone()),
        ]));
    }
    if let Some(issues) = summary.issue_count {
        lines.push(Line::from(vec![
            label_span("Issues "),
            Span::raw(issues.to_string()),
        ]));
    }
    if !summary.diagnostic_time.is_empty() {
        lines.push(Line::styled(
            format!("Diagnosed at {}", summary.diagnostic_time),
            Style::default().fg(MUTED),
        ));
    }
}

fn push_findings(
    lines: &mut Vec<Line<'static>>,
    causes: &[String],
    evidence: &[String],
    actions: &[String],
) {
    for (title, items, color) in [
        ("Probable causes", causes, WARN),
        ("Evidence", evidence, Color::White),
        ("Suggested actions", actions, INFO),
    ] {
        lines.push(Line::from(""));
        lines.push(section_line(title));
        if items.is_empty() {
            lines.push(none_line());
        }
        for item in items {
            lines.push(Line::styled(format!("  • {item}"), Style::default().fg(color)));
        }
    }
}

fn section_line(title: &str) -> Line<'static> {
    Line::styled(
        title.to_string(),
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
    )
}

fn none_line() -> Line<'static> {
    Line::styled("  none", Style::default().fg(MUTED))
}

fn label_span(label: &str) -> Span<'static> {
    Span::styled(label.to_string(), Style::default().fg(MUTED))
}

fn health_span(status: HealthStatus) -> Span<'static> {
    Span::styled(
        status.label(),
        Style::default()
            .fg(health_color(status))
            .add_modifier(Modifier::BOLD),
    )
}

fn health_color(status: HealthStatus) -> Color {
    match status {
        HealthStatus::Healthy => ACCENT,
        HealthStatus::Warning => WARN,
        HealthStatus::Critical => ERROR,
        HealthStatus::Completed => INFO,
        HealthStatus::Unknown => MUTED,
    }
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    if app.mode() == InputMode::Command {
        let mut spans = Vec::new();
        push_powerline_segment(&mut spans, " 󰘳 cmd ", Color::Black, ACCENT, PL_B);
        push_powerline_segment(
            &mut spans,
            format!(" :{} ", app.input()),
            Color::White,
            PL_B,
            BG,
        );
        frame.render_widget(
            Paragraph::new(Line::from(spans)).style(Style::default().bg(BG)),
            area,
        );
        return;
    }

    let (label, label_bg) = match app.mode() {
        InputMode::NamespacePicker => (" 󰉖 ns ", INFO),
        InputMode::Search => (" 󰍉 find ", WARN),
        InputMode::Normal | InputMode::Command => (" 󰘳 nrm ", ACCENT),
    };
    let status_icon = footer_status_icon(app.status());
    let mut spans = Vec::new();
    push_powerline_segment(&mut spans, label, Color::Black, label_bg, PL_B);
    let status_width = area.width.saturating_sub(48).clamp(24, 120) as usize;
    push_powerline_segment(
        &mut spans,
        format!(" {status_icon} {} ", compact_text(app.status(), status_width)),
        Color::White,
        PL_B,
        BG,
    );

    let hints = Line::from(Span::styled(
        footer_hints(app.mode()),
        Style::default().fg(MUTED),
    ));
    let hints_width = spans_width(&hints.spans) as u16;
    let max_right = area.width.saturating_sub(28);
    if hints_width == 0 || hints_width > max_right {
        frame.render_widget(
            Paragraph::new(Line::from(spans)).style(Style::default().bg(BG)),
            area,
        );
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(hints_width)])
        .split(area);
    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(BG)),
        chunks[0],
    );
    frame.render_widget(
        Paragraph::new(hints)
            .style(Style::default().bg(BG))
            .alignment(Alignment::Right),
        chunks[1],
    );
}

fn footer_hints(mode: InputMode) -> &'static str {
    match mode {
        InputMode::Normal => "⏎ open  esc close  n ns  / find  r refresh  ? help ",
        InputMode::NamespacePicker => "j/k move  ⏎ select  esc cancel ",
        InputMode::Search => "tab field  ←/→ kind  ⏎ search  esc cancel ",
        InputMode::Command => "",
    }
}

fn footer_status_icon(status_text: &str) -> &'static str {
    let status = status_text.to_ascii_lowercase();
    let has_failure = [
        "failed",
        "error",
        "timed out",
        "unable",
        "unknown command",
        "no namespace",
    ]
    .iter()
    .any(|needle| status.contains(needle));
    if has_failure { "󰅚" } else { "󰄬" }
}

fn render_namespace_picker(frame: &mut Frame, app: &App, dashboard: &Dashboard) {
    let area = centered_rect(40, 60, frame.area());
    frame.render_widget(Clear, area);

    let active = dashboard.active_namespace();
    let items = dashboard
        .namespaces()
        .namespaces()
        .iter()
        .map(|namespace| {
            let style = if Some(namespace.as_str()) == active {
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(Line::styled(namespace.clone(), style))
        })
        .collect::<Vec<_>>();

    let list = List::new(items)
        .block(
            Block::default()
                .title(" Namespaces ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(ACCENT))
                .style(Style::default().bg(PANEL)),
        )
        .highlight_style(Style::default().bg(HIGHLIGHT).add_modifier(Modifier::BOLD))
        .highlight_symbol("󰜴 ");
    let mut state = ListState::default();
    state.select(app.namespace_cursor());
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_search_modal(frame: &mut Frame, app: &App, dashboard: &Dashboard) {
    let area = centered_rect(56, 30, frame.area());
    frame.render_widget(Clear, area);

    let form = app.search_form();
    let field_style = |field: SearchField| {
        if form.field == field {
            Style::default().fg(Color::Black).bg(ACCENT)
        } else {
            Style::default().fg(Color::White)
        }
    };
    let caret = |field: SearchField| if form.field == field { "▏" } else { "" };

    let mut lines = vec![
        Line::from(vec![
            label_span("Kind       "),
            Span::styled(format!(" {} ", form.kind.title()), field_style(SearchField::Kind)),
            Span::styled("  (space/←/→ toggles)", Style::default().fg(MUTED)),
        ]),
        Line::from(vec![
            label_span("Namespace  "),
            Span::styled(
                format!(" {}{} ", form.namespace, caret(SearchField::Namespace)),
                field_style(SearchField::Namespace),
            ),
        ]),
        Line::from(vec![
            label_span("Name       "),
            Span::styled(
                format!(" {}{} ", form.name, caret(SearchField::Name)),
                field_style(SearchField::Name),
            ),
        ]),
        Line::from(""),
    ];
    if dashboard.is_searching() {
        lines.push(Line::styled(
            "Searching… wait for the current lookup to finish",
            Style::default().fg(INFO),
        ));
    } else {
        lines.push(Line::styled(
            "Enter to search, Esc to cancel",
            Style::default().fg(MUTED),
        ));
    }

    let modal = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(" Find resource ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(ACCENT))
                .style(Style::default().bg(PANEL)),
        )
        .style(Style::default().fg(Color::White));
    frame.render_widget(modal, area);
}

fn render_help_modal(frame: &mut Frame, app: &App) {
    let area = centered_rect(70, 64, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(format!(
            "kubediag help  mode:{}  endpoint:{}",
            help_mode_label(app.mode()),
            display_endpoint(app.endpoint())
        )),
        Line::from(""),
    ];
    for line in help_lines() {
        lines.push(Line::from(line));
    }

    let modal = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title("Help")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(ACCENT))
                .style(Style::default().bg(PANEL)),
        )
        .style(Style::default().fg(Color::White));
    frame.render_widget(modal, area);
}

fn help_lines() -> [&'static str; 12] {
    [
        "Panes: Tab / Shift+Tab cycle pods, detail, services",
        "Move: j/k or arrows, g/G top/bottom, PgUp/PgDn page",
        "Enter: open the focused pod or service in the detail pane",
        "Esc: close the detail pane",
        "r / F5: refresh pods and services in the active namespace",
        "n: pick a namespace",
        "/: find a resource by kind, namespace and name",
        ":ns <name>: switch to any namespace",
        ":po <name> | :po <ns>/<name>: open a pod",
        ":svc <name> | :svc <ns>/<name>: open a service",
        ":refresh  :help  :q",
        "q: quit",
    ]
}

fn help_mode_label(mode: InputMode) -> &'static str {
    match mode {
        InputMode::Normal => "normal",
        InputMode::NamespacePicker => "namespace",
        InputMode::Search => "search",
        InputMode::Command => "command",
    }
}

fn push_powerline_segment(
    spans: &mut Vec<Span<'static>>,
    content: impl Into<String>,
    fg: Color,
    bg: Color,
    next_bg: Color,
) {
    spans.push(Span::styled(
        content.into(),
        Style::default().fg(fg).bg(bg).add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::styled("", Style::default().fg(bg).bg(next_bg)));
}

fn spans_width(spans: &[Span<'_>]) -> usize {
    spans.iter().map(|span| span.content.chars().count()).sum()
}

fn visual_line_count(line: &Line<'_>, width: usize) -> usize {
    let chars = spans_width(&line.spans);
    if chars == 0 {
        return 1;
    }
    chars.div_ceil(width.max(1))
}

fn list_rows_visible(area: Rect) -> usize {
    area.height.saturating_sub(3).max(1) as usize
}

fn compact_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }

    if max_chars <= 1 {
        return "…".to_string();
    }

    let mut out = value
        .chars()
        .take(max_chars.saturating_sub(1))
        .collect::<String>();
    out.push('…');
    out
}

fn display_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim().trim_end_matches('/');
    trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed)
        .to_string()
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
