//! Rendering for the piptui window: search bar, installed and results
//! panes, detail panel, action bar, and the modal overlay.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    prelude::Position,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use crate::state::{AppState, Focus, Modal, PackageDetail};
use crate::theme::theme;

/// Draw one frame of the interface.
pub fn ui(f: &mut Frame, app: &mut AppState) {
    let th = theme();
    let area = f.area();

    let bg = Block::default().style(Style::default().bg(th.base));
    f.render_widget(bg, area);

    let detail_h = (area.height.saturating_mul(2) / 5).max(8);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(detail_h),
            Constraint::Length(1),
        ])
        .split(area);

    render_search_bar(f, app, chunks[0]);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    render_installed_pane(f, app, panes[0]);
    render_results_pane(f, app, panes[1]);

    render_detail_pane(f, app, chunks[2]);
    render_action_bar(f, app, chunks[3]);

    if let Modal::Alert { title, message } = &app.modal {
        render_alert(f, area, title, message);
    }
}

fn render_search_bar(f: &mut Frame, app: &AppState, area: Rect) {
    let th = theme();
    let focused = matches!(app.focus, Focus::Search);
    let input_line = Line::from(vec![
        Span::styled(
            "> ",
            Style::default().fg(if focused { th.sapphire } else { th.overlay1 }),
        ),
        Span::styled(
            app.input.clone(),
            Style::default().fg(if focused { th.text } else { th.subtext0 }),
        ),
    ]);
    let title = if focused {
        "Search the index (Enter to search)"
    } else {
        "Search the index"
    };
    let input = Paragraph::new(input_line)
        .style(Style::default().bg(th.base))
        .block(pane_block(title, focused));
    f.render_widget(input, area);

    if focused {
        let right = area.x + area.width.saturating_sub(1);
        let x = std::cmp::min(area.x + 3 + app.input.chars().count() as u16, right);
        f.set_cursor_position(Position::new(x, area.y + 1));
    }
}

fn render_installed_pane(f: &mut Frame, app: &mut AppState, area: Rect) {
    let th = theme();
    let focused = matches!(app.focus, Focus::Installed);
    let items: Vec<ListItem> = app
        .installed
        .iter()
        .map(|p| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    p.name.clone(),
                    Style::default().fg(th.text).add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("  {}", p.version), Style::default().fg(th.overlay1)),
            ]))
        })
        .collect();
    let list = List::new(items)
        .style(Style::default().fg(th.text).bg(th.base))
        .block(pane_block(
            &format!("Installed ({})", app.installed.len()),
            focused,
        ))
        .highlight_style(Style::default().fg(th.crust).bg(th.lavender))
        .highlight_symbol("> ");
    f.render_stateful_widget(list, area, &mut app.installed_state);
}

fn render_results_pane(f: &mut Frame, app: &mut AppState, area: Rect) {
    let th = theme();
    let focused = matches!(app.focus, Focus::Results);
    let items: Vec<ListItem> = app
        .results
        .iter()
        .map(|name| {
            let mut segs = vec![Span::styled(name.clone(), Style::default().fg(th.text))];
            if app.installed.iter().any(|p| &p.name == name) {
                segs.push(Span::raw("  "));
                segs.push(Span::styled(
                    "[Installed]",
                    Style::default().fg(th.green).add_modifier(Modifier::BOLD),
                ));
            }
            ListItem::new(Line::from(segs))
        })
        .collect();
    let list = List::new(items)
        .style(Style::default().fg(th.text).bg(th.base))
        .block(pane_block(
            &format!("Results ({})", app.results.len()),
            focused,
        ))
        .highlight_style(Style::default().fg(th.crust).bg(th.lavender))
        .highlight_symbol("> ");
    f.render_stateful_widget(list, area, &mut app.results_state);
}

fn render_detail_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let th = theme();
    let lines = match &app.detail {
        Some(detail) => detail_lines(detail),
        None => vec![Line::from(Span::styled(
            "Information about the selected package will appear here.",
            Style::default().fg(th.subtext0),
        ))],
    };
    let pane = Paragraph::new(lines)
        .style(Style::default().fg(th.text).bg(th.base))
        .wrap(Wrap { trim: true })
        .block(pane_block("Package Info", false));
    f.render_widget(pane, area);
}

/// Build the detail-panel text for either metadata source.
///
/// One template serves both tags: name, version, and author always render as
/// headers, the index-page link is always present, and every optional field
/// is omitted when absent. The tags differ only in their trailing field set:
/// platform/Python-version for remote details, required-by for installed.
#[must_use]
pub fn detail_lines(detail: &PackageDetail) -> Vec<Line<'static>> {
    let th = theme();
    let mut lines: Vec<Line<'static>> = Vec::new();

    let (version, author, author_email, license, home_page, summary) = match detail {
        PackageDetail::Installed(d) => (
            &d.version,
            &d.author,
            &d.author_email,
            &d.license,
            &d.home_page,
            &d.summary,
        ),
        PackageDetail::Remote(d) => (
            &d.version,
            &d.author,
            &d.author_email,
            &d.license,
            &d.home_page,
            &d.summary,
        ),
    };

    lines.push(Line::from(Span::styled(
        detail.name().to_string(),
        Style::default().fg(th.mauve).add_modifier(Modifier::BOLD),
    )));
    push_field(&mut lines, "Version", Some(version.clone()));
    let author_text = match (author, author_email) {
        (Some(a), Some(e)) => format!("{a} <{e}>"),
        (Some(a), None) => a.clone(),
        (None, Some(e)) => format!("<{e}>"),
        (None, None) => "unknown".to_string(),
    };
    push_field(&mut lines, "Author", Some(author_text));
    push_field(&mut lines, "License", license.clone());

    let index_page = match detail {
        PackageDetail::Remote(d) if d.package_url.is_some() => d.package_url.clone(),
        _ => Some(format!("https://pypi.org/project/{}/", detail.name())),
    };
    push_link(&mut lines, "Index page", index_page);
    push_link(&mut lines, "Home page", home_page.clone());

    if let Some(text) = summary {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            text.clone(),
            Style::default().fg(th.text),
        )));
    }

    match detail {
        PackageDetail::Installed(d) => {
            if !d.requirements.is_empty() {
                lines.push(Line::default());
                push_field(
                    &mut lines,
                    "Requirements",
                    Some(d.requirements.join(", ")),
                );
            }
            if !d.required_by.is_empty() {
                lines.push(Line::default());
                push_field(&mut lines, "Required by", Some(d.required_by.join(", ")));
            }
        }
        PackageDetail::Remote(d) => {
            push_field(&mut lines, "Platform", d.platform.clone());
            push_field(&mut lines, "Python version/s", d.requires_python.clone());
            if !d.requirements.is_empty() {
                lines.push(Line::default());
                lines.push(Line::from(Span::styled(
                    "Requirements:",
                    Style::default().fg(th.overlay1).add_modifier(Modifier::BOLD),
                )));
                for req in &d.requirements {
                    lines.push(Line::from(Span::styled(
                        format!("  {req}"),
                        Style::default().fg(th.subtext0),
                    )));
                }
            }
        }
    }
    lines
}

fn push_field(lines: &mut Vec<Line<'static>>, label: &str, value: Option<String>) {
    let th = theme();
    if let Some(v) = value {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{label}: "),
                Style::default().fg(th.overlay1).add_modifier(Modifier::BOLD),
            ),
            Span::styled(v, Style::default().fg(th.text)),
        ]));
    }
}

fn push_link(lines: &mut Vec<Line<'static>>, label: &str, url: Option<String>) {
    let th = theme();
    if let Some(u) = url {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{label}: "),
                Style::default().fg(th.overlay1).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                u,
                Style::default()
                    .fg(th.sapphire)
                    .add_modifier(Modifier::UNDERLINED),
            ),
        ]));
    }
}

fn render_action_bar(f: &mut Frame, app: &AppState, area: Rect) {
    let th = theme();
    let mut segs: Vec<Span> = Vec::new();

    if let Some(action) = &app.busy {
        segs.push(Span::styled(
            format!(" working: {} {}... ", action.verb(), action.package()),
            Style::default().fg(th.yellow).add_modifier(Modifier::BOLD),
        ));
    } else {
        segs.push(action_span("[i] Install", app.keys.install));
        segs.push(Span::raw("  "));
        segs.push(action_span("[u] Uninstall", app.keys.uninstall));
        segs.push(Span::raw("  "));
        segs.push(action_span("[U] Update", app.keys.upgrade));
        segs.push(Span::raw("  "));
        segs.push(action_span("[P] Update pip", true));
    }
    segs.push(Span::raw("  "));
    segs.push(Span::styled(
        "[Tab] Focus  [Esc] Quit",
        Style::default().fg(th.overlay1),
    ));

    f.render_widget(Paragraph::new(Line::from(segs)), area);
}

fn action_span(label: &str, enabled: bool) -> Span<'static> {
    let th = theme();
    if enabled {
        Span::styled(label.to_string(), Style::default().fg(th.green))
    } else {
        Span::styled(
            label.to_string(),
            Style::default().fg(th.surface1).add_modifier(Modifier::DIM),
        )
    }
}

fn pane_block(title: &str, focused: bool) -> Block<'static> {
    let th = theme();
    Block::default()
        .title(Span::styled(
            title.to_string(),
            Style::default().fg(if focused { th.mauve } else { th.overlay1 }),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(if focused { th.mauve } else { th.surface2 }))
}

/// Render a centered alert/confirmation modal over the whole window.
fn render_alert(f: &mut Frame, area: Rect, title: &str, message: &str) {
    let th = theme();
    let w = area.width.saturating_sub(8).min(70);
    let h = area.height.saturating_sub(8).min(10).max(5);
    let x = area.x + area.width.saturating_sub(w) / 2;
    let y = area.y + area.height.saturating_sub(h) / 2;
    let rect = Rect {
        x,
        y,
        width: w,
        height: h,
    };
    f.render_widget(Clear, rect);
    let lines = vec![
        Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(th.text),
        )),
        Line::default(),
        Line::from(Span::styled(
            "Press Enter to continue",
            Style::default().fg(th.subtext0),
        )),
    ];
    let boxw = Paragraph::new(lines)
        .style(Style::default().fg(th.text).bg(th.mantle))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(Span::styled(
                    format!(" {title} "),
                    Style::default().fg(th.mauve).add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(th.mauve))
                .style(Style::default().bg(th.mantle)),
        );
    f.render_widget(boxw, rect);
}

#[cfg(test)]
mod tests {
    use super::detail_lines;
    use crate::state::{InstalledDetail, PackageDetail, RemoteDetail};

    fn rendered_text(detail: &PackageDetail) -> String {
        detail_lines(detail)
            .iter()
            .map(|l| {
                l.spans
                    .iter()
                    .map(|s| s.content.as_ref())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// What: Installed template renders mandatory headers and omits absents
    ///
    /// - Input: Installed detail without license or home page
    /// - Output: Name/version/author/index link present; omitted labels absent
    #[test]
    fn installed_template_omits_absent_fields() {
        let detail = PackageDetail::Installed(InstalledDetail {
            name: "requests".into(),
            version: "2.28.1".into(),
            author: Some("Kenneth Reitz".into()),
            author_email: Some("me@kennethreitz.org".into()),
            requirements: vec!["urllib3".into(), "idna".into()],
            ..Default::default()
        });
        let text = rendered_text(&detail);
        assert!(text.contains("requests"));
        assert!(text.contains("Version: 2.28.1"));
        assert!(text.contains("Kenneth Reitz <me@kennethreitz.org>"));
        assert!(text.contains("https://pypi.org/project/requests/"));
        assert!(text.contains("Requirements: urllib3, idna"));
        assert!(!text.contains("License:"));
        assert!(!text.contains("Home page:"));
        assert!(!text.contains("Required by:"));
        assert!(!text.contains("Platform:"));
    }

    /// What: Remote template renders its own optional field set
    ///
    /// - Input: Remote detail with platform and Python version, no summary
    /// - Output: Platform/Python lines present, package URL used as the link
    #[test]
    fn remote_template_renders_remote_only_fields() {
        let detail = PackageDetail::Remote(RemoteDetail {
            name: "numpy".into(),
            version: "1.24.0".into(),
            author: Some("Travis E. Oliphant et al.".into()),
            package_url: Some("https://pypi.org/project/numpy/".into()),
            platform: Some("Windows".into()),
            requires_python: Some(">=3.8".into()),
            requirements: vec!["wheel".into()],
            ..Default::default()
        });
        let text = rendered_text(&detail);
        assert!(text.contains("numpy"));
        assert!(text.contains("Platform: Windows"));
        assert!(text.contains("Python version/s: >=3.8"));
        assert!(text.contains("https://pypi.org/project/numpy/"));
        assert!(text.contains("Requirements:"));
        assert!(text.contains("  wheel"));
        assert!(!text.contains("Required by:"));
    }

    /// What: An empty requirement list renders no requirements section
    ///
    /// - Input: Remote detail with no requirements
    /// - Output: No "Requirements" label in the panel
    #[test]
    fn empty_requirements_are_omitted() {
        let detail = PackageDetail::Remote(RemoteDetail {
            name: "six".into(),
            version: "1.16.0".into(),
            ..Default::default()
        });
        let text = rendered_text(&detail);
        assert!(!text.contains("Requirements"));
    }
}
