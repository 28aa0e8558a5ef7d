//! Dashboard panels, drawn from a [`Board`]

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Gauge, List, ListItem, Paragraph, Row, Table};
use ratatui::Frame;

use super::board::{Board, KindState};
use super::{Level, Phase};

fn panel<'a>(title: impl Into<Line<'a>>) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(Color::Blue))
}

fn phase_style(phase: Phase) -> Style {
    let color = match phase {
        Phase::Complete => Color::Green,
        Phase::Failed => Color::Red,
        _ => Color::Cyan,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

/// Phase, world identity and canvas
pub fn render_status(frame: &mut Frame, area: Rect, board: &Board) {
    let dim = Style::default().fg(Color::Gray);
    let world_id = board.world_id.as_deref().unwrap_or("not yet resolved");
    let canvas = match board.canvas {
        Some((w, h, scale)) => format!(
            "{w}x{h} px @ {scale} m/px ({:.1} x {:.1} km)",
            w as f64 * scale / 1000.0,
            h as f64 * scale / 1000.0
        ),
        None => "metadata pending".to_string(),
    };

    let lines = vec![
        Line::from(Span::styled(format!(" {}", board.phase), phase_style(board.phase))),
        Line::from(vec![
            Span::raw("   "),
            Span::styled(board.world.as_str(), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {world_id}"), dim),
        ]),
        Line::from(vec![Span::raw("   "), Span::styled(canvas, dim)]),
    ];

    frame.render_widget(Paragraph::new(lines).block(panel(" AFMG World Import ")), area);
}

/// One row per selected kind with its file state and committed rows
pub fn render_kinds(frame: &mut Frame, area: Rect, board: &Board) {
    let rows = board.kinds.iter().map(|(kind, state)| {
        let style = match state {
            KindState::Done { .. } => Style::default().fg(Color::Green),
            KindState::Failed => Style::default().fg(Color::Red),
            KindState::Missing => Style::default().fg(Color::DarkGray),
            KindState::Ingesting { .. } => Style::default().fg(Color::Cyan),
            KindState::Pending | KindState::Found => Style::default(),
        };
        let committed = match state {
            KindState::Done { rows } => rows.to_string(),
            _ => "-".to_string(),
        };
        Row::new(vec![
            Cell::from(kind.name()),
            Cell::from(kind.schema().local_id),
            Cell::from(state.label()),
            Cell::from(committed),
        ])
        .style(style)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(9),
            Constraint::Length(11),
            Constraint::Min(12),
            Constraint::Length(10),
        ],
    )
    .header(
        Row::new(vec!["kind", "key", "state", "rows"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(panel(format!(" Feature kinds ({} rows) ", board.committed_rows())));

    frame.render_widget(table, area);
}

/// Upsert progress through the file being ingested
pub fn render_file_gauge(frame: &mut Frame, area: Rect, board: &Board) {
    let block = Block::default()
        .borders(Borders::LEFT | Borders::RIGHT)
        .border_style(Style::default().fg(Color::Blue));

    let current = board.current_file.as_ref().and_then(|(kind, path)| {
        match board.state(*kind)? {
            KindState::Ingesting { written, total } => Some((path, *written, *total)),
            _ => None,
        }
    });

    let Some((path, written, total)) = current else {
        frame.render_widget(Paragraph::new("").block(block), area);
        return;
    };

    let ratio = if total == 0 {
        1.0
    } else {
        (written as f64 / total as f64).min(1.0)
    };
    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let gauge = Gauge::default()
        .block(block)
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::DarkGray))
        .ratio(ratio)
        .label(format!("{file}: {written}/{total} features"));
    frame.render_widget(gauge, area);
}

/// Most recent activity, newest at the bottom
pub fn render_activity(frame: &mut Frame, area: Rect, board: &Board) {
    let visible = area.height.saturating_sub(2) as usize;
    let skip = board.log.len().saturating_sub(visible);

    let items: Vec<ListItem> = board
        .log
        .iter()
        .skip(skip)
        .map(|(level, message)| {
            let style = match level {
                Level::Warn => Style::default().fg(Color::Yellow),
                Level::Info => Style::default().fg(Color::Gray),
            };
            ListItem::new(Span::styled(format!(" {message}"), style))
        })
        .collect();

    frame.render_widget(List::new(items).block(panel(" Activity ")), area);
}
