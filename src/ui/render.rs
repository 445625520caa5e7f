/*!
 * Rendering
 * Draws an engine snapshot; never touches engine state
 */

use crate::core::limits::{PAGES_PER_ROW, SEGMENT_TABLE_ROWS};
use crate::memory::{EngineSnapshot, MemoryPressure, Page, Segment};
use crate::monitoring::MetricsSnapshot;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

const OWNER_PALETTE: [Color; 5] = [
    Color::Green,
    Color::Cyan,
    Color::Magenta,
    Color::Blue,
    Color::Yellow,
];

/// Draw one frame
pub fn draw(f: &mut Frame<'_>, snapshot: &EngineSnapshot, clock: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(7), // Stats
            Constraint::Length(3), // Usage bar
            Constraint::Min(0),    // Paging / segmentation
            Constraint::Length(1), // Status
        ])
        .split(f.area());

    render_title(f, chunks[0]);

    let stats = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(chunks[1]);
    render_system_memory(f, stats[0], &snapshot.metrics);
    render_metrics(f, stats[1], &snapshot.metrics);
    render_operations(f, stats[2], &snapshot.metrics, clock);

    render_usage_bar(f, chunks[2], &snapshot.metrics);

    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[3]);
    render_pages(f, panels[0], &snapshot.pages, snapshot.metrics.page_size_kb);
    render_segments(f, panels[1], &snapshot.segments, snapshot.metrics.page_size_kb);

    render_status(f, chunks[4]);
}

fn panel(title: &str, border: Color) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default().fg(Color::LightGreen).add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center)
}

fn field(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{}: ", label), Style::default().fg(Color::Yellow)),
        Span::styled(value, Style::default().fg(Color::White)),
    ])
}

fn render_title(f: &mut Frame<'_>, area: Rect) {
    let title = Paragraph::new(Line::from(Span::styled(
        "MEMORY ALLOCATION TRACKER",
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::BOTTOM).border_style(Style::default().fg(Color::Green)));
    f.render_widget(title, area);
}

fn render_system_memory(f: &mut Frame<'_>, area: Rect, metrics: &MetricsSnapshot) {
    let lines = match metrics.host {
        Some(host) => vec![
            field("Total", format!("{} MB", host.total_mib())),
            field("Used", format!("{} MB", host.used_mib())),
            field("Free", format!("{} MB", host.free_mib())),
            field("Usage", format!("{:.1}%", host.used_percent)),
        ],
        None => vec![Line::from(Span::styled(
            "Sampling host memory...",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ))],
    };
    f.render_widget(
        Paragraph::new(lines).block(panel("SYSTEM MEMORY", Color::Cyan)),
        area,
    );
}

fn render_metrics(f: &mut Frame<'_>, area: Rect, metrics: &MetricsSnapshot) {
    let lines = vec![
        field("Page Size", format!("{} KB", metrics.page_size_kb)),
        field("Fragmentation", format!("{:.1}%", metrics.fragmentation_rate)),
        field("Peak Usage", format!("{:.1}%", metrics.peak_usage_ratio)),
        field(
            "Free Pages",
            format!("{} (largest run {})", metrics.free_pages, metrics.largest_free_run),
        ),
    ];
    f.render_widget(
        Paragraph::new(lines).block(panel("MEMORY METRICS", Color::Green)),
        area,
    );
}

fn render_operations(f: &mut Frame<'_>, area: Rect, metrics: &MetricsSnapshot, clock: &str) {
    let lines = vec![
        field("Allocations", metrics.total_allocations.to_string()),
        field("Deallocations", metrics.total_deallocations.to_string()),
        field("Pressure", metrics.pressure.to_string()),
        field("Time", clock.to_string()),
    ];
    f.render_widget(
        Paragraph::new(lines).block(panel("OPERATIONS", Color::Magenta)),
        area,
    );
}

pub(crate) fn pressure_color(pressure: MemoryPressure) -> Color {
    match pressure {
        MemoryPressure::Low => Color::Green,
        MemoryPressure::Medium => Color::Yellow,
        MemoryPressure::High | MemoryPressure::Critical => Color::Red,
    }
}

fn render_usage_bar(f: &mut Frame<'_>, area: Rect, metrics: &MetricsSnapshot) {
    let ratio = (metrics.used_page_ratio / 100.0).clamp(0.0, 1.0);
    let gauge = Gauge::default()
        .block(panel("MEMORY USAGE", Color::Green))
        .gauge_style(
            Style::default()
                .fg(pressure_color(metrics.pressure))
                .bg(Color::DarkGray),
        )
        .ratio(ratio)
        .label(format!(
            "{:.1}% ({}/{} pages)",
            metrics.used_page_ratio, metrics.used_pages, metrics.capacity
        ));
    f.render_widget(gauge, area);
}

/// Stable color per owner tag, from the tag's numeric part
pub(crate) fn owner_color(owner: &str) -> Color {
    let number: usize = owner
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse()
        .unwrap_or(0);
    OWNER_PALETTE[number % OWNER_PALETTE.len()]
}

/// Paging grid, `PAGES_PER_ROW` cells per line
pub(crate) fn page_grid_lines(pages: &[Page]) -> Vec<Line<'static>> {
    pages
        .chunks(PAGES_PER_ROW)
        .map(|row| {
            Line::from(
                row.iter()
                    .map(|page| match page.owner() {
                        Some(owner) => Span::styled("■ ", Style::default().fg(owner_color(owner))),
                        None => Span::styled("□ ", Style::default().fg(Color::DarkGray)),
                    })
                    .collect::<Vec<_>>(),
            )
        })
        .collect()
}

fn render_pages(f: &mut Frame<'_>, area: Rect, pages: &[Page], page_size_kb: usize) {
    let mut lines = vec![
        Line::from(Span::styled(
            format!("Fixed-size memory blocks ({}KB each)", page_size_kb),
            Style::default().fg(Color::Yellow),
        )),
        Line::default(),
    ];
    lines.extend(page_grid_lines(pages));
    lines.push(Line::default());
    lines.push(Line::from(vec![
        Span::styled("■", Style::default().fg(Color::Green)),
        Span::raw(" allocated page  "),
        Span::styled("□", Style::default().fg(Color::DarkGray)),
        Span::raw(" free page"),
    ]));

    f.render_widget(
        Paragraph::new(lines).block(panel("PAGING", Color::Cyan)),
        area,
    );
}

/// Width of a segment's bar, proportional to its page count
fn block_width(segment: &Segment, page_size_kb: usize) -> usize {
    (segment.size_kb / page_size_kb.max(1)).clamp(1, 5)
}

pub(crate) fn segment_lines(segments: &[Segment], page_size_kb: usize) -> Vec<Line<'static>> {
    if segments.is_empty() {
        return vec![Line::from(Span::styled(
            "No active memory segments",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ))];
    }

    let mut lines = vec![
        Line::from(Span::styled(
            "Variable-size memory blocks",
            Style::default().fg(Color::Yellow),
        )),
        Line::default(),
    ];

    for row in segments.chunks(8) {
        let spans: Vec<Span<'static>> = row
            .iter()
            .map(|s| {
                Span::styled(
                    format!("{}({}) ", "█".repeat(block_width(s, page_size_kb)), s.owner),
                    Style::default().fg(owner_color(&s.owner)),
                )
            })
            .collect();
        lines.push(Line::from(spans));
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "ID | Size | Status",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from("------------------"));

    for s in segments.iter().take(SEGMENT_TABLE_ROWS) {
        lines.push(Line::from(vec![
            Span::styled(s.owner.clone(), Style::default().fg(owner_color(&s.owner))),
            Span::raw(" | "),
            Span::styled(format!("{}KB", s.size_kb), Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled("Active", Style::default().fg(Color::LightGreen)),
        ]));
    }
    if segments.len() > SEGMENT_TABLE_ROWS {
        lines.push(Line::from(Span::styled(
            format!("... and {} more", segments.len() - SEGMENT_TABLE_ROWS),
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines
}

fn render_segments(f: &mut Frame<'_>, area: Rect, segments: &[Segment], page_size_kb: usize) {
    f.render_widget(
        Paragraph::new(segment_lines(segments, page_size_kb))
            .wrap(Wrap { trim: false })
            .block(panel("SEGMENTATION", Color::Magenta)),
        area,
    );
}

fn render_status(f: &mut Frame<'_>, area: Rect) {
    let key = Style::default().fg(Color::Green);
    let status = Paragraph::new(Line::from(vec![
        Span::styled("a", key),
        Span::raw(":allocate | "),
        Span::styled("d", key),
        Span::raw(":deallocate | "),
        Span::styled("q", key),
        Span::raw(":quit"),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(status, area);
}
