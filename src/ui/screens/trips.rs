use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::summary::TripSummary;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, progress_bar, ratio, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    if app.trips.is_empty() {
        render_empty(f, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_list(f, chunks[0], app);
    if let Some(selected) = app.selected_trip() {
        render_detail(f, chunks[1], app, selected);
    }
}

fn render_list(f: &mut Frame, area: Rect, app: &App) {
    let currency = app.services.currency;
    let items: Vec<ListItem> = app
        .trips
        .iter()
        .enumerate()
        .skip(app.trip_scroll)
        .take(area.height.saturating_sub(2) as usize)
        .map(|(i, summary)| {
            let style = if i == app.trip_index {
                theme::selected_style()
            } else if i % 2 == 0 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };
            let name = truncate(&summary.trip.name, 17);

            if !summary.trip.has_budget() {
                return ListItem::new(Line::from(vec![
                    Span::styled(format!("{name:<18}"), style),
                    Span::styled(
                        format!("{} spent, no budget", format_amount(summary.total_spent, currency)),
                        theme::dim_style(),
                    ),
                ]));
            }

            let used = ratio(summary.total_spent, summary.trip.budget);
            let color = theme::usage_color(used);

            ListItem::new(Line::from(vec![
                Span::styled(format!("{name:<18}"), style),
                Span::styled(
                    format!(
                        "{}/{} ",
                        format_amount(summary.total_spent, currency),
                        format_amount(summary.trip.budget, currency)
                    ),
                    Style::default().fg(color),
                ),
                Span::styled(progress_bar(used, 20), Style::default().fg(color)),
                Span::styled(
                    format!(" {}%", summary.budget_percentage.round()),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(
                format!(" Trips ({}) ", app.trips.len()),
                theme::title_style(),
            )),
    );
    f.render_widget(list, area);
}

fn render_detail(f: &mut Frame, area: Rect, app: &App, summary: &TripSummary) {
    let currency = app.services.currency;
    let trip = &summary.trip;

    let mut lines = vec![
        Line::from(Span::styled(
            format!(" {}", trip.name),
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!(
                " {} to {} ({} days)",
                trip.start_date, trip.end_date, summary.duration
            ),
            theme::dim_style(),
        )),
        Line::from(""),
        detail_line("Spent", format_amount(summary.total_spent, currency)),
        detail_line("Per day", format_amount(summary.daily_average, currency)),
        detail_line("Entries", summary.transaction_count.to_string()),
    ];

    if trip.has_budget() {
        lines.push(detail_line("Budget", format_amount(trip.budget, currency)));
        lines.push(detail_line(
            "Remaining",
            format_amount(summary.budget_comparison, currency),
        ));
        lines.push(Line::from(vec![
            Span::styled(format!(" {:<12}", "Status"), theme::dim_style()),
            Span::styled(
                summary.status.to_string(),
                theme::trip_status_style(summary.status),
            ),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(" By category", theme::section_style())));
    if summary.category_distribution.is_empty() {
        lines.push(Line::from(Span::styled(
            "  No entries linked yet. Use :add while this trip is selected",
            theme::dim_style(),
        )));
    }
    for total in &summary.category_distribution {
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {:<14}", total.category.as_str()),
                Style::default().fg(theme::category_color(total.category)),
            ),
            Span::styled(format_amount(total.amount, currency), theme::normal_style()),
        ]));
    }

    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(" Trip Summary ", theme::title_style())),
    );
    f.render_widget(panel, area);
}

fn detail_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!(" {label:<12}"), theme::dim_style()),
        Span::styled(value, theme::normal_style()),
    ])
}

fn render_empty(f: &mut Frame, area: Rect) {
    let msg = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("No trips yet", theme::dim_style())),
        Line::from(""),
        Line::from(Span::styled(
            "Use :trip <name> <start> <end> [budget] to plan one",
            theme::dim_style(),
        )),
    ])
    .centered()
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(" Trips ", theme::title_style())),
    );
    f.render_widget(msg, area);
}
