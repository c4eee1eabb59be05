use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph, Sparkline},
    Frame,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::summary::NO_INCOME_RATIO;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Summary cards
            Constraint::Min(10),   // Chart + analytics
            Constraint::Length(3), // Monthly trend sparkline
        ])
        .split(area);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(chunks[1]);

    render_summary_cards(f, chunks[0], app);
    render_spending_chart(f, middle[0], app);
    render_analytics(f, middle[1], app);
    render_trend_sparkline(f, chunks[2], app);
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(format!(" {title} "), theme::title_style()))
}

fn render_summary_cards(f: &mut Frame, area: Rect, app: &App) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    let summary = &app.summary;
    let currency = app.services.currency;
    let income_count = app.transactions.iter().filter(|t| t.is_income()).count();
    let expense_count = app.transactions.iter().filter(|t| t.is_expense()).count();
    let signed_color = |value: Decimal| {
        if value >= Decimal::ZERO {
            theme::GREEN
        } else {
            theme::RED
        }
    };

    render_card(
        f,
        cards[0],
        "Income",
        format_amount(summary.total_income, currency),
        theme::GREEN,
        format!("{income_count} entries"),
    );
    render_card(
        f,
        cards[1],
        "Expenses",
        format_amount(summary.total_expenses, currency),
        theme::RED,
        format!("{expense_count} entries"),
    );
    render_card(
        f,
        cards[2],
        "Balance",
        format_amount(summary.balance, currency),
        signed_color(summary.balance),
        summary.month.clone(),
    );
    render_card(
        f,
        cards[3],
        "Savings Rate",
        format!("{}%", summary.savings_rate),
        signed_color(summary.savings_rate),
        "of income kept".to_string(),
    );
}

fn render_card(f: &mut Frame, area: Rect, title: &str, value: String, color: Color, subtitle: String) {
    let text = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(subtitle, theme::dim_style())),
    ])
    .centered()
    .block(panel(title));

    f.render_widget(text, area);
}

fn render_spending_chart(f: &mut Frame, area: Rect, app: &App) {
    if app.summary.category_distribution.is_empty() {
        let msg = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("No expenses for this month", theme::dim_style())),
            Line::from(""),
            Line::from(Span::styled(
                "Press v and say something like \"gastei 20 reais no mercado\"",
                theme::dim_style(),
            )),
        ])
        .centered()
        .block(panel("Spending by Category"));
        f.render_widget(msg, area);
        return;
    }

    let bars: Vec<Bar> = app
        .summary
        .category_distribution
        .iter()
        .map(|total| {
            let color = theme::category_color(total.category);
            Bar::default()
                .value(total.amount.round().to_u64().unwrap_or(0))
                .label(Line::from(truncate(total.category.as_str(), 11)))
                .text_value(format_amount(total.amount, app.services.currency))
                .style(Style::default().fg(color))
                .value_style(
                    Style::default()
                        .fg(theme::HEADER_BG)
                        .bg(color)
                        .add_modifier(Modifier::BOLD),
                )
        })
        .collect();

    let chart = BarChart::default()
        .block(panel("Spending by Category"))
        .data(BarGroup::default().bars(&bars))
        .bar_width(11)
        .bar_gap(2);

    f.render_widget(chart, area);
}

fn render_analytics(f: &mut Frame, area: Rect, app: &App) {
    let summary = &app.summary;
    let currency = app.services.currency;

    let ratio = if summary.expense_ratio == NO_INCOME_RATIO {
        "no income".to_string()
    } else {
        format!("{}", summary.expense_ratio)
    };

    let mut lines = vec![
        stat_line("Avg/day", format_amount(summary.avg_daily_expense, currency)),
        stat_line("Expense ratio", ratio),
        stat_line("Entries", summary.transaction_count.to_string()),
    ];

    match &summary.biggest_expense {
        Some(txn) => {
            lines.push(stat_line(
                "Biggest",
                format_amount(txn.amount, txn.currency),
            ));
            lines.push(Line::from(Span::styled(
                format!("  {}", truncate(&txn.description, 28)),
                theme::dim_style(),
            )));
        }
        None => lines.push(stat_line("Biggest", "-".to_string())),
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(" By source", theme::section_style())));
    for stat in &summary.source_analysis {
        lines.push(stat_line(
            stat.source.as_str(),
            format!("{} ({})", format_amount(stat.amount, currency), stat.count),
        ));
    }

    f.render_widget(Paragraph::new(lines).block(panel("Analytics")), area);
}

fn stat_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!(" {label:<14}"), theme::dim_style()),
        Span::styled(value, theme::normal_style()),
    ])
}

fn render_trend_sparkline(f: &mut Frame, area: Rect, app: &App) {
    let data: Vec<u64> = app
        .monthly_trend
        .iter()
        .map(|(_, _, exp)| exp.abs().to_u64().unwrap_or(0))
        .collect();

    let sparkline = Sparkline::default()
        .block(panel("Monthly Spending Trend"))
        .data(&data)
        .style(Style::default().fg(theme::YELLOW));

    f.render_widget(sparkline, area);
}
