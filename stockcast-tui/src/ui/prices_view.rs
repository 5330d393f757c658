//! View 1: Prices: most recent rows as a table and the close history as a line chart.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::symbols;
use ratatui::text::Span;
use ratatui::widgets::{Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Row, Table};
use ratatui::Frame;

use crate::app::PassOutput;
use crate::theme;
use crate::ui::{date_labels, date_x, padded_bounds, value_labels};

pub fn render(f: &mut Frame, area: Rect, output: &PassOutput) {
    let table_height = output.tail.len() as u16 + 3;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(table_height), Constraint::Min(5)])
        .split(area);

    render_tail(f, chunks[0], output);
    render_close_chart(f, chunks[1], output);
}

fn render_tail(f: &mut Frame, area: Rect, output: &PassOutput) {
    let header = Row::new(["Date", "Open", "High", "Low", "Close", "Volume"])
        .style(theme::accent_bold());

    let mut prev_close: Option<f64> = None;
    let rows: Vec<Row> = output
        .tail
        .iter()
        .map(|r| {
            let close_style = match (prev_close, r.close) {
                (Some(p), Some(c)) => Style::default().fg(theme::change_color(c - p)),
                _ => theme::text(),
            };
            prev_close = r.close.or(prev_close);
            Row::new(vec![
                Cell::from(r.date.format("%Y-%m-%d").to_string()).style(theme::muted()),
                price_cell(r.open),
                price_cell(r.high),
                price_cell(r.low),
                price_cell(r.close).style(close_style),
                Cell::from(r.volume.to_string()).style(theme::secondary()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(14),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(theme::muted())
            .title(format!(" {}: last {} rows ", output.selection.ticker, output.tail.len()))
            .title_style(theme::neutral()),
    );
    f.render_widget(table, area);
}

fn price_cell(value: Option<f64>) -> Cell<'static> {
    match value {
        Some(v) => Cell::from(format!("{v:.2}")).style(theme::text()),
        None => Cell::from("-").style(theme::muted()),
    }
}

fn render_close_chart(f: &mut Frame, area: Rect, output: &PassOutput) {
    let closes = &output.closes;
    let (Some(first), Some(last)) = (closes.first(), closes.last()) else {
        return;
    };

    let data: Vec<(f64, f64)> = closes.iter().map(|(d, c)| (date_x(*d), *c)).collect();
    let y_bounds = padded_bounds(closes.iter().map(|(_, c)| *c));

    let dataset = Dataset::default()
        .name(format!("{} close", output.selection.ticker))
        .marker(symbols::Marker::Braille)
        .style(Style::default().fg(theme::NEUTRAL))
        .graph_type(GraphType::Line)
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .x_axis(
            Axis::default()
                .title(Span::styled("Date", theme::muted()))
                .style(theme::muted())
                .bounds([date_x(first.0), date_x(last.0).max(date_x(first.0) + 1.0)])
                .labels(date_labels(first.0, last.0)),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled("Close", theme::muted()))
                .style(theme::muted())
                .bounds(y_bounds)
                .labels(value_labels(y_bounds)),
        );

    f.render_widget(chart, area);
}

