//! View 2: Forecast: observed closes, predicted line and uncertainty band.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Chart, Dataset, GraphType, LegendPosition, Paragraph};
use ratatui::Frame;

use stockcast_core::forecast::Forecast;

use stockcast_core::ForecastRun;

use crate::theme;
use crate::ui::{date_labels, date_x, padded_bounds, value_labels};

pub fn render(f: &mut Frame, area: Rect, ticker: &str, run: &ForecastRun) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(3)])
        .split(area);

    render_chart(f, chunks[0], run);
    render_summary(f, chunks[1], ticker, run);
}

fn render_chart(f: &mut Frame, area: Rect, run: &ForecastRun) {
    let forecast = &run.forecast;
    let (Some(first), Some(last)) = (forecast.rows.first(), forecast.rows.last()) else {
        return;
    };

    let observed: Vec<(f64, f64)> = run
        .training
        .ds
        .iter()
        .zip(&run.training.y)
        .map(|(d, y)| (date_x(*d), *y))
        .collect();
    let yhat: Vec<(f64, f64)> = forecast.rows.iter().map(|r| (date_x(r.ds), r.yhat)).collect();
    let lower: Vec<(f64, f64)> = forecast
        .rows
        .iter()
        .map(|r| (date_x(r.ds), r.yhat_lower))
        .collect();
    let upper: Vec<(f64, f64)> = forecast
        .rows
        .iter()
        .map(|r| (date_x(r.ds), r.yhat_upper))
        .collect();

    let y_bounds = padded_bounds(
        observed
            .iter()
            .chain(&lower)
            .chain(&upper)
            .map(|(_, v)| *v),
    );

    let band = format!("{:.0}% interval", forecast.interval_width * 100.0);
    let datasets = vec![
        Dataset::default()
            .name(band)
            .marker(symbols::Marker::Braille)
            .style(Style::default().fg(theme::MUTED))
            .graph_type(GraphType::Line)
            .data(&lower),
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .style(Style::default().fg(theme::MUTED))
            .graph_type(GraphType::Line)
            .data(&upper),
        Dataset::default()
            .name("observed")
            .marker(symbols::Marker::Dot)
            .style(Style::default().fg(theme::NEUTRAL))
            .graph_type(GraphType::Scatter)
            .data(&observed),
        Dataset::default()
            .name("yhat")
            .marker(symbols::Marker::Braille)
            .style(Style::default().fg(theme::ACCENT))
            .graph_type(GraphType::Line)
            .data(&yhat),
    ];

    let chart = Chart::new(datasets)
        .legend_position(Some(LegendPosition::TopLeft))
        .hidden_legend_constraints((Constraint::Ratio(1, 3), Constraint::Ratio(1, 3)))
        .x_axis(
            Axis::default()
                .title(Span::styled("ds", theme::muted()))
                .style(theme::muted())
                .bounds([date_x(first.ds), date_x(last.ds).max(date_x(first.ds) + 1.0)])
                .labels(date_labels(first.ds, last.ds)),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled("y", theme::muted()))
                .style(theme::muted())
                .bounds(y_bounds)
                .labels(value_labels(y_bounds)),
        );

    f.render_widget(chart, area);
}

fn render_summary(f: &mut Frame, area: Rect, ticker: &str, run: &ForecastRun) {
    let lines = summary_lines(ticker, &run.forecast);
    f.render_widget(Paragraph::new(lines), area);
}

/// Last observation and end-of-horizon prediction as text.
pub fn summary_lines(ticker: &str, forecast: &Forecast) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let observed = forecast.history_rows().last();
    let end = forecast.future_rows().last();

    if let Some(row) = observed {
        lines.push(Line::from(vec![
            Span::styled(format!("{ticker} "), theme::accent_bold()),
            Span::styled(
                format!("fitted {:.2} on {}", row.yhat, forecast.last_observed),
                theme::secondary(),
            ),
        ]));
    }
    if let (Some(start), Some(end)) = (observed, end) {
        let delta = end.yhat - start.yhat;
        lines.push(Line::from(vec![
            Span::styled(format!("{}: ", end.ds), theme::muted()),
            Span::styled(
                format!("{:.2}", end.yhat),
                Style::default().fg(theme::change_color(delta)),
            ),
            Span::styled(
                format!(
                    "  [{:.2}, {:.2}] at {:.0}%",
                    end.yhat_lower,
                    end.yhat_upper,
                    forecast.interval_width * 100.0
                ),
                theme::muted(),
            ),
        ]));
    }
    lines.push(Line::from(Span::styled(
        "dots: observed   line: yhat   band: yhat_lower / yhat_upper",
        theme::muted(),
    )));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use stockcast_core::forecast::{Components, ForecastRow};

    fn row(day: u32, yhat: f64) -> ForecastRow {
        ForecastRow {
            ds: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            yhat,
            yhat_lower: yhat - 2.0,
            yhat_upper: yhat + 2.0,
            trend: yhat,
            weekly: 0.0,
            yearly: 0.0,
        }
    }

    fn text(lines: &[Line]) -> String {
        lines
            .iter()
            .flat_map(|l| l.spans.iter().map(|s| s.content.to_string()))
            .collect()
    }

    #[test]
    fn summary_reports_last_fit_and_horizon_end() {
        let forecast = Forecast {
            rows: vec![row(1, 10.0), row(2, 11.0), row(3, 12.5)],
            last_observed: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            interval_width: 0.8,
            components: Components::default(),
        };
        let s = text(&summary_lines("AAPL", &forecast));
        assert!(s.contains("fitted 11.00 on 2024-03-02"));
        assert!(s.contains("2024-03-03: 12.50"));
        assert!(s.contains("[10.50, 14.50] at 80%"));
    }
}
