//! View 3: Components: trend, weekly and yearly effects of the fitted model.

use chrono::{Datelike, NaiveDate, Weekday};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph,
};
use ratatui::Frame;

use stockcast_core::ForecastRun;

use crate::theme;
use crate::ui::{date_labels, date_x, padded_bounds, value_labels};

pub fn render(f: &mut Frame, area: Rect, run: &ForecastRun) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(25),
            Constraint::Percentage(35),
        ])
        .split(area);

    render_trend(f, chunks[0], run);
    render_weekly(f, chunks[1], run);
    render_yearly(f, chunks[2], run);
}

fn section(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::TOP)
        .border_style(theme::muted())
        .title(format!(" {title} "))
        .title_style(theme::neutral())
}

fn render_trend(f: &mut Frame, area: Rect, run: &ForecastRun) {
    let rows = &run.forecast.rows;
    let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
        return;
    };
    let data: Vec<(f64, f64)> = rows.iter().map(|r| (date_x(r.ds), r.trend)).collect();
    let y_bounds = padded_bounds(rows.iter().map(|r| r.trend));

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .style(Style::default().fg(theme::ACCENT))
        .graph_type(GraphType::Line)
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(section("trend"))
        .x_axis(
            Axis::default()
                .style(theme::muted())
                .bounds([date_x(first.ds), date_x(last.ds).max(date_x(first.ds) + 1.0)])
                .labels(date_labels(first.ds, last.ds)),
        )
        .y_axis(
            Axis::default()
                .style(theme::muted())
                .bounds(y_bounds)
                .labels(value_labels(y_bounds)),
        );
    f.render_widget(chart, area);
}

fn render_weekly(f: &mut Frame, area: Rect, run: &ForecastRun) {
    let Some(profile) = run.forecast.weekly_profile() else {
        render_disabled(f, area, "weekly", "not fitted: history spans less than two weeks");
        return;
    };

    let bars: Vec<Bar> = profile
        .iter()
        .map(|(day, effect)| {
            Bar::default()
                .label(Line::from(weekday_label(*day)))
                .value(bar_height(*effect))
                .text_value(format!("{effect:+.2}"))
                .style(Style::default().fg(theme::change_color(*effect)))
        })
        .collect();

    let chart = BarChart::default()
        .block(section("weekly"))
        .data(BarGroup::default().bars(&bars))
        .bar_width(7)
        .bar_gap(2)
        .value_style(theme::text());
    f.render_widget(chart, area);
}

fn render_yearly(f: &mut Frame, area: Rect, run: &ForecastRun) {
    let Some(profile) = run.forecast.yearly_profile() else {
        render_disabled(f, area, "yearly", "not fitted: history spans less than two years");
        return;
    };
    let (Some(first), Some(last)) = (profile.first(), profile.last()) else {
        return;
    };

    let data: Vec<(f64, f64)> = profile
        .iter()
        .map(|(d, v)| (d.ordinal0() as f64, *v))
        .collect();
    let y_bounds = padded_bounds(profile.iter().map(|(_, v)| *v));

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .style(Style::default().fg(theme::POSITIVE))
        .graph_type(GraphType::Line)
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(section("yearly"))
        .x_axis(
            Axis::default()
                .style(theme::muted())
                .bounds([first.0.ordinal0() as f64, last.0.ordinal0() as f64])
                .labels(month_labels(first.0, last.0)),
        )
        .y_axis(
            Axis::default()
                .style(theme::muted())
                .bounds(y_bounds)
                .labels(value_labels(y_bounds)),
        );
    f.render_widget(chart, area);
}

fn render_disabled(f: &mut Frame, area: Rect, title: &str, reason: &str) {
    let para = Paragraph::new(Span::styled(reason.to_string(), theme::muted())).block(section(title));
    f.render_widget(para, area);
}

fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

/// Bar height in hundredths of the absolute effect; the sign is carried by color.
pub fn bar_height(effect: f64) -> u64 {
    if effect.is_finite() {
        (effect.abs() * 100.0).round() as u64
    } else {
        0
    }
}

fn month_labels(first: NaiveDate, last: NaiveDate) -> Vec<Span<'static>> {
    let mid = first + (last - first) / 2;
    [first, mid, last]
        .into_iter()
        .map(|d| Span::styled(d.format("%b %d").to_string(), theme::muted()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_height_uses_magnitude() {
        assert_eq!(bar_height(0.256), 26);
        assert_eq!(bar_height(-0.256), 26);
        assert_eq!(bar_height(f64::NAN), 0);
    }

    #[test]
    fn weekday_labels_are_short() {
        assert_eq!(weekday_label(Weekday::Mon), "Mon");
        assert_eq!(weekday_label(Weekday::Sun), "Sun");
    }
}
