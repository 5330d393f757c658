//! Top-level UI layout: control sidebar, active view, status bar.

pub mod components_view;
pub mod controls;
pub mod forecast_view;
pub mod overlays;
pub mod prices_view;
pub mod status_bar;

use chrono::NaiveDate;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::{AppState, Overlay, View};
use crate::theme;

const SIDEBAR_WIDTH: u16 = 32;

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState) {
    // Split: main area + 1-line status bar.
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
        .split(chunks[0]);

    controls::render(f, columns[0], app);
    draw_view(f, columns[1], app);
    status_bar::render(f, chunks[1], app);

    if app.overlay == Overlay::Help {
        overlays::render_help(f, chunks[0]);
    }
}

/// Draw the active view with its border, or the fault panel when the last pass failed.
///
/// Prices that loaded before a forecast failure stay visible in the prices view.
fn draw_view(f: &mut Frame, area: Rect, app: &AppState) {
    let view = app.view;
    let output = app.output.as_ref();

    if let Some(fault) = &app.fault {
        if view != View::Prices || output.is_none() {
            overlays::render_fault(f, area, &app.selection.ticker, fault);
            return;
        }
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(true))
        .title(format!(" {} [{}] ", view.label(), view.index() + 1))
        .title_style(theme::panel_title(true));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let loading = Paragraph::new(Span::styled("Loading…", theme::warning()));
    let Some(output) = output else {
        f.render_widget(loading, inner);
        return;
    };
    let ticker = output.selection.ticker.as_str();

    match (view, &output.run) {
        (View::Prices, _) => prices_view::render(f, inner, output),
        (View::Forecast, Some(run)) => forecast_view::render(f, inner, ticker, run),
        (View::Components, Some(run)) => components_view::render(f, inner, run),
        (_, None) => f.render_widget(loading, inner),
    }
}

/// Compute a centered rect for overlays.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
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

/// Chart x coordinate for a date.
pub fn date_x(date: NaiveDate) -> f64 {
    date.signed_duration_since(NaiveDate::default()).num_days() as f64
}

/// Min/max of `values` with 5% padding; a flat series gets a unit band.
pub fn padded_bounds(values: impl IntoIterator<Item = f64>) -> [f64; 2] {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() {
        return [0.0, 1.0];
    }
    let pad = (hi - lo).abs() * 0.05;
    if pad == 0.0 {
        [lo - 0.5, hi + 0.5]
    } else {
        [lo - pad, hi + pad]
    }
}

/// First, middle and last date as axis labels.
pub fn date_labels(first: NaiveDate, last: NaiveDate) -> Vec<Span<'static>> {
    let mid = first + (last - first) / 2;
    [first, mid, last]
        .into_iter()
        .map(|d| Span::styled(d.format("%Y-%m-%d").to_string(), theme::muted()))
        .collect()
}

/// Low, middle and high value as axis labels.
pub fn value_labels(bounds: [f64; 2]) -> Vec<Span<'static>> {
    let mid = (bounds[0] + bounds[1]) / 2.0;
    [bounds[0], mid, bounds[1]]
        .into_iter()
        .map(|v| Span::styled(format!("{v:.2}"), theme::muted()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{app_with, buffer_text, failing_app, today};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use stockcast_core::DashboardConfig;

    fn render(app: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    #[test]
    fn padded_bounds_handles_flat_and_empty() {
        assert_eq!(padded_bounds([2.0, 2.0]), [1.5, 2.5]);
        assert_eq!(padded_bounds(std::iter::empty()), [0.0, 1.0]);
        let [lo, hi] = padded_bounds([0.0, 10.0, f64::NAN]);
        assert!((lo + 0.5).abs() < 1e-12 && (hi - 10.5).abs() < 1e-12);
    }

    #[test]
    fn date_x_is_epoch_days() {
        assert_eq!(date_x(NaiveDate::from_ymd_opt(1970, 1, 2).unwrap()), 1.0);
    }

    #[test]
    fn before_first_pass_shows_loading() {
        let (app, _) = app_with(DashboardConfig::default());
        let text = render(&app);
        assert!(text.contains("Loading"));
        assert!(text.contains("Fetching NVDA"));
    }

    #[test]
    fn every_view_renders_after_a_pass() {
        let (mut app, _) = app_with(DashboardConfig::default());
        app.rerun_until(today());

        for view in [View::Prices, View::Forecast, View::Components] {
            app.view = view;
            let text = render(&app);
            assert!(text.contains(view.label()), "{view:?} title missing");
            assert!(text.contains("NVDA"));
        }
    }

    #[test]
    fn fault_replaces_the_view() {
        let mut app = failing_app();
        app.rerun_until(today());
        let text = render(&app);
        assert!(text.contains("offline"));
        assert!(!text.contains("Prices [1]"));
    }

    #[test]
    fn forecast_failure_leaves_prices_view_intact() {
        let mut config = DashboardConfig::default();
        config.model.interval_width = 1.5;
        let (mut app, _) = app_with(config);
        app.rerun_until(today());

        app.view = View::Prices;
        let text = render(&app);
        assert!(text.contains("Prices [1]"));
        assert!(text.contains("last 5 rows"));

        app.view = View::Forecast;
        let text = render(&app);
        assert!(text.contains("rerun failed"));
        assert!(!text.contains("Forecast [2]"));
    }

    #[test]
    fn help_overlay_lists_keys() {
        let (mut app, _) = app_with(DashboardConfig::default());
        app.overlay = Overlay::Help;
        let text = render(&app);
        assert!(text.contains("Keyboard"));
    }
}
