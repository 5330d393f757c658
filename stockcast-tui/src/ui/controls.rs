//! Sidebar: ticker select box, lookback and horizon sliders, disclaimer.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use stockcast_core::inputs::{HorizonMonths, LookbackYears};

use crate::app::{AppState, Control};
use crate::theme;

const BAR_WIDTH: usize = 12;

const DISCLAIMER: &str = "This dashboard is a learning tool. Forecasts are model output, \
not advice; investment decisions are your own responsibility.";

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(7)])
        .split(area);

    render_controls(f, chunks[0], app);
    render_disclaimer(f, chunks[1]);
}

fn render_controls(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(false))
        .title(" Inputs ")
        .title_style(theme::panel_title(false));

    let sel = &app.selection;
    let mut lines: Vec<Line> = Vec::new();

    lines.push(label(app.focus == Control::Ticker, "Ticker"));
    lines.push(Line::from(vec![
        Span::styled("  ◂ ", theme::muted()),
        Span::styled(sel.ticker.clone(), theme::accent_bold()),
        Span::styled(" ▸", theme::muted()),
    ]));
    let options: Vec<Span> = app
        .tickers()
        .symbols()
        .iter()
        .map(|s| {
            let style = if *s == sel.ticker {
                theme::accent()
            } else {
                theme::secondary()
            };
            Span::styled(format!(" {s}"), style)
        })
        .collect();
    lines.push(Line::from(options));
    lines.push(Line::from(""));

    lines.push(label(app.focus == Control::Lookback, "Lookback (years)"));
    lines.push(slider(
        sel.lookback.get(),
        LookbackYears::MIN,
        LookbackYears::MAX,
        app.focus == Control::Lookback,
    ));
    lines.push(Line::from(Span::styled(
        format!("  ~{} days of history", sel.lookback.days()),
        theme::muted(),
    )));
    lines.push(Line::from(""));

    lines.push(label(app.focus == Control::Horizon, "Forecast (months)"));
    lines.push(slider(
        sel.horizon.get(),
        HorizonMonths::MIN,
        HorizonMonths::MAX,
        app.focus == Control::Horizon,
    ));
    lines.push(Line::from(Span::styled(
        format!("  {} days ahead", sel.horizon.days()),
        theme::muted(),
    )));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[j/k]focus [h/l]adjust",
        theme::muted(),
    )));

    let para = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(para, area);
}

fn render_disclaimer(f: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::warning())
        .title(" Disclaimer ")
        .title_style(theme::warning());
    let para = Paragraph::new(Span::styled(DISCLAIMER, theme::secondary()))
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(para, area);
}

fn label(active: bool, text: &str) -> Line<'static> {
    let style = if active {
        theme::accent().add_modifier(Modifier::REVERSED)
    } else {
        theme::text()
    };
    Line::from(Span::styled(text.to_string(), style))
}

fn slider(value: u32, min: u32, max: u32, active: bool) -> Line<'static> {
    let style = if active { theme::accent() } else { theme::muted() };
    Line::from(vec![
        Span::styled(format!("  {}", slider_bar(value, min, max, BAR_WIDTH)), style),
        Span::styled(format!(" {value}"), theme::text()),
    ])
}

/// `[====    ]` with the filled share proportional to `value` in `min..=max`.
pub fn slider_bar(value: u32, min: u32, max: u32, width: usize) -> String {
    let frac = if max > min {
        (value.clamp(min, max) - min) as f64 / (max - min) as f64
    } else {
        1.0
    };
    let filled = (frac * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);
    format!("[{}{}]", "=".repeat(filled), " ".repeat(empty))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slider_bar_fills_proportionally() {
        assert_eq!(slider_bar(1, 1, 5, 4), "[    ]");
        assert_eq!(slider_bar(3, 1, 5, 4), "[==  ]");
        assert_eq!(slider_bar(5, 1, 5, 4), "[====]");
        assert_eq!(slider_bar(9, 1, 5, 4), "[====]");
    }
}
