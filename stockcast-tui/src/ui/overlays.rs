//! Help overlay and the fault panel shown when a rerun fails.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::theme;
use crate::ui::centered_rect;

pub fn render_help(f: &mut Frame, area: Rect) {
    let popup = centered_rect(60, 70, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::accent())
        .title(" Keyboard [Esc]close ")
        .title_style(theme::accent_bold());

    let mut lines: Vec<Line> = Vec::new();

    section(&mut lines, "Views");
    key(&mut lines, "1 / 2 / 3", "Prices / Forecast / Components");
    key(&mut lines, "Tab / Shift+Tab", "Cycle views forward / back");
    lines.push(Line::from(""));

    section(&mut lines, "Inputs");
    key(&mut lines, "j / k", "Move focus down / up");
    key(&mut lines, "h / l", "Previous / next ticker, or slider down / up");
    key(&mut lines, "r", "Clear cached prices and refetch");
    lines.push(Line::from(""));

    section(&mut lines, "General");
    key(&mut lines, "?", "Toggle this help");
    key(&mut lines, "q", "Quit");
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Every change reruns the forecast; prices are fetched once per ticker.",
        theme::neutral(),
    )));

    let para = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    f.render_widget(para, popup);
}

/// Replaces the active view for a pass that failed.
pub fn render_fault(f: &mut Frame, area: Rect, ticker: &str, message: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::negative())
        .title(format!(" {ticker}: rerun failed "))
        .title_style(theme::negative());

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), theme::negative())),
        Line::from(""),
        Line::from(Span::styled(
            "Change an input to try again, or press r to refetch.",
            theme::muted(),
        )),
    ];

    let para = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    f.render_widget(para, area);
}

fn section(lines: &mut Vec<Line<'static>>, title: &str) {
    lines.push(Line::from(Span::styled(title.to_string(), theme::accent_bold())));
}

fn key(lines: &mut Vec<Line<'static>>, keys: &str, desc: &str) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {keys:>16}  "), theme::accent()),
        Span::styled(desc.to_string(), theme::muted()),
    ]));
}
