//! Bottom status bar: view hints, loading state, last status message.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{AppState, LoadState, StatusLevel};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let mut spans: Vec<Span> = Vec::new();

    spans.push(Span::styled(
        " 1:Prices 2:Forecast 3:Components ?:Help q:Quit",
        theme::muted(),
    ));
    spans.push(Span::raw(" | "));

    match app.load_state {
        LoadState::Fetching => spans.push(Span::styled("fetching… ", theme::warning())),
        LoadState::Fetched => spans.push(Span::styled("fetched ", theme::positive())),
        LoadState::Idle => {}
    }

    if let Some((msg, level)) = &app.status_message {
        let style = match level {
            StatusLevel::Info => theme::accent(),
            StatusLevel::Error => theme::negative(),
        };
        spans.push(Span::styled(msg.as_str(), style));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
