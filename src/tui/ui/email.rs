//! E-mail screen: send the latest estimate to an address.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::domain::i18n::{estimate_message, t, Phrase};
use crate::domain::{Language, PredictionRecord};
use crate::tui::styles::InsuranceTheme;

use super::history::{status_line, Status};

/// Longest address accepted by the input (RFC 5321 path limit).
const MAX_ADDRESS_LEN: usize = 254;

/// E-mail form state
#[derive(Debug, Clone, Default)]
pub struct EmailState {
    pub address: String,
    pub status: Option<Status>,
}

impl EmailState {
    /// Add a character to the address
    pub fn input_char(&mut self, c: char) {
        if !c.is_whitespace() && !c.is_control() && self.address.len() < MAX_ADDRESS_LEN {
            self.address.push(c);
            self.status = None;
        }
    }

    /// Delete the last character
    pub fn delete_char(&mut self) {
        self.address.pop();
    }
}

/// Render the e-mail screen
pub fn render_email(
    f: &mut Frame,
    area: Rect,
    state: &EmailState,
    latest: Option<&PredictionRecord>,
    lang: Language,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Estimate
            Constraint::Length(3), // Address
            Constraint::Min(0),
            Constraint::Length(3), // Footer/status
        ])
        .split(area);

    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", InsuranceTheme::text()),
        Span::styled(t(lang, Phrase::SendEmail), InsuranceTheme::title()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(InsuranceTheme::border()),
    );
    f.render_widget(header, chunks[0]);

    let estimate = match latest {
        Some(record) => Span::styled(
            estimate_message(lang, record.predicted_cost),
            InsuranceTheme::estimate(),
        ),
        None => Span::styled(t(lang, Phrase::HistoryEmpty), InsuranceTheme::text_muted()),
    };
    f.render_widget(Paragraph::new(Line::from(estimate)), chunks[1]);

    let input = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        Span::styled(state.address.as_str(), InsuranceTheme::text()),
        Span::styled("▌", InsuranceTheme::focused()),
    ]))
    .block(
        Block::default()
            .title(Span::styled(
                format!(" {} ", t(lang, Phrase::EmailAddress)),
                InsuranceTheme::focused(),
            ))
            .borders(Borders::ALL)
            .border_style(InsuranceTheme::border_focused()),
    );
    f.render_widget(input, chunks[2]);

    let footer = match &state.status {
        Some(status) => status_line(status),
        None => Line::from(vec![
            Span::styled("[Enter] ", InsuranceTheme::key_hint()),
            Span::styled(format!("{} ", t(lang, Phrase::SendEmail)), InsuranceTheme::key_desc()),
            Span::styled("[Esc] ", InsuranceTheme::key_hint()),
            Span::styled(t(lang, Phrase::Back), InsuranceTheme::key_desc()),
        ]),
    };
    f.render_widget(
        Paragraph::new(footer).wrap(Wrap { trim: true }).block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(InsuranceTheme::border()),
        ),
        chunks[4],
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_input_rejects_whitespace_and_caps_length() {
        let mut state = EmailState::default();
        for c in "a b@example.com".chars() {
            state.input_char(c);
        }
        assert_eq!(state.address, "ab@example.com");

        for _ in 0..400 {
            state.input_char('x');
        }
        assert_eq!(state.address.len(), MAX_ADDRESS_LEN);

        state.status = Some(Status::Failed("x".into()));
        state.delete_char();
        assert_eq!(state.address.len(), MAX_ADDRESS_LEN - 1);
    }
}
