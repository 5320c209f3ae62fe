//! UI module: View components for the TUI.

pub mod email;
pub mod form;
pub mod history;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::domain::i18n::{t, Phrase};
use crate::domain::Language;
use crate::tui::styles::InsuranceTheme;

pub fn render_disclaimer(f: &mut Frame, area: Rect, lang: Language) {
    let text = vec![Line::from(vec![Span::styled(
        t(lang, Phrase::Disclaimer),
        InsuranceTheme::text_muted(),
    )])];

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(InsuranceTheme::border());

    let p = Paragraph::new(text).block(block).wrap(Wrap { trim: true });

    f.render_widget(p, area);
}
