//! Prediction history table with export actions.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::domain::i18n::{t, Phrase};
use crate::domain::{HistoryLedger, Language, RECORD_HEADERS};
use crate::tui::styles::InsuranceTheme;

/// Outcome of the last export action.
#[derive(Debug, Clone, Default)]
pub struct HistoryState {
    pub status: Option<Status>,
}

/// One-line status message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Ok(String),
    Failed(String),
}

/// Render the history screen
pub fn render_history(
    f: &mut Frame,
    area: Rect,
    ledger: &HistoryLedger,
    state: &HistoryState,
    lang: Language,
    email_enabled: bool,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Table
            Constraint::Length(3), // Footer/status
        ])
        .split(area);

    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", InsuranceTheme::text()),
        Span::styled(t(lang, Phrase::HistoryTitle), InsuranceTheme::title()),
        Span::styled(
            format!(" │ {}", ledger.len()),
            InsuranceTheme::text_secondary(),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(InsuranceTheme::border()),
    );
    f.render_widget(header, chunks[0]);

    if ledger.is_empty() {
        let empty = Paragraph::new(Span::styled(
            t(lang, Phrase::HistoryEmpty),
            InsuranceTheme::text_muted(),
        ))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(InsuranceTheme::border()),
        );
        f.render_widget(empty, chunks[1]);
    } else {
        render_table(f, chunks[1], ledger);
    }

    render_history_footer(f, chunks[2], ledger, state, lang, email_enabled);
}

fn render_table(f: &mut Frame, area: Rect, ledger: &HistoryLedger) {
    let header = Row::new(RECORD_HEADERS.iter().map(|h| Cell::from(*h)))
        .style(InsuranceTheme::header());

    // Newest first so the latest estimate is always visible.
    let rows = ledger.records().iter().rev().enumerate().map(|(i, record)| {
        let style = if i % 2 == 1 {
            InsuranceTheme::row_alt()
        } else {
            InsuranceTheme::text()
        };
        Row::new(record.display_cells().map(Cell::from)).style(style)
    });

    let widths = [
        Constraint::Length(5),
        Constraint::Length(10),
        Constraint::Length(7),
        Constraint::Length(9),
        Constraint::Length(7),
        Constraint::Length(10),
        Constraint::Length(18),
        Constraint::Min(12),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(InsuranceTheme::border_focused()),
    );
    f.render_widget(table, area);
}

/// Footer key hints as `(key, description)` pairs.
///
/// Export actions are only offered once the ledger has records.
#[must_use]
pub fn key_hints(
    ledger_empty: bool,
    email_enabled: bool,
    lang: Language,
) -> Vec<(&'static str, &'static str)> {
    let mut hints = Vec::new();
    if !ledger_empty {
        hints.push(("C", t(lang, Phrase::DownloadCsv)));
        hints.push(("W", t(lang, Phrase::PreviewHtml)));
        if email_enabled {
            hints.push(("E", t(lang, Phrase::SendEmail)));
        }
    }
    hints.push(("Esc", t(lang, Phrase::Back)));
    hints
}

fn render_history_footer(
    f: &mut Frame,
    area: Rect,
    ledger: &HistoryLedger,
    state: &HistoryState,
    lang: Language,
    email_enabled: bool,
) {
    let mut lines = vec![Line::from(
        key_hints(ledger.is_empty(), email_enabled, lang)
            .into_iter()
            .flat_map(|(key, desc)| {
                [
                    Span::styled(format!("[{key}] "), InsuranceTheme::key_hint()),
                    Span::styled(format!("{desc} "), InsuranceTheme::key_desc()),
                ]
            })
            .collect::<Vec<_>>(),
    )];
    if let Some(status) = &state.status {
        lines.push(status_line(status));
    }

    let footer = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(InsuranceTheme::border()),
    );
    f.render_widget(footer, area);
}

/// A styled one-line rendering of `status`.
pub fn status_line(status: &Status) -> Line<'static> {
    match status {
        Status::Ok(msg) => Line::from(Span::styled(msg.clone(), InsuranceTheme::success())),
        Status::Failed(msg) => Line::from(vec![
            Span::styled("! ", InsuranceTheme::danger()),
            Span::styled(msg.clone(), InsuranceTheme::danger()),
        ]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_hints_only_for_non_empty_history() {
        assert_eq!(
            key_hints(true, true, Language::English),
            vec![("Esc", "Back")]
        );

        let keys: Vec<_> = key_hints(false, true, Language::English)
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        assert_eq!(keys, vec!["C", "W", "E", "Esc"]);
        assert!(!key_hints(false, false, Language::English)
            .iter()
            .any(|(key, _)| *key == "E"));
    }

    #[test]
    fn test_hints_are_localized() {
        let english = key_hints(false, true, Language::English);
        let german = key_hints(false, true, Language::Deutsch);
        for ((_, en), (_, de)) in english.iter().zip(&german) {
            assert_ne!(en, de);
        }
        assert_eq!(german.last(), Some(&("Esc", "Zurück")));
    }
}
