//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Service integration
//!
//! Every interaction runs one synchronous encode, predict, append and
//! render pass; there is no background work.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::adapters::{JsonEstimator, SmtpMailer, SmtpSettings};
use crate::application::{MailService, PredictionService, Session, SessionSummary};
use crate::config::AppConfig;
use crate::domain::i18n::{estimate_message, t, Phrase};

use super::ui::{
    email::{render_email, EmailState},
    form::{render_form, Field, FormState},
    history::{render_history, HistoryState, Status},
    render_disclaimer,
};

/// File names written by the export actions.
pub const CSV_EXPORT_FILE: &str = "prediction_history.csv";
pub const HTML_EXPORT_FILE: &str = "prediction_history.html";

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Form,
    History,
    Email,
}

/// Main application state
pub struct App {
    /// Current screen
    screen: Screen,

    /// Whether the app should quit
    should_quit: bool,

    config: AppConfig,

    /// Language, model selection and history
    session: Session,

    prediction_service: PredictionService<JsonEstimator>,

    /// Present when e-mail is enabled and the transport could be set up
    mail_service: Option<MailService<SmtpMailer>>,

    /// Why mail is unavailable although enabled
    mail_error: Option<String>,

    form_state: FormState,
    history_state: HistoryState,
    email_state: EmailState,
}

impl App {
    /// Create a new application instance from configuration.
    ///
    /// Model loading failures are fatal. A mail transport that cannot be
    /// configured only disables sending.
    ///
    /// # Errors
    /// Returns error if the model directory is missing or a model fails to load.
    pub fn new(config: AppConfig) -> Result<Self> {
        if !config.model_dir.exists() {
            return Err(anyhow!(
                "Model path not found at {:?}. Set PREMIUMCAST_MODEL_PATH to a directory containing {}.",
                config.model_dir,
                config
                    .required_models()
                    .iter()
                    .map(|m| m.artifact_file())
                    .collect::<Vec<_>>()
                    .join(" and ")
            ));
        }

        let prediction_service = PredictionService::load(&config)
            .map_err(|e| anyhow!("Failed to load models from {:?}: {}", config.model_dir, e))?;

        let (mail_service, mail_error) = if config.email_enabled {
            match SmtpSettings::from_env().and_then(|s| SmtpMailer::new(&s)) {
                Ok(mailer) => (Some(MailService::new(Arc::new(mailer))), None),
                Err(e) => {
                    tracing::warn!("E-mail disabled: {}", e);
                    (None, Some(e.to_string()))
                }
            }
        } else {
            (None, None)
        };

        Ok(Self::with_dependencies(
            config,
            prediction_service,
            mail_service,
            mail_error,
        ))
    }

    /// Create application with injected dependencies (Composition Root pattern).
    pub fn with_dependencies(
        config: AppConfig,
        prediction_service: PredictionService<JsonEstimator>,
        mail_service: Option<MailService<SmtpMailer>>,
        mail_error: Option<String>,
    ) -> Self {
        let session = Session::new(&config);
        let form_state = FormState::new(
            config.bmi_input_mode,
            session.model_choice(),
            session.model_variant(),
        );
        Self {
            screen: Screen::Form,
            should_quit: false,
            config,
            session,
            prediction_service,
            mail_service,
            mail_error,
            form_state,
            history_state: HistoryState::default(),
            email_state: EmailState::default(),
        }
    }

    /// Run the main application loop, then end the session.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(mut self) -> Result<SessionSummary> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result?;
        Ok(self.session.end())
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(2)])
                    .split(f.area());

                let lang = self.session.language();
                match self.screen {
                    Screen::Form => render_form(f, chunks[0], &self.form_state, lang),
                    Screen::History => render_history(
                        f,
                        chunks[0],
                        self.session.ledger(),
                        &self.history_state,
                        lang,
                        self.config.email_enabled,
                    ),
                    Screen::Email => render_email(
                        f,
                        chunks[0],
                        &self.email_state,
                        self.session.ledger().last(),
                        lang,
                    ),
                }

                render_disclaimer(f, chunks[1], lang);
            })?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Form => self.handle_form_key(key),
            Screen::History => self.handle_history_key(key),
            Screen::Email => self.handle_email_key(key),
        }
    }

    fn handle_form_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up | KeyCode::BackTab => self.form_state.prev_field(),
            KeyCode::Down | KeyCode::Tab => self.form_state.next_field(),
            KeyCode::Left | KeyCode::Right => {
                self.form_state.adjust(key == KeyCode::Right);
                if self.form_state.current_field() == Field::Model {
                    self.sync_model();
                }
            }
            KeyCode::Char('m') | KeyCode::Char('M') if self.session.model_choice() => {
                self.form_state.model = self.form_state.model.toggled();
                self.sync_model();
            }
            KeyCode::Enter => self.submit_form(),
            KeyCode::Char('l') | KeyCode::Char('L') => self.toggle_language(),
            KeyCode::Char('h') | KeyCode::Char('H') => {
                self.history_state = HistoryState::default();
                self.screen = Screen::History;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_history_key(&mut self, key: KeyCode) {
        // A status line only describes the action that produced it.
        self.history_state.status = None;
        match key {
            KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('H') => self.screen = Screen::Form,
            KeyCode::Char('l') | KeyCode::Char('L') => self.toggle_language(),
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            // Export controls only exist once there is something to export.
            _ if self.session.ledger().is_empty() => {}
            KeyCode::Char('c') | KeyCode::Char('C') => self.export_csv(),
            KeyCode::Char('w') | KeyCode::Char('W') => self.export_html(),
            KeyCode::Char('e') | KeyCode::Char('E') if self.config.email_enabled => {
                self.email_state.status = self.mail_error.clone().map(|e| {
                    Status::Failed(format!(
                        "{}: {}",
                        t(self.session.language(), Phrase::EmailFailed),
                        e
                    ))
                });
                self.screen = Screen::Email;
            }
            _ => {}
        }
    }

    fn handle_email_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.screen = Screen::History,
            KeyCode::Enter => self.send_email(),
            KeyCode::Backspace => self.email_state.delete_char(),
            KeyCode::Char(c) => self.email_state.input_char(c),
            _ => {}
        }
    }

    fn toggle_language(&mut self) {
        let lang = self.session.toggle_language();
        // The banner is re-rendered in the new language; records keep theirs.
        if let Some(record) = self.session.ledger().last() {
            if self.form_state.banner.is_some() {
                self.form_state.banner = Some(estimate_message(lang, record.predicted_cost));
            }
        }
    }

    fn sync_model(&mut self) {
        if let Err(e) = self.session.set_model_variant(self.form_state.model) {
            self.form_state.model = self.session.model_variant();
            self.form_state.error_message = Some(e.to_string());
        }
    }

    fn submit_form(&mut self) {
        let input = self.form_state.to_input();
        if let Err(errors) = input.validate() {
            self.form_state.error_message = Some(errors.join(", "));
            return;
        }

        match self.prediction_service.predict(&mut self.session, &input) {
            Ok(record) => {
                self.form_state.banner = Some(estimate_message(
                    self.session.language(),
                    record.predicted_cost,
                ));
                self.form_state.error_message = None;
            }
            Err(e) => {
                tracing::error!("Prediction failed: {}", e);
                self.form_state.banner = None;
                self.form_state.error_message = Some(e.to_string());
            }
        }
    }

    fn export_path(&self, file: &str) -> crate::Result<PathBuf> {
        std::fs::create_dir_all(&self.config.export_dir)?;
        Ok(self.config.export_dir.join(file))
    }

    fn write_csv_export(&self) -> crate::Result<PathBuf> {
        let path = self.export_path(CSV_EXPORT_FILE)?;
        self.session.ledger().write_csv(&path)?;
        Ok(path)
    }

    fn write_html_export(&self) -> crate::Result<PathBuf> {
        let path = self.export_path(HTML_EXPORT_FILE)?;
        let title = t(self.session.language(), Phrase::HistoryTitle);
        self.session.ledger().write_html(&path, title)?;
        Ok(path)
    }

    fn export_csv(&mut self) {
        let result = self.write_csv_export();
        self.history_state.status = Some(self.export_status(result));
    }

    fn export_html(&mut self) {
        let result = self.write_html_export();
        self.history_state.status = Some(self.export_status(result));
    }

    fn export_status(&self, result: crate::Result<PathBuf>) -> Status {
        match result {
            Ok(path) => Status::Ok(format!(
                "{} {}",
                t(self.session.language(), Phrase::Saved),
                path.display()
            )),
            Err(e) => {
                tracing::error!("Export failed: {}", e);
                Status::Failed(e.to_string())
            }
        }
    }

    fn send_email(&mut self) {
        let lang = self.session.language();
        let Some(service) = &self.mail_service else {
            let reason = self
                .mail_error
                .clone()
                .unwrap_or_else(|| t(lang, Phrase::MailNotConfigured).to_string());
            self.email_state.status = Some(Status::Failed(format!(
                "{}: {}",
                t(lang, Phrase::EmailFailed),
                reason
            )));
            return;
        };

        self.email_state.status = Some(
            match service.send_latest(&self.session, &self.email_state.address) {
                Ok(()) => Status::Ok(t(lang, Phrase::EmailSent).to_string()),
                Err(e) => {
                    tracing::error!("Sending estimate failed: {}", e);
                    Status::Failed(format!("{}: {}", t(lang, Phrase::EmailFailed), e))
                }
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Language, ModelVariant};
    use tempfile::tempdir;

    fn test_app(config: AppConfig) -> App {
        let predictions = PredictionService::load(&config).expect("bundled models load");
        App::with_dependencies(config, predictions, None, None)
    }

    fn press(app: &mut App, key: KeyCode) {
        app.handle_key(key, KeyModifiers::NONE);
    }

    #[test]
    fn test_enter_predicts_and_shows_banner() {
        let mut app = test_app(AppConfig::default());
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.session.ledger().len(), 1);
        let banner = app.form_state.banner.clone().expect("banner");
        assert!(banner.starts_with("Estimated Annual Insurance Cost: €"));

        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.session.language(), Language::Deutsch);
        assert!(app
            .form_state
            .banner
            .as_deref()
            .expect("banner")
            .starts_with("Geschätzte"));
    }

    #[test]
    fn test_history_exports_only_when_non_empty() {
        let dir = tempdir().expect("tempdir");
        let config = AppConfig {
            export_dir: dir.path().join("exports"),
            ..AppConfig::default()
        };
        let mut app = test_app(config);

        press(&mut app, KeyCode::Char('h'));
        assert_eq!(app.screen, Screen::History);
        press(&mut app, KeyCode::Char('c'));
        assert!(app.history_state.status.is_none());

        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('h'));
        press(&mut app, KeyCode::Char('c'));
        assert!(matches!(app.history_state.status, Some(Status::Ok(_))));
        press(&mut app, KeyCode::Char('w'));

        let csv = std::fs::read_to_string(dir.path().join("exports").join(CSV_EXPORT_FILE))
            .expect("csv written");
        assert!(csv.starts_with("Age,Sex,BMI,Children,Smoker,Region,Model,Predicted Cost (€)"));
        assert_eq!(csv.lines().count(), 2);
        assert!(dir.path().join("exports").join(HTML_EXPORT_FILE).is_file());
    }

    #[test]
    fn test_export_status_clears_on_next_key() {
        let dir = tempdir().expect("tempdir");
        let mut app = test_app(AppConfig {
            export_dir: dir.path().to_path_buf(),
            ..AppConfig::default()
        });
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('h'));
        press(&mut app, KeyCode::Char('w'));
        assert!(matches!(app.history_state.status, Some(Status::Ok(_))));

        press(&mut app, KeyCode::Char('x'));
        assert!(app.history_state.status.is_none());
    }

    #[test]
    fn test_export_failure_is_reported() {
        let dir = tempdir().expect("tempdir");
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file").expect("write");
        let mut app = test_app(AppConfig {
            export_dir: blocker,
            ..AppConfig::default()
        });
        press(&mut app, KeyCode::Enter);

        assert!(matches!(
            app.write_csv_export(),
            Err(crate::PremiumcastError::Io(_))
        ));
        press(&mut app, KeyCode::Char('h'));
        press(&mut app, KeyCode::Char('c'));
        assert!(matches!(app.history_state.status, Some(Status::Failed(_))));
    }

    #[test]
    fn test_unwritable_export_file_is_a_history_error() {
        let dir = tempdir().expect("tempdir");
        std::fs::create_dir(dir.path().join(HTML_EXPORT_FILE)).expect("mkdir");
        let mut app = test_app(AppConfig {
            export_dir: dir.path().to_path_buf(),
            ..AppConfig::default()
        });
        press(&mut app, KeyCode::Enter);

        assert!(matches!(
            app.write_html_export(),
            Err(crate::PremiumcastError::Ledger(_))
        ));
    }

    #[test]
    fn test_email_failure_message_is_localized() {
        let mut app = test_app(AppConfig {
            email_enabled: true,
            language: Language::Deutsch,
            ..AppConfig::default()
        });
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('h'));
        press(&mut app, KeyCode::Char('e'));
        press(&mut app, KeyCode::Enter);

        let Some(Status::Failed(msg)) = &app.email_state.status else {
            panic!("expected failure status");
        };
        assert!(msg.contains(t(Language::Deutsch, Phrase::MailNotConfigured)));
    }

    #[test]
    fn test_model_key_switches_only_with_choice() {
        let mut fixed = test_app(AppConfig::default());
        press(&mut fixed, KeyCode::Char('m'));
        assert_eq!(fixed.session.model_variant(), ModelVariant::RandomForest);

        let mut dual = test_app(AppConfig {
            model_choice: true,
            ..AppConfig::default()
        });
        press(&mut dual, KeyCode::Char('m'));
        assert_eq!(dual.session.model_variant(), ModelVariant::LinearRegression);
        press(&mut dual, KeyCode::Enter);
        assert_eq!(
            dual.session.ledger().last().map(|r| r.model),
            Some(ModelVariant::LinearRegression)
        );
    }

    #[test]
    fn test_email_without_transport_reports_failure() {
        let mut app = test_app(AppConfig {
            email_enabled: true,
            ..AppConfig::default()
        });
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('h'));
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.screen, Screen::Email);

        for c in "me@example.com".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.email_state.status, Some(Status::Failed(_))));
        assert_eq!(app.session.ledger().len(), 1);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = test_app(AppConfig::default());
        app.handle_key(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit);

        let mut app = test_app(AppConfig::default());
        press(&mut app, KeyCode::Char('Q'));
        assert!(app.should_quit);
    }
}
