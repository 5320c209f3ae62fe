//! Applicant input form.
//!
//! Every field is adjusted with ←/→ and clamped to its range, so the form
//! can only ever produce a valid `PredictionInput`.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::config::BmiInputMode;
use crate::domain::i18n::{t, Phrase};
use crate::domain::{
    bmi_from_metrics, smoker, BmiInput, Language, ModelVariant, PredictionInput, Region, Sex,
    AGE_RANGE, BMI_RANGE, CHILDREN_RANGE, HEIGHT_CM_RANGE, WEIGHT_KG_RANGE,
};
use crate::tui::styles::InsuranceTheme;

/// One adjustable form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Age,
    Sex,
    Bmi,
    Height,
    Weight,
    Children,
    Smoker,
    Region,
    Model,
}

impl Field {
    fn label(self, lang: Language) -> &'static str {
        let phrase = match self {
            Self::Age => Phrase::Age,
            Self::Sex => Phrase::Sex,
            Self::Bmi => Phrase::Bmi,
            Self::Height => Phrase::Height,
            Self::Weight => Phrase::Weight,
            Self::Children => Phrase::Children,
            Self::Smoker => Phrase::Smoker,
            Self::Region => Phrase::Region,
            Self::Model => Phrase::Model,
        };
        t(lang, phrase)
    }
}

/// Form state
#[derive(Debug, Clone)]
pub struct FormState {
    pub age: u8,
    pub sex: Sex,
    /// BMI in tenths, so stepping never drifts
    bmi_tenths: u16,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub children: u8,
    pub smoker: bool,
    pub region: Region,
    pub model: ModelVariant,
    bmi_mode: BmiInputMode,
    model_choice: bool,
    pub selected_field: usize,
    /// Localized result message of the last prediction
    pub banner: Option<String>,
    pub error_message: Option<String>,
}

impl FormState {
    /// A form with the default applicant values.
    #[must_use]
    pub fn new(bmi_mode: BmiInputMode, model_choice: bool, model: ModelVariant) -> Self {
        Self {
            age: 30,
            sex: Sex::Male,
            bmi_tenths: 250,
            height_cm: 170.0,
            weight_kg: 70.0,
            children: 0,
            smoker: true,
            region: Region::Northeast,
            model,
            bmi_mode,
            model_choice,
            selected_field: 0,
            banner: None,
            error_message: None,
        }
    }

    /// Visible fields in display order.
    #[must_use]
    pub fn fields(&self) -> Vec<Field> {
        let mut fields = vec![Field::Age, Field::Sex];
        match self.bmi_mode {
            BmiInputMode::Direct => fields.push(Field::Bmi),
            BmiInputMode::Derived => fields.extend([Field::Height, Field::Weight]),
        }
        fields.extend([Field::Children, Field::Smoker, Field::Region]);
        if self.model_choice {
            fields.push(Field::Model);
        }
        fields
    }

    #[must_use]
    pub fn current_field(&self) -> Field {
        let fields = self.fields();
        fields[self.selected_field.min(fields.len() - 1)]
    }

    #[must_use]
    pub fn bmi(&self) -> f64 {
        f64::from(self.bmi_tenths) / 10.0
    }

    /// Move to the next field
    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % self.fields().len();
    }

    /// Move to the previous field
    pub fn prev_field(&mut self) {
        if self.selected_field == 0 {
            self.selected_field = self.fields().len() - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    /// Step the selected field up (`forward`) or down, clamped to its range.
    pub fn adjust(&mut self, forward: bool) {
        let step: i32 = if forward { 1 } else { -1 };
        match self.current_field() {
            Field::Age => {
                self.age = step_int(self.age.into(), step, AGE_RANGE.0.into(), AGE_RANGE.1.into())
                    as u8;
            }
            Field::Sex => self.sex = self.sex.toggled(),
            Field::Bmi => {
                let lo = (BMI_RANGE.0 * 10.0) as i32;
                let hi = (BMI_RANGE.1 * 10.0) as i32;
                self.bmi_tenths = step_int(self.bmi_tenths.into(), step, lo, hi) as u16;
            }
            Field::Height => {
                self.height_cm = (self.height_cm + f64::from(step))
                    .clamp(HEIGHT_CM_RANGE.0, HEIGHT_CM_RANGE.1);
            }
            Field::Weight => {
                self.weight_kg = (self.weight_kg + 0.5 * f64::from(step))
                    .clamp(WEIGHT_KG_RANGE.0, WEIGHT_KG_RANGE.1);
            }
            Field::Children => {
                self.children = step_int(
                    self.children.into(),
                    step,
                    CHILDREN_RANGE.0.into(),
                    CHILDREN_RANGE.1.into(),
                ) as u8;
            }
            Field::Smoker => self.smoker = !self.smoker,
            Field::Region => {
                self.region = if forward {
                    self.region.next()
                } else {
                    self.region.prev()
                };
            }
            Field::Model => self.model = self.model.toggled(),
        }
        self.error_message = None;
    }

    /// Snapshot the form as a prediction input.
    #[must_use]
    pub fn to_input(&self) -> PredictionInput {
        let bmi = match self.bmi_mode {
            BmiInputMode::Direct => BmiInput::Direct(self.bmi()),
            BmiInputMode::Derived => BmiInput::Derived {
                height_cm: self.height_cm,
                weight_kg: self.weight_kg,
            },
        };
        PredictionInput {
            age: self.age,
            sex: self.sex,
            bmi,
            children: self.children,
            smoker: self.smoker,
            region: self.region,
        }
    }

    fn display_value(&self, field: Field, lang: Language) -> String {
        match field {
            Field::Age => self.age.to_string(),
            Field::Sex => self.sex.display(lang).to_string(),
            Field::Bmi => format!("{:.1}", self.bmi()),
            Field::Height => format!("{:.0}", self.height_cm),
            Field::Weight => format!(
                "{:.1}  (BMI {:.1})",
                self.weight_kg,
                bmi_from_metrics(self.height_cm, self.weight_kg)
            ),
            Field::Children => self.children.to_string(),
            Field::Smoker => smoker::display(self.smoker, lang).to_string(),
            Field::Region => self.region.to_string(),
            Field::Model => self.model.to_string(),
        }
    }
}

fn step_int(value: i32, step: i32, lo: i32, hi: i32) -> i32 {
    (value + step).clamp(lo, hi)
}

/// Footer key hints as `(key, description)` pairs.
#[must_use]
pub fn key_hints(state: &FormState, lang: Language) -> Vec<(&'static str, String)> {
    let mut hints = vec![
        ("↑↓", t(lang, Phrase::FieldHint).to_string()),
        ("←→", t(lang, Phrase::AdjustHint).to_string()),
        ("Enter", t(lang, Phrase::Predict).to_string()),
    ];
    if state.model_choice {
        hints.push(("M", t(lang, Phrase::SwitchModel).to_string()));
    }
    hints.extend([
        ("H", t(lang, Phrase::HistoryTitle).to_string()),
        ("L", lang.toggled().to_string()),
        ("Q", t(lang, Phrase::Quit).to_string()),
    ]);
    hints
}

/// Render the applicant form
pub fn render_form(f: &mut Frame, area: Rect, state: &FormState, lang: Language) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header
            Constraint::Min(0),    // Fields
            Constraint::Length(3), // Result banner
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_form_header(f, chunks[0], lang);
    render_form_fields(f, chunks[1], state, lang);
    render_banner(f, chunks[2], state);
    render_form_footer(f, chunks[3], state, lang);
}

fn render_form_header(f: &mut Frame, area: Rect, lang: Language) {
    let header = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(" ", InsuranceTheme::text()),
            Span::styled(t(lang, Phrase::Title), InsuranceTheme::title()),
            Span::styled(
                format!(" │ {}", t(lang, Phrase::Welcome)),
                InsuranceTheme::text_secondary(),
            ),
        ]),
        Line::from(Span::styled(
            format!(" {}", t(lang, Phrase::Intro)),
            InsuranceTheme::text_muted(),
        )),
    ])
    .wrap(Wrap { trim: false })
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(InsuranceTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &FormState, lang: Language) {
    let fields = state.fields();
    let constraints: Vec<Constraint> = fields
        .iter()
        .map(|_| Constraint::Length(3))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .horizontal_margin(2)
        .split(area);

    for (i, field) in fields.iter().enumerate() {
        let is_selected = i == state.selected_field;
        let (border_style, title_style) = if is_selected {
            (InsuranceTheme::border_focused(), InsuranceTheme::focused())
        } else {
            (InsuranceTheme::border(), InsuranceTheme::text_secondary())
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", field.label(lang)), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let value = state.display_value(*field, lang);
        let line = if is_selected {
            Line::from(vec![
                Span::styled(" ◀ ", InsuranceTheme::key_hint()),
                Span::styled(value, InsuranceTheme::text()),
                Span::styled(" ▶", InsuranceTheme::key_hint()),
            ])
        } else {
            Line::from(vec![Span::raw("   "), Span::styled(value, InsuranceTheme::text())])
        };

        f.render_widget(Paragraph::new(line).block(block), chunks[i]);
    }
}

fn render_banner(f: &mut Frame, area: Rect, state: &FormState) {
    let Some(banner) = &state.banner else {
        return;
    };
    let p = Paragraph::new(Line::from(Span::styled(
        banner.as_str(),
        InsuranceTheme::estimate(),
    )))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(InsuranceTheme::border_focused()),
    );
    f.render_widget(p, area);
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &FormState, lang: Language) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", InsuranceTheme::danger()),
            Span::styled(err.clone(), InsuranceTheme::danger()),
        ])
    } else {
        Line::from(
            key_hints(state, lang)
                .into_iter()
                .flat_map(|(key, desc)| {
                    [
                        Span::styled(format!("[{key}] "), InsuranceTheme::key_hint()),
                        Span::styled(format!("{desc} "), InsuranceTheme::key_desc()),
                    ]
                })
                .collect::<Vec<_>>(),
        )
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(InsuranceTheme::border()),
    );

    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FeatureVector;

    fn select(state: &mut FormState, field: Field) {
        state.selected_field = state
            .fields()
            .iter()
            .position(|f| *f == field)
            .expect("field visible");
    }

    #[test]
    fn test_defaults_match_default_input() {
        let state = FormState::new(BmiInputMode::Direct, false, ModelVariant::RandomForest);
        assert_eq!(state.to_input(), PredictionInput::default());
    }

    #[test]
    fn test_age_clamps_at_bounds() {
        let mut state = FormState::new(BmiInputMode::Direct, false, ModelVariant::RandomForest);
        select(&mut state, Field::Age);
        for _ in 0..100 {
            state.adjust(true);
        }
        assert_eq!(state.age, 64);
        for _ in 0..100 {
            state.adjust(false);
        }
        assert_eq!(state.age, 18);
    }

    #[test]
    fn test_bmi_steps_by_tenths_without_drift() {
        let mut state = FormState::new(BmiInputMode::Direct, false, ModelVariant::RandomForest);
        select(&mut state, Field::Bmi);
        for _ in 0..3 {
            state.adjust(true);
        }
        assert_eq!(state.bmi(), 25.3);
        for _ in 0..1000 {
            state.adjust(false);
        }
        assert_eq!(state.bmi(), 15.0);
    }

    #[test]
    fn test_children_and_region_cycle() {
        let mut state = FormState::new(BmiInputMode::Direct, false, ModelVariant::RandomForest);
        select(&mut state, Field::Children);
        state.adjust(false);
        assert_eq!(state.children, 0);

        select(&mut state, Field::Region);
        state.adjust(false);
        assert_eq!(state.region, Region::Southwest);
        state.adjust(true);
        assert_eq!(state.region, Region::Northeast);
    }

    #[test]
    fn test_derived_mode_fields_and_input() {
        let mut state = FormState::new(BmiInputMode::Derived, true, ModelVariant::RandomForest);
        let fields = state.fields();
        assert!(fields.contains(&Field::Height));
        assert!(!fields.contains(&Field::Bmi));
        assert_eq!(fields.last(), Some(&Field::Model));

        select(&mut state, Field::Weight);
        state.adjust(true);
        let input = state.to_input();
        assert_eq!(
            input.bmi,
            BmiInput::Derived {
                height_cm: 170.0,
                weight_kg: 70.5
            }
        );
        let encoded = FeatureVector::encode(&input);
        assert!((encoded[2] - 70.5 / (1.7 * 1.7)).abs() < 1e-9);
    }

    #[test]
    fn test_footer_hints_follow_language_and_model_choice() {
        let fixed = FormState::new(BmiInputMode::Direct, false, ModelVariant::RandomForest);
        let english = key_hints(&fixed, Language::English);
        let german = key_hints(&fixed, Language::Deutsch);

        assert!(!english.iter().any(|(key, _)| *key == "M"));
        assert_eq!(english.len(), german.len());
        for ((key_en, desc_en), (key_de, desc_de)) in english.iter().zip(&german) {
            assert_eq!(key_en, key_de);
            assert_ne!(desc_en, desc_de, "[{key_en}]");
        }

        let dual = FormState::new(BmiInputMode::Direct, true, ModelVariant::RandomForest);
        assert!(key_hints(&dual, Language::English)
            .iter()
            .any(|(key, desc)| *key == "M" && desc == "Switch model"));
    }

    #[test]
    fn test_navigation_wraps() {
        let mut state = FormState::new(BmiInputMode::Direct, false, ModelVariant::RandomForest);
        state.prev_field();
        assert_eq!(state.current_field(), Field::Region);
        state.next_field();
        assert_eq!(state.current_field(), Field::Age);
    }
}
