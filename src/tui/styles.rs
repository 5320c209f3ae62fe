//! Insurance-themed color palette and styles.
//!
//! Navy and ocean blue on a dark background, with high-contrast text.

use ratatui::style::{Color, Modifier, Style};

/// Insurance theme color palette.
pub struct InsuranceTheme;

impl InsuranceTheme {
    // === Primary Colors ===

    /// Navy - Primary color
    pub const PRIMARY: Color = Color::Rgb(0, 53, 102); // #003566

    /// Ocean blue for highlights
    pub const PRIMARY_LIGHT: Color = Color::Rgb(0, 119, 182); // #0077B6

    /// Sky blue for focus accents
    pub const ACCENT: Color = Color::Rgb(72, 202, 228); // #48CAE4

    // === Secondary Colors ===

    /// Light slate for borders
    pub const SECONDARY_LIGHT: Color = Color::Rgb(148, 163, 184); // #94A3B8

    // === Semantic Colors ===

    pub const SUCCESS: Color = Color::Rgb(16, 185, 129); // #10B981

    pub const DANGER: Color = Color::Rgb(244, 63, 94); // #F43F5E

    /// Gold - the estimate banner
    pub const HIGHLIGHT: Color = Color::Rgb(255, 195, 0); // #FFC300

    // === Background Colors ===

    pub const BG_DARK: Color = Color::Rgb(0, 29, 61); // #001D3D

    // === Text Colors ===

    pub const TEXT_PRIMARY: Color = Color::Rgb(248, 250, 252); // #F8FAFC

    pub const TEXT_SECONDARY: Color = Color::Rgb(148, 163, 184); // #94A3B8

    pub const TEXT_MUTED: Color = Color::Rgb(100, 116, 139); // #64748B

    // === Preset Styles ===

    /// Style for titles
    #[must_use]
    pub fn title() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn text() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY)
    }

    #[must_use]
    pub fn text_secondary() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    #[must_use]
    pub fn text_muted() -> Style {
        Style::default().fg(Self::TEXT_MUTED)
    }

    #[must_use]
    pub fn success() -> Style {
        Style::default().fg(Self::SUCCESS)
    }

    #[must_use]
    pub fn danger() -> Style {
        Style::default().fg(Self::DANGER)
    }

    /// Style for the estimated cost banner
    #[must_use]
    pub fn estimate() -> Style {
        Style::default()
            .fg(Self::HIGHLIGHT)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for focused elements
    #[must_use]
    pub fn focused() -> Style {
        Style::default()
            .fg(Self::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn border() -> Style {
        Style::default().fg(Self::SECONDARY_LIGHT)
    }

    #[must_use]
    pub fn border_focused() -> Style {
        Style::default().fg(Self::PRIMARY_LIGHT)
    }

    /// Style for table headers
    #[must_use]
    pub fn header() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .bg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for alternating table rows
    #[must_use]
    pub fn row_alt() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY).bg(Self::BG_DARK)
    }

    /// Style for key hints
    #[must_use]
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Self::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for key descriptions
    #[must_use]
    pub fn key_desc() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }
}
