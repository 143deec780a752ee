use owo_colors::Style;
use std::sync::OnceLock;

use crate::model::EntityStatus;

static THEME: OnceLock<Theme> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub warn: Style,
    pub info: Style,
    pub dim: Style,
    pub price: Style,
    pub active: Style,
    pub inactive: Style,
}

impl Theme {
    pub fn detect() -> Self {
        if !console::Term::stdout().is_term() {
            return Self::plain();
        }
        Self::colored()
    }

    pub fn colored() -> Self {
        Self {
            header: Style::new().cyan().bold(),
            success: Style::new().green().bold(),
            warn: Style::new().yellow().bold(),
            info: Style::new().magenta(),
            dim: Style::new().white().dimmed(),
            price: Style::new().bright_green(),
            active: Style::new().green(),
            inactive: Style::new().bright_black(),
        }
    }

    pub fn plain() -> Self {
        Self {
            header: Style::new(),
            success: Style::new(),
            warn: Style::new(),
            info: Style::new(),
            dim: Style::new(),
            price: Style::new(),
            active: Style::new(),
            inactive: Style::new(),
        }
    }

    pub fn status(&self, status: EntityStatus) -> Style {
        match status {
            EntityStatus::Active => self.active.clone(),
            EntityStatus::Inactive => self.inactive.clone(),
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}
