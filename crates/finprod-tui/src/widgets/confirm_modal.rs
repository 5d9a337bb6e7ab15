//! Confirmation modal with a loading state and an inline error.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span, Text};
use throbber_widgets_tui::{Throbber, ThrobberState};
use tui_popup::Popup;

use crate::theme;

pub const DEFAULT_TITLE: &str = "¿Estás seguro?";
pub const DEFAULT_CONFIRM: &str = "Confirmar";
pub const DEFAULT_CANCEL: &str = "Cancelar";

/// What a key press in the modal asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalOutcome {
    Confirm,
    Cancel,
    /// Consumed, nothing to do.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Button {
    Cancel,
    Confirm,
}

pub struct ConfirmModal {
    title: String,
    message: String,
    confirm_label: String,
    cancel_label: String,
    selected: Button,
    loading: bool,
    error: Option<String>,
    throbber_state: ThrobberState,
}

impl ConfirmModal {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            title: DEFAULT_TITLE.into(),
            message: message.into(),
            confirm_label: DEFAULT_CONFIRM.into(),
            cancel_label: DEFAULT_CANCEL.into(),
            selected: Button::Cancel,
            loading: false,
            error: None,
            throbber_state: ThrobberState::default(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Start the confirmed operation. Clears a previous error.
    pub fn begin_loading(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// The operation failed; show why and allow another attempt.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }

    pub fn tick(&mut self) {
        if self.loading {
            self.throbber_state.calc_next();
        }
    }

    /// Keys are ignored while loading. `y`/`n` are shortcuts for the two
    /// buttons; Tab and the arrows switch the highlighted one.
    pub fn handle_key(&mut self, key: KeyEvent) -> ModalOutcome {
        if self.loading {
            return ModalOutcome::Ignored;
        }
        match key.code {
            KeyCode::Esc | KeyCode::Char('n' | 'N') => self.cancel(),
            KeyCode::Char('y' | 'Y') => ModalOutcome::Confirm,
            KeyCode::Enter => match self.selected {
                Button::Confirm => ModalOutcome::Confirm,
                Button::Cancel => self.cancel(),
            },
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Left | KeyCode::Right => {
                self.selected = match self.selected {
                    Button::Cancel => Button::Confirm,
                    Button::Confirm => Button::Cancel,
                };
                ModalOutcome::Ignored
            }
            _ => ModalOutcome::Ignored,
        }
    }

    fn cancel(&mut self) -> ModalOutcome {
        self.error = None;
        ModalOutcome::Cancel
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("  {}  ", self.message),
                Style::default().fg(theme::DIM_WHITE),
            )),
            Line::from(""),
        ];

        if self.loading {
            let throbber = Throbber::default()
                .label("Procesando…")
                .style(Style::default().fg(theme::DIM_WHITE))
                .throbber_style(Style::default().fg(theme::BANK_YELLOW));
            let mut line = throbber.to_line(&self.throbber_state);
            line.spans.insert(0, Span::raw("  "));
            lines.push(line);
            lines.push(Line::from(""));
        } else if let Some(ref error) = self.error {
            lines.push(Line::from(Span::styled(
                format!("  ✗ {error}"),
                theme::field_error(),
            )));
            lines.push(Line::from(""));
        }

        let confirm_active = self.selected == Button::Confirm && !self.loading;
        let cancel_active = self.selected == Button::Cancel && !self.loading;
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(
                format!(" {} ", self.cancel_label),
                theme::button_secondary(cancel_active),
            ),
            Span::raw("   "),
            Span::styled(
                format!(" {} ", self.confirm_label),
                theme::button_primary(confirm_active),
            ),
            Span::raw("  "),
        ]));

        let popup = Popup::new(Text::from(lines))
            .title(Line::from(Span::styled(
                format!(" {} ", self.title),
                theme::title_style(),
            )))
            .style(Style::default().bg(theme::BG_DARK))
            .border_style(Style::default().fg(theme::WARN_ORANGE));
        frame.render_widget(popup, area);
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;

    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn defaults_use_the_standard_labels() {
        let modal = ConfirmModal::new("¿Eliminar?");
        assert_eq!(modal.title, DEFAULT_TITLE);
        assert_eq!(modal.confirm_label, DEFAULT_CONFIRM);
        assert_eq!(modal.cancel_label, DEFAULT_CANCEL);
    }

    #[test]
    fn esc_cancels() {
        let mut modal = ConfirmModal::new("¿Eliminar?");
        assert_eq!(modal.handle_key(press(KeyCode::Esc)), ModalOutcome::Cancel);
    }

    #[test]
    fn enter_follows_the_highlighted_button() {
        let mut modal = ConfirmModal::new("¿Eliminar?");
        assert_eq!(modal.handle_key(press(KeyCode::Enter)), ModalOutcome::Cancel);
        assert_eq!(modal.handle_key(press(KeyCode::Tab)), ModalOutcome::Ignored);
        assert_eq!(modal.handle_key(press(KeyCode::Enter)), ModalOutcome::Confirm);
    }

    #[test]
    fn keys_are_ignored_while_loading() {
        let mut modal = ConfirmModal::new("¿Eliminar?");
        modal.begin_loading();
        assert_eq!(modal.handle_key(press(KeyCode::Esc)), ModalOutcome::Ignored);
        assert_eq!(modal.handle_key(press(KeyCode::Char('y'))), ModalOutcome::Ignored);
    }

    #[test]
    fn failure_shows_inline_and_cancel_clears_it() {
        let mut modal = ConfirmModal::new("¿Eliminar?");
        modal.begin_loading();
        modal.fail("Producto no encontrado.");
        assert!(!modal.is_loading());
        assert_eq!(modal.error(), Some("Producto no encontrado."));

        assert_eq!(modal.handle_key(press(KeyCode::Char('n'))), ModalOutcome::Cancel);
        assert_eq!(modal.error(), None);
    }

    #[test]
    fn retry_clears_the_previous_error() {
        let mut modal = ConfirmModal::new("¿Eliminar?");
        modal.fail("Error interno del servidor. Intenta más tarde.");
        assert_eq!(modal.handle_key(press(KeyCode::Char('y'))), ModalOutcome::Confirm);
        modal.begin_loading();
        assert_eq!(modal.error(), None);
    }
}
