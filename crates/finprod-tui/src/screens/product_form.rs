//! Add / edit screen around [`ProductForm`].
//!
//! Fields are edited one at a time through a `tui-input` buffer that is
//! written back to the form on every change. Leaving a field touches it so
//! its error shows. Id edits go through a 500 ms debouncer; the settled
//! value becomes an [`IdCheckTicket`](finprod_core::IdCheckTicket) that
//! the app answers with [`Action::IdVerified`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use strum::IntoEnumIterator;
use throbber_widgets_tui::{Throbber, ThrobberState};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tui_input::Input;

use finprod_core::debounce::ID_CHECK_DEBOUNCE;
use finprod_core::{Debouncer, Field, FormMode, IdCheckStatus, Product, ProductForm};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::text_input::{self, FIELD_HEIGHT, FieldView};

/// How long the "not found" notice stays before returning to the list.
const NOT_FOUND_REDIRECT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Field(Field),
    Reset,
    Submit,
}

enum Body {
    Form(Box<ProductForm>),
    /// Edit target is not in the cache.
    Missing { since: Instant, redirected: bool },
}

pub struct ProductFormScreen {
    body: Body,
    focus: Focus,
    input: Input,
    action_tx: Option<UnboundedSender<Action>>,
    id_debounce: Option<Debouncer<String>>,
    cancel: CancellationToken,
    submit_error: Option<String>,
    throbber_state: ThrobberState,
}

impl ProductFormScreen {
    /// Empty form for a new product.
    pub fn create(today: NaiveDate) -> Self {
        Self::with_body(Body::Form(Box::new(ProductForm::new_create(today))))
    }

    /// Form for an existing product, or the not-found notice.
    pub fn edit(product: Option<Arc<Product>>, today: NaiveDate) -> Self {
        let body = match product {
            Some(product) => Body::Form(Box::new(ProductForm::new_edit(product, today))),
            None => Body::Missing {
                since: Instant::now(),
                redirected: false,
            },
        };
        Self::with_body(body)
    }

    fn with_body(body: Body) -> Self {
        let mut screen = Self {
            body,
            focus: Focus::Submit,
            input: Input::default(),
            action_tx: None,
            id_debounce: None,
            cancel: CancellationToken::new(),
            submit_error: None,
            throbber_state: ThrobberState::default(),
        };
        if let Some(first) = screen.focus_order().first().copied() {
            screen.set_focus(first);
        }
        screen
    }

    fn form(&self) -> Option<&ProductForm> {
        match self.body {
            Body::Form(ref form) => Some(&**form),
            Body::Missing { .. } => None,
        }
    }

    fn form_mut(&mut self) -> Option<&mut ProductForm> {
        match self.body {
            Body::Form(ref mut form) => Some(&mut **form),
            Body::Missing { .. } => None,
        }
    }

    /// Editable fields in display order, then the buttons.
    fn focus_order(&self) -> Vec<Focus> {
        let Some(form) = self.form() else {
            return Vec::new();
        };
        Field::iter()
            .filter(|f| !form.is_disabled(*f))
            .map(Focus::Field)
            .chain([Focus::Reset, Focus::Submit])
            .collect()
    }

    fn set_focus(&mut self, next: Focus) {
        if let Focus::Field(left) = self.focus {
            if next != self.focus {
                if let Some(form) = self.form_mut() {
                    form.touch(left);
                }
            }
        }
        self.focus = next;
        if let Focus::Field(field) = next {
            let value = self.form().map(|f| f.value(field).to_owned()).unwrap_or_default();
            self.input = Input::new(value);
        }
    }

    fn move_focus(&mut self, forward: bool) {
        let order = self.focus_order();
        if order.is_empty() {
            return;
        }
        let idx = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (idx + 1) % order.len()
        } else {
            (idx + order.len() - 1) % order.len()
        };
        self.set_focus(order[next]);
    }

    /// Write the input buffer back to the form.
    fn field_changed(&mut self, field: Field) -> Option<Action> {
        let value = self.input.value().to_owned();
        let form = self.form_mut()?;
        form.set_value(field, value.clone());
        if field != Field::Id || form.is_edit() {
            return None;
        }
        match self.id_debounce {
            Some(ref debounce) => {
                debounce.push(value);
                None
            }
            None => Some(Action::IdSettled(value)),
        }
    }

    fn spawn_id_debouncer(&mut self) {
        let Some(tx) = self.action_tx.clone() else {
            return;
        };
        if self.form().is_none_or(ProductForm::is_edit) {
            return;
        }
        if let Some(ref old) = self.id_debounce {
            old.cancel();
        }
        self.id_debounce = Some(Debouncer::spawn(
            ID_CHECK_DEBOUNCE,
            self.cancel.child_token(),
            move |id| {
                let _ = tx.send(Action::IdSettled(id));
            },
        ));
    }

    fn submit(&mut self) -> Option<Action> {
        if let Focus::Field(field) = self.focus {
            if let Some(form) = self.form_mut() {
                form.touch(field);
            }
        }
        let form = self.form_mut()?;

        // Submitted before the id debounce settled: ask now
        if !form.is_edit() && form.id_check_status() == IdCheckStatus::Unchecked {
            let id = form.value(Field::Id).to_owned();
            form.mark_all_touched();
            return form.request_id_check(&id).map(Action::VerifyId);
        }

        let draft = form.submit()?;
        let action = match form.mode() {
            FormMode::Create => Action::CreateProduct(draft),
            FormMode::Edit(product) => Action::UpdateProduct {
                id: product.id.clone(),
                changes: draft.changes(),
            },
        };
        self.submit_error = None;
        Some(action)
    }

    fn reset(&mut self) {
        let Some(form) = self.form_mut() else {
            return;
        };
        form.reset();
        self.submit_error = None;
        // A fresh debouncer forgets the last settled id, so retyping it
        // triggers a new check.
        self.spawn_id_debouncer();
        let first = self.focus_order().first().copied().unwrap_or(Focus::Submit);
        self.focus = first;
        self.set_focus(first);
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn field_view<'a>(&'a self, form: &'a ProductForm, field: Field) -> FieldView<'a> {
        let focused = self.focus == Focus::Field(field);
        let value = if focused {
            self.input.value()
        } else {
            form.value(field)
        };
        let mut view = FieldView::new(field_label(field), value);
        view.cursor = focused.then(|| self.input.cursor());
        view.error = form.visible_error(field).map(|e| e.to_string());
        view.disabled = form.is_disabled(field);
        if matches!(field, Field::DateRelease | Field::DateRevision) {
            view.placeholder = "AAAA-MM-DD";
        }
        if field == Field::Id && !form.is_edit() {
            view.note = id_status_note(form.id_check_status());
        }
        view
    }

    fn render_form(&self, frame: &mut Frame, area: Rect, form: &ProductForm) {
        let block = Block::default()
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled(form_title(form.mode()), theme::title_style()),
                Span::raw(" "),
            ]))
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [grid, status_area, buttons_area] = Layout::vertical([
            Constraint::Length(FIELD_HEIGHT * 3),
            Constraint::Length(2),
            Constraint::Length(1),
        ])
        .areas(inner);

        let rows = Layout::vertical([Constraint::Length(FIELD_HEIGHT); 3]).split(grid);
        let pairs = [
            (Field::Id, Field::Name),
            (Field::Description, Field::Logo),
            (Field::DateRelease, Field::DateRevision),
        ];
        for (row, (left, right)) in rows.iter().zip(pairs) {
            let [l, _, r] = Layout::horizontal([
                Constraint::Fill(1),
                Constraint::Length(2),
                Constraint::Fill(1),
            ])
            .areas(*row);
            text_input::render_input_field(frame, l, &self.field_view(form, left));
            text_input::render_input_field(frame, r, &self.field_view(form, right));
        }

        if form.is_submitting() {
            let throbber = Throbber::default()
                .label("Enviando…")
                .style(Style::default().fg(theme::DIM_WHITE))
                .throbber_style(Style::default().fg(theme::BANK_YELLOW));
            frame.render_stateful_widget(throbber, status_area, &mut self.throbber_state.clone());
        } else if let Some(ref error) = self.submit_error {
            frame.render_widget(
                Paragraph::new(Span::styled(format!("✗ {error}"), theme::field_error())),
                status_area,
            );
        }

        let buttons = Line::from(vec![
            Span::styled(
                " Reiniciar ",
                theme::button_secondary(self.focus == Focus::Reset),
            ),
            Span::raw("   "),
            Span::styled(" Enviar ", theme::button_primary(self.focus == Focus::Submit)),
        ]);
        frame.render_widget(
            Paragraph::new(buttons).alignment(Alignment::Center),
            buttons_area,
        );
    }
}

fn form_title(mode: &FormMode) -> &'static str {
    match mode {
        FormMode::Create => "Formulario de Registro",
        FormMode::Edit(_) => "Editar producto",
    }
}

fn field_label(field: Field) -> &'static str {
    match field {
        Field::Id => "ID",
        Field::Name => "Nombre",
        Field::Description => "Descripción",
        Field::Logo => "Logo",
        Field::DateRelease => "Fecha Liberación",
        Field::DateRevision => "Fecha Revisión",
    }
}

fn id_status_note(status: IdCheckStatus) -> Option<Span<'static>> {
    match status {
        IdCheckStatus::Unchecked => None,
        IdCheckStatus::Pending => Some(Span::styled("verificando…", theme::key_hint())),
        IdCheckStatus::Available => Some(Span::styled(
            "✓ disponible",
            Style::default().fg(theme::SUCCESS_GREEN),
        )),
        IdCheckStatus::Taken => Some(Span::styled("✗ en uso", theme::field_error())),
    }
}

impl Drop for ProductFormScreen {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl Component for ProductFormScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        self.spawn_id_debouncer();
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.form().is_none() {
            return Ok(matches!(key.code, KeyCode::Esc | KeyCode::Enter).then_some(Action::BackToList));
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let action = match key.code {
            KeyCode::Esc => Some(Action::BackToList),
            KeyCode::Char('s') if ctrl => self.submit(),
            KeyCode::Char('r') if ctrl => {
                self.reset();
                None
            }
            KeyCode::Tab | KeyCode::Down => {
                self.move_focus(true);
                None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.move_focus(false);
                None
            }
            KeyCode::Enter => match self.focus {
                Focus::Submit => self.submit(),
                Focus::Reset => {
                    self.reset();
                    None
                }
                Focus::Field(_) => {
                    self.move_focus(true);
                    None
                }
            },
            _ => {
                let Focus::Field(field) = self.focus else {
                    return Ok(None);
                };
                if text_input::edit(&mut self.input, key) {
                    self.field_changed(field)
                } else {
                    None
                }
            }
        };
        Ok(action)
    }

    fn handle_paste(&mut self, text: &str) -> Result<Option<Action>> {
        if let Focus::Field(field) = self.focus {
            if text_input::paste(&mut self.input, text) {
                return Ok(self.field_changed(field));
            }
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::IdSettled(id) => {
                return Ok(self
                    .form_mut()
                    .and_then(|form| form.request_id_check(id))
                    .map(Action::VerifyId));
            }
            Action::IdVerified(ticket, result) => {
                let Some(form) = self.form_mut() else {
                    return Ok(None);
                };
                let applied = form.apply_id_check(ticket, result.clone());
                // A stale answer for the value now in the field means the
                // debouncer swallowed the repeat; ask again.
                if !applied
                    && form.value(Field::Id) == ticket.id
                    && form.id_check_status() == IdCheckStatus::Unchecked
                {
                    return Ok(form.request_id_check(&ticket.id).map(Action::VerifyId));
                }
            }
            Action::SubmitFinished { result, .. } => {
                if let Some(form) = self.form_mut() {
                    form.set_submitting(false);
                }
                if let Err(message) = result {
                    self.submit_error = Some(message.clone());
                }
            }
            Action::Tick => {
                if let Body::Missing {
                    since,
                    ref mut redirected,
                } = self.body
                {
                    if !*redirected && since.elapsed() >= NOT_FOUND_REDIRECT {
                        *redirected = true;
                        return Ok(Some(Action::BackToList));
                    }
                }
                let busy = self.form().is_some_and(|f| {
                    f.is_submitting() || f.id_check_status() == IdCheckStatus::Pending
                });
                if busy {
                    self.throbber_state.calc_next();
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let width = area.width.min(100);
        let height = area.height.min(FIELD_HEIGHT * 3 + 5);
        let panel = Rect::new(
            area.x + (area.width - width) / 2,
            area.y,
            width,
            height,
        );

        match self.form() {
            Some(form) => self.render_form(frame, panel, form),
            None => {
                let text = vec![
                    Line::from(""),
                    Line::from(Span::styled("Producto no encontrado", theme::field_error())),
                    Line::from(""),
                    Line::from(Span::styled("Volviendo a la lista…", theme::key_hint())),
                ];
                frame.render_widget(
                    Paragraph::new(text).alignment(Alignment::Center),
                    panel,
                );
            }
        }
    }

    fn captures_input(&self) -> bool {
        true
    }

    fn hints(&self) -> &'static [(&'static str, &'static str)] {
        if self.form().is_none() {
            return &[("Esc", "volver")];
        }
        &[
            ("Tab", "siguiente"),
            ("Ctrl+S", "enviar"),
            ("Ctrl+R", "reiniciar"),
            ("Esc", "cancelar"),
        ]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use finprod_core::IdCheckTicket;
    use pretty_assertions::assert_eq;

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn existing() -> Arc<Product> {
        Arc::new(Product {
            id: "trj-crd".into(),
            name: "Tarjeta Crédito".into(),
            description: "Tarjeta de consumo bajo la modalidad de crédito".into(),
            logo: "https://example.com/logo.png".into(),
            date_release: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            date_revision: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
        })
    }

    fn key(screen: &mut ProductFormScreen, code: KeyCode) -> Option<Action> {
        screen
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    fn ctrl(screen: &mut ProductFormScreen, c: char) -> Option<Action> {
        screen
            .handle_key_event(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
            .unwrap()
    }

    /// Type into the focused field; returns the last action produced.
    fn type_text(screen: &mut ProductFormScreen, text: &str) -> Option<Action> {
        let mut last = None;
        for c in text.chars() {
            last = key(screen, KeyCode::Char(c));
        }
        last
    }

    fn form(screen: &ProductFormScreen) -> &ProductForm {
        screen.form().unwrap()
    }

    /// Answer whatever id check `action` asks for.
    fn answer(screen: &mut ProductFormScreen, action: Option<Action>, exists: bool) {
        let Some(Action::IdSettled(id)) = action else {
            panic!("expected a settled id");
        };
        let Some(Action::VerifyId(ticket)) = screen.update(&Action::IdSettled(id)).unwrap() else {
            panic!("expected a verification request");
        };
        screen
            .update(&Action::IdVerified(ticket, Ok(exists)))
            .unwrap();
    }

    fn fill_valid(screen: &mut ProductFormScreen) {
        let settled = type_text(screen, "abc-123");
        answer(screen, settled, false);
        for text in [
            "Cuenta Ahorro",
            "Cuenta de ahorro con rendimiento",
            "https://example.com/a.png",
            "2025-06-01",
        ] {
            key(screen, KeyCode::Tab);
            type_text(screen, text);
        }
    }

    #[test]
    fn create_starts_on_the_id_field() {
        let screen = ProductFormScreen::create(today());
        assert_eq!(screen.focus, Focus::Field(Field::Id));
        assert_eq!(
            screen.focus_order(),
            vec![
                Focus::Field(Field::Id),
                Focus::Field(Field::Name),
                Focus::Field(Field::Description),
                Focus::Field(Field::Logo),
                Focus::Field(Field::DateRelease),
                Focus::Reset,
                Focus::Submit,
            ]
        );
    }

    #[test]
    fn edit_skips_the_locked_id() {
        let screen = ProductFormScreen::edit(Some(existing()), today());
        assert_eq!(screen.focus, Focus::Field(Field::Name));
        assert_eq!(screen.input.value(), "Tarjeta Crédito");
    }

    #[test]
    fn leaving_a_field_touches_it() {
        let mut screen = ProductFormScreen::create(today());
        assert!(!form(&screen).has_error(Field::Id));
        key(&mut screen, KeyCode::Tab);
        assert_eq!(
            form(&screen).visible_error(Field::Id).map(|e| e.to_string()),
            Some("El ID es requerido".into())
        );
        assert!(!form(&screen).has_error(Field::Name));
    }

    #[test]
    fn release_date_derives_the_revision() {
        let mut screen = ProductFormScreen::create(today());
        for _ in 0..4 {
            key(&mut screen, KeyCode::Tab);
        }
        type_text(&mut screen, "2025-06-01");
        assert_eq!(form(&screen).value(Field::DateRevision), "2026-06-01");
    }

    #[test]
    fn id_edits_settle_into_a_verification() {
        let mut screen = ProductFormScreen::create(today());
        let settled = type_text(&mut screen, "abc");
        answer(&mut screen, settled, true);
        assert_eq!(form(&screen).id_check_status(), IdCheckStatus::Taken);
        assert_eq!(
            form(&screen).error(Field::Id).map(|e| e.to_string()),
            Some("Este ID ya existe".into())
        );
    }

    #[test]
    fn stale_answer_for_the_current_value_is_asked_again() {
        let mut screen = ProductFormScreen::create(today());
        type_text(&mut screen, "abc");
        let stale = screen
            .form_mut()
            .unwrap()
            .request_id_check("abc")
            .unwrap();
        // Edit away and back: the old ticket is now stale
        key(&mut screen, KeyCode::Backspace);
        key(&mut screen, KeyCode::Char('c'));

        let follow_up = screen
            .update(&Action::IdVerified(stale, Ok(false)))
            .unwrap();
        assert!(matches!(
            follow_up,
            Some(Action::VerifyId(IdCheckTicket { ref id, .. })) if id == "abc"
        ));
    }

    #[test]
    fn failed_check_counts_as_available() {
        let mut screen = ProductFormScreen::create(today());
        let Some(Action::IdSettled(id)) = type_text(&mut screen, "abc") else {
            panic!("expected a settled id");
        };
        let Some(Action::VerifyId(ticket)) = screen.update(&Action::IdSettled(id)).unwrap() else {
            panic!("expected a verification request");
        };
        screen
            .update(&Action::IdVerified(ticket, Err("timeout".into())))
            .unwrap();
        assert_eq!(form(&screen).id_check_status(), IdCheckStatus::Available);
    }

    #[test]
    fn ctrl_s_submits_a_valid_form_once() {
        let mut screen = ProductFormScreen::create(today());
        fill_valid(&mut screen);

        let Some(Action::CreateProduct(draft)) = ctrl(&mut screen, 's') else {
            panic!("expected a create");
        };
        assert_eq!(draft.id, "abc-123");
        assert_eq!(draft.date_revision, NaiveDate::from_ymd_opt(2026, 6, 1).unwrap());

        // In flight: a second submit is a no-op
        assert!(ctrl(&mut screen, 's').is_none());

        screen
            .update(&Action::SubmitFinished {
                form: 1,
                result: Err("Datos inválidos. Por favor verifica la información ingresada.".into()),
            })
            .unwrap();
        assert!(!form(&screen).is_submitting());
        assert!(screen.submit_error.is_some());
    }

    #[test]
    fn invalid_submit_shows_every_error() {
        let mut screen = ProductFormScreen::create(today());
        key(&mut screen, KeyCode::Tab);
        assert!(ctrl(&mut screen, 's').is_none());
        assert!(Field::iter().all(|f| form(&screen).is_touched(f)));
    }

    #[test]
    fn edit_submits_changes_without_the_id() {
        let mut screen = ProductFormScreen::edit(Some(existing()), today());
        type_text(&mut screen, " Oro");
        let Some(Action::UpdateProduct { id, changes }) = ctrl(&mut screen, 's') else {
            panic!("expected an update");
        };
        assert_eq!(id, "trj-crd");
        assert_eq!(changes.name, "Tarjeta Crédito Oro");
    }

    #[test]
    fn reset_restores_the_original_product() {
        let mut screen = ProductFormScreen::edit(Some(existing()), today());
        type_text(&mut screen, "XYZ");
        ctrl(&mut screen, 'r');
        assert_eq!(form(&screen).value(Field::Name), "Tarjeta Crédito");
        assert_eq!(screen.input.value(), "Tarjeta Crédito");
        assert!(!form(&screen).is_touched(Field::Name));
    }

    #[test]
    fn enter_on_submit_button_submits() {
        let mut screen = ProductFormScreen::create(today());
        fill_valid(&mut screen);
        key(&mut screen, KeyCode::Tab);
        key(&mut screen, KeyCode::Tab);
        assert_eq!(screen.focus, Focus::Submit);
        assert!(matches!(
            key(&mut screen, KeyCode::Enter),
            Some(Action::CreateProduct(_))
        ));
    }

    #[test]
    fn esc_cancels_back_to_the_list() {
        let mut screen = ProductFormScreen::create(today());
        assert!(matches!(key(&mut screen, KeyCode::Esc), Some(Action::BackToList)));
    }

    #[test]
    fn missing_product_returns_to_the_list_once() {
        let mut screen = ProductFormScreen::edit(None, today());
        if let Body::Missing { ref mut since, .. } = screen.body {
            *since = Instant::now().checked_sub(NOT_FOUND_REDIRECT).unwrap();
        }
        assert!(matches!(
            screen.update(&Action::Tick).unwrap(),
            Some(Action::BackToList)
        ));
        assert!(screen.update(&Action::Tick).unwrap().is_none());
    }
}
