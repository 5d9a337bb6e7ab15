//! Product list screen: search box, paginated table, page size selector
//! and the delete confirmation.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};
use throbber_widgets_tui::{Throbber, ThrobberState};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tui_input::Input;

use finprod_core::debounce::SEARCH_DEBOUNCE;
use finprod_core::form::validation::format_date;
use finprod_core::pagination::PAGE_SIZE_OPTIONS;
use finprod_core::{Debouncer, ListState, Product, ProductList};

use crate::action::{Action, Notification};
use crate::component::Component;
use crate::theme;
use crate::widgets::confirm_modal::{ConfirmModal, ModalOutcome};
use crate::widgets::text_input::{self, FieldView};

/// Delete confirmation for one product.
struct PendingDelete {
    id: String,
    modal: ConfirmModal,
}

pub struct ProductsScreen {
    list: ProductList,
    table_state: TableState,
    search: Input,
    search_active: bool,
    search_debounce: Option<Debouncer<String>>,
    cancel: CancellationToken,
    pending_delete: Option<PendingDelete>,
    /// Set by an explicit load; the list it brings starts on page 1.
    from_first_page: bool,
    throbber_state: ThrobberState,
}

impl ProductsScreen {
    pub fn new(page_size: usize) -> Self {
        Self {
            list: ProductList::new(page_size),
            table_state: TableState::default().with_selected(Some(0)),
            search: Input::default(),
            search_active: false,
            search_debounce: None,
            cancel: CancellationToken::new(),
            pending_delete: None,
            from_first_page: false,
            throbber_state: ThrobberState::default(),
        }
    }

    fn to_first_page(&mut self) {
        self.list.go_to_page(1);
        self.select(0);
    }

    fn selected_index(&self) -> usize {
        self.table_state.selected().unwrap_or(0)
    }

    fn selected_product(&self) -> Option<&Arc<Product>> {
        self.list.page_items().get(self.selected_index())
    }

    fn select(&mut self, idx: usize) {
        let len = self.list.page_items().len();
        self.table_state
            .select(Some(if len == 0 { 0 } else { idx.min(len - 1) }));
    }

    fn move_selection(&mut self, down: bool) {
        let idx = self.selected_index();
        let next = if down {
            idx.saturating_add(1)
        } else {
            idx.saturating_sub(1)
        };
        self.select(next);
    }

    /// Feed the search box into the debouncer. Without one (no runtime yet)
    /// the term applies immediately.
    fn search_changed(&mut self) {
        let term = self.search.value().to_owned();
        match self.search_debounce {
            Some(ref debounce) => debounce.push(term),
            None => self.apply_search(&term),
        }
    }

    fn apply_search(&mut self, term: &str) {
        self.list.apply_search(term);
        self.select(0);
    }

    fn request_delete(&mut self) {
        if let Some(product) = self.selected_product() {
            let message = format!("¿Estás seguro de eliminar el producto {}?", product.name);
            self.pending_delete = Some(PendingDelete {
                id: product.id.clone(),
                modal: ConfirmModal::new(message),
            });
        }
    }

    fn handle_modal_key(&mut self, key: KeyEvent) -> Option<Action> {
        let pending = self.pending_delete.as_mut()?;
        match pending.modal.handle_key(key) {
            ModalOutcome::Confirm => {
                pending.modal.begin_loading();
                Some(Action::DeleteProduct(pending.id.clone()))
            }
            ModalOutcome::Cancel => {
                self.pending_delete = None;
                None
            }
            ModalOutcome::Ignored => None,
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Tab => self.search_active = false,
            _ => {
                if text_input::edit(&mut self.search, key) {
                    self.search_changed();
                }
            }
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render_search(&self, frame: &mut Frame, area: Rect) {
        let [search_area, add_area] =
            Layout::horizontal([Constraint::Min(20), Constraint::Length(14)]).areas(area);

        let mut view = FieldView::new("Buscar", self.search.value());
        view.placeholder = "Buscar...";
        view.cursor = self.search_active.then(|| self.search.cursor());
        text_input::render_input_field(frame, search_area, &view);

        let add = Paragraph::new(vec![
            Line::from(""),
            Line::from(""),
            Line::from(vec![
                Span::styled(" a ", theme::key_hint_key()),
                Span::styled("Agregar", theme::button_primary(true)),
            ]),
        ])
        .alignment(Alignment::Right);
        frame.render_widget(add, add_area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        match self.list.state() {
            ListState::Loading | ListState::Idle => {
                let throbber = Throbber::default()
                    .label("Cargando productos…")
                    .style(Style::default().fg(theme::DIM_WHITE))
                    .throbber_style(Style::default().fg(theme::BANK_YELLOW));
                frame.render_stateful_widget(throbber, area, &mut self.throbber_state.clone());
            }
            ListState::Errored(message) => {
                let line = Line::from(vec![
                    Span::styled(format!(" ✗ {message}  "), theme::field_error()),
                    Span::styled("r ", theme::key_hint_key()),
                    Span::styled("reintentar", theme::key_hint()),
                ]);
                frame.render_widget(Paragraph::new(line), area);
            }
            ListState::Loaded => {
                if !self.list.search_term().is_empty() {
                    let line = Line::from(Span::styled(
                        format!(" Filtro: \"{}\"", self.list.search_term()),
                        theme::key_hint(),
                    ));
                    frame.render_widget(Paragraph::new(line), area);
                }
            }
        }
    }

    fn render_table(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.list.total() == 0 && *self.list.state() == ListState::Loaded {
            let text = if self.list.search_term().is_empty() {
                "No hay productos registrados"
            } else {
                "No se encontraron productos"
            };
            frame.render_widget(
                Paragraph::new(Span::styled(text, theme::key_hint())).alignment(Alignment::Center),
                inner,
            );
            return;
        }

        let header = Row::new(vec![
            Cell::from("Logo"),
            Cell::from("Nombre del producto"),
            Cell::from("Descripción"),
            Cell::from("Fecha de liberación"),
            Cell::from("Fecha de reestructuración"),
        ])
        .style(theme::table_header());

        let rows: Vec<Row> = self
            .list
            .page_items()
            .iter()
            .map(|p| {
                Row::new(vec![
                    Cell::from(Span::styled(format!(" {:<2} ", p.initials()), theme::avatar())),
                    Cell::from(p.name.clone()).style(
                        Style::default()
                            .fg(theme::SKY_BLUE)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Cell::from(p.description.clone()),
                    Cell::from(format_date(p.date_release)),
                    Cell::from(format_date(p.date_revision)),
                ])
                .style(theme::table_row())
            })
            .collect();

        let widths = [
            Constraint::Length(6),
            Constraint::Fill(2),
            Constraint::Fill(3),
            Constraint::Length(20),
            Constraint::Length(26),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(theme::table_selected());

        let mut state = self.table_state;
        frame.render_stateful_widget(table, inner, &mut state);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let [range_area, size_area] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).areas(area);

        let pagination = self.list.pagination();
        let range = Line::from(vec![
            Span::styled(
                format!(" {}", self.list.display_range()),
                Style::default().fg(theme::DIM_WHITE),
            ),
            Span::styled(
                format!(
                    "  ·  página {}/{}",
                    pagination.page(),
                    pagination.page_count().max(1)
                ),
                theme::key_hint(),
            ),
        ]);
        frame.render_widget(Paragraph::new(range), range_area);

        let mut sizes = vec![Span::styled("s ", theme::key_hint_key())];
        for size in PAGE_SIZE_OPTIONS {
            let style = if size == pagination.page_size() {
                theme::button_primary(true)
            } else {
                theme::key_hint()
            };
            sizes.push(Span::styled(format!(" {size} "), style));
        }
        sizes.push(Span::raw(" "));
        frame.render_widget(
            Paragraph::new(Line::from(sizes)).alignment(Alignment::Right),
            size_area,
        );
    }
}

impl Drop for ProductsScreen {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl Component for ProductsScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.search_debounce = Some(Debouncer::spawn(
            SEARCH_DEBOUNCE,
            self.cancel.child_token(),
            move |term| {
                let _ = action_tx.send(Action::SearchSettled(term));
            },
        ));
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.pending_delete.is_some() {
            return Ok(self.handle_modal_key(key));
        }
        if self.search_active {
            self.handle_search_key(key);
            return Ok(None);
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(None);
        }

        let action = match key.code {
            KeyCode::Char('/') => {
                self.search_active = true;
                None
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection(true);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection(false);
                None
            }
            KeyCode::Char('l') | KeyCode::Right => {
                if self.list.next_page() {
                    self.select(0);
                }
                None
            }
            KeyCode::Char('h') | KeyCode::Left => {
                if self.list.prev_page() {
                    self.select(0);
                }
                None
            }
            KeyCode::Char('s') => {
                self.list.cycle_page_size();
                self.select(0);
                None
            }
            KeyCode::Char('a') => Some(Action::OpenAdd),
            KeyCode::Char('e') | KeyCode::Enter => {
                self.selected_product().map(|p| Action::OpenEdit(p.id.clone()))
            }
            KeyCode::Char('d') => {
                self.request_delete();
                None
            }
            KeyCode::Char('r') => Some(Action::RequestRefresh),
            _ => None,
        };
        Ok(action)
    }

    fn handle_paste(&mut self, text: &str) -> Result<Option<Action>> {
        if self.search_active && text_input::paste(&mut self.search, text) {
            self.search_changed();
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::ProductsLoading => {
                self.list.begin_loading();
                self.from_first_page = true;
            }
            Action::ProductsUpdated(snapshot) => {
                if std::mem::take(&mut self.from_first_page) {
                    self.list.set_products(snapshot.clone());
                    self.select(0);
                } else {
                    // Background refreshes keep the page the user is on
                    let page = self.list.pagination().page();
                    let selected = self.selected_index();
                    self.list.set_products(snapshot.clone());
                    self.list.go_to_page(page);
                    self.select(selected);
                }
            }
            Action::ProductsLoadFailed(message) => {
                self.from_first_page = false;
                self.list.fail(message.clone());
            }
            Action::SearchSettled(term) => self.apply_search(term),
            // The write already re-fetched the list; its update may land
            // on either side of this
            Action::DeleteFinished(Ok(message)) => {
                self.pending_delete = None;
                self.to_first_page();
                return Ok(Some(Action::Notify(Notification::success(message.clone()))));
            }
            Action::SubmitFinished { result: Ok(_), .. } => self.to_first_page(),
            Action::DeleteFinished(Err(message)) => {
                if let Some(ref mut pending) = self.pending_delete {
                    pending.modal.fail(message.clone());
                }
            }
            Action::Tick => {
                if self.list.is_loading() {
                    self.throbber_state.calc_next();
                }
                if let Some(ref mut pending) = self.pending_delete {
                    pending.modal.tick();
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let [search_area, status_area, table_area, footer_area] = Layout::vertical([
            Constraint::Length(text_input::FIELD_HEIGHT - 1),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .areas(area);

        self.render_search(frame, search_area);
        self.render_status(frame, status_area);
        self.render_table(frame, table_area);
        self.render_footer(frame, footer_area);

        if let Some(ref pending) = self.pending_delete {
            pending.modal.render(frame, area);
        }
    }

    fn captures_input(&self) -> bool {
        self.search_active || self.pending_delete.is_some()
    }

    fn hints(&self) -> &'static [(&'static str, &'static str)] {
        if self.pending_delete.as_ref().is_some_and(|p| p.modal.is_loading()) {
            &[]
        } else if self.pending_delete.is_some() {
            &[("y", "confirmar"), ("n/Esc", "cancelar"), ("Tab", "cambiar")]
        } else if self.search_active {
            &[("Enter/Esc", "terminar búsqueda")]
        } else {
            &[
                ("/", "buscar"),
                ("a", "agregar"),
                ("e", "editar"),
                ("d", "eliminar"),
                ("h/l", "página"),
                ("s", "tamaño"),
                ("r", "recargar"),
            ]
        }
    }
}
