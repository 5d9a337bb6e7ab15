//! Application core: event loop, screen switching, action dispatch.
//!
//! The list screen lives for the whole session; a form screen is built
//! when the user opens one and dropped on the way back, which also
//! cancels its id debouncer. Every API call runs on a spawned task and
//! reports back through the action channel.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Local;
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Margin, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use finprod_core::{Command, CommandResult, ConnectionState, Controller, IdCheckTicket};

use crate::action::{Action, Notification, NotificationLevel};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::product_form::ProductFormScreen;
use crate::screens::products::ProductsScreen;
use crate::theme;
use crate::tui::Tui;

/// How long a toast stays up.
const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

/// Connection status as seen by the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// The bridge connects on startup.
    #[default]
    Connecting,
    Connected,
    Disconnected,
}

/// Top-level application state and event loop.
pub struct App {
    active_screen: ScreenId,
    products: ProductsScreen,
    /// Present while the add or edit screen is open.
    form: Option<ProductFormScreen>,
    /// Bumped every time a form opens; tags its saves.
    form_generation: u64,
    running: bool,
    connection_status: ConnectionStatus,
    help_visible: bool,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    controller: Controller,
    /// Cancellation token for the data bridge task.
    data_cancel: CancellationToken,
    /// Active notification toast with display timestamp.
    notification: Option<(Notification, Instant)>,
    /// When the list last arrived.
    last_refresh: Option<Instant>,
}

impl App {
    pub fn new(controller: Controller, page_size: usize) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        Self {
            active_screen: ScreenId::default(),
            products: ProductsScreen::new(page_size),
            form: None,
            form_generation: 0,
            running: true,
            connection_status: ConnectionStatus::default(),
            help_visible: false,
            action_tx,
            action_rx,
            controller,
            data_cancel: CancellationToken::new(),
            notification: None,
            last_refresh: None,
        }
    }

    /// Run the main event loop until the user quits.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.products.init(self.action_tx.clone())?;

        {
            let controller = self.controller.clone();
            let cancel = self.data_cancel.clone();
            let tx = self.action_tx.clone();
            tokio::spawn(async move {
                crate::data_bridge::spawn_data_bridge(controller, tx, cancel).await;
            });
        }

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Paste(text) => {
                    if let Some(action) = self.active_mut().handle_paste(&text)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.data_cancel.cancel();
        events.stop();
        info!("TUI event loop ended");
        Ok(())
    }

    fn active(&self) -> &dyn Component {
        match self.form {
            Some(ref form) => form,
            None => &self.products,
        }
    }

    fn active_mut(&mut self) -> &mut dyn Component {
        match self.form {
            Some(ref mut form) => form,
            None => &mut self.products,
        }
    }

    /// Ctrl+C always quits. `q` and `?` only apply when no text input
    /// has the keyboard; everything else goes to the active screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        if !self.active().captures_input() && key.modifiers == KeyModifiers::NONE {
            match key.code {
                KeyCode::Char('q') => return Ok(Some(Action::Quit)),
                KeyCode::Char('?') => return Ok(Some(Action::ToggleHelp)),
                _ => {}
            }
        }

        self.active_mut().handle_key_event(key)
    }

    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,
            Action::Render | Action::Resize(..) => {}
            Action::ToggleHelp => self.help_visible = !self.help_visible,

            Action::Connecting => self.connection_status = ConnectionStatus::Connecting,
            Action::Connected => self.connection_status = ConnectionStatus::Connected,
            Action::Disconnected(reason) => {
                debug!(%reason, "connection lost");
                self.connection_status = ConnectionStatus::Disconnected;
            }

            Action::Tick => {
                if self
                    .notification
                    .as_ref()
                    .is_some_and(|(_, created)| created.elapsed() > NOTIFICATION_TTL)
                {
                    self.notification = None;
                }
                // The list keeps animating behind an open form
                self.to_products(action)?;
                self.to_form(action)?;
            }

            // List data goes to the list screen whichever screen is active
            Action::ProductsUpdated(_) => {
                self.last_refresh = Some(Instant::now());
                self.to_products(action)?;
            }
            Action::ProductsLoading
            | Action::ProductsLoadFailed(_)
            | Action::SearchSettled(_)
            | Action::DeleteFinished(_) => self.to_products(action)?,

            Action::RequestRefresh => {
                self.to_products(&Action::ProductsLoading)?;
                self.spawn_refresh();
            }
            Action::DeleteProduct(id) => self.spawn_delete(id.clone()),

            Action::OpenAdd => self.open_form(ScreenId::Add)?,
            Action::OpenEdit(id) => self.open_form(ScreenId::Edit(id.clone()))?,
            Action::BackToList => self.close_form(),

            Action::IdSettled(_) | Action::IdVerified(..) => self.to_form(action)?,
            Action::VerifyId(ticket) => self.spawn_verify(ticket.clone()),
            Action::CreateProduct(draft) => {
                self.spawn_submit(Command::CreateProduct(draft.clone()));
            }
            Action::UpdateProduct { id, changes } => self.spawn_submit(Command::UpdateProduct {
                id: id.clone(),
                changes: changes.clone(),
            }),
            Action::SubmitFinished { form, result } if *form == self.form_generation => {
                self.to_products(action)?;
                self.to_form(action)?;
                if let Ok(product) = result {
                    let message = submit_message(&self.active_screen, &product.id);
                    self.notification = Some((Notification::success(message), Instant::now()));
                    self.close_form();
                }
            }
            // The form that sent it is gone; report without touching the
            // one now open
            Action::SubmitFinished { form, result } => {
                debug!(form, current = self.form_generation, "save for a closed form");
                self.to_products(action)?;
                let toast = match result {
                    Ok(product) => {
                        Notification::success(format!("Producto {} guardado", product.id))
                    }
                    Err(message) => Notification::error(message.clone()),
                };
                self.notification = Some((toast, Instant::now()));
            }

            Action::Notify(n) => {
                self.notification = Some((n.clone(), Instant::now()));
            }
        }

        Ok(())
    }

    fn to_products(&mut self, action: &Action) -> Result<()> {
        if let Some(follow_up) = self.products.update(action)? {
            self.action_tx.send(follow_up)?;
        }
        Ok(())
    }

    fn to_form(&mut self, action: &Action) -> Result<()> {
        if let Some(ref mut form) = self.form {
            if let Some(follow_up) = form.update(action)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    // ── Navigation ───────────────────────────────────────────────

    fn open_form(&mut self, target: ScreenId) -> Result<()> {
        let today = Local::now().date_naive();
        let mut form = match target {
            ScreenId::Edit(ref id) => ProductFormScreen::edit(self.controller.product(id), today),
            ScreenId::Add | ScreenId::List => ProductFormScreen::create(today),
        };
        form.init(self.action_tx.clone())?;
        debug!("switching screen: {} → {}", self.active_screen, target);
        self.form = Some(form);
        self.form_generation += 1;
        self.active_screen = target;
        Ok(())
    }

    fn close_form(&mut self) {
        if self.form.take().is_some() {
            debug!("switching screen: {} → {}", self.active_screen, ScreenId::List);
        }
        self.active_screen = ScreenId::List;
    }

    // ── API calls ────────────────────────────────────────────────

    /// Re-fetch when connected, otherwise retry the connection.
    fn spawn_refresh(&self) {
        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let connected = *controller.connection_state().borrow() == ConnectionState::Connected;
            let result = if connected {
                controller.execute(Command::Refresh).await.map(|_| ())
            } else {
                controller.connect().await
            };
            match result {
                // The bridge only hears about changed lists; an identical
                // one still has to end the loading state.
                Ok(()) => {
                    let _ = tx.send(Action::ProductsUpdated(controller.products()));
                }
                Err(e) => {
                    warn!(error = %e, "refresh failed");
                    let _ = tx.send(Action::ProductsLoadFailed(e.user_message()));
                }
            }
        });
    }

    fn spawn_delete(&self, id: String) {
        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let result = match controller
                .execute(Command::DeleteProduct { id: id.clone() })
                .await
            {
                Ok(CommandResult::Deleted { message, .. }) => Ok(message),
                Ok(_) => Ok(format!("Producto {id} eliminado")),
                Err(e) => {
                    warn!(%id, error = %e, "delete failed");
                    Err(e.user_message())
                }
            };
            let _ = tx.send(Action::DeleteFinished(result));
        });
    }

    fn spawn_submit(&self, cmd: Command) {
        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        let form = self.form_generation;
        tokio::spawn(async move {
            let result = match controller.execute(cmd).await {
                Ok(CommandResult::Product(product)) => Ok(Arc::new(product)),
                Ok(other) => {
                    warn!(?other, "unexpected command result");
                    Err("Respuesta inesperada del servidor.".to_owned())
                }
                Err(e) => {
                    warn!(error = %e, "submit failed");
                    Err(e.user_message())
                }
            };
            let _ = tx.send(Action::SubmitFinished { form, result });
        });
    }

    fn spawn_verify(&self, ticket: IdCheckTicket) {
        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let result = controller
                .verify_id(&ticket.id)
                .await
                .map_err(|e| e.user_message());
            let _ = tx.send(Action::IdVerified(ticket, result));
        });
    }

    // ── Rendering ────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let [header_area, content_area, status_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .areas(area);

        self.render_header(frame, header_area);
        self.active().render(frame, content_area.inner(Margin::new(1, 0)));
        self.render_status_bar(frame, status_area);

        if let Some((ref notif, _)) = self.notification {
            render_notification(frame, area, notif);
        }
        if self.help_visible {
            render_help_overlay(frame, area);
        }
    }

    /// Brand and screen title on the left, connection and freshness on
    /// the right.
    fn render_header(&self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Block::default().style(Style::default().bg(theme::NAVY)), area);

        let left = Line::from(vec![
            Span::styled(" ▌", Style::default().fg(theme::BANK_YELLOW)),
            Span::styled("BANCO ", theme::title_style()),
            Span::styled(self.active_screen.label(), Style::default().fg(theme::DIM_WHITE)),
        ]);
        frame.render_widget(Paragraph::new(left), area);

        let mut right = vec![connection_indicator(self.connection_status)];
        if let Some(at) = self.last_refresh {
            right.push(Span::styled(
                format!("  {} ", refresh_label(at.elapsed())),
                theme::key_hint(),
            ));
        }
        frame.render_widget(
            Paragraph::new(Line::from(right)).alignment(Alignment::Right),
            area,
        );
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::raw(" ")];
        for (key, label) in self.active().hints() {
            spans.push(Span::styled(*key, theme::key_hint_key()));
            spans.push(Span::styled(format!(" {label}  "), theme::key_hint()));
        }
        let globals: &[(&str, &str)] = if self.active().captures_input() {
            &[("Ctrl+C", "salir")]
        } else {
            &[("?", "ayuda"), ("q", "salir")]
        };
        spans.push(Span::styled("│ ", theme::key_hint()));
        for (key, label) in globals {
            spans.push(Span::styled(*key, theme::key_hint_key()));
            spans.push(Span::styled(format!(" {label}  "), theme::key_hint()));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

fn connection_indicator(status: ConnectionStatus) -> Span<'static> {
    match status {
        ConnectionStatus::Connected => {
            Span::styled("● conectado", Style::default().fg(theme::SUCCESS_GREEN))
        }
        ConnectionStatus::Connecting => {
            Span::styled("◐ conectando", Style::default().fg(theme::WARN_ORANGE))
        }
        ConnectionStatus::Disconnected => {
            Span::styled("○ sin conexión", Style::default().fg(theme::ERROR_RED))
        }
    }
}

/// "actualizado hace 1m 5s", whole seconds only.
fn refresh_label(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs == 0 {
        return "actualizado ahora".into();
    }
    format!(
        "actualizado hace {}",
        humantime::format_duration(Duration::from_secs(secs))
    )
}

fn submit_message(screen: &ScreenId, id: &str) -> String {
    match screen {
        ScreenId::Edit(_) => format!("Producto {id} actualizado"),
        ScreenId::Add | ScreenId::List => format!("Producto {id} creado"),
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let help_width = 56u16.min(area.width.saturating_sub(4));
    let help_height = 20u16.min(area.height.saturating_sub(4));
    let x = (area.width.saturating_sub(help_width)) / 2;
    let y = (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(area.x + x, area.y + y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    let block = Block::default()
        .title(" Atajos de teclado ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused())
        .style(Style::default().bg(theme::BG_DARK));
    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let section = |title: &'static str| {
        Line::from(Span::styled(
            format!("  {title}"),
            Style::default().fg(theme::SKY_BLUE),
        ))
    };
    let entry = |key: &'static str, label: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
            Span::styled(label, theme::key_hint()),
        ])
    };

    let help_text = vec![
        Line::from(""),
        section("Listado"),
        entry("/", "Buscar"),
        entry("j/k ↑/↓", "Mover selección"),
        entry("h/l ←/→", "Página anterior / siguiente"),
        entry("s", "Cambiar tamaño de página"),
        entry("a", "Agregar producto"),
        entry("e Enter", "Editar producto"),
        entry("d", "Eliminar producto"),
        entry("r", "Recargar"),
        Line::from(""),
        section("Formulario"),
        entry("Tab", "Campo siguiente"),
        entry("Ctrl+S", "Enviar"),
        entry("Ctrl+R", "Reiniciar"),
        entry("Esc", "Volver al listado"),
        Line::from(""),
        Line::from(Span::styled(
            "                 Esc o ? para cerrar",
            theme::key_hint(),
        )),
    ];
    frame.render_widget(Paragraph::new(help_text), inner);
}

/// Toast in the bottom-right corner, above the status bar.
fn render_notification(frame: &mut Frame, area: Rect, notif: &Notification) {
    let msg_len = u16::try_from(notif.message.chars().count()).unwrap_or(u16::MAX);
    let width = msg_len
        .saturating_add(6)
        .clamp(20, 70)
        .min(area.width.saturating_sub(2));
    let height = 3u16;

    let x = area.width.saturating_sub(width + 1);
    let y = area.height.saturating_sub(height + 1);
    let toast_area = Rect::new(area.x + x, area.y + y, width, height);

    let (color, icon) = match notif.level {
        NotificationLevel::Success => (theme::SUCCESS_GREEN, "✓"),
        NotificationLevel::Error => (theme::ERROR_RED, "✗"),
    };

    frame.render_widget(Clear, toast_area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
        .style(Style::default().bg(theme::BG_DARK));
    let inner = block.inner(toast_area);
    frame.render_widget(block, toast_area);

    let line = Line::from(vec![
        Span::styled(format!(" {icon} "), Style::default().fg(color)),
        Span::styled(notif.message.as_str(), Style::default().fg(theme::DIM_WHITE)),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}
