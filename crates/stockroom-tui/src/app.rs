//! Application core: event loop, screen switching, action dispatch, and
//! the catalog operations that actions trigger.

use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use stockroom_core::{Catalog, CoreError, FavoriteToggle, ProductId};

use crate::action::{Action, ConfirmAction, Direction, Notification, NotificationLevel};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;

/// How long a toast stays up.
const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

pub struct App {
    catalog: Catalog,
    active_screen: ScreenId,
    screens: HashMap<ScreenId, Box<dyn Component>>,
    running: bool,
    /// Mirrors the session watch; tabs are unreachable while false.
    logged_in: bool,
    help_visible: bool,
    search_active: bool,
    search_query: String,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    /// Stops the data bridge.
    data_cancel: CancellationToken,
    /// Blocks all other input while set.
    pending_confirm: Option<ConfirmAction>,
    notification: Option<(Notification, Instant)>,
}

impl App {
    pub fn new(catalog: Catalog) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let screens = create_screens(catalog.config().api_url.as_str());
        let logged_in = catalog.is_authenticated();

        Self {
            catalog,
            active_screen: if logged_in {
                ScreenId::Products
            } else {
                ScreenId::Login
            },
            screens,
            running: true,
            logged_in,
            help_visible: false,
            search_active: false,
            search_query: String::new(),
            action_tx,
            action_rx,
            data_cancel: CancellationToken::new(),
            pending_confirm: None,
            notification: None,
        }
    }

    fn init_screens(&mut self) -> Result<()> {
        for screen in self.screens.values_mut() {
            screen.init(self.action_tx.clone())?;
            debug!(screen = screen.id(), "screen mounted");
        }
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }
        Ok(())
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.init_screens()?;

        let bridge = {
            let catalog = self.catalog.clone();
            let tx = self.action_tx.clone();
            let cancel = self.data_cancel.clone();
            tokio::spawn(async move {
                crate::data_bridge::spawn_data_bridge(catalog, tx, cancel).await;
            })
        };

        if self.logged_in {
            self.action_tx.send(Action::RefreshProducts)?;
        }

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        let (cols, rows) = tui.size()?;
        info!(screen = %self.active_screen, cols, rows, "TUI event loop started");

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
                Event::Mouse(mouse) => {
                    if let Some(action) = self.handle_mouse_event(mouse)? {
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
        let _ = bridge.await;
        tui.exit();
        info!("TUI event loop ended");
        Ok(())
    }

    // ── Input ─────────────────────────────────────────────────────────

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        // The login form takes every other key
        if self.active_screen == ScreenId::Login {
            return self.delegate_key(key);
        }

        if self.pending_confirm.is_some() {
            return Ok(match key.code {
                KeyCode::Char('y' | 'Y') => Some(Action::ConfirmYes),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(Action::ConfirmNo),
                _ => None,
            });
        }

        if self.search_active {
            return Ok(match key.code {
                KeyCode::Esc => Some(Action::CloseSearch),
                KeyCode::Enter => Some(Action::SearchSubmit),
                KeyCode::Up => Some(Action::SearchMove(Direction::Up)),
                KeyCode::Down => Some(Action::SearchMove(Direction::Down)),
                KeyCode::Backspace => {
                    self.search_query.pop();
                    Some(Action::SearchInput(self.search_query.clone()))
                }
                KeyCode::Char(c) if !ctrl => {
                    self.search_query.push(c);
                    Some(Action::SearchInput(self.search_query.clone()))
                }
                _ => None,
            });
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        if !ctrl {
            let global = match key.code {
                KeyCode::Char('q') => Some(Action::Quit),
                KeyCode::Char('?') => Some(Action::ToggleHelp),
                KeyCode::Char('/') => Some(Action::OpenSearch),
                KeyCode::Char('L') => Some(Action::RequestLogout),
                KeyCode::Char(c @ '1'..='9') => c
                    .to_digit(10)
                    .and_then(|d| u8::try_from(d).ok())
                    .and_then(ScreenId::from_number)
                    .map(Action::SwitchScreen),
                KeyCode::Tab => Some(Action::SwitchScreen(self.active_screen.next())),
                KeyCode::BackTab => Some(Action::SwitchScreen(self.active_screen.prev())),
                KeyCode::Esc if self.notification.is_some() => Some(Action::DismissNotification),
                KeyCode::Esc => Some(Action::GoBack),
                _ => None,
            };
            if global.is_some() {
                return Ok(global);
            }
        }

        self.delegate_key(key)
    }

    fn delegate_key(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match self.screens.get_mut(&self.active_screen) {
            Some(screen) => screen.handle_key_event(key),
            None => Ok(None),
        }
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        if self.pending_confirm.is_some() || self.help_visible {
            return Ok(None);
        }
        match self.screens.get_mut(&self.active_screen) {
            Some(screen) => screen.handle_mouse_event(mouse),
            None => Ok(None),
        }
    }

    // ── Dispatch ──────────────────────────────────────────────────────

    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,

            Action::Tick => {
                if let Some((_, shown)) = &self.notification {
                    if shown.elapsed() > NOTIFICATION_TTL {
                        self.notification = None;
                    }
                }
            }

            Action::Render => {}

            Action::Resize(w, h) => debug!(w, h, "terminal resized"),

            Action::SwitchScreen(target) => {
                if self.logged_in {
                    self.switch_to(*target);
                }
            }

            Action::GoBack => {
                if self.active_screen == ScreenId::Detail {
                    self.switch_to(ScreenId::Products);
                }
            }

            Action::ToggleHelp => self.help_visible = !self.help_visible,

            // ── Search bar ────────────────────────────────────────────
            Action::OpenSearch => {
                self.switch_to(ScreenId::Products);
                self.search_active = true;
                self.search_query.clear();
            }

            Action::CloseSearch | Action::SearchSubmit => {
                self.search_active = false;
                self.search_query.clear();
                self.forward_to(ScreenId::Products, action)?;
            }

            Action::SearchInput(_) | Action::SearchMove(_) => {
                self.forward_to(ScreenId::Products, action)?;
            }

            // ── Data updates go to every screen ───────────────────────
            Action::ProductsUpdated(_)
            | Action::FavoritesUpdated(_)
            | Action::ProductLoaded { .. }
            | Action::ProductDeleted(_)
            | Action::ProductsLoaded => self.broadcast(action)?,

            Action::SessionChanged(logged_in) => self.on_session_changed(*logged_in, action)?,

            // ── Catalog operations ────────────────────────────────────
            Action::OpenDetail(id) => {
                self.switch_to(ScreenId::Detail);
                self.forward_to(ScreenId::Detail, action)?;
                self.fetch_product(id.clone());
            }

            Action::RefreshProducts => self.refresh(),

            Action::SyncFavorites => self.execute(
                |catalog| async move { catalog.sync_favorites().await },
                |set| format!("{} favorites synced", set.len()),
            ),

            Action::ToggleFavorite(id) => self.toggle_favorite(id),

            Action::RequestDelete(id) => {
                let name = self.product_name(id);
                self.action_tx
                    .send(Action::ShowConfirm(ConfirmAction::DeleteProduct {
                        id: id.clone(),
                        name,
                    }))?;
            }

            Action::RequestLogout => {
                self.action_tx
                    .send(Action::ShowConfirm(ConfirmAction::Logout))?;
            }

            Action::SubmitLogin { email, password } => {
                let (login_email, password) = (email.clone(), password.clone());
                self.authenticate(email.clone(), move |catalog| async move {
                    catalog.login(&login_email, &password).await
                });
            }

            Action::SubmitRegister {
                name,
                email,
                password,
            } => {
                let (name, register_email, password) =
                    (name.clone(), email.clone(), password.clone());
                self.authenticate(email.clone(), move |catalog| async move {
                    catalog.register(&name, &register_email, &password).await
                });
            }

            Action::AuthResult(_) => self.forward_to(ScreenId::Login, action)?,

            // ── Dialogs and toasts ────────────────────────────────────
            Action::ShowConfirm(confirm) => self.pending_confirm = Some(confirm.clone()),

            Action::ConfirmYes => {
                if let Some(confirm) = self.pending_confirm.take() {
                    self.execute_confirm(confirm);
                }
            }

            Action::ConfirmNo => self.pending_confirm = None,

            Action::Notify(n) => self.notification = Some((n.clone(), Instant::now())),

            Action::DismissNotification => self.notification = None,
        }

        Ok(())
    }

    fn switch_to(&mut self, target: ScreenId) {
        if target == self.active_screen {
            return;
        }
        debug!("switching screen: {} → {}", self.active_screen, target);
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(false);
        }
        self.active_screen = target;
        if let Some(screen) = self.screens.get_mut(&target) {
            screen.set_focused(true);
        }
    }

    fn forward_to(&mut self, id: ScreenId, action: &Action) -> Result<()> {
        if let Some(screen) = self.screens.get_mut(&id) {
            if let Some(follow_up) = screen.update(action)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    fn broadcast(&mut self, action: &Action) -> Result<()> {
        for screen in self.screens.values_mut() {
            if let Some(follow_up) = screen.update(action)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    fn on_session_changed(&mut self, logged_in: bool, action: &Action) -> Result<()> {
        self.logged_in = logged_in;
        self.broadcast(action)?;

        if logged_in && self.active_screen == ScreenId::Login {
            self.switch_to(ScreenId::Products);
            self.action_tx.send(Action::RefreshProducts)?;
        } else if !logged_in && self.active_screen != ScreenId::Login {
            info!("session ended, showing login");
            self.search_active = false;
            self.search_query.clear();
            self.help_visible = false;
            self.pending_confirm = None;
            self.switch_to(ScreenId::Login);
        }
        Ok(())
    }

    // ── Catalog operations ────────────────────────────────────────────

    fn notify(&self, notification: Notification) {
        let _ = self.action_tx.send(Action::Notify(notification));
    }

    fn product_name(&self, id: &ProductId) -> String {
        self.catalog
            .cached_product(id)
            .map_or_else(|| id.to_string(), |p| p.name)
    }

    /// Spawn a catalog operation. The outcome is reported as a toast.
    fn execute<T, Fut>(
        &self,
        op: impl FnOnce(Catalog) -> Fut,
        describe: impl FnOnce(T) -> String + Send + 'static,
    ) where
        T: Send + 'static,
        Fut: Future<Output = Result<T, CoreError>> + Send + 'static,
    {
        let tx = self.action_tx.clone();
        let task = op(self.catalog.clone());
        tokio::spawn(async move {
            let notification = match task.await {
                Ok(value) => Notification::success(describe(value)),
                Err(e) => {
                    warn!(error = %e, "catalog operation failed");
                    Notification::error(e.to_string())
                }
            };
            let _ = tx.send(Action::Notify(notification));
        });
    }

    /// Reload the product list, then adopt the server's favorites so stale
    /// entries are pruned.
    fn refresh(&self) {
        let tx = self.action_tx.clone();
        self.execute(
            move |catalog| async move {
                let result = async {
                    let products = catalog.refresh_products().await?;
                    catalog.sync_favorites().await?;
                    Ok::<_, CoreError>(products.len())
                }
                .await;
                let _ = tx.send(Action::ProductsLoaded);
                result
            },
            |count| format!("Loaded {count} products"),
        );
    }

    fn toggle_favorite(&self, id: &ProductId) {
        let Some(product) = self.catalog.cached_product(id) else {
            self.notify(Notification::error(format!("Product {id} is not loaded")));
            return;
        };
        let name = product.name.clone();
        self.execute(
            move |catalog| async move { catalog.toggle_favorite(&product).await },
            move |outcome| match outcome {
                FavoriteToggle::Added => format!("Added '{name}' to favorites"),
                FavoriteToggle::Removed => format!("Removed '{name}' from favorites"),
            },
        );
    }

    fn fetch_product(&self, id: ProductId) {
        let catalog = self.catalog.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let result = catalog.product(&id).await.map_err(|e| {
                warn!(%id, error = %e, "product fetch failed");
                e.to_string()
            });
            let _ = tx.send(Action::ProductLoaded { id, result });
        });
    }

    fn authenticate<Fut>(&self, email: String, op: impl FnOnce(Catalog) -> Fut)
    where
        Fut: Future<Output = Result<(), CoreError>> + Send + 'static,
    {
        let tx = self.action_tx.clone();
        let task = op(self.catalog.clone());
        tokio::spawn(async move {
            let result = task.await.map_err(|e| {
                warn!(error = %e, "authentication failed");
                e.to_string()
            });
            if result.is_ok() {
                let _ = tx.send(Action::Notify(Notification::success(format!(
                    "Signed in as {email}"
                ))));
            }
            let _ = tx.send(Action::AuthResult(result));
        });
    }

    fn execute_confirm(&self, confirm: ConfirmAction) {
        match confirm {
            ConfirmAction::DeleteProduct { id, name } => {
                let tx = self.action_tx.clone();
                self.execute(
                    move |catalog| async move {
                        catalog.delete_product(&id).await?;
                        let _ = tx.send(Action::ProductDeleted(id));
                        Ok(())
                    },
                    move |()| format!("Deleted '{name}'"),
                );
            }
            ConfirmAction::Logout => match self.catalog.logout() {
                Ok(()) => self.notify(Notification::info("Logged out")),
                Err(e) => self.notify(Notification::error(e.to_string())),
            },
        }
    }

    // ── Rendering ─────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        // The login form gets the whole frame
        if self.active_screen == ScreenId::Login {
            if let Some(screen) = self.screens.get(&ScreenId::Login) {
                screen.render(frame, area);
            }
            if let Some((notif, _)) = &self.notification {
                Self::render_notification(frame, area, notif);
            }
            return;
        }

        let layout = Layout::vertical([
            Constraint::Min(1),    // screen content
            Constraint::Length(1), // tab bar
            Constraint::Length(1), // status bar
        ])
        .split(area);

        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, layout[0]);
        }
        self.render_tab_bar(frame, layout[1]);
        self.render_status_bar(frame, layout[2]);

        // Overlays, last is topmost
        if let Some((notif, _)) = &self.notification {
            Self::render_notification(frame, area, notif);
        }
        if let Some(confirm) = &self.pending_confirm {
            Self::render_confirm_dialog(frame, area, confirm);
        }
        if self.help_visible {
            Self::render_help_overlay(frame, area);
        }
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = ScreenId::ALL
            .iter()
            .map(|&id| {
                let style = if id == self.active_screen {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                };
                Line::from(Span::styled(
                    format!(" {} {} ", id.number(), id.label()),
                    style,
                ))
            })
            .collect();

        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", theme::key_hint()))
            .select(
                ScreenId::ALL
                    .iter()
                    .position(|&s| s == self.active_screen)
                    .unwrap_or(0),
            );

        frame.render_widget(tabs, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        if self.search_active {
            let line = Line::from(vec![
                Span::styled(" / ", Style::default().fg(theme::ELECTRIC_PURPLE)),
                Span::styled(&self.search_query, theme::value()),
                Span::styled("\u{2588}", theme::value()),
                Span::styled("  \u{2191}/\u{2193} pick  Enter open  Esc cancel", theme::key_hint()),
            ]);
            frame.render_widget(Paragraph::new(line), area);
            return;
        }

        let line = Line::from(vec![
            Span::raw(" "),
            Span::styled("\u{25CF} signed in", Style::default().fg(theme::SUCCESS_GREEN)),
            Span::styled(
                format!("  {}", self.catalog.config().api_url),
                theme::key_hint(),
            ),
            Span::styled(
                " \u{2502} / search  L logout  ? help  q quit",
                theme::key_hint(),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_help_overlay(frame: &mut Frame, area: Rect) {
        let width = 56u16.min(area.width.saturating_sub(4));
        let height = 20u16.min(area.height.saturating_sub(4));
        let x = area.width.saturating_sub(width) / 2;
        let y = area.height.saturating_sub(height) / 2;
        let help_area = Rect::new(area.x + x, area.y + y, width, height);

        frame.render_widget(Clear, help_area);
        let block = Block::default()
            .title(" Keyboard Shortcuts ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused())
            .style(Style::default().bg(theme::BG_DARK));

        let entry = |keys: &'static str, what: &'static str| {
            Line::from(vec![
                Span::styled(format!("  {keys:<10}"), theme::key_hint_key()),
                Span::styled(what, theme::key_hint()),
            ])
        };
        let heading = |text: &'static str| {
            Line::from(Span::styled(format!("  {text}"), theme::value()))
        };

        let help_text = vec![
            Line::from(""),
            heading("Navigation"),
            entry("1-2 Tab", "Switch screen"),
            entry("j/k \u{2191}/\u{2193}", "Move up/down"),
            entry("g/G", "Top / bottom"),
            entry("Enter", "Open product"),
            entry("Esc", "Back / close"),
            Line::from(""),
            heading("Products"),
            entry("Space", "Toggle favorite"),
            entry("f", "Favorites only / all"),
            entry("/", "Search by name or SKU"),
            entry("d", "Delete product"),
            entry("r", "Refresh list"),
            entry("s", "Sync favorites"),
            Line::from(""),
            heading("Global"),
            entry("L", "Log out"),
            entry("q", "Quit"),
        ];

        frame.render_widget(Paragraph::new(help_text).block(block), help_area);
    }

    fn render_confirm_dialog(frame: &mut Frame, area: Rect, confirm: &ConfirmAction) {
        let width = 50u16.min(area.width.saturating_sub(4));
        let height = 5u16;
        let x = area.width.saturating_sub(width) / 2;
        let y = area.height.saturating_sub(height) / 2;
        let dialog_area = Rect::new(area.x + x, area.y + y, width, height);

        frame.render_widget(Clear, dialog_area);
        let block = Block::default()
            .title(" Confirm ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme::ELECTRIC_YELLOW))
            .style(Style::default().bg(theme::BG_DARK));

        let text = vec![
            Line::from(Span::styled(format!("  {confirm}"), theme::table_row())),
            Line::from(""),
            Line::from(vec![
                Span::styled("  y ", theme::key_hint_key()),
                Span::styled("confirm    ", theme::key_hint()),
                Span::styled("n ", theme::key_hint_key()),
                Span::styled("cancel", theme::key_hint()),
            ]),
        ];
        frame.render_widget(Paragraph::new(text).block(block), dialog_area);
    }

    /// Toast in the bottom-right corner, above the status bar.
    fn render_notification(frame: &mut Frame, area: Rect, notif: &Notification) {
        let msg_len = u16::try_from(notif.message.chars().count()).unwrap_or(u16::MAX);
        let width = msg_len
            .saturating_add(6)
            .clamp(20, 70)
            .min(area.width);
        let height = 3u16.min(area.height);
        let x = area.width.saturating_sub(width + 1);
        let y = area.height.saturating_sub(height + 2);
        let toast_area = Rect::new(area.x + x, area.y + y, width, height);

        let (color, icon) = match notif.level {
            NotificationLevel::Success => (theme::SUCCESS_GREEN, "\u{2713}"),
            NotificationLevel::Error => (theme::ERROR_RED, "\u{2717}"),
            NotificationLevel::Info => (theme::NEON_CYAN, "\u{00B7}"),
        };

        frame.render_widget(Clear, toast_area);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(color))
            .style(Style::default().bg(theme::BG_DARK));

        let line = Line::from(vec![
            Span::styled(format!(" {icon} "), Style::default().fg(color)),
            Span::styled(notif.message.as_str(), theme::table_row()),
        ]);
        frame.render_widget(Paragraph::new(line).block(block), toast_area);
    }
}
