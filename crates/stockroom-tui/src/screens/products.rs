//! Products screen: product table with a favorites filter and the search
//! suggestion panel.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, TableState};

use stockroom_core::{FavoriteSet, Product, ProductId, ProductListView};

use crate::action::{Action, Direction};
use crate::component::Component;
use crate::theme;

pub struct ProductsScreen {
    focused: bool,
    products: Arc<Vec<Product>>,
    favorites: Arc<FavoriteSet>,
    view: ProductListView,
    table_state: TableState,
    suggestion_cursor: usize,
    /// False until a refresh finishes or a non-empty list arrives.
    loaded: bool,
}

impl ProductsScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            products: Arc::new(Vec::new()),
            favorites: Arc::new(FavoriteSet::new()),
            view: ProductListView::new(),
            table_state: TableState::default().with_selected(Some(0)),
            suggestion_cursor: 0,
            loaded: false,
        }
    }

    fn visible(&self) -> Vec<&Product> {
        self.view.visible(&self.products, &self.favorites)
    }

    fn selected_index(&self) -> usize {
        self.table_state.selected().unwrap_or(0)
    }

    fn selected_product(&self) -> Option<&Product> {
        self.visible().get(self.selected_index()).copied()
    }

    fn select(&mut self, idx: usize) {
        let len = self.visible().len();
        let clamped = if len == 0 { 0 } else { idx.min(len - 1) };
        self.table_state.select(Some(clamped));
    }

    fn move_selection(&mut self, delta: isize) {
        self.select(self.selected_index().saturating_add_signed(delta));
    }

    fn clamp_selection(&mut self) {
        self.select(self.selected_index());
    }

    fn move_suggestion(&mut self, direction: Direction) {
        let count = self.view.suggestions(&self.products).len();
        if count == 0 {
            self.suggestion_cursor = 0;
            return;
        }
        self.suggestion_cursor = match direction {
            Direction::Up => self.suggestion_cursor.saturating_sub(1),
            Direction::Down => (self.suggestion_cursor + 1).min(count - 1),
        };
    }

    fn selected_id_action(&self, make: fn(ProductId) -> Action) -> Option<Action> {
        self.selected_product().map(|p| make(p.id.clone()))
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render_filter_line(&self, frame: &mut Frame, area: Rect, shown: usize) {
        let mode = if self.view.favorites_only() {
            "[favorites]"
        } else {
            "[all]"
        };
        let mut spans = vec![
            Span::styled(" Filter: ", theme::label()),
            Span::styled(mode, theme::value()),
            Span::styled(
                format!("  \u{2605} {}", self.favorites.len()),
                theme::favorite(),
            ),
            Span::styled(
                format!("   {shown} of {} shown", self.products.len()),
                theme::label(),
            ),
        ];
        if self.favorites.has_pending() {
            spans.push(Span::styled("   syncing\u{2026}", theme::favorite_pending()));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_table(&self, frame: &mut Frame, area: Rect, visible: &[&Product]) {
        if visible.is_empty() {
            let text = match (self.loaded, self.view.favorites_only()) {
                (false, _) => "  Loading products\u{2026}",
                (true, true) => "  No favorites yet. Press f to show all products, Space to star one.",
                (true, false) => "  No products in the catalog.",
            };
            frame.render_widget(Paragraph::new(text).style(theme::table_row()), area);
            return;
        }

        let header = Row::new(vec![
            Cell::from(" \u{2605}").style(theme::table_header()),
            Cell::from("Name").style(theme::table_header()),
            Cell::from("SKU").style(theme::table_header()),
            Cell::from("Price").style(theme::table_header()),
            Cell::from("Qty").style(theme::table_header()),
            Cell::from("Image").style(theme::table_header()),
        ]);

        let selected = self.selected_index();
        let rows: Vec<Row> = visible
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let is_selected = i == selected;
                let prefix = if is_selected { "\u{25B8}" } else { " " };
                let star = if self.favorites.is_pending(&p.id) {
                    Span::styled("\u{2606}", theme::favorite_pending())
                } else if self.favorites.contains(&p.id) {
                    Span::styled("\u{2605}", theme::favorite())
                } else {
                    Span::raw(" ")
                };

                let row_style = if is_selected {
                    theme::table_selected()
                } else {
                    theme::table_row()
                };

                Row::new(vec![
                    Cell::from(Line::from(vec![Span::raw(prefix), star])),
                    Cell::from(p.name.clone()).style(
                        Style::default()
                            .fg(theme::NEON_CYAN)
                            .add_modifier(if is_selected {
                                Modifier::BOLD
                            } else {
                                Modifier::empty()
                            }),
                    ),
                    Cell::from(p.sku.clone()).style(Style::default().fg(theme::CORAL)),
                    Cell::from(p.display_price()),
                    Cell::from(p.quantity.to_string()),
                    Cell::from(p.cover_image().unwrap_or("\u{2500}").to_owned()),
                ])
                .style(row_style)
            })
            .collect();

        let widths = [
            Constraint::Length(3),
            Constraint::Min(16),
            Constraint::Length(14),
            Constraint::Length(11),
            Constraint::Length(6),
            Constraint::Min(12),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(theme::table_selected());

        let mut state = self.table_state;
        frame.render_stateful_widget(table, area, &mut state);
    }

    /// Suggestion panel anchored to the bottom of `area`, above the hints.
    fn render_suggestions(&self, frame: &mut Frame, area: Rect) {
        let suggestions = self.view.suggestions(&self.products);
        let lines: Vec<Line> = if suggestions.is_empty() {
            vec![Line::from(Span::styled("  No matches", theme::key_hint()))]
        } else {
            suggestions
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    let style = if i == self.suggestion_cursor {
                        theme::table_selected()
                    } else {
                        theme::table_row()
                    };
                    Line::from(vec![
                        Span::styled(format!("  {:<28}", p.name), style),
                        Span::styled(format!(" {}", p.sku), Style::default().fg(theme::CORAL)),
                    ])
                })
                .collect()
        };

        let height = u16::try_from(lines.len() + 2)
            .unwrap_or(u16::MAX)
            .min(area.height);
        let panel = Rect::new(area.x, area.y + area.height - height, area.width, height);

        let block = Block::default()
            .title(format!(" Suggestions for \"{}\" ", self.view.term().trim()))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused())
            .style(Style::default().bg(theme::BG_DARK));

        frame.render_widget(Clear, panel);
        frame.render_widget(Paragraph::new(lines).block(block), panel);
    }
}

impl Component for ProductsScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection(1);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection(-1);
                None
            }
            KeyCode::Char('g') => {
                self.select(0);
                None
            }
            KeyCode::Char('G') => {
                self.select(usize::MAX);
                None
            }
            KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.move_selection(10);
                None
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.move_selection(-10);
                None
            }
            KeyCode::Char('f') => {
                self.view.set_filter_mode(!self.view.favorites_only());
                self.select(0);
                None
            }
            KeyCode::Enter => self.selected_id_action(Action::OpenDetail),
            KeyCode::Char(' ') => self.selected_id_action(Action::ToggleFavorite),
            KeyCode::Char('d') => self.selected_id_action(Action::RequestDelete),
            KeyCode::Char('r') => Some(Action::RefreshProducts),
            KeyCode::Char('s') => Some(Action::SyncFavorites),
            _ => None,
        };
        Ok(action)
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        match mouse.kind {
            MouseEventKind::ScrollDown => self.move_selection(1),
            MouseEventKind::ScrollUp => self.move_selection(-1),
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::ProductsUpdated(products) => {
                self.products = Arc::clone(products);
                self.loaded |= !self.products.is_empty();
                self.clamp_selection();
            }
            Action::FavoritesUpdated(favorites) => {
                self.favorites = Arc::clone(favorites);
                self.clamp_selection();
            }
            Action::ProductsLoaded => self.loaded = true,
            Action::SearchInput(term) => {
                self.view.set_term(term.as_str());
                self.suggestion_cursor = 0;
            }
            Action::SearchMove(direction) => self.move_suggestion(*direction),
            Action::SearchSubmit => {
                let picked = self
                    .view
                    .select_suggestion(&self.products, self.suggestion_cursor);
                self.view.clear_term();
                self.suggestion_cursor = 0;
                return Ok(picked.map(Action::OpenDetail));
            }
            Action::CloseSearch => {
                self.view.clear_term();
                self.suggestion_cursor = 0;
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let visible = self.visible();
        let title = if self.view.favorites_only() {
            format!(" Favorites ({}) ", visible.len())
        } else {
            format!(" Products ({}) ", visible.len())
        };
        let block = Block::default()
            .title(title)
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([
            Constraint::Length(1), // filter line
            Constraint::Min(1),    // table
            Constraint::Length(1), // hints
        ])
        .split(inner);

        self.render_filter_line(frame, layout[0], visible.len());
        self.render_table(frame, layout[1], &visible);

        if self.view.shows_suggestions() {
            self.render_suggestions(frame, layout[1]);
        }

        let hints = Line::from(vec![
            Span::styled("  j/k ", theme::key_hint_key()),
            Span::styled("navigate  ", theme::key_hint()),
            Span::styled("Enter ", theme::key_hint_key()),
            Span::styled("detail  ", theme::key_hint()),
            Span::styled("Space ", theme::key_hint_key()),
            Span::styled("favorite  ", theme::key_hint()),
            Span::styled("f ", theme::key_hint_key()),
            Span::styled("filter  ", theme::key_hint()),
            Span::styled("d ", theme::key_hint_key()),
            Span::styled("delete  ", theme::key_hint()),
            Span::styled("r ", theme::key_hint_key()),
            Span::styled("refresh  ", theme::key_hint()),
            Span::styled("s ", theme::key_hint_key()),
            Span::styled("sync", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), layout[2]);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &str {
        "products"
    }
}
