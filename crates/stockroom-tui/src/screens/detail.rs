//! Detail screen for a single product.
//!
//! Shows the cached copy straight away and swaps in the fetched one when
//! it arrives. Fetch results for a product that is no longer on screen are
//! dropped.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};

use stockroom_core::{FavoriteSet, Product, ProductId};

use crate::action::Action;
use crate::component::Component;
use crate::screen::ScreenId;
use crate::theme;

#[derive(Debug, Clone, PartialEq, Eq)]
enum LoadState {
    Idle,
    Loading,
    Failed(String),
    Deleted,
}

pub struct DetailScreen {
    focused: bool,
    product_id: Option<ProductId>,
    product: Option<Product>,
    products: Arc<Vec<Product>>,
    favorites: Arc<FavoriteSet>,
    state: LoadState,
}

impl DetailScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            product_id: None,
            product: None,
            products: Arc::new(Vec::new()),
            favorites: Arc::new(FavoriteSet::new()),
            state: LoadState::Idle,
        }
    }

    fn shows(&self, id: &ProductId) -> bool {
        self.product_id.as_ref() == Some(id)
    }

    fn open(&mut self, id: &ProductId) {
        self.product = self.products.iter().find(|p| &p.id == id).cloned();
        self.product_id = Some(id.clone());
        self.state = LoadState::Loading;
    }

    fn field<'a>(label: &'a str, value: impl Into<Span<'a>>) -> Line<'a> {
        Line::from(vec![
            Span::styled(format!("  {label:<14}"), theme::label()),
            value.into(),
        ])
    }

    fn render_product(&self, frame: &mut Frame, area: Rect, product: &Product) {
        let favorite = if self.favorites.is_pending(&product.id) {
            Span::styled("\u{2606} saving\u{2026}", theme::favorite_pending())
        } else if self.favorites.contains(&product.id) {
            Span::styled("\u{2605} yes", theme::favorite())
        } else {
            Span::styled("no", theme::label())
        };

        let mut lines = vec![
            Line::from(""),
            Self::field("Name", Span::styled(product.name.clone(), theme::title_style())),
            Self::field("SKU", Span::styled(product.sku.clone(), Style::default().fg(theme::CORAL))),
            Self::field("Price", Span::styled(product.display_price(), theme::value())),
            Self::field("Quantity", Span::styled(product.quantity.to_string(), theme::value())),
            Self::field("Favorite", favorite),
            Self::field("ID", Span::styled(product.id.to_string(), theme::label())),
            Self::field(
                "Thumbnail",
                Span::styled(product.cover_image().unwrap_or("\u{2500}").to_owned(), theme::value()),
            ),
        ];
        for (i, image) in product.images.iter().enumerate() {
            let label = if i == 0 { "Images" } else { "" };
            lines.push(Self::field(label, Span::styled(image.clone(), theme::label())));
        }
        if let Some(at) = product.updated_at.or(product.created_at) {
            lines.push(Self::field(
                "Updated",
                Span::styled(at.format("%Y-%m-%d %H:%M UTC").to_string(), theme::label()),
            ));
        }
        if !product.description.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("  {}", product.description),
                theme::table_row(),
            )));
        }

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
    }

    fn status_line(&self) -> Option<Line<'_>> {
        match &self.state {
            LoadState::Idle => None,
            LoadState::Loading => Some(Line::from(Span::styled(
                "  Loading\u{2026}",
                theme::key_hint(),
            ))),
            LoadState::Failed(msg) => Some(Line::from(Span::styled(
                format!("  Could not load: {msg}"),
                Style::default().fg(theme::ERROR_RED),
            ))),
            LoadState::Deleted => Some(Line::from(Span::styled(
                "  This product was deleted.",
                Style::default().fg(theme::ELECTRIC_YELLOW),
            ))),
        }
    }
}

impl Component for DetailScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.state == LoadState::Deleted {
            return Ok(None);
        }
        let Some(id) = self.product_id.clone() else {
            return Ok(None);
        };
        let action = match key.code {
            KeyCode::Char(' ') => Some(Action::ToggleFavorite(id)),
            KeyCode::Char('d') => Some(Action::RequestDelete(id)),
            KeyCode::Char('r') => Some(Action::OpenDetail(id)),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::ProductsUpdated(products) => {
                self.products = Arc::clone(products);
                // Pick up edits made elsewhere
                if let Some(id) = &self.product_id {
                    if let Some(fresh) = self.products.iter().find(|p| &p.id == id) {
                        self.product = Some(fresh.clone());
                    }
                }
            }
            Action::FavoritesUpdated(favorites) => {
                self.favorites = Arc::clone(favorites);
            }
            Action::OpenDetail(id) => self.open(id),
            Action::ProductLoaded { id, result } if self.shows(id) => match result {
                Ok(product) => {
                    self.product = Some(product.clone());
                    self.state = LoadState::Idle;
                }
                Err(msg) => self.state = LoadState::Failed(msg.clone()),
            },
            Action::ProductDeleted(id) if self.shows(id) => {
                self.state = LoadState::Deleted;
                if self.focused {
                    return Ok(Some(Action::SwitchScreen(ScreenId::Products)));
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let title = self
            .product
            .as_ref()
            .map_or_else(|| " Product ".to_owned(), |p| format!(" {} ", p.name));
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
            Constraint::Length(1), // status
            Constraint::Min(1),    // body
            Constraint::Length(1), // hints
        ])
        .split(inner);

        if let Some(status) = self.status_line() {
            frame.render_widget(Paragraph::new(status), layout[0]);
        }

        match &self.product {
            Some(product) => self.render_product(frame, layout[1], product),
            None if self.product_id.is_none() => {
                frame.render_widget(
                    Paragraph::new("  No product selected. Pick one from the Products tab.")
                        .style(theme::table_row()),
                    layout[1],
                );
            }
            None => {}
        }

        let hints = Line::from(vec![
            Span::styled("  Space ", theme::key_hint_key()),
            Span::styled("favorite  ", theme::key_hint()),
            Span::styled("d ", theme::key_hint_key()),
            Span::styled("delete  ", theme::key_hint()),
            Span::styled("r ", theme::key_hint_key()),
            Span::styled("reload  ", theme::key_hint()),
            Span::styled("Esc ", theme::key_hint_key()),
            Span::styled("back", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), layout[2]);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &str {
        "detail"
    }
}
