//! All UI actions. Screens and background tasks only change state by
//! sending one of these through the app's action channel.

use std::fmt;
use std::sync::Arc;

use secrecy::SecretString;

use stockroom_core::{FavoriteSet, Product, ProductId};

use crate::screen::ScreenId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}

/// Operations that need a y/n before they run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteProduct { id: ProductId, name: String },
    Logout,
}

impl fmt::Display for ConfirmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeleteProduct { name, .. } => write!(f, "Delete product '{name}'?"),
            Self::Logout => f.write_str("Log out of the catalog?"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ────────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ───────────────────────────────────────────────────
    SwitchScreen(ScreenId),
    GoBack,
    ToggleHelp,

    // ── Search bar ───────────────────────────────────────────────────
    OpenSearch,
    CloseSearch,
    SearchInput(String),
    SearchMove(Direction),
    SearchSubmit,

    // ── Data from core ───────────────────────────────────────────────
    ProductsUpdated(Arc<Vec<Product>>),
    FavoritesUpdated(Arc<FavoriteSet>),
    SessionChanged(bool),
    /// Outcome of fetching one product for the detail view.
    ProductLoaded {
        id: ProductId,
        result: Result<Product, String>,
    },
    ProductDeleted(ProductId),
    /// A refresh finished, successfully or not.
    ProductsLoaded,

    // ── Requests (handled by the app, which talks to core) ───────────
    OpenDetail(ProductId),
    RefreshProducts,
    SyncFavorites,
    ToggleFavorite(ProductId),
    RequestDelete(ProductId),
    RequestLogout,
    SubmitLogin {
        email: String,
        password: SecretString,
    },
    SubmitRegister {
        name: String,
        email: String,
        password: SecretString,
    },
    /// Outcome of a login/register attempt, for the login screen.
    AuthResult(Result<(), String>),

    // ── Dialogs and toasts ───────────────────────────────────────────
    ShowConfirm(ConfirmAction),
    ConfirmYes,
    ConfirmNo,
    Notify(Notification),
    DismissNotification,
}
