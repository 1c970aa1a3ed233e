//! Screen components.

pub mod detail;
pub mod login;
pub mod products;

use std::collections::HashMap;

use crate::component::Component;
use crate::screen::ScreenId;

/// Build every screen. `api_url` is shown on the login form.
pub fn create_screens(api_url: &str) -> HashMap<ScreenId, Box<dyn Component>> {
    let mut screens: HashMap<ScreenId, Box<dyn Component>> = HashMap::new();
    screens.insert(ScreenId::Products, Box::new(products::ProductsScreen::new()));
    screens.insert(ScreenId::Detail, Box::new(detail::DetailScreen::new()));
    screens.insert(ScreenId::Login, Box::new(login::LoginScreen::new(api_url)));
    screens
}
