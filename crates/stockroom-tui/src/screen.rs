//! Screen identifiers.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenId {
    #[default]
    Products, // 1
    Detail, // 2
    /// Login / register form. Not in the tab bar; shown whenever there is
    /// no session.
    Login,
}

impl ScreenId {
    /// Screens in tab-bar order.
    pub const ALL: [ScreenId; 2] = [Self::Products, Self::Detail];

    /// Number key for this screen; 0 for screens outside the tab bar.
    pub fn number(self) -> u8 {
        match self {
            Self::Products => 1,
            Self::Detail => 2,
            Self::Login => 0,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Products),
            2 => Some(Self::Detail),
            _ => None,
        }
    }

    /// Next tab (wraps).
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&s| s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Previous tab (wraps).
    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|&s| s == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Products => "Products",
            Self::Detail => "Detail",
            Self::Login => "Login",
        }
    }

    /// Whether the screen appears in the tab bar.
    pub fn in_tab_bar(self) -> bool {
        self.number() != 0
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_keys_round_trip_for_tabs() {
        for id in ScreenId::ALL {
            assert_eq!(ScreenId::from_number(id.number()), Some(id));
        }
        assert_eq!(ScreenId::from_number(0), None);
        assert_eq!(ScreenId::from_number(3), None);
    }

    #[test]
    fn tab_cycling_wraps() {
        assert_eq!(ScreenId::Products.next(), ScreenId::Detail);
        assert_eq!(ScreenId::Detail.next(), ScreenId::Products);
        assert_eq!(ScreenId::Products.prev(), ScreenId::Detail);
    }

    #[test]
    fn login_is_not_a_tab() {
        assert!(!ScreenId::Login.in_tab_bar());
        assert!(ScreenId::Products.in_tab_bar());
    }
}
