//! Storefront areas and navigation destinations.
//!
//! The storefront is a static multi-page site: the home page lives at the
//! site root and every other page lives exactly one folder below it
//! (`login/`, `admin/`, `pharmacy/`, ...). Session routing therefore only
//! ever needs two pieces of path arithmetic: whether to climb out of the
//! current folder with `../`, and which folder to descend into.

use serde::{Deserialize, Serialize};

use crate::Role;

/// A storefront area, as reported by the hosting page context.
///
/// The host tells the session library which area the current document
/// belongs to; nothing in this crate inspects URL strings to find out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Area {
    /// The storefront home page at the site root.
    Root,
    /// The login page.
    Login,
    /// The registration page.
    Register,
    /// The admin dashboard.
    Admin,
    /// The pharmacy partner dashboard.
    Pharmacy,
    /// The signed-in customer dashboard.
    UserDashboard,
    /// Category listings.
    Categories,
    /// A product detail page.
    Product,
    /// The shopping cart.
    Cart,
    /// Saved delivery addresses.
    Addresses,
    /// Order tracking.
    Track,
    /// Checkout and payment.
    Pay,
    /// The fixed page shown to disabled accounts.
    Disabled,
}

impl Area {
    /// Whether this is one of the entry pages (login or registration) that
    /// an authenticated session should always be routed away from.
    #[must_use]
    pub const fn is_entry(self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }

    /// Whether the area lives in a subfolder below the site root.
    #[must_use]
    pub const fn is_nested(self) -> bool {
        !matches!(self, Self::Root)
    }
}

/// A navigation target selected by session routing.
///
/// Unlike [`Area`], which names every page the storefront has, a
/// `Destination` is only ever one of the places the session logic routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Destination {
    /// The storefront home page.
    Home,
    /// The admin dashboard.
    Admin,
    /// The pharmacy partner dashboard.
    Pharmacy,
    /// The login page.
    Login,
    /// The disabled-account page.
    Disabled,
}

impl Destination {
    /// The destination an authenticated role is routed to.
    #[must_use]
    pub const fn for_role(role: Role) -> Self {
        match role {
            Role::Admin => Self::Admin,
            Role::Pharmacy => Self::Pharmacy,
            Role::User => Self::Home,
        }
    }

    /// The area this destination lands in.
    #[must_use]
    pub const fn area(self) -> Area {
        match self {
            Self::Home => Area::Root,
            Self::Admin => Area::Admin,
            Self::Pharmacy => Area::Pharmacy,
            Self::Login => Area::Login,
            Self::Disabled => Area::Disabled,
        }
    }

    /// Relative href that reaches this destination from `from`.
    ///
    /// Nested areas climb out with `../` first; the home page renders as
    /// `./` when already at the root rather than an empty href.
    ///
    /// ```
    /// use pharma_direct_core::{Area, Destination};
    ///
    /// assert_eq!(Destination::Pharmacy.href_from(Area::Login), "../pharmacy/");
    /// assert_eq!(Destination::Admin.href_from(Area::Root), "admin/");
    /// assert_eq!(Destination::Home.href_from(Area::Root), "./");
    /// ```
    #[must_use]
    pub fn href_from(self, from: Area) -> String {
        let base = if from.is_nested() { "../" } else { "" };
        match self {
            Self::Home => {
                if base.is_empty() {
                    "./".to_owned()
                } else {
                    base.to_owned()
                }
            }
            Self::Admin => format!("{base}admin/"),
            Self::Pharmacy => format!("{base}pharmacy/"),
            Self::Login => format!("{base}login/"),
            Self::Disabled => format!("{base}disabled/"),
        }
    }
}
