//! Native menu renderers for the server's menu tree.
//!
//! Both renderers consume the same [`MenuItem`](pime_core::domain::menu::MenuItem)
//! tree; the caller picks one depending on where the menu is shown.
//!
//! - **`lang_bar`** – Entries for the language bar button menu.
//! - **`popup`** – Entries for a classic popup (context) menu.

pub mod lang_bar;
pub mod popup;

pub use lang_bar::{LangBarMenuEntry, LangBarMenuRenderer};
pub use popup::{PopupMenuEntry, PopupMenuRenderer};
