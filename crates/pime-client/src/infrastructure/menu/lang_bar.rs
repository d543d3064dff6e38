//! Language bar menu renderer.

use pime_core::domain::menu::{MenuItem, MenuRenderer};

/// Item is checked.
pub const LBMENUF_CHECKED: u32 = 0x1;
/// Item opens a submenu.
pub const LBMENUF_SUBMENU: u32 = 0x2;
/// Item is a separator line.
pub const LBMENUF_SEPARATOR: u32 = 0x4;
/// Item is disabled.
pub const LBMENUF_GRAYED: u32 = 0x10;

/// One entry of a language bar menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LangBarMenuEntry {
    pub id: u32,
    pub text: String,
    pub flags: u32,
    pub submenu: Vec<LangBarMenuEntry>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LangBarMenuRenderer;

impl LangBarMenuRenderer {
    fn entry(&self, item: &MenuItem) -> LangBarMenuEntry {
        if item.is_separator() {
            return LangBarMenuEntry {
                id: 0,
                text: String::new(),
                flags: LBMENUF_SEPARATOR,
                submenu: Vec::new(),
            };
        }

        let mut flags = 0;
        if item.checked {
            flags |= LBMENUF_CHECKED;
        }
        if !item.enabled {
            flags |= LBMENUF_GRAYED;
        }
        let submenu = match &item.submenu {
            Some(children) => {
                flags |= LBMENUF_SUBMENU;
                self.render(children)
            }
            None => Vec::new(),
        };
        LangBarMenuEntry {
            id: item.id,
            text: item.text.clone(),
            flags,
            submenu,
        }
    }
}

impl MenuRenderer for LangBarMenuRenderer {
    type Output = Vec<LangBarMenuEntry>;

    fn render(&self, items: &[MenuItem]) -> Self::Output {
        items.iter().map(|item| self.entry(item)).collect()
    }
}
