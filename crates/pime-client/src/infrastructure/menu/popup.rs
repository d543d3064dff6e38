//! Classic popup menu renderer.
//!
//! The flags match the `MF_*` values of the Win32 `AppendMenu` call the host
//! makes for each entry.

use pime_core::domain::menu::{MenuItem, MenuRenderer};

pub const MF_STRING: u32 = 0x0;
pub const MF_GRAYED: u32 = 0x1;
pub const MF_CHECKED: u32 = 0x8;
pub const MF_POPUP: u32 = 0x10;
pub const MF_SEPARATOR: u32 = 0x800;

/// One entry of a popup menu.  `submenu` is non-empty only with `MF_POPUP`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupMenuEntry {
    pub id: u32,
    pub text: String,
    pub flags: u32,
    pub submenu: Vec<PopupMenuEntry>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PopupMenuRenderer;

impl MenuRenderer for PopupMenuRenderer {
    type Output = Vec<PopupMenuEntry>;

    fn render(&self, items: &[MenuItem]) -> Self::Output {
        items
            .iter()
            .map(|item| {
                if item.is_separator() {
                    return PopupMenuEntry {
                        id: 0,
                        text: String::new(),
                        flags: MF_SEPARATOR,
                        submenu: Vec::new(),
                    };
                }
                let mut flags = MF_STRING;
                if item.checked {
                    flags |= MF_CHECKED;
                }
                if !item.enabled {
                    flags |= MF_GRAYED;
                }
                let submenu = item
                    .submenu
                    .as_deref()
                    .map(|children| self.render(children))
                    .unwrap_or_default();
                if item.submenu.is_some() {
                    flags |= MF_POPUP;
                }
                PopupMenuEntry {
                    id: item.id,
                    text: item.text.clone(),
                    flags,
                    submenu,
                }
            })
            .collect()
    }
}
