//! The menu tree returned by `onMenu` and the renderer strategy trait.
//!
//! The server describes a button's menu as a JSON array:
//!
//! ```json
//! [
//!   {"id": 1, "text": "Traditional", "checked": true},
//!   {},
//!   {"id": 2, "text": "Options", "submenu": [{"id": 3, "text": "Big5 only", "enabled": false}]}
//! ]
//! ```
//!
//! An entry with id 0 and empty text (such as `{}` above) is a separator.
//! The host needs the menu in one of two native shapes (the language bar
//! menu or a classic popup menu); each is produced by a [`MenuRenderer`]
//! implementation chosen by the caller.

use serde::Serialize;
use serde_json::Value;

/// One node of the menu tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub id: u32,
    pub text: String,
    pub checked: bool,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submenu: Option<Vec<MenuItem>>,
}

impl Default for MenuItem {
    fn default() -> Self {
        Self {
            id: 0,
            text: String::new(),
            checked: false,
            enabled: true,
            submenu: None,
        }
    }
}

impl MenuItem {
    /// Creates a plain, enabled, unchecked item.
    pub fn new(id: u32, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            ..Self::default()
        }
    }

    /// A separator line.
    pub fn separator() -> Self {
        Self::default()
    }

    pub fn is_separator(&self) -> bool {
        self.id == 0 && self.text.is_empty()
    }

    /// Reads one item, applying the defaults for absent or mistyped fields.
    ///
    /// Returns `None` if `value` is not an object.
    pub fn from_value(value: &Value) -> Option<Self> {
        let fields = value.as_object()?;
        Some(Self {
            id: fields
                .get("id")
                .and_then(Value::as_u64)
                .and_then(|id| u32::try_from(id).ok())
                .unwrap_or(0),
            text: fields.get("text").and_then(Value::as_str).unwrap_or("").to_string(),
            checked: fields.get("checked").and_then(Value::as_bool).unwrap_or(false),
            enabled: fields.get("enabled").and_then(Value::as_bool).unwrap_or(true),
            submenu: fields.get("submenu").and_then(parse_menu),
        })
    }
}

/// Reads a menu from the `return` value of an `onMenu` reply.
///
/// Returns `None` when `value` is not an array.  Entries that are not
/// objects are skipped.
pub fn parse_menu(value: &Value) -> Option<Vec<MenuItem>> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(MenuItem::from_value).collect())
}

/// Turns the generic menu tree into one native menu shape.
pub trait MenuRenderer {
    /// The native menu produced.
    type Output;

    fn render(&self, items: &[MenuItem]) -> Self::Output;
}
