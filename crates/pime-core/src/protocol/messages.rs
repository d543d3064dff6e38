//! All request and response types exchanged with the server.
//!
//! Every message is a JSON object.  Requests carry a `method` discriminant
//! plus method-specific fields; responses carry `seqNum`, `success`,
//! `return`, and any number of optional directive fields.
//!
//! # Serde representation
//!
//! ```json
//! {"seqNum":3,"method":"onKeyDown","charCode":97,"keyCode":65,"repeatCount":1,
//!  "scanCode":30,"isExtended":false,"keyStates":[0,0,...]}
//! {"seqNum":3,"success":true,"return":true,"compositionString":"a","compositionCursor":1}
//! ```
//!
//! # Lenient directive decoding
//!
//! The server is written in a dynamic language and occasionally sends a field
//! with an unexpected type.  A reply must not be rejected because one
//! directive is odd, so every directive field is decoded on its own: a field
//! with the wrong JSON type is treated as absent, and a list entry that does
//! not decode is dropped while its siblings are kept.  Only `seqNum` is
//! strict.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::domain::directive::Directive;

/// Number of entries in the keyboard state table sent with every key event.
pub const KEY_STATE_COUNT: usize = 256;

// ── Requests ──────────────────────────────────────────────────────────────────

/// A request as written to the input lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Assigned by the client when the request is built.
    #[serde(rename = "seqNum")]
    pub seq_num: u64,
    /// The method name and its fields, flattened into the same object.
    #[serde(flatten)]
    pub body: RequestBody,
}

/// Method-specific request payloads.
///
/// `tag = "method"` puts the variant name, camel-cased, in a `"method"` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "camelCase")]
pub enum RequestBody {
    /// One-time handshake sent before the first activation.
    #[serde(rename_all = "camelCase")]
    Init {
        /// Language profile GUID in lowercase braced form.
        id: String,
        #[serde(rename = "isWindows8Above")]
        is_windows8_above: bool,
        is_metro_app: bool,
        is_ui_less: bool,
        is_console: bool,
    },
    #[serde(rename_all = "camelCase")]
    OnActivate { is_keyboard_open: bool },
    OnDeactivate,
    FilterKeyDown(KeyEvent),
    OnKeyDown(KeyEvent),
    FilterKeyUp(KeyEvent),
    OnKeyUp(KeyEvent),
    OnPreservedKey { guid: String },
    OnCommand {
        id: u32,
        /// Numeric [`CommandType`] code.
        #[serde(rename = "type")]
        command_type: u32,
    },
    /// Asks the server for the menu of a language bar button.
    OnMenu { id: String },
    OnCompartmentChanged { guid: String },
    OnKeyboardStatusChanged { opened: bool },
    OnCompositionTerminated { forced: bool },
}

impl RequestBody {
    /// Returns the wire method name.
    pub fn method(&self) -> &'static str {
        match self {
            RequestBody::Init { .. } => "init",
            RequestBody::OnActivate { .. } => "onActivate",
            RequestBody::OnDeactivate => "onDeactivate",
            RequestBody::FilterKeyDown(_) => "filterKeyDown",
            RequestBody::OnKeyDown(_) => "onKeyDown",
            RequestBody::FilterKeyUp(_) => "filterKeyUp",
            RequestBody::OnKeyUp(_) => "onKeyUp",
            RequestBody::OnPreservedKey { .. } => "onPreservedKey",
            RequestBody::OnCommand { .. } => "onCommand",
            RequestBody::OnMenu { .. } => "onMenu",
            RequestBody::OnCompartmentChanged { .. } => "onCompartmentChanged",
            RequestBody::OnKeyboardStatusChanged { .. } => "onKeyboardStatusChanged",
            RequestBody::OnCompositionTerminated { .. } => "onCompositionTerminated",
        }
    }
}

/// A keyboard event as reported by the host input framework.
///
/// The fields are forwarded verbatim; mapping keys to characters is the
/// server's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyEvent {
    /// Character produced by the key under the current layout, or 0.
    pub char_code: u32,
    /// Virtual key code.
    pub key_code: u32,
    pub repeat_count: u32,
    pub scan_code: u32,
    pub is_extended: bool,
    /// The full keyboard state table (`KEY_STATE_COUNT` entries).
    pub key_states: Vec<u8>,
}

impl KeyEvent {
    /// Builds a key event from the host's fixed-size keyboard state table.
    pub fn new(
        char_code: u32,
        key_code: u32,
        repeat_count: u32,
        scan_code: u32,
        is_extended: bool,
        key_states: &[u8; KEY_STATE_COUNT],
    ) -> Self {
        Self {
            char_code,
            key_code,
            repeat_count,
            scan_code,
            is_extended,
            key_states: key_states.to_vec(),
        }
    }

    /// Convenience constructor for a plain key press with an all-zero state table.
    pub fn simple(char_code: u32, key_code: u32) -> Self {
        Self::new(char_code, key_code, 1, 0, false, &[0; KEY_STATE_COUNT])
    }
}

/// How a language bar button command was invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum CommandType {
    LeftClick = 0,
    RightClick = 1,
    Menu = 2,
}

impl CommandType {
    /// Returns the numeric code sent in the `type` field.
    pub fn code(self) -> u32 {
        self as u32
    }
}

// ── Responses ─────────────────────────────────────────────────────────────────

/// A reply picked out of the output lane.
///
/// Every directive field is optional; presence is what drives the
/// reconciler.  Use [`Response::directives`] to get them as an ordered batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub seq_num: u64,
    #[serde(default)]
    pub success: bool,
    /// Method-specific return value (a bool for key events, a menu tree for `onMenu`).
    #[serde(rename = "return", default)]
    pub return_value: Value,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub set_sel_keys: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub show_message: Option<ShowMessage>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub show_candidates: Option<bool>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub candidate_list: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub candidate_cursor: Option<i64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub commit_string: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub composition_string: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub composition_cursor: Option<i64>,
    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Option::is_none")]
    pub add_button: Option<Vec<ButtonDescriptor>>,
    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Option::is_none")]
    pub remove_button: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Option::is_none")]
    pub change_button: Option<Vec<ButtonDescriptor>>,
    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Option::is_none")]
    pub add_preserved_key: Option<Vec<PreservedKeyDescriptor>>,
    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Option::is_none")]
    pub remove_preserved_key: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub open_keyboard: Option<bool>,
    #[serde(
        rename = "customizeUI",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub customize_ui: Option<UiCustomization>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub hide_message: Option<bool>,
}

impl Response {
    /// Creates an empty successful reply for `seq_num`.
    pub fn success(seq_num: u64) -> Self {
        Self {
            seq_num,
            success: true,
            ..Self::default()
        }
    }

    /// Interprets `return` as the "key was consumed" flag; anything but `true` is `false`.
    pub fn return_bool(&self) -> bool {
        self.return_value.as_bool().unwrap_or(false)
    }

    /// Flattens the present directive fields into the batch order the
    /// reconciler applies them in.
    pub fn directives(&self) -> Vec<Directive> {
        let mut batch = Vec::new();

        if let Some(keys) = &self.set_sel_keys {
            batch.push(Directive::SetSelectionKeys(keys.clone()));
        }
        if let Some(message) = &self.show_message {
            batch.push(Directive::ShowMessage {
                text: message.message.clone(),
                duration: message.duration,
            });
        }
        if let Some(show) = self.show_candidates {
            batch.push(Directive::ShowCandidates(show));
        }
        if let Some(list) = &self.candidate_list {
            batch.push(Directive::CandidateList(list.clone()));
        }
        if let Some(cursor) = self.candidate_cursor {
            batch.push(Directive::CandidateCursor(cursor));
        }
        if let Some(text) = &self.commit_string {
            batch.push(Directive::CommitString(text.clone()));
        }
        if let Some(text) = &self.composition_string {
            batch.push(Directive::CompositionString(text.clone()));
        }
        if let Some(cursor) = self.composition_cursor {
            batch.push(Directive::CompositionCursor(cursor));
        }
        for button in self.add_button.iter().flatten() {
            batch.push(Directive::AddButton(button.clone()));
        }
        for id in self.remove_button.iter().flatten() {
            batch.push(Directive::RemoveButton(id.clone()));
        }
        for button in self.change_button.iter().flatten() {
            batch.push(Directive::ChangeButton(button.clone()));
        }
        for key in self.add_preserved_key.iter().flatten() {
            batch.push(Directive::AddPreservedKey(key.clone()));
        }
        for guid in self.remove_preserved_key.iter().flatten() {
            batch.push(Directive::RemovePreservedKey(guid.clone()));
        }
        if let Some(open) = self.open_keyboard {
            batch.push(Directive::KeyboardOpen(open));
        }
        if let Some(ui) = &self.customize_ui {
            batch.push(Directive::CustomizeUi(ui.clone()));
        }
        if self.hide_message.is_some() {
            batch.push(Directive::HideMessage);
        }

        batch
    }
}

/// Payload of the `showMessage` directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowMessage {
    pub message: String,
    /// How long the message stays up, in seconds.
    pub duration: u32,
}

/// Visual kind of a language bar button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonStyle {
    Button,
    Menu,
    Toggle,
}

/// A language bar button as described by `addButton` and `changeButton`.
///
/// `changeButton` entries only carry the fields that change, so everything
/// but `id` is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonDescriptor {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ButtonStyle>,
    /// Path to the icon file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toggled: Option<bool>,
}

/// One entry of `addPreservedKey`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreservedKeyDescriptor {
    /// GUID string identifying the shortcut; parsed when applied.
    pub guid: String,
    #[serde(default)]
    pub key_code: u32,
    #[serde(default)]
    pub modifiers: u32,
}

/// Payload of `customizeUI`; only the fields present are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiCustomization {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub cand_font_name: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub cand_font_size: Option<i32>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub cand_per_row: Option<i32>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub cand_use_cursor: Option<bool>,
}

// ── Lenient field decoders ────────────────────────────────────────────────────

/// Decodes a present field, mapping a type mismatch to `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    match serde_json::from_value(value) {
        Ok(decoded) => Ok(Some(decoded)),
        Err(e) => {
            debug!("ignoring directive field with unexpected type: {e}");
            Ok(None)
        }
    }
}

/// Decodes a present list field entry by entry, dropping entries that do not decode.
///
/// A value that is not an array at all is treated as absent.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        debug!("ignoring list directive that is not an array");
        return Ok(None);
    };
    let decoded = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("skipping malformed list entry: {e}");
                None
            }
        })
        .collect();
    Ok(Some(decoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serializes_method_and_seq_num_in_one_object() {
        // Arrange
        let req = Request {
            seq_num: 7,
            body: RequestBody::OnActivate {
                is_keyboard_open: true,
            },
        };

        // Act
        let value = serde_json::to_value(&req).unwrap();

        // Assert
        assert_eq!(
            value,
            json!({"seqNum": 7, "method": "onActivate", "isKeyboardOpen": true})
        );
    }

    #[test]
    fn test_init_request_uses_capability_field_names() {
        // Arrange
        let req = Request {
            seq_num: 0,
            body: RequestBody::Init {
                id: "{00000000-0000-0000-0000-000000000001}".to_string(),
                is_windows8_above: true,
                is_metro_app: false,
                is_ui_less: false,
                is_console: true,
            },
        };

        // Act
        let value = serde_json::to_value(&req).unwrap();

        // Assert
        assert_eq!(value["method"], "init");
        assert_eq!(value["isWindows8Above"], true);
        assert_eq!(value["isMetroApp"], false);
        assert_eq!(value["isUiLess"], false);
        assert_eq!(value["isConsole"], true);
    }

    #[test]
    fn test_key_event_request_carries_full_state_table() {
        // Arrange
        let mut states = [0u8; KEY_STATE_COUNT];
        states[0x10] = 0x80; // shift down
        let req = Request {
            seq_num: 2,
            body: RequestBody::FilterKeyDown(KeyEvent::new(65, 0x41, 1, 30, false, &states)),
        };

        // Act
        let value = serde_json::to_value(&req).unwrap();

        // Assert
        assert_eq!(value["method"], "filterKeyDown");
        assert_eq!(value["charCode"], 65);
        assert_eq!(value["keyCode"], 0x41);
        assert_eq!(value["repeatCount"], 1);
        assert_eq!(value["scanCode"], 30);
        assert_eq!(value["isExtended"], false);
        assert_eq!(value["keyStates"].as_array().unwrap().len(), KEY_STATE_COUNT);
        assert_eq!(value["keyStates"][0x10], 0x80);
    }

    #[test]
    fn test_on_deactivate_has_only_method_and_seq_num() {
        let req = Request {
            seq_num: 4,
            body: RequestBody::OnDeactivate,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value, json!({"seqNum": 4, "method": "onDeactivate"}));
    }

    #[test]
    fn test_command_request_uses_type_field() {
        let req = Request {
            seq_num: 1,
            body: RequestBody::OnCommand {
                id: 5,
                command_type: CommandType::RightClick.code(),
            },
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["type"], 1);
        assert_eq!(value["id"], 5);
    }

    #[test]
    fn test_method_name_matches_serialized_tag() {
        let bodies = [
            RequestBody::OnDeactivate,
            RequestBody::OnKeyUp(KeyEvent::simple(0, 0x20)),
            RequestBody::OnMenu { id: "mode".into() },
            RequestBody::OnCompositionTerminated { forced: true },
        ];
        for body in bodies {
            let value = serde_json::to_value(&body).unwrap();
            assert_eq!(value["method"], body.method());
        }
    }

    #[test]
    fn test_response_missing_success_defaults_to_false() {
        let resp: Response = serde_json::from_value(json!({"seqNum": 1})).unwrap();
        assert!(!resp.success);
        assert_eq!(resp.return_value, Value::Null);
    }

    #[test]
    fn test_response_decodes_directive_fields() {
        // Arrange
        let value = json!({
            "seqNum": 9,
            "success": true,
            "return": true,
            "setSelKeys": "1234567890",
            "showMessage": {"message": "中", "duration": 3},
            "candidateList": ["你", "妳"],
            "customizeUI": {"candFontSize": 16, "candPerRow": 5}
        });

        // Act
        let resp: Response = serde_json::from_value(value).unwrap();

        // Assert
        assert!(resp.return_bool());
        assert_eq!(resp.set_sel_keys.as_deref(), Some("1234567890"));
        assert_eq!(resp.show_message.unwrap().duration, 3);
        assert_eq!(resp.candidate_list.unwrap(), vec!["你", "妳"]);
        let ui = resp.customize_ui.unwrap();
        assert_eq!(ui.cand_font_size, Some(16));
        assert_eq!(ui.cand_font_name, None);
    }

    #[test]
    fn test_mistyped_directive_field_is_treated_as_absent() {
        // Arrange – compositionString is a number, which is invalid
        let value = json!({"seqNum": 1, "success": true, "compositionString": 12, "commitString": "ok"});

        // Act
        let resp: Response = serde_json::from_value(value).unwrap();

        // Assert
        assert_eq!(resp.composition_string, None);
        assert_eq!(resp.commit_string.as_deref(), Some("ok"));
    }

    #[test]
    fn test_malformed_list_entries_are_skipped_individually() {
        // Arrange – second entry lacks the required "id"
        let value = json!({
            "seqNum": 1,
            "addButton": [{"id": "a"}, {"text": "no id"}, {"id": "b", "style": "toggle"}],
            "removeButton": ["a", 3, "b"]
        });

        // Act
        let resp: Response = serde_json::from_value(value).unwrap();

        // Assert
        let ids: Vec<_> = resp.add_button.unwrap().into_iter().map(|b| b.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(resp.remove_button.unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_missing_seq_num_fails_to_decode() {
        let result: Result<Response, _> = serde_json::from_value(json!({"success": true}));
        assert!(result.is_err());
    }

    #[test]
    fn test_directives_follow_fixed_order_regardless_of_field_order() {
        // Arrange – JSON fields deliberately listed in reverse order
        let value = json!({
            "seqNum": 1,
            "hideMessage": true,
            "openKeyboard": false,
            "compositionCursor": 1,
            "compositionString": "ab",
            "commitString": "x",
            "showCandidates": true,
            "setSelKeys": "asdf"
        });
        let resp: Response = serde_json::from_value(value).unwrap();

        // Act
        let batch = resp.directives();

        // Assert
        assert_eq!(
            batch,
            vec![
                Directive::SetSelectionKeys("asdf".into()),
                Directive::ShowCandidates(true),
                Directive::CommitString("x".into()),
                Directive::CompositionString("ab".into()),
                Directive::CompositionCursor(1),
                Directive::KeyboardOpen(false),
                Directive::HideMessage,
            ]
        );
    }

    #[test]
    fn test_return_bool_is_false_for_non_bool_values() {
        let mut resp = Response::success(0);
        resp.return_value = json!([1, 2]);
        assert!(!resp.return_bool());
    }
}
