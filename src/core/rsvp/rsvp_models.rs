// RSVP domain models.
//
// A board tracks, for one event message, who picked which option.
// Responders are stored as mention strings so the embed can list them as-is.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const CUSTOM_ID_PREFIX: &str = "rsvp_";

/// Placeholder value for an empty embed field (Discord rejects empty values).
pub const EMPTY_FIELD_VALUE: &str = "\u{200b}";

/// Button colour, mapped onto Discord button styles by the Discord layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RsvpStyle {
    Success,
    Primary,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsvpOption {
    pub key: String,
    pub label: String,
    pub style: RsvpStyle,
}

impl RsvpOption {
    pub fn new(key: &str, label: &str, style: RsvpStyle) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            style,
        }
    }

    /// Button custom id. Stable across restarts so old buttons keep working.
    pub fn custom_id(&self) -> String {
        format!("{}{}", CUSTOM_ID_PREFIX, self.key)
    }
}

/// Going / Maybe / Not Going.
pub fn default_options() -> Vec<RsvpOption> {
    vec![
        RsvpOption::new("going", "Going", RsvpStyle::Success),
        RsvpOption::new("maybe", "Maybe", RsvpStyle::Primary),
        RsvpOption::new("not_going", "Not Going", RsvpStyle::Danger),
    ]
}

/// Extract the option key from a button custom id, if it is an RSVP button.
pub fn parse_custom_id(custom_id: &str) -> Option<&str> {
    custom_id
        .strip_prefix(CUSTOM_ID_PREFIX)
        .filter(|key| !key.is_empty())
}

/// `not_going` -> `Not Going`
pub fn pretty_key(key: &str) -> String {
    key.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// What a button press did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RsvpToggle {
    /// The user was added to `key` (and removed from any other option).
    Added { key: String },
    /// The user had already picked `key`, so they were removed from it.
    Removed { key: String },
}

/// Responses for a single RSVP message: option key -> responder mentions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RsvpBoard {
    responses: HashMap<String, Vec<String>>,
}

impl RsvpBoard {
    /// Empty board with one (empty) list per option.
    pub fn new(options: &[RsvpOption]) -> Self {
        Self {
            responses: options
                .iter()
                .map(|opt| (opt.key.clone(), Vec::new()))
                .collect(),
        }
    }

    pub fn responders(&self, key: &str) -> &[String] {
        self.responses.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// A user is on at most one list. Picking the same option twice removes them.
    pub fn toggle(&mut self, key: &str, user_mention: &str) -> RsvpToggle {
        if let Some(list) = self.responses.get_mut(key) {
            if let Some(pos) = list.iter().position(|m| m == user_mention) {
                list.remove(pos);
                return RsvpToggle::Removed {
                    key: key.to_string(),
                };
            }
        }

        for list in self.responses.values_mut() {
            list.retain(|m| m != user_mention);
        }
        self.responses
            .entry(key.to_string())
            .or_default()
            .push(user_mention.to_string());

        RsvpToggle::Added {
            key: key.to_string(),
        }
    }
}

/// Plain embed field, independent of the Discord SDK types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Rebuild the field list of an RSVP embed.
///
/// Fields that are not RSVP lists (e.g. "Event Time") keep their order; the
/// RSVP lists are dropped and re-appended from the board, one inline field
/// per option.
pub fn merge_rsvp_fields(
    existing: Vec<EmbedField>,
    options: &[RsvpOption],
    board: &RsvpBoard,
) -> Vec<EmbedField> {
    let mut fields: Vec<EmbedField> = existing
        .into_iter()
        .filter(|field| !field.name.is_empty())
        .filter(|field| !options.iter().any(|opt| opt.label == field.name))
        .collect();

    fields.extend(options.iter().map(|opt| {
        let responders = board.responders(&opt.key);
        EmbedField {
            name: opt.label.clone(),
            value: if responders.is_empty() {
                EMPTY_FIELD_VALUE.to_string()
            } else {
                responders.join("\n")
            },
            inline: true,
        }
    }));

    fields
}
