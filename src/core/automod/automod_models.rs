// Automod domain models.
//
// Pure data - the Discord layer decides how to apply an Outcome
// (delete the message, rename the member, post a notice).

use crate::core::moderation::WarningRecord;

/// Reason attached to warnings issued for a blacklisted message.
pub const MESSAGE_WARNING_REASON: &str = "Sending inappropriate messages (Automod)";

/// Reason attached to warnings issued for a blacklisted nickname.
pub const NICKNAME_WARNING_REASON: &str = "Inappropriate nickname or username (Automod)";

/// Nickname given to members whose display name was blacklisted.
pub const MODERATED_NICKNAME: &str = "Moderated Nickname";

/// Result of running a piece of user content through the filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing matched.
    Clean,
    /// The message matched. The caller deletes it and persists the warning.
    Violation { warning: WarningRecord },
    /// The display name matched. The caller renames the member to
    /// `replacement` and persists the warning.
    ViolationRename {
        warning: WarningRecord,
        replacement: String,
    },
}

/// Strip every character that is not an ASCII letter.
///
/// Applied identically to banned words and to input, so `e-v-i-l`,
/// `e.v.i.l` and `e v i l` all collapse onto `evil`.
pub fn normalize(input: &str) -> String {
    input.chars().filter(char::is_ascii_alphabetic).collect()
}

/// Like [`normalize`], but lookalike symbols touching a letter are read as
/// the letter they imitate (`b@d` -> `bad`, `h3ll0` -> `hello`).
///
/// Symbols with no letter beside them are dropped, so plain numbers such as
/// `room 101` are never read as letters.
pub fn fold_lookalikes(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let touches_letter = |i: usize| {
        (i > 0 && chars[i - 1].is_ascii_alphabetic())
            || chars.get(i + 1).is_some_and(|c| c.is_ascii_alphabetic())
    };

    chars
        .iter()
        .enumerate()
        .filter_map(|(i, &c)| {
            if c.is_ascii_alphabetic() {
                return Some(c);
            }
            lookalike(c).filter(|_| touches_letter(i))
        })
        .collect()
}

fn lookalike(c: char) -> Option<char> {
    match c {
        '@' | '4' => Some('a'),
        '8' => Some('b'),
        '3' => Some('e'),
        '1' | '!' | '|' => Some('i'),
        '0' => Some('o'),
        '$' | '5' => Some('s'),
        '7' | '+' => Some('t'),
        _ => None,
    }
}

/// Whether the text contains at least one ASCII letter.
///
/// Text without letters is never considered blacklisted.
pub fn has_letters(input: &str) -> bool {
    input.chars().any(|c| c.is_ascii_alphabetic())
}
