// Naming rules for event team provisioning.
//
// Every team gets a private category, a role that can see it, and one text
// plus one voice channel inside it. Removal finds those pieces again by name,
// so both directions must go through `TeamLayout`.

const ROLE_SUFFIX: &str = "_role";

/// Names of every Discord object that belongs to one team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamLayout {
    pub team_name: String,
    pub category_name: String,
    pub role_name: String,
    pub text_channel: String,
    pub voice_channel: String,
}

impl TeamLayout {
    /// `Red Team` -> `=== Red Team ===`, `Red Team_role`, `red_team_chat`, `red_team_voice`
    pub fn for_team(team_name: &str) -> Self {
        let team_name = team_name.trim();
        let slug = team_name.to_lowercase().replace(' ', "_");

        Self {
            team_name: team_name.to_string(),
            category_name: format!("=== {} ===", team_name),
            role_name: format!("{}{}", team_name, ROLE_SUFFIX),
            text_channel: format!("{}_chat", slug),
            voice_channel: format!("{}_voice", slug),
        }
    }

    /// Recover the layout from a team role name (`Red Team_role`).
    pub fn from_role_name(role_name: &str) -> Self {
        Self::for_team(role_name.strip_suffix(ROLE_SUFFIX).unwrap_or(role_name))
    }

    /// The shared leaders area, which can also see every team category.
    pub fn leaders() -> Self {
        Self {
            team_name: "leaders".to_string(),
            category_name: "leaders".to_string(),
            role_name: format!("leaders{}", ROLE_SUFFIX),
            text_channel: "leaders_general".to_string(),
            voice_channel: "leaders_voice".to_string(),
        }
    }
}

/// Split a comma separated team list, dropping blanks.
pub fn parse_team_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
