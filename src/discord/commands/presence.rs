// Bot presence, set once the gateway reports ready.

use poise::serenity_prelude as serenity;

const DEFAULT_ACTIVITY: &str = "your commands!";

/// Shows "Listening to your commands!" in the member list.
pub fn on_ready(ctx: &serenity::Context) {
    let activity = serenity::ActivityData::listening(DEFAULT_ACTIVITY);
    ctx.set_presence(Some(activity), serenity::OnlineStatus::Online);
}
