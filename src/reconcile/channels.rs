//! Chat channel enablement (Telegram, Discord).

use super::{ReconcileReport, Rule};
use crate::env::Env;
use crate::error::Result;

use serde_json::Value;

const TELEGRAM_TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";
const DISCORD_TOKEN_VAR: &str = "DISCORD_BOT_TOKEN";
const DISCORD_GUILD_ID_VAR: &str = "DISCORD_GUILD_ID";

struct ChannelSpec {
    name: &'static str,
    /// Every variable here must be non-empty for the channel to be enabled.
    required_env: &'static [&'static str],
}

const CHANNELS: &[ChannelSpec] = &[
    ChannelSpec {
        name: "telegram",
        required_env: &[TELEGRAM_TOKEN_VAR],
    },
    // Discord bots are scoped to a guild, so a token alone is not enough.
    ChannelSpec {
        name: "discord",
        required_env: &[DISCORD_TOKEN_VAR, DISCORD_GUILD_ID_VAR],
    },
];

/// Enable the channel and its plugin entry for every channel whose
/// credentials are complete. Channels are never disabled here.
pub(super) fn apply(document: &mut Value, env: &Env, report: &mut ReconcileReport) -> Result<()> {
    for channel in CHANNELS {
        let missing: Vec<&str> = channel
            .required_env
            .iter()
            .copied()
            .filter(|key| !env.is_set(key))
            .collect();

        if !missing.is_empty() {
            if missing.len() < channel.required_env.len() {
                tracing::info!(
                    channel = channel.name,
                    missing = ?missing,
                    "channel credentials incomplete, not enabling"
                );
            }
            continue;
        }

        report.set(
            document,
            Rule::Channels,
            &["channels", channel.name, "enabled"],
            Value::Bool(true),
        )?;
        report.set(
            document,
            Rule::Channels,
            &["plugins", "entries", channel.name, "enabled"],
            Value::Bool(true),
        )?;
    }
    Ok(())
}
