use twilight_http::Client;
use twilight_model::{
    guild::Permissions,
    id::{
        Id,
        marker::{GuildMarker, UserMarker},
    },
};

/// Resolve a member's effective guild-level permissions from their roles.
///
/// Channel overwrites are not applied.
pub async fn resolve_member_permissions(
    http: &Client,
    guild_id: Id<GuildMarker>,
    user_id: Id<UserMarker>,
) -> anyhow::Result<Permissions> {
    let member = http.guild_member(guild_id, user_id).await?.model().await?;
    let roles = http.roles(guild_id).await?.model().await?;

    let mut resolved = Permissions::empty();

    for role in roles {
        if role.id == guild_id.cast() || member.roles.contains(&role.id) {
            resolved |= role.permissions;
        }
    }

    Ok(resolved)
}

/// Check whether the bot account holds a permission (or administrator) in a guild.
pub async fn current_user_has_permission(
    http: &Client,
    guild_id: Id<GuildMarker>,
    required: Permissions,
) -> anyhow::Result<bool> {
    let current_user = http.current_user().await?.model().await?;
    let perms = resolve_member_permissions(http, guild_id, current_user.id).await?;

    Ok(grants(perms, required))
}

/// Whether a permission set grants `required`, treating `ADMINISTRATOR` as all permissions.
pub fn grants(perms: Permissions, required: Permissions) -> bool {
    perms.contains(Permissions::ADMINISTRATOR) || perms.contains(required)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn administrator_grants_everything() {
        assert!(grants(Permissions::ADMINISTRATOR, Permissions::MANAGE_MESSAGES));
        assert!(grants(
            Permissions::MANAGE_MESSAGES | Permissions::SEND_MESSAGES,
            Permissions::MANAGE_MESSAGES
        ));
        assert!(!grants(Permissions::SEND_MESSAGES, Permissions::MANAGE_MESSAGES));
    }
}
