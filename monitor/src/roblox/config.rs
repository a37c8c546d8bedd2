use presence_tracker::EntityId;

pub const AVATAR_URL: &str = "https://www.roblox.com/headshot-thumbnail/image";
pub const COOKIE_NAME: &str = ".ROBLOSECURITY";
pub const USER_AGENT: &str = "presence-monitor/0.1";

/// Seconds before an API request is abandoned.
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Headshot thumbnail for an account, as shown next to notifications.
pub fn avatar_url(entity_id: EntityId) -> String {
    format!(
        "{}?userId={}&width=150&height=150&format=png",
        AVATAR_URL, entity_id
    )
}

/// Cookie header value carrying the account credential.
pub fn auth_cookie(roblosecurity: &str) -> String {
    format!("{}={}", COOKIE_NAME, roblosecurity)
}
