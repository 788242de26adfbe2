//! Local store schema and record keys

/// SQL schema for initialization
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS records (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
";

/// Key holding the signed-in user (`null` when logged out)
pub const USER_KEY: &str = "cybersec_user";

/// Key holding the conversation list
pub const CHATS_KEY: &str = "cybersec_chats";
