use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable};
use serde::Serialize;
use ts_rs::TS;

use crate::schema::sessions;

/// A server-side login session. The `id` is the opaque token the client
/// presents in its cookie; it is generated once and never reused.
/// Sessions are deactivated (never deleted) on logout, bulk revocation, or
/// idle cleanup, and `is_active` never flips back to true.
#[derive(Queryable, Identifiable, Debug, Clone, Serialize, TS)]
#[diesel(table_name = sessions)]
#[ts(export)]
pub struct Session {
    pub id: String, // Opaque session token (UUID)
    pub user_id: i32,
    pub client_ip: Option<String>,
    pub client_agent: Option<String>,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    #[ts(type = "string")]
    pub last_activity: NaiveDateTime,
    pub is_active: bool,
}

#[derive(Insertable)]
#[diesel(table_name = sessions)]
pub struct NewSession {
    pub id: String,
    pub user_id: i32,
    pub client_ip: Option<String>,
    pub client_agent: Option<String>,
    pub created_at: NaiveDateTime,
    pub last_activity: NaiveDateTime,
    pub is_active: bool,
}

/// Session point-lookup with the owning user's name denormalized in, for
/// "manage devices" views and ownership checks.
#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct SessionInfo {
    pub id: String,
    pub user_id: i32,
    pub username: String,
    pub client_ip: Option<String>,
    pub client_agent: Option<String>,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    #[ts(type = "string")]
    pub last_activity: NaiveDateTime,
    pub is_active: bool,
}
