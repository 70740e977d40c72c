use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;

use chrono::Utc;

use crate::models::{NewUser, User, UserInput};

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    last_insert_rowid: i64,
}

/// Inserts a new user and returns the stored row.
pub fn insert_user(
    conn: &mut SqliteConnection,
    new_user: UserInput,
) -> Result<User, diesel::result::Error> {
    use crate::schema::users::dsl::*;

    let insertable_user = NewUser {
        email: new_user.email,
        username: new_user.username,
        password_hash: new_user.password_hash,
        is_admin: new_user.is_admin,
        created_at: Utc::now().naive_utc(),
    };

    diesel::insert_into(users)
        .values(&insertable_user)
        .execute(conn)?;

    let last_id = diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
        .get_result::<LastInsertRowId>(conn)?
        .last_insert_rowid;

    users.filter(id.eq(last_id as i32)).first::<User>(conn)
}

/// Returns all users in ascending order by id.
pub fn list_all_users(conn: &mut SqliteConnection) -> Result<Vec<User>, diesel::result::Error> {
    use crate::schema::users::dsl::*;
    users.order(id.asc()).load::<User>(conn)
}

/// Gets a single user by ID.
pub fn get_user(conn: &mut SqliteConnection, user_id: i32) -> Result<Option<User>, diesel::result::Error> {
    use crate::schema::users::dsl::*;
    users.filter(id.eq(user_id)).first::<User>(conn).optional()
}

/// Gets a single user by email (case-insensitive).
pub fn get_user_by_email(
    conn: &mut SqliteConnection,
    user_email: &str,
) -> Result<Option<User>, diesel::result::Error> {
    // Use raw SQL with parameter binding for case-insensitive search
    diesel::sql_query("SELECT * FROM users WHERE LOWER(email) = LOWER(?)")
        .bind::<diesel::sql_types::Text, _>(user_email)
        .get_result::<User>(conn)
        .optional()
}

/// Gets a single user by username (exact match).
pub fn get_user_by_username(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<Option<User>, diesel::result::Error> {
    use crate::schema::users::dsl::*;
    users.filter(username.eq(name)).first::<User>(conn).optional()
}

/// Updates a user's fields. All fields are optional - only provided fields
/// will be updated.
pub fn update_user(
    conn: &mut SqliteConnection,
    user_id: i32,
    new_email: Option<String>,
    new_username: Option<String>,
    new_password_hash: Option<String>,
    new_is_admin: Option<bool>,
) -> Result<User, diesel::result::Error> {
    use crate::schema::users::dsl::*;

    // Update each field individually if provided
    if let Some(email_val) = new_email {
        diesel::update(users.filter(id.eq(user_id)))
            .set(email.eq(email_val))
            .execute(conn)?;
    }

    if let Some(username_val) = new_username {
        diesel::update(users.filter(id.eq(user_id)))
            .set(username.eq(username_val))
            .execute(conn)?;
    }

    if let Some(password_val) = new_password_hash {
        diesel::update(users.filter(id.eq(user_id)))
            .set(password_hash.eq(password_val))
            .execute(conn)?;
    }

    if let Some(admin_val) = new_is_admin {
        diesel::update(users.filter(id.eq(user_id)))
            .set(is_admin.eq(admin_val))
            .execute(conn)?;
    }

    // Return the updated user
    users.filter(id.eq(user_id)).first::<User>(conn)
}

/// Deletes a user and their dependent rows (sessions, results).
///
/// Quizzes the user authored survive with `created_by` cleared, matching
/// the nullable foreign key. Runs in one transaction.
///
/// # Returns
/// * `Ok(usize)` - Number of users deleted (1 if the user existed, 0 if not)
pub fn delete_user_with_cleanup(
    conn: &mut SqliteConnection,
    target_user_id: i32,
) -> Result<usize, diesel::result::Error> {
    use crate::schema::{quiz_results, quizzes, sessions, users};

    conn.transaction(|conn| {
        diesel::update(quizzes::table.filter(quizzes::created_by.eq(target_user_id)))
            .set(quizzes::created_by.eq(None::<i32>))
            .execute(conn)?;
        diesel::delete(sessions::table.filter(sessions::user_id.eq(target_user_id)))
            .execute(conn)?;
        diesel::delete(quiz_results::table.filter(quiz_results::user_id.eq(target_user_id)))
            .execute(conn)?;
        diesel::delete(users::table.filter(users::id.eq(target_user_id))).execute(conn)
    })
}
