use diesel::prelude::*;
use dotenvy::dotenv;
use rocket::Rocket;
use rocket::fairing::AdHoc;

use crate::models::UserInput;
use crate::orm::DbConn;
use crate::orm::login::hash_password;
use crate::orm::user::{get_user_by_email, insert_user};

/// Add a default admin user if needed.
///
/// Set the default admin credentials with the QUIZDECK_DEFAULT_EMAIL,
/// QUIZDECK_DEFAULT_USERNAME and QUIZDECK_DEFAULT_PASSWORD envars.
pub fn admin_init_fairing() -> AdHoc {
    AdHoc::try_on_ignite("Admin User Initialization", |rocket| async {
        dotenv().ok();

        let conn = match DbConn::get_one(&rocket).await {
            Some(conn) => conn,
            None => {
                error!("[admin-init] ERROR: Could not get DB connection.");
                return Err(rocket);
            }
        };

        let admin_email = std::env::var("QUIZDECK_DEFAULT_EMAIL")
            .unwrap_or_else(|_| "admin@quizdeck.io".to_string());

        match conn
            .run(move |c| create_admin_user_if_needed(c, &admin_email))
            .await
        {
            Ok(()) => Ok(rocket),
            Err(e) => {
                error!("[admin-init] ERROR creating admin user: {:?}", e);
                Err(rocket)
            }
        }
    })
}

fn create_admin_user_if_needed(
    conn: &mut SqliteConnection,
    admin_email: &str,
) -> Result<(), diesel::result::Error> {
    if get_user_by_email(conn, admin_email)?.is_some() {
        info!("[admin-init] Admin user '{}' already exists", admin_email);
        return Ok(());
    }

    let admin_username = std::env::var("QUIZDECK_DEFAULT_USERNAME")
        .unwrap_or_else(|_| "admin".to_string());
    let admin_password = std::env::var("QUIZDECK_DEFAULT_PASSWORD")
        .unwrap_or_else(|_| "admin".to_string());

    let user = insert_user(
        conn,
        UserInput {
            email: admin_email.to_string(),
            username: admin_username,
            password_hash: hash_password(&admin_password),
            is_admin: true,
        },
    )?;

    info!("[admin-init] Created admin user '{}' (ID: {})", user.email, user.id);
    Ok(())
}
