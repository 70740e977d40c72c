use clap::Subcommand;
use diesel::sqlite::SqliteConnection;
use quizdeck_api::models::UserInput;
use quizdeck_api::orm::login::hash_password;
use quizdeck_api::orm::user::{
    delete_user_with_cleanup, get_user_by_email, insert_user, list_all_users, update_user,
};
use regex::Regex;

use super::utils::{confirm, establish_connection, prompt_for_password};

#[derive(Subcommand)]
pub enum UserAction {
    #[command(about = "Add a new user")]
    Add {
        #[arg(short, long, help = "Email address")]
        email: String,
        #[arg(short, long, help = "Username")]
        username: String,
        #[arg(short, long, help = "Password (will be prompted securely if not provided)")]
        password: Option<String>,
        #[arg(long, help = "Grant admin privileges")]
        admin: bool,
    },
    #[command(about = "Change user password")]
    ChangePassword {
        #[arg(short, long, help = "Email address")]
        email: String,
        #[arg(short, long, help = "New password (will be prompted securely if not provided)")]
        password: Option<String>,
    },
    #[command(about = "List users, optionally filtered by search term")]
    Ls {
        #[arg(help = "Search term (regex by default, use -F for fixed string)")]
        search_term: Option<String>,
        #[arg(short = 'F', long = "fixed-string", help = "Treat search term as fixed string instead of regex")]
        fixed_string: bool,
    },
    #[command(about = "Remove users matching search term")]
    Rm {
        #[arg(help = "Search term to match users for removal (regex by default, use -F for fixed string)")]
        search_term: String,
        #[arg(short = 'F', long = "fixed-string", help = "Treat search term as fixed string instead of regex")]
        fixed_string: bool,
        #[arg(short = 'y', long = "yes", help = "Skip confirmation prompt")]
        yes: bool,
    },
}

pub fn handle_user_command(action: UserAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = establish_connection()?;
    handle_user_command_with_conn(&mut conn, action)
}

pub fn handle_user_command_with_conn(
    conn: &mut SqliteConnection,
    action: UserAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        UserAction::Add {
            email,
            username,
            password,
            admin,
        } => {
            add_user_impl(conn, &email, &username, password, admin)?;
        }
        UserAction::ChangePassword { email, password } => {
            change_password_impl(conn, &email, password)?;
        }
        UserAction::Ls { search_term, fixed_string } => {
            list_users_impl(conn, search_term, fixed_string)?;
        }
        UserAction::Rm { search_term, fixed_string, yes } => {
            remove_users_impl(conn, search_term, fixed_string, yes)?;
        }
    }
    Ok(())
}

pub fn add_user_impl(
    conn: &mut SqliteConnection,
    email: &str,
    username: &str,
    password: Option<String>,
    admin: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let password = match password {
        Some(p) => p,
        None => prompt_for_password()?,
    };

    let new_user = UserInput {
        email: email.to_string(),
        username: username.to_string(),
        password_hash: hash_password(&password),
        is_admin: admin,
    };

    let created_user = insert_user(conn, new_user)?;

    println!("User created successfully!");
    println!("ID: {}", created_user.id);
    println!("Email: {}", created_user.email);
    println!("Username: {}", created_user.username);
    println!("Admin: {}", created_user.is_admin);

    Ok(())
}

pub fn change_password_impl(
    conn: &mut SqliteConnection,
    email: &str,
    password: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let password = match password {
        Some(p) => p,
        None => prompt_for_password()?,
    };

    let user = get_user_by_email(conn, email)?
        .ok_or_else(|| format!("No user with email '{}'", email))?;
    update_user(conn, user.id, None, None, Some(hash_password(&password)), None)?;

    println!("Password changed successfully for user: {}", email);
    Ok(())
}

/// Filters users by email or username using the term as regex or fixed
/// string.
fn match_users(
    users: Vec<quizdeck_api::models::User>,
    term: &str,
    fixed_string: bool,
) -> Result<Vec<quizdeck_api::models::User>, Box<dyn std::error::Error>> {
    if fixed_string {
        Ok(users
            .into_iter()
            .filter(|user| user.email.contains(term) || user.username.contains(term))
            .collect())
    } else {
        let regex = Regex::new(term)
            .map_err(|e| format!("Invalid regex pattern '{}': {}", term, e))?;
        Ok(users
            .into_iter()
            .filter(|user| regex.is_match(&user.email) || regex.is_match(&user.username))
            .collect())
    }
}

pub fn list_users_impl(
    conn: &mut SqliteConnection,
    search_term: Option<String>,
    fixed_string: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let users = list_all_users(conn)?;

    let filtered_users = match search_term {
        Some(term) => match_users(users, &term, fixed_string)?,
        None => users,
    };

    if filtered_users.is_empty() {
        println!("No users found.");
    } else {
        println!("Users:");
        for user in filtered_users {
            println!(
                "  ID: {}, Email: {}, Username: {}, Admin: {}, Created: {}",
                user.id, user.email, user.username, user.is_admin, user.created_at
            );
        }
    }

    Ok(())
}

pub fn remove_users_impl(
    conn: &mut SqliteConnection,
    search_term: String,
    fixed_string: bool,
    yes: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let users = list_all_users(conn)?;
    let matching_users = match_users(users, &search_term, fixed_string)?;

    if matching_users.is_empty() {
        println!("No users found matching the search term.");
        return Ok(());
    }

    println!("Found {} user(s) matching the search term:", matching_users.len());
    for user in &matching_users {
        println!("  ID: {}, Email: {}, Username: {}", user.id, user.email, user.username);
    }

    if !yes
        && !confirm(&format!(
            "Are you sure you want to delete these {} user(s)?",
            matching_users.len()
        ))?
    {
        println!("Operation cancelled.");
        return Ok(());
    }

    let mut deleted_count = 0;
    let mut errors = Vec::new();

    for user in matching_users {
        match delete_user_with_cleanup(conn, user.id) {
            Ok(rows_affected) => {
                if rows_affected > 0 {
                    deleted_count += 1;
                    println!("Deleted user: {} (ID: {})", user.email, user.id);
                }
            }
            Err(e) => {
                errors.push(format!(
                    "Failed to delete user {} (ID: {}): {}",
                    user.email, user.id, e
                ));
            }
        }
    }

    println!("Successfully deleted {} user(s).", deleted_count);

    if !errors.is_empty() {
        println!("Errors encountered:");
        for error in errors {
            println!("  {}", error);
        }
        return Err("Some deletions failed".into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::{Argon2, PasswordHash, PasswordVerifier};
    use quizdeck_api::orm::testing::setup_test_db;

    #[test]
    fn test_add_user_impl() {
        let mut conn = setup_test_db();

        let result = add_user_impl(
            &mut conn,
            "cli_test@example.com",
            "cli_test",
            Some("cli_password".to_string()),
            false,
        );
        assert!(result.is_ok());

        let created_user = get_user_by_email(&mut conn, "cli_test@example.com")
            .expect("Failed to query created user")
            .expect("User should exist");

        assert_eq!(created_user.email, "cli_test@example.com");
        assert_eq!(created_user.username, "cli_test");
        assert!(!created_user.is_admin);

        // Verify password was hashed (not stored as plaintext)
        assert_ne!(created_user.password_hash, "cli_password");
        assert!(created_user.password_hash.starts_with("$argon2"));
    }

    #[test]
    fn test_add_user_impl_duplicate_email() {
        let mut conn = setup_test_db();

        add_user_impl(&mut conn, "dup@example.com", "dup1", Some("pw".to_string()), false)
            .expect("Failed to create first user");

        let result = add_user_impl(&mut conn, "dup@example.com", "dup2", Some("pw".to_string()), false);
        assert!(result.is_err());
    }

    #[test]
    fn test_change_password_impl() {
        let mut conn = setup_test_db();

        add_user_impl(
            &mut conn,
            "change@example.com",
            "change",
            Some("original_password".to_string()),
            false,
        )
        .expect("Failed to create user");

        let original_user = get_user_by_email(&mut conn, "change@example.com")
            .unwrap()
            .unwrap();
        let original_hash = original_user.password_hash.clone();

        let result =
            change_password_impl(&mut conn, "change@example.com", Some("new_password".to_string()));
        assert!(result.is_ok());

        let updated_user = get_user_by_email(&mut conn, "change@example.com")
            .unwrap()
            .unwrap();
        assert_ne!(updated_user.password_hash, original_hash);

        // Verify new password works
        let parsed_hash =
            PasswordHash::new(&updated_user.password_hash).expect("Failed to parse new hash");
        assert!(
            Argon2::default()
                .verify_password("new_password".as_bytes(), &parsed_hash)
                .is_ok()
        );
    }

    #[test]
    fn test_change_password_impl_nonexistent_user() {
        let mut conn = setup_test_db();

        let result =
            change_password_impl(&mut conn, "nonexistent@example.com", Some("pw".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_remove_users_impl_with_regex() {
        let mut conn = setup_test_db();

        add_user_impl(&mut conn, "alice@example.com", "alice", Some("pw".to_string()), false)
            .unwrap();
        add_user_impl(&mut conn, "bob@test.com", "bob", Some("pw".to_string()), false).unwrap();
        add_user_impl(&mut conn, "charlie@example.org", "charlie", Some("pw".to_string()), false)
            .unwrap();

        let result = remove_users_impl(&mut conn, "example\\.com$".to_string(), false, true);
        assert!(result.is_ok());

        let remaining_users = list_all_users(&mut conn).expect("Failed to list users");
        assert_eq!(remaining_users.len(), 2);
        assert_eq!(remaining_users[0].email, "bob@test.com");
        assert_eq!(remaining_users[1].email, "charlie@example.org");
    }

    #[test]
    fn test_remove_users_impl_invalid_regex() {
        let mut conn = setup_test_db();

        let result = remove_users_impl(&mut conn, "[invalid".to_string(), false, true);
        assert!(result.is_err());
    }

    #[test]
    fn test_handle_user_command_with_conn_ls() {
        let mut conn = setup_test_db();

        let action = UserAction::Ls {
            search_term: None,
            fixed_string: false,
        };
        let result = handle_user_command_with_conn(&mut conn, action);
        assert!(result.is_ok());
    }
}
