mod db;
pub mod leaderboard;
pub mod login;
pub mod logout;
pub mod question;
pub mod quiz;
pub mod quiz_result;
pub mod session;
#[cfg(any(test, feature = "test-staging"))]
pub mod testing;
pub mod user;

pub use db::*;
