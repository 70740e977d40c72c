pub mod leaderboard;
pub mod login;
pub mod logout;
pub mod quiz;
pub mod quiz_result;
pub mod session;
pub mod status;
pub mod user;

use rocket::Route;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(leaderboard::routes());
    routes.extend(login::routes());
    routes.extend(logout::routes());
    routes.extend(quiz::routes());
    routes.extend(quiz_result::routes());
    routes.extend(session::routes());
    routes.extend(status::routes());
    routes.extend(user::routes());
    routes
}
