//! Request guard capturing the client metadata a session is bound to.

use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest, Request};

/// Client IP address and user agent as presented on the current request.
///
/// Both fields are best-effort descriptive metadata: either can be absent,
/// and they are captured once at session creation and never updated.
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ClientInfo {
    type Error = std::convert::Infallible;

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        Outcome::Success(ClientInfo {
            ip_address: request.client_ip().map(|ip| ip.to_string()),
            user_agent: request
                .headers()
                .get_one("User-Agent")
                .map(|agent| agent.to_string()),
        })
    }
}
