pub mod question;
pub mod quiz;
pub mod quiz_result;
pub mod session;
pub mod user;

// Re-export models for easier access
pub use question::*;
pub use quiz::*;
pub use quiz_result::*;
pub use session::*;
pub use user::*;
