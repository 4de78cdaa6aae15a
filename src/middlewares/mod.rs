pub mod auth;
pub mod cors;

pub use auth::{AuthMiddleware, AuthUser, bearer_token, current_user};
pub use cors::create_cors;
