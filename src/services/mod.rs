pub mod attendance_service;
pub mod auth_service;
pub mod catalog_service;
pub mod checkout_service;
pub mod customer_service;
pub mod event_service;
pub mod gym_service;
pub mod mentor_service;
pub mod payment_service;
pub mod reconcile_service;
pub mod user_service;

pub use attendance_service::*;
pub use auth_service::*;
pub use catalog_service::*;
pub use checkout_service::*;
pub use customer_service::*;
pub use event_service::*;
pub use gym_service::*;
pub use mentor_service::*;
pub use payment_service::*;
pub use reconcile_service::*;
pub use user_service::*;
