pub mod attendance;
pub mod catalog;
pub mod customer;
pub mod event;
pub mod gym;
pub mod mentor;
pub mod pagination;
pub mod payment;
pub mod user;

pub use attendance::*;
pub use catalog::*;
pub use customer::*;
pub use event::*;
pub use gym::*;
pub use mentor::*;
pub use pagination::*;
pub use payment::*;
pub use user::*;
