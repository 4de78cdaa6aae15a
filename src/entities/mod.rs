pub mod attendance;
pub mod customers;
pub mod events;
pub mod gyms;
pub mod mentors;
pub mod orders;
pub mod payments;
pub mod products;
pub mod subscription_plans;
pub mod users;

pub use attendance as attendance_entity;
pub use customers as customer_entity;
pub use events as event_entity;
pub use gyms as gym_entity;
pub use mentors as mentor_entity;
pub use orders as order_entity;
pub use payments as payment_entity;
pub use products as product_entity;
pub use subscription_plans as subscription_plan_entity;
pub use users as user_entity;

pub use customers::PlanStatus;
pub use payments::PaymentStatus;
pub use subscription_plans::PlanInterval;
