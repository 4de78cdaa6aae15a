pub mod stripe;
pub mod stripe_webhook;

pub use self::stripe::{
    CheckoutMode, CheckoutSessionParams, CouponInfo, CreatedSession, PaymentGateway, PriceParams,
    SessionDetails, SharedGateway, StripeService, SubscriptionDetails,
};
pub use self::stripe_webhook::{
    CheckoutSessionSnapshot, SubscriptionSnapshot, WebhookError, WebhookEvent,
};
