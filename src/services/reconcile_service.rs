use super::customer_service::{CustomerService, SubscriptionRecord};
use super::gym_service::find_gym;
use super::payment_service::{PaymentRecord, PaymentService};
use crate::entities::{
    PaymentStatus, PlanStatus, order_entity as orders, user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::external::stripe_webhook::payment_key;
use crate::external::{CheckoutMode, SharedGateway, SubscriptionDetails, SubscriptionSnapshot, WebhookEvent};
use crate::models::*;
use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, EntityTrait};
use uuid::Uuid;

/// Stripe 订阅状态 → 本地会员状态
///
/// 本地状态名同样会被接受并映射为自身, 重复映射结果不变
pub fn map_plan_status(status: &str) -> PlanStatus {
    match status {
        "active" | "trialing" => PlanStatus::Active,
        "canceled" | "incomplete_expired" | "expired" => PlanStatus::Expired,
        "past_due" | "pending" => PlanStatus::Pending,
        "inactive" => PlanStatus::Inactive,
        _ => PlanStatus::Unknown,
    }
}

fn from_timestamp(ts: Option<i64>) -> Option<DateTime<Utc>> {
    ts.and_then(|t| DateTime::from_timestamp(t, 0))
}

/// webhook 快照和主动查询的订阅统一成一种形状
#[derive(Debug, Clone)]
struct SubscriptionState {
    id: String,
    customer_id: String,
    status: PlanStatus,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

impl From<SubscriptionSnapshot> for SubscriptionState {
    fn from(s: SubscriptionSnapshot) -> Self {
        Self {
            status: map_plan_status(&s.status),
            start: from_timestamp(s.current_period_start),
            end: from_timestamp(s.current_period_end),
            id: s.id,
            customer_id: s.customer,
        }
    }
}

impl From<SubscriptionDetails> for SubscriptionState {
    fn from(s: SubscriptionDetails) -> Self {
        Self {
            status: map_plan_status(&s.status),
            start: from_timestamp(s.current_period_start),
            end: from_timestamp(s.current_period_end),
            id: s.id,
            customer_id: s.customer_id,
        }
    }
}

/// 把 Stripe 侧的事实 (webhook 事件、成功回调) 写入本地台账和会员表。
///
/// 两条路径可能针对同一笔交易先后到达, 所有写入都是按 Stripe id 的 upsert,
/// 重放任意次结果相同。
#[derive(Clone)]
pub struct ReconcileService {
    pool: DatabaseConnection,
    gateway: SharedGateway,
    payments: PaymentService,
    customers: CustomerService,
    currency: String,
}

impl ReconcileService {
    pub fn new(
        pool: DatabaseConnection,
        gateway: SharedGateway,
        payments: PaymentService,
        customers: CustomerService,
        currency: String,
    ) -> Self {
        Self {
            pool,
            gateway,
            payments,
            customers,
            currency,
        }
    }

    pub async fn handle_event(&self, event: WebhookEvent) -> AppResult<()> {
        match event {
            WebhookEvent::CheckoutSessionCompleted(session) => {
                let key = session.payment_key();
                if self.payments.mark_succeeded(&key).await? {
                    log::info!("Payment {key} marked succeeded by webhook");
                } else {
                    // 台账由成功回调写入, 这里不补建
                    log::info!("No local payment for {key} yet, skipping status update");
                }

                if session.is_subscription()
                    && let Some(subscription_id) = session.subscription.as_deref()
                {
                    let subscription = self.gateway.retrieve_subscription(subscription_id).await?;
                    self.sync_subscription(subscription.into()).await?;
                }
            }
            WebhookEvent::SubscriptionCreated(subscription) => {
                self.sync_subscription(subscription.into()).await?;
            }
            WebhookEvent::SubscriptionUpdated(subscription) => {
                let state = SubscriptionState::from(subscription);
                let updated = self
                    .customers
                    .update_subscription_state(&state.id, state.status, state.start, state.end)
                    .await?;
                match updated {
                    Some(c) => log::info!(
                        "Subscription {} updated, customer {} now {}",
                        state.id,
                        c.id,
                        c.plan_status
                    ),
                    None => self.sync_subscription(state).await?,
                }
            }
            WebhookEvent::SubscriptionDeleted(subscription) => {
                let removed = self.customers.delete_by_subscription(&subscription.id).await?;
                if removed == 0 {
                    log::info!("Subscription {} deleted, no local customer", subscription.id);
                } else {
                    log::info!(
                        "Subscription {} deleted, removed {removed} customer row(s)",
                        subscription.id
                    );
                }
            }
            WebhookEvent::Unhandled(event_type) => {
                log::info!("Ignoring Stripe event {event_type}");
            }
        }
        Ok(())
    }

    /// `GET /payment/payment-success/?session_id=` 的同步写入
    pub async fn handle_success(&self, session_id: &str) -> AppResult<PaymentSuccessResponse> {
        let session = self.gateway.retrieve_session(session_id).await?;
        let customer_id = session.customer_id.as_deref().ok_or_else(|| {
            AppError::ValidationError("Checkout session has no customer".to_string())
        })?;

        let metadata = self.fetch_metadata(customer_id).await?;
        let (gym_id, user_id) = self.resolve_parties(&metadata).await?;

        let payment = self
            .payments
            .upsert_payment(PaymentRecord {
                user_id,
                gym_id,
                username: metadata.username.clone(),
                first_name: metadata.first_name.clone(),
                last_name: metadata.last_name.clone(),
                plan_name: metadata.plan_name.clone(),
                amount_cents: session.amount_total.unwrap_or_default(),
                currency: session
                    .currency
                    .clone()
                    .unwrap_or_else(|| self.currency.clone()),
                status: PaymentStatus::Succeeded,
                stripe_payment_id: payment_key(session.payment_intent_id.as_deref(), &session.id),
                stripe_session_id: Some(session.id.clone()),
            })
            .await?;

        let customer = match (session.mode, session.subscription_id.as_deref()) {
            (CheckoutMode::Subscription, Some(subscription_id)) => {
                let subscription = self.gateway.retrieve_subscription(subscription_id).await?;
                let record =
                    Self::subscription_record(subscription.into(), &metadata, gym_id, user_id);
                Some(self.customers.upsert_from_subscription(record).await?)
            }
            _ => None,
        };

        log::info!(
            "Checkout session {} recorded as payment {}",
            session.id,
            payment.stripe_payment_id
        );

        Ok(PaymentSuccessResponse {
            message: "Payment successful".to_string(),
            payment: PaymentResponse::from(payment),
            customer: customer.map(CustomerResponse::from),
        })
    }

    /// 货到付款的跳转只确认订单存在
    pub async fn confirm_order(&self, order_id: Uuid) -> AppResult<OrderResponse> {
        let order = orders::Entity::find_by_id(order_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
        Ok(OrderResponse::from(order))
    }

    async fn sync_subscription(&self, state: SubscriptionState) -> AppResult<()> {
        let metadata = self.fetch_metadata(&state.customer_id).await?;
        let (gym_id, user_id) = self.resolve_parties(&metadata).await?;
        let subscription_id = state.id.clone();

        let customer = self
            .customers
            .upsert_from_subscription(Self::subscription_record(state, &metadata, gym_id, user_id))
            .await?;

        log::info!(
            "Subscription {subscription_id} synced to customer {} ({})",
            customer.id,
            customer.plan_status
        );
        Ok(())
    }

    fn subscription_record(
        state: SubscriptionState,
        metadata: &CheckoutMetadata,
        gym_id: Uuid,
        user_id: Option<Uuid>,
    ) -> SubscriptionRecord {
        SubscriptionRecord {
            stripe_subscription_id: state.id,
            gym_id,
            user_id,
            username: metadata.username.clone(),
            first_name: metadata.first_name.clone(),
            last_name: metadata.last_name.clone(),
            plan_name: metadata.plan_name.clone(),
            plan_status: state.status,
            plan_start_date: state.start,
            plan_end_date: state.end,
        }
    }

    async fn fetch_metadata(&self, customer_id: &str) -> AppResult<CheckoutMetadata> {
        let map = self.gateway.retrieve_customer_metadata(customer_id).await?;
        Ok(CheckoutMetadata::from_map(&map))
    }

    /// metadata 中的 gym 必须存在; user 可以为空, 给出时也必须存在
    async fn resolve_parties(&self, metadata: &CheckoutMetadata) -> AppResult<(Uuid, Option<Uuid>)> {
        let gym_id = metadata
            .gym_uuid()
            .ok_or_else(|| AppError::NotFound("Gym not found".to_string()))?;
        let gym = find_gym(&self.pool, gym_id).await?;

        if metadata.user_id.trim().is_empty() {
            return Ok((gym.id, None));
        }

        let user_id = metadata
            .user_uuid()
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Ok((gym.id, Some(user.id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_plan_status_known_values() {
        assert_eq!(map_plan_status("active"), PlanStatus::Active);
        assert_eq!(map_plan_status("trialing"), PlanStatus::Active);
        assert_eq!(map_plan_status("canceled"), PlanStatus::Expired);
        assert_eq!(map_plan_status("incomplete_expired"), PlanStatus::Expired);
        assert_eq!(map_plan_status("past_due"), PlanStatus::Pending);
    }

    #[test]
    fn test_map_plan_status_is_total() {
        for s in ["", "unpaid", "incomplete", "paused", "ACTIVE", "cancelled", "🙂"] {
            assert_eq!(map_plan_status(s), PlanStatus::Unknown, "input {s:?}");
        }
    }

    #[test]
    fn test_map_plan_status_is_idempotent() {
        let inputs = [
            "active",
            "trialing",
            "canceled",
            "incomplete_expired",
            "past_due",
            "unpaid",
            "paused",
            "",
            "expired",
            "pending",
            "inactive",
            "unknown",
        ];
        for s in inputs {
            let once = map_plan_status(s);
            assert_eq!(map_plan_status(&once.to_string()), once, "input {s:?}");
        }

        // 每个输出都是不动点
        for status in [
            PlanStatus::Active,
            PlanStatus::Expired,
            PlanStatus::Inactive,
            PlanStatus::Pending,
            PlanStatus::Unknown,
        ] {
            assert_eq!(map_plan_status(&status.to_string()), status);
        }
    }

    #[test]
    fn test_subscription_state_from_snapshot() {
        let snapshot = SubscriptionSnapshot {
            id: "sub_abc".into(),
            customer: "cus_1".into(),
            status: "past_due".into(),
            current_period_start: Some(1_700_000_000),
            current_period_end: None,
        };
        let state = SubscriptionState::from(snapshot);
        assert_eq!(state.status, PlanStatus::Pending);
        assert_eq!(state.start.map(|d| d.timestamp()), Some(1_700_000_000));
        assert!(state.end.is_none());
        assert_eq!(state.customer_id, "cus_1");
    }
}
