use crate::entities::{PaymentStatus, order_entity as orders, payment_entity as payments};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// `POST /payment/` 请求体, 字段均可选, 由 service 做必填校验
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub stripe_price_id: Option<String>,
    pub product_type: Option<String>,
    pub gym_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub plan_name: Option<String>,
    pub product_id: Option<Uuid>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub country: Option<String>,
    pub pin_code: Option<String>,
    pub promo_code: Option<String>,
    pub payment_type: Option<String>,
}

impl CheckoutRequest {
    pub fn is_cod(&self) -> bool {
        self.payment_type.as_deref() == Some("cod")
    }
}

/// 写入 Stripe customer metadata 的买家信息, 回调时据此还原 gym/user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutMetadata {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub gym_id: String,
    pub user_id: String,
    pub plan_name: String,
    pub product_id: String,
    pub pin_code: String,
    pub address: String,
    pub phone_number: String,
    pub country: String,
    pub payment_type: String,
}

const NOT_AVAILABLE: &str = "N/A";

impl CheckoutMetadata {
    pub fn from_request(req: &CheckoutRequest) -> Self {
        let s = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            username: s(&req.username),
            first_name: s(&req.first_name),
            last_name: s(&req.last_name),
            gym_id: req.gym_id.map(|id| id.to_string()).unwrap_or_default(),
            user_id: req.user_id.map(|id| id.to_string()).unwrap_or_default(),
            plan_name: s(&req.plan_name),
            product_id: req.product_id.map(|id| id.to_string()).unwrap_or_default(),
            pin_code: s(&req.pin_code),
            address: s(&req.address),
            phone_number: s(&req.phone_number),
            country: s(&req.country),
            payment_type: s(&req.payment_type),
        }
    }

    pub fn into_map(self) -> HashMap<String, String> {
        HashMap::from([
            ("username".to_string(), self.username),
            ("first_name".to_string(), self.first_name),
            ("last_name".to_string(), self.last_name),
            ("gym_id".to_string(), self.gym_id),
            ("user_id".to_string(), self.user_id),
            ("plan_name".to_string(), self.plan_name),
            ("product_id".to_string(), self.product_id),
            ("pin_code".to_string(), self.pin_code),
            ("address".to_string(), self.address),
            ("phone_number".to_string(), self.phone_number),
            ("country".to_string(), self.country),
            ("payment_type".to_string(), self.payment_type),
        ])
    }

    /// 缺失的展示字段填 "N/A"
    pub fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |k: &str| map.get(k).cloned().unwrap_or_default();
        let display = |k: &str| {
            map.get(k)
                .filter(|v| !v.is_empty())
                .cloned()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string())
        };
        Self {
            username: display("username"),
            first_name: display("first_name"),
            last_name: display("last_name"),
            gym_id: get("gym_id"),
            user_id: get("user_id"),
            plan_name: display("plan_name"),
            product_id: get("product_id"),
            pin_code: get("pin_code"),
            address: get("address"),
            phone_number: get("phone_number"),
            country: get("country"),
            payment_type: get("payment_type"),
        }
    }

    pub fn gym_uuid(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.gym_id).ok()
    }

    pub fn user_uuid(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.user_id).ok()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum CheckoutResponse {
    Session {
        #[serde(rename = "sessionId")]
        session_id: String,
        #[serde(rename = "sessionUrl")]
        session_url: Option<String>,
        #[serde(rename = "successUrl")]
        success_url: String,
        #[serde(rename = "cancelUrl")]
        cancel_url: String,
    },
    CashOnDelivery {
        #[serde(rename = "successUrl")]
        success_url: String,
        message: String,
    },
}

#[derive(Debug, Deserialize)]
pub struct PaymentSuccessQuery {
    pub session_id: Option<String>,
    pub order_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub gym_id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub plan_name: String,
    pub amount_cents: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub stripe_payment_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<payments::Model> for PaymentResponse {
    fn from(p: payments::Model) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            gym_id: p.gym_id,
            username: p.username,
            first_name: p.first_name,
            last_name: p.last_name,
            plan_name: p.plan_name,
            amount_cents: p.amount_cents,
            currency: p.currency,
            status: p.status,
            stripe_payment_id: p.stripe_payment_id,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// 成功回调的结果: 台账记录, 订阅模式下附带会员行
#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentSuccessResponse {
    pub message: String,
    pub payment: PaymentResponse,
    pub customer: Option<crate::models::CustomerResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub gym_id: Uuid,
    pub user_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub plan_name: Option<String>,
    pub username: String,
    pub payment_type: String,
    pub created_at: DateTime<Utc>,
}

impl From<orders::Model> for OrderResponse {
    fn from(o: orders::Model) -> Self {
        Self {
            id: o.id,
            gym_id: o.gym_id,
            user_id: o.user_id,
            product_id: o.product_id,
            plan_name: o.plan_name,
            username: o.username,
            payment_type: o.payment_type,
            created_at: o.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PaymentListQuery {
    pub gym_id: Uuid,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// 前台手工录入 (现金等)
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatePaymentRequest {
    pub gym_id: Uuid,
    pub user_id: Option<Uuid>,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub plan_name: String,
    pub amount_cents: i64,
    pub currency: Option<String>,
    pub status: Option<PaymentStatus>,
    pub stripe_payment_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdatePaymentRequest {
    pub status: Option<PaymentStatus>,
    pub amount_cents: Option<i64>,
    pub plan_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_map_round_trip_and_defaults() {
        let req = CheckoutRequest {
            gym_id: Some(Uuid::nil()),
            username: Some("sam".into()),
            ..Default::default()
        };
        let map = CheckoutMetadata::from_request(&req).into_map();
        assert_eq!(map.len(), 12);
        let back = CheckoutMetadata::from_map(&map);
        assert_eq!(back.username, "sam");
        assert_eq!(back.first_name, "N/A");
        assert_eq!(back.gym_uuid(), Some(Uuid::nil()));
        assert_eq!(back.user_uuid(), None);
    }

    #[test]
    fn test_checkout_response_shape() {
        let resp = CheckoutResponse::Session {
            session_id: "cs_1".into(),
            session_url: Some("https://checkout.stripe.com/c/cs_1".into()),
            success_url: "s".into(),
            cancel_url: "c".into(),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["sessionId"], "cs_1");
        assert!(json.get("sessionUrl").is_some());
    }
}
