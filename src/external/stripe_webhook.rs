//! Stripe webhook 签名校验与事件解码
//!
//! 签名头格式: `t=<timestamp>,v1=<hex hmac>[,v1=...][,v0=...]`,
//! 签名内容为 `"{t}.{raw body}"`, 密钥为 endpoint 的 `whsec_...`。

use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("missing Stripe-Signature header")]
    MissingHeader,
    #[error("malformed Stripe-Signature header")]
    MalformedHeader,
    #[error("timestamp outside tolerance ({0}s)")]
    TimestampOutOfTolerance(i64),
    #[error("signature mismatch")]
    SignatureMismatch,
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

impl WebhookError {
    /// 除 payload 解析失败外, 其余都属于签名错误
    pub fn is_signature_error(&self) -> bool {
        !matches!(self, WebhookError::InvalidPayload(_))
    }
}

#[derive(Debug, Clone)]
pub struct SignatureHeader {
    pub timestamp: i64,
    pub v1_signatures: Vec<Vec<u8>>,
}

impl SignatureHeader {
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        if header.trim().is_empty() {
            return Err(WebhookError::MissingHeader);
        }

        let mut timestamp: Option<i64> = None;
        let mut v1_signatures = Vec::new();

        for part in header.split(',') {
            let (key, value) = part
                .split_once('=')
                .ok_or(WebhookError::MalformedHeader)?;
            match key.trim() {
                "t" => {
                    timestamp = Some(
                        value
                            .trim()
                            .parse()
                            .map_err(|_| WebhookError::MalformedHeader)?,
                    );
                }
                "v1" => {
                    let value = value.trim();
                    if value.is_empty() {
                        return Err(WebhookError::MalformedHeader);
                    }
                    v1_signatures
                        .push(hex::decode(value).map_err(|_| WebhookError::MalformedHeader)?);
                }
                // v0 等其他 scheme 忽略
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or(WebhookError::MalformedHeader)?;
        if v1_signatures.is_empty() {
            return Err(WebhookError::MalformedHeader);
        }

        Ok(Self {
            timestamp,
            v1_signatures,
        })
    }
}

/// 计算 `t.payload` 的 HMAC-SHA256 签名
pub fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> Vec<u8> {
    // HMAC 接受任意长度的 key, new_from_slice 不会失败
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return Vec::new(),
    };
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

/// 校验签名, `now` 由调用方提供便于测试
pub fn verify_signature_at(
    payload: &[u8],
    header: Option<&str>,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> Result<(), WebhookError> {
    let header = SignatureHeader::parse(header.ok_or(WebhookError::MissingHeader)?)?;

    // t 来自未认证的请求头, 极端值不能溢出
    if now.abs_diff(header.timestamp) > tolerance_secs.unsigned_abs() {
        return Err(WebhookError::TimestampOutOfTolerance(tolerance_secs));
    }

    let expected = compute_signature(secret, header.timestamp, payload);
    if expected.is_empty() {
        return Err(WebhookError::SignatureMismatch);
    }

    let matched = header
        .v1_signatures
        .iter()
        .any(|sig| sig.len() == expected.len() && bool::from(expected.ct_eq(sig)));
    if !matched {
        return Err(WebhookError::SignatureMismatch);
    }

    Ok(())
}

/// 校验签名并解码为 [`WebhookEvent`]
pub fn construct_event(
    payload: &[u8],
    header: Option<&str>,
    secret: &str,
    tolerance_secs: i64,
) -> Result<WebhookEvent, WebhookError> {
    verify_signature_at(payload, header, secret, tolerance_secs, Utc::now().timestamp())?;
    WebhookEvent::from_slice(payload)
}

/// Stripe 对象引用: 可能是 id 字符串, 也可能是展开后的对象
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ObjectRef {
    Id(String),
    Object { id: String },
}

impl ObjectRef {
    fn into_id(self) -> String {
        match self {
            ObjectRef::Id(id) => id,
            ObjectRef::Object { id } => id,
        }
    }
}

fn opt_ref<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<ObjectRef>::deserialize(deserializer)?.map(ObjectRef::into_id))
}

fn required_ref<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(ObjectRef::deserialize(deserializer)?.into_id())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSessionSnapshot {
    pub id: String,
    pub mode: String,
    #[serde(default, deserialize_with = "opt_ref")]
    pub customer: Option<String>,
    #[serde(default, deserialize_with = "opt_ref")]
    pub payment_intent: Option<String>,
    #[serde(default, deserialize_with = "opt_ref")]
    pub subscription: Option<String>,
    #[serde(default)]
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
}

impl CheckoutSessionSnapshot {
    pub fn is_subscription(&self) -> bool {
        self.mode == "subscription"
    }

    /// 支付台账的幂等键: payment intent, 订阅模式没有 intent 时退回 session id
    pub fn payment_key(&self) -> String {
        payment_key(self.payment_intent.as_deref(), &self.id)
    }
}

pub fn payment_key(payment_intent: Option<&str>, session_id: &str) -> String {
    match payment_intent {
        Some(pi) if !pi.is_empty() => pi.to_string(),
        _ => session_id.to_string(),
    }
}

#[derive(Debug, Clone, Deserialize)]
struct SubscriptionItemPeriod {
    #[serde(default)]
    current_period_start: Option<i64>,
    #[serde(default)]
    current_period_end: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SubscriptionItems {
    #[serde(default)]
    data: Vec<SubscriptionItemPeriod>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawSubscription {
    id: String,
    #[serde(deserialize_with = "required_ref")]
    customer: String,
    status: String,
    #[serde(default)]
    current_period_start: Option<i64>,
    #[serde(default)]
    current_period_end: Option<i64>,
    #[serde(default)]
    items: SubscriptionItems,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawSubscription")]
pub struct SubscriptionSnapshot {
    pub id: String,
    pub customer: String,
    pub status: String,
    pub current_period_start: Option<i64>,
    pub current_period_end: Option<i64>,
}

impl From<RawSubscription> for SubscriptionSnapshot {
    fn from(raw: RawSubscription) -> Self {
        // 新版 API 把计费周期挪到了 subscription item 上
        let first_item = raw.items.data.first();
        Self {
            current_period_start: raw
                .current_period_start
                .or_else(|| first_item.and_then(|i| i.current_period_start)),
            current_period_end: raw
                .current_period_end
                .or_else(|| first_item.and_then(|i| i.current_period_end)),
            id: raw.id,
            customer: raw.customer,
            status: raw.status,
        }
    }
}

#[derive(Debug, Deserialize)]
struct EventEnvelope {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type")]
    event_type: String,
    data: EventData,
}

#[derive(Debug, Deserialize)]
struct EventData {
    object: serde_json::Value,
}

/// 本服务关心的 Stripe 事件, 其余归入 `Unhandled`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    CheckoutSessionCompleted(CheckoutSessionSnapshot),
    SubscriptionCreated(SubscriptionSnapshot),
    SubscriptionUpdated(SubscriptionSnapshot),
    SubscriptionDeleted(SubscriptionSnapshot),
    Unhandled(String),
}

impl WebhookEvent {
    pub fn from_slice(payload: &[u8]) -> Result<Self, WebhookError> {
        let envelope: EventEnvelope = serde_json::from_slice(payload)
            .map_err(|e| WebhookError::InvalidPayload(e.to_string()))?;

        log::debug!(
            "Decoding Stripe event {} ({})",
            envelope.id.as_deref().unwrap_or("-"),
            envelope.event_type
        );

        let object = envelope.data.object;
        let decode_err = |e: serde_json::Error| WebhookError::InvalidPayload(e.to_string());

        let event = match envelope.event_type.as_str() {
            "checkout.session.completed" => {
                WebhookEvent::CheckoutSessionCompleted(serde_json::from_value(object).map_err(decode_err)?)
            }
            "customer.subscription.created" => {
                WebhookEvent::SubscriptionCreated(serde_json::from_value(object).map_err(decode_err)?)
            }
            "customer.subscription.updated" => {
                WebhookEvent::SubscriptionUpdated(serde_json::from_value(object).map_err(decode_err)?)
            }
            "customer.subscription.deleted" => {
                WebhookEvent::SubscriptionDeleted(serde_json::from_value(object).map_err(decode_err)?)
            }
            other => WebhookEvent::Unhandled(other.to_string()),
        };

        Ok(event)
    }

    pub fn event_type(&self) -> &str {
        match self {
            WebhookEvent::CheckoutSessionCompleted(_) => "checkout.session.completed",
            WebhookEvent::SubscriptionCreated(_) => "customer.subscription.created",
            WebhookEvent::SubscriptionUpdated(_) => "customer.subscription.updated",
            WebhookEvent::SubscriptionDeleted(_) => "customer.subscription.deleted",
            WebhookEvent::Unhandled(t) => t,
        }
    }
}
