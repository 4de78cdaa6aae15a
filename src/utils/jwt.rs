use crate::error::{AppError, AppResult};
use crate::entities::{mentor_entity as mentors, user_entity as users};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id (uuid)
    pub is_staff: bool,
    pub is_superuser: bool,
    pub exp: i64,
    pub iat: i64,
    pub token_type: String, // "access" / "refresh" / "mentor_access" / "mentor_refresh" / "password_reset"
    /// 重置令牌绑定的密码指纹, 密码一旦修改令牌即失效
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pwd: Option<String>,
}

impl Claims {
    pub fn user_id(&self) -> AppResult<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::AuthError("Invalid token subject".to_string()))
    }
}

/// 密码重置令牌有效期 (3 天)
const PASSWORD_RESET_TTL: i64 = 3 * 24 * 3600;

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expires_in: i64,
    refresh_token_expires_in: i64,
}

impl JwtService {
    pub fn new(secret: &str, access_expires_in: i64, refresh_expires_in: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expires_in: access_expires_in,
            refresh_token_expires_in: refresh_expires_in,
        }
    }

    fn sign(
        &self,
        sub: Uuid,
        is_staff: bool,
        is_superuser: bool,
        token_type: &str,
        ttl: i64,
        pwd: Option<String>,
    ) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(ttl);

        let claims = Claims {
            sub: sub.to_string(),
            is_staff,
            is_superuser,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            token_type: token_type.to_string(),
            pwd,
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(AppError::JwtError)
    }

    fn generate_token(&self, user: &users::Model, token_type: &str, ttl: i64) -> AppResult<String> {
        self.sign(user.id, user.is_staff, user.is_superuser, token_type, ttl, None)
    }

    pub fn generate_access_token(&self, user: &users::Model) -> AppResult<String> {
        self.generate_token(user, "access", self.access_token_expires_in)
    }

    pub fn generate_refresh_token(&self, user: &users::Model) -> AppResult<String> {
        self.generate_token(user, "refresh", self.refresh_token_expires_in)
    }

    /// 教练令牌使用独立的 token_type, 不能通过用户鉴权中间件
    pub fn generate_mentor_access_token(&self, mentor: &mentors::Model) -> AppResult<String> {
        self.sign(mentor.id, false, false, "mentor_access", self.access_token_expires_in, None)
    }

    pub fn generate_mentor_refresh_token(&self, mentor: &mentors::Model) -> AppResult<String> {
        self.sign(mentor.id, false, false, "mentor_refresh", self.refresh_token_expires_in, None)
    }

    pub fn generate_password_reset_token(
        &self,
        user: &users::Model,
        fingerprint: String,
    ) -> AppResult<String> {
        self.sign(user.id, false, false, "password_reset", PASSWORD_RESET_TTL, Some(fingerprint))
    }

    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(AppError::JwtError)
    }

    fn verify_typed(&self, token: &str, token_type: &str) -> AppResult<Claims> {
        let claims = self.verify_token(token)?;

        if claims.token_type != token_type {
            return Err(AppError::AuthError(format!(
                "Invalid {} token type",
                token_type.replace('_', " ")
            )));
        }

        Ok(claims)
    }

    pub fn verify_access_token(&self, token: &str) -> AppResult<Claims> {
        self.verify_typed(token, "access")
    }

    pub fn verify_refresh_token(&self, token: &str) -> AppResult<Claims> {
        self.verify_typed(token, "refresh")
    }

    pub fn verify_mentor_access_token(&self, token: &str) -> AppResult<Claims> {
        self.verify_typed(token, "mentor_access")
    }

    pub fn verify_mentor_refresh_token(&self, token: &str) -> AppResult<Claims> {
        self.verify_typed(token, "mentor_refresh")
    }

    pub fn verify_password_reset_token(&self, token: &str) -> AppResult<Claims> {
        self.verify_typed(token, "password_reset")
    }

    pub fn get_access_token_expires_in(&self) -> i64 {
        self.access_token_expires_in
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staff_user() -> users::Model {
        let now = Utc::now();
        users::Model {
            id: Uuid::new_v4(),
            username: "coach".to_string(),
            email: "coach@example.com".to_string(),
            password_hash: String::new(),
            first_name: "Ada".to_string(),
            last_name: "Lane".to_string(),
            phone_number: None,
            country: None,
            is_staff: true,
            is_superuser: false,
            is_logged_in: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_access_token_round_trip() {
        let jwt = JwtService::new("secret", 3600, 7200);
        let user = staff_user();
        let token = jwt.generate_access_token(&user).unwrap();
        let claims = jwt.verify_access_token(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), user.id);
        assert!(claims.is_staff);
        assert!(!claims.is_superuser);
    }

    #[test]
    fn test_refresh_token_is_not_access_token() {
        let jwt = JwtService::new("secret", 3600, 7200);
        let token = jwt.generate_refresh_token(&staff_user()).unwrap();
        assert!(jwt.verify_access_token(&token).is_err());
        assert!(jwt.verify_refresh_token(&token).is_ok());
    }

    #[test]
    fn test_token_signed_with_other_secret_rejected() {
        let issuer = JwtService::new("secret-a", 3600, 7200);
        let verifier = JwtService::new("secret-b", 3600, 7200);
        let token = issuer.generate_access_token(&staff_user()).unwrap();
        assert!(verifier.verify_access_token(&token).is_err());
    }

    #[test]
    fn test_mentor_tokens_are_separate_from_user_tokens() {
        let jwt = JwtService::new("secret", 3600, 7200);
        let now = Utc::now();
        let mentor = mentors::Model {
            id: Uuid::new_v4(),
            gym_id: Uuid::new_v4(),
            admin_id: Uuid::new_v4(),
            username: "coach_kim".to_string(),
            first_name: "Kim".to_string(),
            last_name: "Park".to_string(),
            expertise: "Boxing".to_string(),
            email: "kim@example.com".to_string(),
            phone_number: "+1 555 0101".to_string(),
            password_hash: String::new(),
            is_logged_in: false,
            created_at: now,
            updated_at: now,
        };

        let access = jwt.generate_mentor_access_token(&mentor).unwrap();
        assert_eq!(jwt.verify_mentor_access_token(&access).unwrap().user_id().unwrap(), mentor.id);
        assert!(jwt.verify_access_token(&access).is_err());

        let refresh = jwt.generate_mentor_refresh_token(&mentor).unwrap();
        assert!(jwt.verify_mentor_refresh_token(&refresh).is_ok());
        assert!(jwt.verify_refresh_token(&refresh).is_err());
        assert!(jwt.verify_mentor_access_token(&refresh).is_err());
    }

    #[test]
    fn test_password_reset_token_carries_fingerprint() {
        let jwt = JwtService::new("secret", 3600, 7200);
        let user = staff_user();
        let token = jwt
            .generate_password_reset_token(&user, "abc123".to_string())
            .unwrap();
        let claims = jwt.verify_password_reset_token(&token).unwrap();
        assert_eq!(claims.pwd.as_deref(), Some("abc123"));
        assert!(jwt.verify_access_token(&token).is_err());
    }
}
