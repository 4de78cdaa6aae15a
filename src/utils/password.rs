use crate::error::{AppError, AppResult};
use bcrypt::{DEFAULT_COST, hash, verify};

const MIN_LENGTH: usize = 8;
const MAX_LENGTH: usize = 128;

/// 注册时的密码规则: 长度, 大小写与数字, 且不能包含用户名
pub fn validate_password(password: &str, username: &str) -> AppResult<()> {
    let length = password.chars().count();
    if !(MIN_LENGTH..=MAX_LENGTH).contains(&length) {
        return Err(AppError::ValidationError(format!(
            "Password must be between {MIN_LENGTH} and {MAX_LENGTH} characters"
        )));
    }

    let has_lowercase = password.chars().any(char::is_lowercase);
    let has_uppercase = password.chars().any(char::is_uppercase);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !has_lowercase || !has_uppercase || !has_digit {
        return Err(AppError::ValidationError(
            "Password must contain upper case, lower case letters and digits".to_string(),
        ));
    }

    let username = username.trim().to_lowercase();
    if username.len() >= 3 && password.to_lowercase().contains(&username) {
        return Err(AppError::ValidationError(
            "Password is too similar to the username".to_string(),
        ));
    }

    Ok(())
}

pub fn hash_password(password: &str) -> AppResult<String> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::InternalError(format!("密码哈希失败: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    verify(password, hash).map_err(|e| AppError::InternalError(format!("密码验证失败: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password() {
        assert!(validate_password("Squat2024", "sam").is_ok());
        assert!(validate_password("squat2024", "sam").is_err()); // 缺少大写
        assert!(validate_password("SQUAT2024", "sam").is_err()); // 缺少小写
        assert!(validate_password("SquatRack", "sam").is_err()); // 缺少数字
        assert!(validate_password("Sq12", "sam").is_err());
    }

    #[test]
    fn test_password_containing_username_rejected() {
        assert!(validate_password("Deadlift99x", "deadlift").is_err());
        assert!(validate_password("MyDEADLIFT1", "Deadlift").is_err());
        // 过短的用户名不参与比较
        assert!(validate_password("Abc12345", "ab").is_ok());
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hashed = hash_password("Squat2024").unwrap();
        assert!(verify_password("Squat2024", &hashed).unwrap());
        assert!(!verify_password("Bench2024", &hashed).unwrap());
    }
}
