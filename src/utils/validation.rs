use regex::Regex;
use crate::error::{AppError, AppResult};

fn compile(pattern: &str) -> AppResult<Regex> {
    Regex::new(pattern).map_err(|e| AppError::InternalError(format!("invalid regex: {e}")))
}

/// 验证邮箱格式
pub fn validate_email(email: &str) -> AppResult<()> {
    let email_regex = compile(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$")?;

    if email.len() > 254 || !email_regex.is_match(email) {
        return Err(AppError::ValidationError("Invalid email address".to_string()));
    }

    Ok(())
}

/// 用户名 3-50 个字符, 仅允许字母数字和 . _ -
pub fn validate_username(username: &str) -> AppResult<()> {
    let username_regex = compile(r"^[A-Za-z0-9._\-]{3,50}$")?;

    if !username_regex.is_match(username) {
        return Err(AppError::ValidationError(
            "Username must be 3-50 characters of letters, digits, '.', '_' or '-'".to_string(),
        ));
    }

    Ok(())
}

/// 宽松的电话号码校验: 可选 +, 7-15 位数字
pub fn validate_phone(phone: &str) -> AppResult<()> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    let phone_regex = compile(r"^\+?[0-9 ()\-]+$")?;

    if !phone_regex.is_match(phone) || digits.len() < 7 || digits.len() > 15 {
        return Err(AppError::ValidationError("Invalid phone number".to_string()));
    }

    Ok(())
}

/// 非空且不超过数据库列长度
pub fn validate_length(field: &str, value: &str, max: usize) -> AppResult<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::ValidationError(format!("{field} is required")));
    }
    if trimmed.chars().count() > max {
        return Err(AppError::ValidationError(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}
