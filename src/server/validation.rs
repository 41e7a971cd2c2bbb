use crate::server::response::ApiError;

const MAX_COLLECTION_NAME_LEN: usize = 100;
const MIN_PASSWORD_LEN: usize = 8;
const MAX_PASSWORD_LEN: usize = 32;

const PASSWORD_SYMBOLS: &str = "`~!@#$%^&*()-_+={[]|:;\"'<,>.?/}";

/// A username starts with a letter followed by 2 to 31 letters, digits,
/// hyphens, or underscores. Login ids matching this grammar are looked up
/// by username, everything else by email.
pub fn is_username(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    first.is_ascii_alphabetic()
        && (3..=32).contains(&s.len())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

pub fn validate_username(name: &str) -> Result<(), ApiError> {
    if is_username(name) {
        Ok(())
    } else {
        Err(ApiError::bad_request(
            "Username must start with a letter and contain 3-32 letters, digits, hyphens, or underscores",
        ))
    }
}

pub fn validate_email(email: &str) -> Result<(), ApiError> {
    let valid = matches!(email.split_once('@'), Some((local, domain))
        if !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.'));
    if valid {
        Ok(())
    } else {
        Err(ApiError::bad_request("Invalid email address"))
    }
}

pub fn validate_password(password: &str) -> Result<(), ApiError> {
    let length_ok = (MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&password.len());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| PASSWORD_SYMBOLS.contains(c));
    let charset_ok = password
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SYMBOLS.contains(c));

    if length_ok && has_lower && has_upper && has_digit && has_symbol && charset_ok {
        Ok(())
    } else {
        Err(ApiError::bad_request(
            "Password must be 8-32 characters and mix lower case, upper case, digits, and symbols",
        ))
    }
}

pub fn validate_collection_name(name: &str) -> Result<(), ApiError> {
    if name.is_empty() {
        return Err(ApiError::bad_request("Collection name cannot be empty"));
    }
    if name.len() > MAX_COLLECTION_NAME_LEN {
        return Err(ApiError::bad_request(
            "Collection name cannot exceed 100 characters",
        ));
    }
    Ok(())
}

pub fn validate_data_type(data_type: &str) -> Result<(), ApiError> {
    if data_type.is_empty() || data_type.len() > 255 {
        return Err(ApiError::bad_request("Invalid data type"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_grammar() {
        assert!(is_username("testuser"));
        assert!(is_username("a-b_c1"));
        assert!(!is_username("ab"));
        assert!(!is_username("1startswithdigit"));
        assert!(!is_username("has space"));
        assert!(!is_username("test@somewhere.com"));
        assert!(!is_username(""));
    }

    #[test]
    fn test_email_validation() {
        assert!(validate_email("test@somewhere.com").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("@somewhere.com").is_err());
        assert!(validate_email("test@nodot").is_err());
        assert!(validate_email("test@.com").is_err());
    }

    #[test]
    fn test_password_policy() {
        assert!(validate_password("p@ssW0rd").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password("alllowercase1!").is_err());
        assert!(validate_password("NoDigits!!").is_err());
        assert!(validate_password("NoSymbols123").is_err());
        assert!(validate_password(&"p@ssW0rd".repeat(8)).is_err());
    }
}
