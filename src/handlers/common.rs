use crate::errors::ServiceError;
use validator::Validate;

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ServiceError> {
    input
        .validate()
        .map_err(|e| ServiceError::ValidationError(format!("Validation failed: {}", e)))
}

/// Trims a required string field
pub fn normalize_string(value: String) -> String {
    value.trim().to_string()
}

/// Trims an optional string field; blank values collapse to `None`
pub fn normalize_optional_string(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .and_then(|v| if v.is_empty() { None } else { Some(v) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_string_trims_whitespace() {
        assert_eq!(normalize_string("  dupatta  ".to_string()), "dupatta");
    }

    #[test]
    fn blank_optional_strings_collapse_to_none() {
        assert_eq!(normalize_optional_string(Some("   ".to_string())), None);
        assert_eq!(normalize_optional_string(None), None);
        assert_eq!(
            normalize_optional_string(Some(" Sarees ".to_string())),
            Some("Sarees".to_string())
        );
    }
}
