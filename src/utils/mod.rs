//! Shared request-surface helpers.

use folio_db::DbError;
use folio_http::AppError;
use validator::{Validate, ValidationErrors};

/// Run declarative validation on a payload, mapping violations to a 400
/// response with one message per violated field rule.
pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload
        .validate()
        .map_err(|errors| AppError::validation(collect_messages(&errors), "Validation failed"))
}

/// Wrap a datastore failure for the boundary translator.
pub fn db_internal(err: DbError) -> AppError {
    AppError::Internal(err.into())
}

fn collect_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages = Vec::new();
    for (field, field_errors) in errors.field_errors() {
        for error in field_errors.iter() {
            match &error.message {
                Some(message) => messages.push(message.to_string()),
                None => messages.push(format!("{field} is invalid")),
            }
        }
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Debug, Validate)]
    struct Payload {
        #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
        name: String,
        #[validate(email(message = "Please provide a valid email"))]
        email: String,
    }

    #[test]
    fn valid_payload_passes() {
        let payload = Payload {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
        };
        assert!(validate_payload(&payload).is_ok());
    }

    #[test]
    fn all_violations_are_collected() {
        let payload = Payload {
            name: "A".to_string(),
            email: "not-an-email".to_string(),
        };

        let err = validate_payload(&payload).unwrap_err();
        match err {
            AppError::Validation { errors, message } => {
                assert_eq!(message, "Validation failed");
                assert_eq!(errors.len(), 2);
                assert!(errors.contains(&"Name must be at least 2 characters".to_string()));
                assert!(errors.contains(&"Please provide a valid email".to_string()));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
