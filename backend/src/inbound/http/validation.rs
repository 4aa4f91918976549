//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field} must be a valid UUID")).with_details(json!({
        "field": field,
        "value": value,
        "code": "invalid_uuid",
    }))
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn invalid_choice_error(field: FieldName, value: &str, expected: &str) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field} must be one of: {expected}")).with_details(json!({
        "field": field,
        "value": value,
        "code": "invalid_choice",
    }))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;

    #[rstest]
    fn parse_uuid_accepts_canonical_form() {
        let parsed = parse_uuid(
            "3fa85f64-5717-4562-b3fc-2c963f66afa6",
            FieldName::new("invitationId"),
        )
        .expect("valid uuid parses");
        assert_eq!(parsed.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    }

    #[rstest]
    fn parse_uuid_reports_field_and_value() {
        let err =
            parse_uuid("nope", FieldName::new("invitationId")).expect_err("invalid uuid fails");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);

        let details = err.details().expect("details present");
        assert_eq!(details["field"], "invitationId");
        assert_eq!(details["value"], "nope");
        assert_eq!(details["code"], "invalid_uuid");
    }

    #[rstest]
    fn invalid_choice_names_the_accepted_values() {
        let err = invalid_choice_error(FieldName::new("bioDisplay"), "both", "user1, user2, combine");
        assert!(err.message().contains("user1, user2, combine"));
        assert_eq!(
            err.details().and_then(|d| d["code"].as_str()),
            Some("invalid_choice")
        );
    }
}
