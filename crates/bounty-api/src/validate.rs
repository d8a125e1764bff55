//! Checks for untrusted request bodies.
//!
//! serde enforces the shape (field names, JSON types, no unknown fields).
//! What types cannot express is checked here on the typed value, and every
//! violation found is reported together.

use serde::de::DeserializeOwned;

use bounty_chain::H256;
use bounty_types::{CompleteBounty, FieldError, NewBounty, NewSubmission};

use crate::ApiError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(pub Vec<FieldError>);

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err.0)
    }
}

pub fn new_bounty(body: &[u8]) -> Result<NewBounty, ValidationError> {
    let raw: NewBounty = parse(body)?;
    let mut check = Checks::default();

    let bounty = NewBounty {
        id: check.non_empty("id", raw.id),
        creator: check.address("creator", raw.creator),
        title: check.non_empty("title", raw.title),
        description: raw.description,
        amount: check.non_negative("amount", raw.amount),
    };
    check.finish(bounty)
}

pub fn complete_bounty(body: &[u8]) -> Result<CompleteBounty, ValidationError> {
    let raw: CompleteBounty = parse(body)?;
    let mut check = Checks::default();

    let completion = CompleteBounty {
        hash: check.hex("hash", raw.hash, 64, "a 0x-prefixed 32-byte transaction hash"),
        bounty_id: check.non_empty("bountyId", raw.bounty_id),
        submission_id: check.non_negative_int("submissionId", raw.submission_id),
    };
    check.finish(completion)
}

pub fn new_submission(body: &[u8]) -> Result<NewSubmission, ValidationError> {
    let raw: NewSubmission = parse(body)?;
    let mut check = Checks::default();

    let submission = NewSubmission {
        id: check.non_negative_int("id", raw.id),
        hunter: check.address("hunter", raw.hunter),
    };
    check.finish(submission)
}

/// The hash of a validated completion, typed for the chain reader.
pub fn tx_hash(hash: &str) -> Result<H256, ValidationError> {
    hash.parse()
        .map_err(|e| ValidationError(vec![violation("hash", format!("invalid hash: {}", e))]))
}

fn parse<T: DeserializeOwned>(body: &[u8]) -> Result<T, ValidationError> {
    serde_json::from_slice(body).map_err(|e| {
        let reason = e.to_string();
        let field = named_field(&reason).unwrap_or("body").to_string();
        ValidationError(vec![FieldError { field, reason }])
    })
}

/// serde names the field in its message for missing and unknown fields only.
fn named_field(message: &str) -> Option<&str> {
    let rest = message
        .strip_prefix("missing field `")
        .or_else(|| message.strip_prefix("unknown field `"))?;
    rest.split('`').next()
}

#[derive(Default)]
struct Checks {
    errors: Vec<FieldError>,
}

impl Checks {
    fn reject(&mut self, field: &str, reason: impl Into<String>) {
        self.errors.push(violation(field, reason));
    }

    fn non_empty(&mut self, field: &str, value: String) -> String {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.reject(field, "must not be empty");
        }
        trimmed.to_string()
    }

    fn hex(&mut self, field: &str, value: String, digits: usize, expected: &str) -> String {
        let well_formed = value
            .strip_prefix("0x")
            .is_some_and(|h| h.len() == digits && h.bytes().all(|b| b.is_ascii_hexdigit()));
        if !well_formed {
            self.reject(field, format!("expected {}", expected));
        }
        value.to_ascii_lowercase()
    }

    fn address(&mut self, field: &str, value: String) -> String {
        self.hex(field, value, 40, "a 0x-prefixed 20-byte hex address")
    }

    fn non_negative(&mut self, field: &str, value: f64) -> f64 {
        if !(value.is_finite() && value >= 0.0) {
            self.reject(field, "must be a non-negative number");
        }
        value
    }

    fn non_negative_int(&mut self, field: &str, value: i64) -> i64 {
        if value < 0 {
            self.reject(field, "must be a non-negative integer");
        }
        value
    }

    fn finish<T>(self, value: T) -> Result<T, ValidationError> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(ValidationError(self.errors))
        }
    }
}

fn violation(field: &str, reason: impl Into<String>) -> FieldError {
    FieldError {
        field: field.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    const CREATOR: &str = "0xAbCdEf0123456789aBcDeF0123456789abcdef01";

    fn body(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    fn fields_of(err: ValidationError) -> Vec<String> {
        err.0.into_iter().map(|e| e.field).collect()
    }

    fn hash() -> String {
        format!("0x{}", "AB".repeat(32))
    }

    #[test]
    fn accepts_and_normalizes_bounty() {
        let bounty = new_bounty(&body(json!({
            "id": "  B1 ",
            "creator": CREATOR,
            "title": "Fix it",
            "description": "",
            "amount": 100
        })))
        .unwrap();

        assert_eq!(bounty.id, "B1");
        assert_eq!(bounty.creator, CREATOR.to_ascii_lowercase());
        assert_eq!(bounty.amount, 100.0);
        assert_eq!(bounty.description, "");
    }

    #[test]
    fn reports_every_bounty_violation() {
        let err = new_bounty(&body(json!({
            "id": "",
            "creator": "0x1234",
            "title": "   ",
            "description": "d",
            "amount": -1
        })))
        .unwrap_err();

        assert_eq!(fields_of(err), vec!["id", "creator", "title", "amount"]);
    }

    #[test]
    fn names_unknown_and_missing_fields() {
        let err = new_bounty(&body(json!({
            "id": "B1",
            "creator": CREATOR,
            "title": "Fix it",
            "description": "d",
            "amount": 1.5,
            "status": "complete"
        })))
        .unwrap_err();
        assert_eq!(fields_of(err), vec!["status"]);

        let err = new_bounty(&body(json!({
            "id": "B1",
            "creator": CREATOR,
            "description": "d",
            "amount": 1.5
        })))
        .unwrap_err();
        assert_eq!(fields_of(err), vec!["title"]);
    }

    #[test]
    fn wrong_types_and_non_objects_are_body_errors() {
        assert_eq!(fields_of(new_bounty(b"{not json").unwrap_err()), vec!["body"]);
        assert_eq!(fields_of(new_bounty(b"[1, 2]").unwrap_err()), vec!["body"]);
        assert_eq!(fields_of(complete_bounty(b"").unwrap_err()), vec!["body"]);

        let err = new_bounty(&body(json!({
            "id": "B1",
            "creator": CREATOR,
            "title": "t",
            "description": "d",
            "amount": "100"
        })))
        .unwrap_err();
        assert_eq!(fields_of(err.clone()), vec!["body"]);
        assert!(err.0[0].reason.contains("invalid type"));
    }

    #[test]
    fn accepts_completion() {
        let completion = complete_bounty(&body(json!({
            "hash": hash(),
            "bountyId": "B1",
            "submissionId": 3
        })))
        .unwrap();

        assert_eq!(completion.hash, hash().to_ascii_lowercase());
        assert_eq!(completion.submission_id, 3);
        assert_eq!(tx_hash(&completion.hash).unwrap(), H256::repeat_byte(0xab));
    }

    #[test]
    fn whole_float_submission_id_is_an_integer() {
        let completion = complete_bounty(&body(json!({
            "hash": hash(),
            "bountyId": "B1",
            "submissionId": 1.0
        })))
        .unwrap();
        assert_eq!(completion.submission_id, 1);

        let err = complete_bounty(&body(json!({
            "hash": hash(),
            "bountyId": "B1",
            "submissionId": 1.5
        })))
        .unwrap_err();
        assert_eq!(fields_of(err), vec!["body"]);
    }

    #[test]
    fn completion_needs_real_hash_and_non_negative_submission() {
        let err = complete_bounty(&body(json!({
            "hash": "0xdeadbeef",
            "bountyId": " ",
            "submissionId": -2
        })))
        .unwrap_err();
        assert_eq!(fields_of(err), vec!["hash", "bountyId", "submissionId"]);
    }

    #[test]
    fn submission_shape() {
        let sub = new_submission(&body(json!({ "id": 9, "hunter": CREATOR }))).unwrap();
        assert_eq!(sub.id, 9);

        let err = new_submission(&body(json!({ "id": 9 }))).unwrap_err();
        assert_eq!(fields_of(err), vec!["hunter"]);

        let err = new_submission(&body(json!({ "id": -1, "hunter": "bob" }))).unwrap_err();
        assert_eq!(fields_of(err), vec!["id", "hunter"]);
    }
}
