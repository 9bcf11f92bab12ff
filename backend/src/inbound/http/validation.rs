//! Declarative request-body validation.
//!
//! Handlers pair each route with one or more [`RuleSet`]s evaluated against
//! the parsed JSON body before any deserialization. Evaluation short-circuits
//! on the first failing rule and renders it as a failure envelope with the
//! offending field in the details.

use serde_json::{json, Value};

use crate::domain::Error;

/// A single constraint applied to one field of a JSON body.
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    /// Field must be present, non-null, and (for strings) non-blank.
    Required,
    /// Field must be a string of at least this many characters.
    MinLength(usize),
    /// Field must be a string shaped like an email address.
    Email,
}

impl Rule {
    fn code(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::MinLength(_) => "min_length",
            Self::Email => "email",
        }
    }

    fn holds(self, value: Option<&Value>) -> bool {
        match self {
            Self::Required => match value {
                None | Some(Value::Null) => false,
                Some(Value::String(s)) => !s.trim().is_empty(),
                Some(_) => true,
            },
            Self::MinLength(min) => {
                matches!(value, Some(Value::String(s)) if s.chars().count() >= min)
            }
            Self::Email => match value {
                Some(Value::String(s)) => looks_like_email(s),
                _ => false,
            },
        }
    }
}

fn looks_like_email(candidate: &str) -> bool {
    let trimmed = candidate.trim();
    match trimmed.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}

/// One field's constraint plus the message reported when it fails.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub rule: Rule,
    pub message: &'static str,
}

/// Named collection of field rules attached to a route.
#[derive(Debug, Clone, Copy)]
pub struct RuleSet {
    pub name: &'static str,
    pub rules: &'static [FieldRule],
}

impl RuleSet {
    /// Evaluates every rule in declaration order, stopping at the first
    /// violation.
    pub fn apply(&self, body: &Value) -> Result<(), Error> {
        for field_rule in self.rules {
            let value = body.get(field_rule.field);
            if !field_rule.rule.holds(value) {
                return Err(Error::invalid_request(field_rule.message).with_details(json!({
                    "field": field_rule.field,
                    "rule": field_rule.rule.code(),
                    "ruleSet": self.name,
                })));
            }
        }
        Ok(())
    }

    /// Applies multiple rule sets in order, short-circuiting on the first
    /// failure.
    pub fn apply_all(sets: &[&Self], body: &Value) -> Result<(), Error> {
        for set in sets {
            set.apply(body)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    static SIGNUP: RuleSet = RuleSet {
        name: "signup",
        rules: &[
            FieldRule {
                field: "name",
                rule: Rule::Required,
                message: "name is required",
            },
            FieldRule {
                field: "email",
                rule: Rule::Email,
                message: "email must be a valid address",
            },
            FieldRule {
                field: "password",
                rule: Rule::MinLength(8),
                message: "password must be at least 8 characters",
            },
        ],
    };

    #[rstest]
    fn valid_body_passes() {
        let body = json!({"name": "Ada", "email": "ada@example.com", "password": "longenough"});
        assert!(SIGNUP.apply(&body).is_ok());
    }

    #[rstest]
    #[case(json!({"email": "ada@example.com", "password": "longenough"}), "name")]
    #[case(json!({"name": "  ", "email": "ada@example.com", "password": "longenough"}), "name")]
    #[case(json!({"name": "Ada", "email": "not-an-email", "password": "longenough"}), "email")]
    #[case(json!({"name": "Ada", "email": "ada@example.com", "password": "short"}), "password")]
    fn first_violation_is_reported(#[case] body: Value, #[case] expected_field: &str) {
        let error = SIGNUP.apply(&body).expect_err("validation failure");
        let details = error.details().expect("details");
        assert_eq!(details["field"], expected_field);
        assert_eq!(details["ruleSet"], "signup");
    }

    #[rstest]
    #[case("ada@example.com", true)]
    #[case("ada@sub.example.com", true)]
    #[case("ada@example", false)]
    #[case("@example.com", false)]
    #[case("ada@.com", false)]
    #[case("plainaddress", false)]
    fn email_shape(#[case] candidate: &str, #[case] expected: bool) {
        assert_eq!(looks_like_email(candidate), expected);
    }

    #[rstest]
    fn apply_all_short_circuits_in_order() {
        static EXTRA: RuleSet = RuleSet {
            name: "extra",
            rules: &[FieldRule {
                field: "role",
                rule: Rule::Required,
                message: "role is required",
            }],
        };
        let body = json!({"name": "Ada", "email": "ada@example.com", "password": "longenough"});
        let error = RuleSet::apply_all(&[&SIGNUP, &EXTRA], &body).expect_err("second set fails");
        assert_eq!(error.details().expect("details")["ruleSet"], "extra");
    }
}
