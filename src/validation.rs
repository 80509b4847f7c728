//! Boundary validation of inference payloads.
//!
//! The request body is parsed as loosely-typed JSON first and then checked
//! field by field, so every rejection names the offending field before any
//! feature engineering runs.

use serde_json::{Map, Value};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::models::{CustomerProfile, Gender, Geography};

/// Credit scores outside the credit-risk bins cannot be bucketed.
pub const CREDIT_SCORE_RANGE: RangeInclusive<i64> = 0..=1000;
pub const AGE_RANGE: RangeInclusive<i64> = 1..=120;
pub const TENURE_RANGE: RangeInclusive<i64> = 0..=100;
pub const NUM_OF_PRODUCTS_RANGE: RangeInclusive<i64> = 1..=10;

/// Every field of a profile, in training column order.
pub const PROFILE_FIELDS: [&str; 10] = [
    "CreditScore",
    "Geography",
    "Gender",
    "Age",
    "Tenure",
    "Balance",
    "NumOfProducts",
    "HasCrCard",
    "IsActiveMember",
    "EstimatedSalary",
];

/// A request field failed boundary validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The payload is not a JSON object.
    NotAnObject,
    Missing { field: String },
    UnknownField { field: String },
    WrongType { field: String, expected: &'static str },
    OutOfRange { field: String, message: String },
    UnknownCategory {
        field: String,
        value: String,
        allowed: Vec<&'static str>,
    },
}

impl ValidationError {
    /// The offending field, when the failure concerns a single field.
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::NotAnObject => None,
            ValidationError::Missing { field }
            | ValidationError::UnknownField { field }
            | ValidationError::WrongType { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::UnknownCategory { field, .. } => Some(field),
        }
    }

    fn out_of_range(field: &str, message: impl Into<String>) -> Self {
        ValidationError::OutOfRange {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NotAnObject => write!(f, "request body must be a JSON object"),
            ValidationError::Missing { field } => write!(f, "{}: field required", field),
            ValidationError::UnknownField { field } => {
                write!(f, "{}: unexpected field", field)
            }
            ValidationError::WrongType { field, expected } => {
                write!(f, "{}: expected {}", field, expected)
            }
            ValidationError::OutOfRange { field, message } => write!(f, "{}: {}", field, message),
            ValidationError::UnknownCategory {
                field,
                value,
                allowed,
            } => write!(
                f,
                "{}: '{}' is not one of {}",
                field,
                value,
                allowed.join(", ")
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Parse and validate an inference payload into a [`CustomerProfile`].
///
/// Exactly the ten profile fields must be present. Integers may be given as
/// integral floats (`650.0`); strings are never coerced to numbers.
pub fn parse_customer_profile(payload: &Value) -> Result<CustomerProfile, ValidationError> {
    let object = payload.as_object().ok_or(ValidationError::NotAnObject)?;

    if let Some(unknown) = object
        .keys()
        .find(|key| !PROFILE_FIELDS.contains(&key.as_str()))
    {
        return Err(ValidationError::UnknownField {
            field: unknown.clone(),
        });
    }

    let profile = CustomerProfile {
        credit_score: integer_field(object, "CreditScore", CREDIT_SCORE_RANGE)?,
        geography: category_field::<Geography>(
            object,
            "Geography",
            Geography::ALL.iter().map(Geography::as_str).collect(),
        )?,
        gender: category_field::<Gender>(
            object,
            "Gender",
            Gender::ALL.iter().map(Gender::as_str).collect(),
        )?,
        age: integer_field(object, "Age", AGE_RANGE)?,
        tenure: integer_field(object, "Tenure", TENURE_RANGE)?,
        balance: amount_field(object, "Balance")?,
        num_of_products: integer_field(object, "NumOfProducts", NUM_OF_PRODUCTS_RANGE)?,
        has_cr_card: flag_field(object, "HasCrCard")?,
        is_active_member: flag_field(object, "IsActiveMember")?,
        estimated_salary: amount_field(object, "EstimatedSalary")?,
    };

    validate_profile(&profile)?;
    Ok(profile)
}

/// Range-check a profile that was built without going through JSON.
pub fn validate_profile(profile: &CustomerProfile) -> Result<(), ValidationError> {
    check_range("CreditScore", profile.credit_score, &CREDIT_SCORE_RANGE)?;
    check_range("Age", profile.age, &AGE_RANGE)?;
    check_range("Tenure", profile.tenure, &TENURE_RANGE)?;
    check_range("NumOfProducts", profile.num_of_products, &NUM_OF_PRODUCTS_RANGE)?;
    check_amount("Balance", profile.balance)?;
    check_amount("EstimatedSalary", profile.estimated_salary)?;
    Ok(())
}

fn require<'a>(object: &'a Map<String, Value>, field: &str) -> Result<&'a Value, ValidationError> {
    match object.get(field) {
        None | Some(Value::Null) => Err(ValidationError::Missing {
            field: field.to_string(),
        }),
        Some(value) => Ok(value),
    }
}

fn integer_field(
    object: &Map<String, Value>,
    field: &str,
    range: RangeInclusive<i64>,
) -> Result<i64, ValidationError> {
    let value = require(object, field)?;
    let wrong_type = || ValidationError::WrongType {
        field: field.to_string(),
        expected: "an integer",
    };

    let number = match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => i,
            None => {
                let f = n.as_f64().ok_or_else(wrong_type)?;
                if f.fract() != 0.0 || f.abs() > i64::MAX as f64 {
                    return Err(wrong_type());
                }
                f as i64
            }
        },
        _ => return Err(wrong_type()),
    };

    check_range(field, number, &range)?;
    Ok(number)
}

fn amount_field(object: &Map<String, Value>, field: &str) -> Result<f64, ValidationError> {
    let amount = require(object, field)?
        .as_f64()
        .ok_or_else(|| ValidationError::WrongType {
            field: field.to_string(),
            expected: "a number",
        })?;

    check_amount(field, amount)?;
    Ok(amount)
}

fn flag_field(object: &Map<String, Value>, field: &str) -> Result<bool, ValidationError> {
    match require(object, field)? {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => match n.as_f64() {
            Some(v) if v == 0.0 => Ok(false),
            Some(v) if v == 1.0 => Ok(true),
            _ => Err(ValidationError::out_of_range(field, "must be 0 or 1")),
        },
        _ => Err(ValidationError::WrongType {
            field: field.to_string(),
            expected: "0 or 1",
        }),
    }
}

fn category_field<T: FromStr>(
    object: &Map<String, Value>,
    field: &str,
    allowed: Vec<&'static str>,
) -> Result<T, ValidationError> {
    let raw = require(object, field)?
        .as_str()
        .ok_or_else(|| ValidationError::WrongType {
            field: field.to_string(),
            expected: "a string",
        })?;

    raw.parse::<T>()
        .map_err(|_| ValidationError::UnknownCategory {
            field: field.to_string(),
            value: raw.to_string(),
            allowed,
        })
}

fn check_range(
    field: &str,
    value: i64,
    range: &RangeInclusive<i64>,
) -> Result<(), ValidationError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::out_of_range(
            field,
            format!(
                "{} is outside {}..={}",
                value,
                range.start(),
                range.end()
            ),
        ))
    }
}

fn check_amount(field: &str, amount: f64) -> Result<(), ValidationError> {
    if !amount.is_finite() {
        return Err(ValidationError::out_of_range(field, "must be a finite number"));
    }
    if amount < 0.0 {
        return Err(ValidationError::out_of_range(field, "must not be negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> Value {
        json!({
            "CreditScore": 650,
            "Geography": "France",
            "Gender": "Male",
            "Age": 40,
            "Tenure": 3,
            "Balance": 60000,
            "NumOfProducts": 2,
            "HasCrCard": 1,
            "IsActiveMember": 1,
            "EstimatedSalary": 50000.0
        })
    }

    #[test]
    fn test_valid_payload() {
        let profile = parse_customer_profile(&payload()).unwrap();

        assert_eq!(profile.credit_score, 650);
        assert_eq!(profile.geography, Geography::France);
        assert_eq!(profile.gender, Gender::Male);
        assert_eq!(profile.balance, 60000.0);
        assert!(profile.has_cr_card);
        assert!(profile.is_active_member);
    }

    #[test]
    fn test_missing_and_null_fields() {
        for field in PROFILE_FIELDS {
            let mut body = payload();
            body.as_object_mut().unwrap().remove(field);
            let err = parse_customer_profile(&body).unwrap_err();
            assert_eq!(err.field(), Some(field));
            assert!(matches!(err, ValidationError::Missing { .. }));
        }

        let mut body = payload();
        body["Age"] = Value::Null;
        assert!(matches!(
            parse_customer_profile(&body),
            Err(ValidationError::Missing { .. })
        ));
    }

    #[test]
    fn test_wrong_types() {
        let mut body = payload();
        body["CreditScore"] = json!("abc");
        let err = parse_customer_profile(&body).unwrap_err();
        assert_eq!(err.field(), Some("CreditScore"));
        assert!(matches!(err, ValidationError::WrongType { .. }));

        let mut body = payload();
        body["Age"] = json!(40.5);
        assert_eq!(parse_customer_profile(&body).unwrap_err().field(), Some("Age"));

        let mut body = payload();
        body["Balance"] = json!("60000");
        assert_eq!(
            parse_customer_profile(&body).unwrap_err().field(),
            Some("Balance")
        );

        let mut body = payload();
        body["Geography"] = json!(1);
        assert_eq!(
            parse_customer_profile(&body).unwrap_err().field(),
            Some("Geography")
        );
    }

    #[test]
    fn test_integral_floats_accepted() {
        let mut body = payload();
        body["CreditScore"] = json!(650.0);
        body["HasCrCard"] = json!(false);
        let profile = parse_customer_profile(&body).unwrap();
        assert_eq!(profile.credit_score, 650);
        assert!(!profile.has_cr_card);
    }

    #[test]
    fn test_unknown_category_rejected() {
        let mut body = payload();
        body["Geography"] = json!("Italy");
        let err = parse_customer_profile(&body).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownCategory {
                field: "Geography".to_string(),
                value: "Italy".to_string(),
                allowed: vec!["France", "Spain", "Germany"],
            }
        );
    }

    #[test]
    fn test_out_of_range_values() {
        let cases = [
            ("CreditScore", json!(1001)),
            ("CreditScore", json!(-1)),
            ("Age", json!(0)),
            ("Tenure", json!(-1)),
            ("NumOfProducts", json!(0)),
            ("Balance", json!(-0.01)),
            ("EstimatedSalary", json!(-5)),
            ("HasCrCard", json!(2)),
        ];

        for (field, value) in cases {
            let mut body = payload();
            body[field] = value;
            let err = parse_customer_profile(&body).unwrap_err();
            assert_eq!(err.field(), Some(field), "{}", err);
        }
    }

    #[test]
    fn test_unexpected_field_and_non_object() {
        let mut body = payload();
        body["CustomerId"] = json!(15634602);
        assert_eq!(
            parse_customer_profile(&body).unwrap_err(),
            ValidationError::UnknownField {
                field: "CustomerId".to_string()
            }
        );

        assert_eq!(
            parse_customer_profile(&json!([1, 2])).unwrap_err(),
            ValidationError::NotAnObject
        );
    }

    #[test]
    fn test_error_messages_name_the_field() {
        let mut body = payload();
        body.as_object_mut().unwrap().remove("Tenure");
        let err = parse_customer_profile(&body).unwrap_err();
        assert_eq!(err.to_string(), "Tenure: field required");
    }
}
