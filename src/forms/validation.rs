//! Field value validation from declarative rules.

use crate::store::FieldRule;
use regex::Regex;
use serde_json::Value;

/// Check one value against a rule. Returns the first violation message.
/// Null values pass; required-ness is the form's concern, not the rule's.
pub fn validate_value(name: &str, v: &Value, rule: &FieldRule) -> Result<(), String> {
    if v.is_null() {
        return Ok(());
    }
    if let Some(format) = &rule.format {
        validate_format(name, v, format)?;
    }
    if let Some(max) = rule.max_length {
        if let Some(s) = v.as_str() {
            if s.len() > max as usize {
                return Err(format!("{} must be at most {} characters", name, max));
            }
        }
    }
    if let Some(min) = rule.min_length {
        if let Some(s) = v.as_str() {
            if s.len() < min as usize {
                return Err(format!("{} must be at least {} characters", name, min));
            }
        }
    }
    if let Some(ref pattern) = rule.pattern {
        let re = Regex::new(pattern).map_err(|_| format!("invalid pattern for {}", name))?;
        if let Some(s) = v.as_str() {
            if !re.is_match(s) {
                return Err(format!("{} does not match required pattern", name));
            }
        }
    }
    if let Some(ref allowed) = rule.allowed {
        if !allowed.iter().any(|a| value_eq(v, a)) {
            return Err(format!(
                "{} must be one of: {:?}",
                name,
                allowed.iter().take(5).collect::<Vec<_>>()
            ));
        }
    }
    if let Some(min) = rule.minimum {
        if let Some(n) = v.as_f64() {
            if n < min {
                return Err(format!("{} must be at least {}", name, min));
            }
        }
    }
    if let Some(max) = rule.maximum {
        if let Some(n) = v.as_f64() {
            if n > max {
                return Err(format!("{} must be at most {}", name, max));
            }
        }
    }
    Ok(())
}

fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(s), Value::String(t)) => s == t,
        (Value::Number(n), Value::Number(m)) => n.as_f64() == m.as_f64(),
        _ => a == b,
    }
}

fn validate_format(name: &str, v: &Value, format: &str) -> Result<(), String> {
    match format.to_lowercase().as_str() {
        "email" => {
            if let Some(s) = v.as_str() {
                if !s.contains('@') || s.len() < 3 {
                    return Err(format!("{} must be a valid email", name));
                }
            }
        }
        "uuid" => {
            if let Some(s) = v.as_str() {
                if uuid::Uuid::parse_str(s).is_err() {
                    return Err(format!("{} must be a valid UUID", name));
                }
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn length_bounds() {
        let rule = FieldRule {
            max_length: Some(5),
            min_length: Some(2),
            ..Default::default()
        };
        assert!(validate_value("t", &json!("abc"), &rule).is_ok());
        assert!(validate_value("t", &json!("a"), &rule).is_err());
        assert!(validate_value("t", &json!("abcdef"), &rule).is_err());
    }

    #[test]
    fn null_passes_any_rule() {
        let rule = FieldRule {
            min_length: Some(2),
            format: Some("email".into()),
            ..Default::default()
        };
        assert!(validate_value("t", &Value::Null, &rule).is_ok());
    }

    #[test]
    fn allowed_compares_numbers_loosely() {
        let rule = FieldRule {
            allowed: Some(vec![json!(1), json!(2)]),
            ..Default::default()
        };
        assert!(validate_value("t", &json!(1.0), &rule).is_ok());
        assert!(validate_value("t", &json!(3), &rule).is_err());
    }

    #[test]
    fn email_format() {
        let rule = FieldRule {
            format: Some("email".into()),
            ..Default::default()
        };
        assert!(validate_value("t", &json!("a@b"), &rule).is_ok());
        assert!(validate_value("t", &json!("nope"), &rule).is_err());
    }
}
