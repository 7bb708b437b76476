//! Explicit extraction of loosely typed JSON fields.
//!
//! Upstream rows are produced by PHP and MySQL, so a number may arrive as
//! `42`, `42.0`, `"42"` or `" 42 "`, and a boolean as `true`, `1` or `"1"`.
//! Each helper here accepts the forms seen in practice and returns `None` for
//! anything else; callers then apply the field's named default.
use serde_json::Value;

/// Trimmed, non-empty text. Numbers are rendered with their JSON spelling.
pub(crate) fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Integer value, truncating fractional numbers.
pub(crate) fn integer(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
            .or_else(|| n.as_f64().and_then(truncate)),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().and_then(truncate))
        }
        _ => None,
    }
}

fn truncate(f: f64) -> Option<i64> {
    if !f.is_finite() {
        return None;
    }
    let t = f.trunc();
    if t >= i64::MIN as f64 && t <= i64::MAX as f64 {
        Some(t as i64)
    } else {
        None
    }
}

/// Finite decimal value. Strings may hold a plain number or an EXIF
/// rational such as `"4123/100"`.
pub(crate) fn decimal(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_decimal(s.trim()),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

fn parse_decimal(s: &str) -> Option<f64> {
    if s.is_empty() {
        return None;
    }
    if let Some((num, den)) = s.split_once('/') {
        let num = num.trim().parse::<f64>().ok()?;
        let den = den.trim().parse::<f64>().ok()?;
        if den == 0.0 {
            return None;
        }
        return Some(num / den);
    }
    s.parse::<f64>().ok()
}

/// Boolean flag in any of the spellings PHP and MySQL produce.
pub(crate) fn flag(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Sanitizes a name by optionally stripping control characters and trimming.
///
/// Returns `None` when nothing is left.
pub(crate) fn sanitize_optional_string(value: Option<String>, strip_control: bool) -> Option<String> {
    value.and_then(|raw| {
        let filtered = if strip_control {
            raw.chars().filter(|c| !c.is_control()).collect::<String>()
        } else {
            raw
        };
        let trimmed = filtered.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_trims_and_renders_numbers() {
        assert_eq!(text(Some(&json!("  Alice "))), Some("Alice".into()));
        assert_eq!(text(Some(&json!(""))), None);
        assert_eq!(text(Some(&json!("   "))), None);
        assert_eq!(text(Some(&json!(20240101))), Some("20240101".into()));
        assert_eq!(text(Some(&json!(true))), None);
        assert_eq!(text(None), None);
    }

    #[test]
    fn integer_accepts_php_spellings() {
        assert_eq!(integer(Some(&json!(42))), Some(42));
        assert_eq!(integer(Some(&json!("42"))), Some(42));
        assert_eq!(integer(Some(&json!(" -7 "))), Some(-7));
        assert_eq!(integer(Some(&json!(1048576.0))), Some(1048576));
        assert_eq!(integer(Some(&json!("3.9"))), Some(3));
        assert_eq!(integer(Some(&json!("abc"))), None);
        assert_eq!(integer(Some(&json!(null))), None);
        assert_eq!(integer(Some(&json!([1]))), None);
    }

    #[test]
    fn decimal_accepts_rationals() {
        assert_eq!(decimal(Some(&json!(10.5))), Some(10.5));
        assert_eq!(decimal(Some(&json!("76.25"))), Some(76.25));
        assert_eq!(decimal(Some(&json!("30/1"))), Some(30.0));
        assert_eq!(decimal(Some(&json!("1/0"))), None);
        assert_eq!(decimal(Some(&json!("NaN"))), None);
        assert_eq!(decimal(Some(&json!("inf"))), None);
        assert_eq!(decimal(Some(&json!(""))), None);
    }

    #[test]
    fn flag_spellings() {
        assert_eq!(flag(Some(&json!(true))), Some(true));
        assert_eq!(flag(Some(&json!(0))), Some(false));
        assert_eq!(flag(Some(&json!("1"))), Some(true));
        assert_eq!(flag(Some(&json!("False"))), Some(false));
        assert_eq!(flag(Some(&json!("maybe"))), None);
    }

    #[test]
    fn sanitize_strips_control_and_trims() {
        assert_eq!(
            sanitize_optional_string(Some("  Bird\u{0007}Lover\n".into()), true),
            Some("BirdLover".into())
        );
        assert_eq!(sanitize_optional_string(Some("\u{0000} ".into()), true), None);
        assert_eq!(
            sanitize_optional_string(Some(" a\tb ".into()), false),
            Some("a\tb".into())
        );
    }
}
