//! Display strings for cached values

use crate::provider::{LiveValue, TypeRef};

/// Label shown for a null value.
pub const NULL: &str = "null";

/// Label shown for a value whose host object is gone.
pub const DESTROYED: &str = "<destroyed>";

/// Label shown for a method that has not been invoked yet.
pub const NOT_EVALUATED: &str = "<not evaluated>";

/// Format a scalar-like value.
///
/// Host objects have no scalar form and print as their type name.
pub fn scalar(value: &LiveValue, ty: &TypeRef, max_string_len: usize) -> String {
    match value {
        LiveValue::Null => NULL.to_string(),
        LiveValue::Bool(b) => b.to_string(),
        LiveValue::Int(i) => i.to_string(),
        LiveValue::Float(f) => format_float(*f),
        LiveValue::Str(s) => quoted(s, max_string_len),
        LiveValue::Enum { ty, variant } => format!("{}::{}", ty, variant),
        LiveValue::Function(f) => format!("fn {}", f.name),
        LiveValue::Object(_) => ty.to_string(),
    }
}

/// `[count] Type` label of a container. `count` is `None` while unknown.
pub fn container(count: Option<usize>, truncated: bool, ty: &TypeRef) -> String {
    match count {
        Some(n) if truncated => format!("[{}+] {}", n, ty),
        Some(n) => format!("[{}] {}", n, ty),
        None => format!("[?] {}", ty),
    }
}

/// Quote a string, cutting it to `max_len` characters.
pub fn quoted(s: &str, max_len: usize) -> String {
    match s.char_indices().nth(max_len) {
        Some((cut, _)) => format!("\"{}…\"", &s[..cut]),
        None => format!("\"{}\"", s),
    }
}

fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 {
        format!("{:.1}", f)
    } else {
        f.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{FunctionRef, ObjectId};

    #[test]
    fn test_scalars() {
        let ty = TypeRef::object();
        assert_eq!(scalar(&LiveValue::Null, &ty, 10), "null");
        assert_eq!(scalar(&LiveValue::Float(2.0), &ty, 10), "2.0");
        assert_eq!(scalar(&LiveValue::Float(0.25), &ty, 10), "0.25");
        assert_eq!(
            scalar(
                &LiveValue::Enum {
                    ty: TypeRef::new("Mode"),
                    variant: "Run".into()
                },
                &ty,
                10
            ),
            "Mode::Run"
        );
        assert_eq!(
            scalar(&LiveValue::Function(FunctionRef { name: "tick".into() }), &ty, 10),
            "fn tick"
        );
        assert_eq!(
            scalar(&LiveValue::Object(ObjectId(3)), &TypeRef::new("Marker"), 10),
            "Marker"
        );
    }

    #[test]
    fn test_strings_are_truncated_by_chars() {
        assert_eq!(quoted("abc", 3), "\"abc\"");
        assert_eq!(quoted("abcdef", 3), "\"abc…\"");
        assert_eq!(quoted("ééééé", 2), "\"éé…\"");
    }

    #[test]
    fn test_container_label() {
        let ty = TypeRef::new("List<int>");
        assert_eq!(container(Some(3), false, &ty), "[3] List<int>");
        assert_eq!(container(None, false, &ty), "[?] List<int>");
        assert_eq!(container(Some(10), true, &ty), "[10+] List<int>");
    }
}
