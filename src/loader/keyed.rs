use serde_json::Value;

/// One entry of the backend's "array of single-key objects" encoding.
///
/// The backend uses `[{ "<name>": <payload> }, ...]` wherever it means an
/// ordered map. Exactly one key per object is expected; [`Keyed::first`]
/// takes the first key and ignores any others.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyed<T> {
    pub key: String,
    pub value: T,
}

impl<'a> Keyed<&'a Value> {
    pub fn first(entry: &'a Value) -> Option<Self> {
        let (key, value) = entry.as_object()?.iter().next()?;
        Some(Self {
            key: key.clone(),
            value,
        })
    }

    /// Every key of the object, in document order.
    pub fn all(entry: &'a Value) -> Vec<Self> {
        entry
            .as_object()
            .map(|obj| {
                obj.iter()
                    .map(|(key, value)| Self {
                        key: key.clone(),
                        value,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl<T> Keyed<T> {
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Keyed<U> {
        Keyed {
            key: self.key,
            value: f(self.value),
        }
    }
}

/// Non-null elements of `value` if it is an array; empty otherwise.
pub fn array_of(value: Option<&Value>) -> impl Iterator<Item = &Value> {
    value
        .and_then(Value::as_array)
        .map(|a| a.as_slice())
        .unwrap_or(&[])
        .iter()
        .filter(|v| !v.is_null())
}

/// First non-null field among `names`.
pub fn field<'a>(value: &'a Value, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|n| value.get(*n))
        .find(|v| !v.is_null())
}

/// Numbers and numeric strings; anything else is `None`.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

pub fn as_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Strings verbatim, numbers in their JSON spelling, everything else empty.
pub fn as_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_key_only() {
        let v = json!({"a - Engineering": [1], "ignored": [2]});
        let k = Keyed::first(&v).unwrap();
        assert_eq!(k.key, "a - Engineering");
        assert_eq!(k.value, &json!([1]));
    }

    #[test]
    fn test_first_on_non_object() {
        assert!(Keyed::first(&json!([1, 2])).is_none());
        assert!(Keyed::first(&json!({})).is_none());
        assert!(Keyed::all(&json!("x")).is_empty());
    }

    #[test]
    fn test_all_keeps_document_order() {
        let v = json!({"Remember": [], "Apply": [], "Create": []});
        let keys: Vec<String> = Keyed::all(&v).into_iter().map(|k| k.key).collect();
        assert_eq!(keys, vec!["Remember", "Apply", "Create"]);
    }

    #[test]
    fn test_array_of_skips_nulls_and_non_arrays() {
        let v = json!([1, null, 2]);
        assert_eq!(array_of(Some(&v)).count(), 2);
        assert_eq!(array_of(Some(&json!({"a": 1}))).count(), 0);
        assert_eq!(array_of(None).count(), 0);
    }

    #[test]
    fn test_scalar_coercions() {
        assert_eq!(as_number(&json!("12.5")), Some(12.5));
        assert_eq!(as_number(&json!("n/a")), None);
        assert_eq!(as_id(&json!("42")), Some(42));
        assert_eq!(as_text(Some(&json!(2021000001u64))), "2021000001");
        assert_eq!(as_text(None), "");
    }
}
