//! Normalization of decoded tags into a JSON-compatible value tree.

use serde_json::{Map, Number, Value};

use crate::nbt::Tag;

/// Convert a decoded tag into a canonical value tree.
///
/// Pure and total: compounds become objects, lists and typed numeric arrays
/// become arrays (array elements widen to plain integers; element width and
/// signedness are not preserved), scalars become primitives. Floats that are
/// NaN or infinite become `null` so the result is representable in any
/// structured output format.
pub fn normalize(tag: &Tag) -> Value {
    match tag {
        Tag::Byte(v) => Value::from(i64::from(*v)),
        Tag::Short(v) => Value::from(i64::from(*v)),
        Tag::Int(v) => Value::from(i64::from(*v)),
        Tag::Long(v) => Value::from(*v),
        Tag::Float(v) => float_value(f64::from(*v)),
        Tag::Double(v) => float_value(*v),
        Tag::String(s) => Value::String(s.clone()),
        Tag::ByteArray(values) => values.iter().map(|v| Value::from(i64::from(*v))).collect(),
        Tag::IntArray(values) => values.iter().map(|v| Value::from(i64::from(*v))).collect(),
        Tag::LongArray(values) => values.iter().map(|v| Value::from(*v)).collect(),
        Tag::List(items) => items.iter().map(normalize).collect(),
        Tag::Compound(entries) => {
            let mut object = Map::new();
            for (key, value) in entries {
                object.insert(key.clone(), normalize(value));
            }
            Value::Object(object)
        }
    }
}

fn float_value(v: f64) -> Value {
    Number::from_f64(v).map_or(Value::Null, Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn compound_becomes_object() {
        let tag = Tag::Compound(vec![
            ("Count".to_string(), Tag::Int(5)),
            (
                "Items".to_string(),
                Tag::List(vec![Tag::Int(1), Tag::Int(2), Tag::Int(3)]),
            ),
        ]);
        assert_eq!(normalize(&tag), json!({"Count": 5, "Items": [1, 2, 3]}));
    }

    #[test]
    fn typed_arrays_expand_to_plain_integers() {
        let tag = Tag::Compound(vec![
            ("bytes".to_string(), Tag::ByteArray(vec![-1, 2])),
            ("ints".to_string(), Tag::IntArray(vec![2088048874, -679722978])),
            ("longs".to_string(), Tag::LongArray(vec![1 << 40])),
        ]);
        assert_eq!(
            normalize(&tag),
            json!({
                "bytes": [-1, 2],
                "ints": [2088048874, -679722978],
                "longs": [1099511627776i64],
            })
        );
    }

    #[test]
    fn non_finite_floats_become_null() {
        assert_eq!(normalize(&Tag::Double(f64::NAN)), Value::Null);
        assert_eq!(normalize(&Tag::Float(f32::INFINITY)), Value::Null);
        assert_eq!(normalize(&Tag::Double(1.5)), json!(1.5));
    }

    #[test]
    fn nested_lists_recurse() {
        let tag = Tag::List(vec![
            Tag::List(vec![Tag::String("a".to_string())]),
            Tag::Compound(vec![("k".to_string(), Tag::Byte(1))]),
        ]);
        assert_eq!(normalize(&tag), json!([["a"], {"k": 1}]));
    }

    #[test]
    fn duplicate_compound_keys_keep_last_value() {
        let tag = Tag::Compound(vec![
            ("k".to_string(), Tag::Int(1)),
            ("k".to_string(), Tag::Int(2)),
        ]);
        assert_eq!(normalize(&tag), json!({"k": 2}));
    }
}
