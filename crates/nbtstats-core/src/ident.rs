//! Identifier codec: 128-bit identifiers, four-int arrays, and known names.
//!
//! Save data stores player identifiers as arrays of four signed 32-bit
//! integers, one per big-endian 4-byte slice of the underlying UUID. This
//! module converts between that form, the canonical hyphenated string form,
//! and human-readable names via an injected read-only [`NameTable`].

use std::collections::BTreeMap;

use thiserror::Error;
use uuid::{uuid, Uuid};

/// Result alias for codec operations.
pub type IdentResult<T> = Result<T, IdentError>;

/// Errors from identifier resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentError {
    /// An int-array input did not have exactly four entries.
    #[error("expected an array of four 32-bit integers, got {len} entries")]
    InvalidShape { len: usize },

    /// A textual input was neither a known name nor a parseable identifier.
    #[error("'{input}' does not resolve to a valid identifier")]
    InvalidFormat { input: String },
}

/// A value that can designate an identity: a known name, a canonical
/// identifier string, or the four-int-array form found in save data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentValue {
    /// A name from the table, or an identifier string.
    Text(String),
    /// Candidate four-int-array form (validated on resolution).
    Ints(Vec<i32>),
}

impl IdentValue {
    /// Convenience constructor for textual inputs.
    pub fn text(value: impl Into<String>) -> Self {
        IdentValue::Text(value.into())
    }
}

/// Known names shipped with the tool.
const BUILTIN: &[(&str, Uuid)] = &[
    ("AtlasV1224", uuid!("7c7518ea-d77c-401e-805e-3fecb9d3f888")),
    ("tlitookilakin", uuid!("8ee61ef3-1eee-4867-96c6-c9ee708cd1ea")),
    ("Pinkmoney", uuid!("8fa2d575-05fe-4af0-a62f-d8493aecae66")),
    ("kittycatcasey", uuid!("9beee7d5-6f24-45b4-acf2-bcd3cab184a2")),
    ("DecidedlyHuman", uuid!("83caec38-58b8-4d24-95ec-209eefc8ce73")),
    ("Erinthe", uuid!("246bc0d1-c5f6-418e-baaf-a9b632ace079")),
    ("Super_MrSpring", uuid!("2886d944-b171-413f-ad25-4d5f27ee46ed")),
    ("Spiderbuttons", uuid!("07304b7d-1ab9-49ea-9995-35fba7b17e4a")),
    ("Xeragene", uuid!("7746f2d4-a4d7-4d6a-bb59-82ad6ecd6725")),
    ("shekurika", uuid!("051295fe-8aec-44aa-84c6-f9b6eea8245c")),
    ("KhloeLeclair", uuid!("41481473-e075-4896-adcd-0e91c89606df")),
    ("pneuma163", uuid!("55725902-ad5d-4a1f-9ee3-3e3c61f6102a")),
    ("TheFrenchDodo", uuid!("b279d81d-dd25-418f-b78c-6ae7282d26c5")),
    ("ScarletCraft", uuid!("d1a2643a-fd66-4af6-81f4-1b7b8cd86653")),
    ("skellady", uuid!("ddbd74b6-8302-4f93-ae1d-9ca8db5000a0")),
    ("Pil_", uuid!("e054b62a-e6d7-475d-8fae-a4ebf98c8519")),
    ("SinZ", uuid!("e0989ba6-7eee-4ad1-9c49-88fc6db8e7e5")),
    ("LeFauxMatt", uuid!("ec1b0b30-782d-44ec-8e06-79def1444c26")),
];

/// Read-only name-to-identifier mapping.
///
/// Loaded once at process start and never mutated. Identifiers with no
/// table entry are data, not errors: reverse lookup degrades to a
/// descriptive "no name found" string so downstream counting can keep them.
#[derive(Debug, Clone)]
pub struct NameTable {
    by_name: BTreeMap<String, Uuid>,
}

impl NameTable {
    /// Build a table from explicit entries.
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Uuid)>,
    {
        NameTable {
            by_name: entries.into_iter().collect(),
        }
    }

    /// The compiled-in table of known names.
    pub fn builtin() -> Self {
        NameTable::new(
            BUILTIN
                .iter()
                .map(|(name, id)| ((*name).to_string(), *id)),
        )
    }

    /// Number of entries in the table.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Forward lookup: name to identifier.
    pub fn lookup(&self, name: &str) -> Option<Uuid> {
        self.by_name.get(name).copied()
    }

    /// Reverse lookup: identifier to name.
    pub fn name_of(&self, id: Uuid) -> Option<&str> {
        self.by_name
            .iter()
            .find(|(_, mapped)| **mapped == id)
            .map(|(name, _)| name.as_str())
    }

    /// Resolve any [`IdentValue`] to its identifier.
    ///
    /// Text inputs that match a table name substitute the mapped identifier;
    /// other text must parse as a UUID. Int-array inputs must have exactly
    /// four entries.
    pub fn canonical(&self, value: &IdentValue) -> IdentResult<Uuid> {
        match value {
            IdentValue::Text(text) => {
                if let Some(id) = self.lookup(text) {
                    return Ok(id);
                }
                Uuid::parse_str(text).map_err(|_| IdentError::InvalidFormat {
                    input: text.clone(),
                })
            }
            IdentValue::Ints(words) => uuid_from_int_array(words),
        }
    }

    /// Resolve to the canonical lowercase hyphenated string form.
    pub fn canonical_string(&self, value: &IdentValue) -> IdentResult<String> {
        Ok(self.canonical(value)?.to_string())
    }

    /// Resolve to the four signed big-endian words, in slice order 0..3.
    pub fn to_int_array(&self, value: &IdentValue) -> IdentResult<[i32; 4]> {
        Ok(uuid_to_int_array(self.canonical(value)?))
    }

    /// Resolve to a human-readable name.
    ///
    /// Identifiers absent from the table yield `"no name found for UUID:
    /// <identifier>"` rather than an error.
    pub fn display_name(&self, value: &IdentValue) -> IdentResult<String> {
        let id = self.canonical(value)?;
        Ok(match self.name_of(id) {
            Some(name) => name.to_string(),
            None => format!("no name found for UUID: {id}"),
        })
    }
}

/// Pack four signed 32-bit words into an identifier.
///
/// Each word contributes its unsigned 32-bit bit pattern as one big-endian
/// 4-byte slice, so negative representations round-trip exactly.
pub fn uuid_from_int_array(words: &[i32]) -> IdentResult<Uuid> {
    if words.len() != 4 {
        return Err(IdentError::InvalidShape { len: words.len() });
    }
    let mut bytes = [0u8; 16];
    for (i, word) in words.iter().enumerate() {
        bytes[i * 4..i * 4 + 4].copy_from_slice(&word.to_be_bytes());
    }
    Ok(Uuid::from_bytes(bytes))
}

/// Split an identifier into its four signed big-endian words.
pub fn uuid_to_int_array(id: Uuid) -> [i32; 4] {
    let bytes = id.as_bytes();
    let mut words = [0i32; 4];
    for (i, word) in words.iter_mut().enumerate() {
        *word = i32::from_be_bytes([
            bytes[i * 4],
            bytes[i * 4 + 1],
            bytes[i * 4 + 2],
            bytes[i * 4 + 3],
        ]);
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> NameTable {
        NameTable::builtin()
    }

    mod round_trips {
        use super::*;

        #[test]
        fn string_to_ints_and_back() {
            let table = table();
            let value = IdentValue::text("7c7518ea-d77c-401e-805e-3fecb9d3f888");
            let words = table.to_int_array(&value).unwrap();
            let back = uuid_from_int_array(&words).unwrap();
            assert_eq!(back.to_string(), "7c7518ea-d77c-401e-805e-3fecb9d3f888");
        }

        #[test]
        fn ints_to_uuid_and_back() {
            let words = [2088048874, -679722978, -2141306900, -1177290616];
            let id = uuid_from_int_array(&words).unwrap();
            assert_eq!(uuid_to_int_array(id), words);
        }

        #[test]
        fn uppercase_input_normalizes_to_lowercase() {
            let table = table();
            let value = IdentValue::text("7C7518EA-D77C-401E-805E-3FECB9D3F888");
            assert_eq!(
                table.canonical_string(&value).unwrap(),
                "7c7518ea-d77c-401e-805e-3fecb9d3f888"
            );
        }

        #[test]
        fn negative_words_use_unsigned_bit_pattern() {
            let id = uuid_from_int_array(&[-1, 0, -1, 0]).unwrap();
            assert_eq!(
                id.as_bytes(),
                &[
                    0xff, 0xff, 0xff, 0xff, 0, 0, 0, 0, 0xff, 0xff, 0xff, 0xff, 0, 0, 0, 0
                ]
            );
        }
    }

    mod name_resolution {
        use super::*;

        #[test]
        fn name_substitutes_mapped_identifier() {
            let table = table();
            assert_eq!(
                table
                    .canonical_string(&IdentValue::text("AtlasV1224"))
                    .unwrap(),
                "7c7518ea-d77c-401e-805e-3fecb9d3f888"
            );
        }

        #[test]
        fn int_array_resolves_to_exact_name() {
            let table = table();
            let value = IdentValue::Ints(vec![2088048874, -679722978, -2141306900, -1177290616]);
            assert_eq!(table.display_name(&value).unwrap(), "AtlasV1224");
        }

        #[test]
        fn unknown_identifier_yields_descriptive_string() {
            let table = table();
            let value = IdentValue::text("00000000-0000-0000-0000-000000000001");
            let name = table.display_name(&value).unwrap();
            assert_eq!(
                name,
                "no name found for UUID: 00000000-0000-0000-0000-000000000001"
            );
        }

        #[test]
        fn injected_table_overrides_builtin() {
            let table = NameTable::new([(
                "Tester".to_string(),
                Uuid::parse_str("7e7e80aa-aae9-abff-9769-6ac6beeafd5a").unwrap(),
            )]);
            let value = IdentValue::Ints(vec![
                2122219690,
                -1427526657,
                -1754699066,
                -1091895974,
            ]);
            assert_eq!(table.display_name(&value).unwrap(), "Tester");
        }
    }

    mod failures {
        use super::*;

        #[test]
        fn wrong_length_int_array_is_invalid_shape() {
            let err = uuid_from_int_array(&[1, 2, 3]).unwrap_err();
            assert_eq!(err, IdentError::InvalidShape { len: 3 });
        }

        #[test]
        fn garbage_text_is_invalid_format() {
            let table = table();
            let err = table
                .canonical(&IdentValue::text("definitely-not-a-uuid"))
                .unwrap_err();
            assert!(matches!(err, IdentError::InvalidFormat { .. }));
        }
    }
}
