//! Host value model produced by the classic-mode reifier

use indexmap::IndexMap;

/// A host value pushed by the reifier.
///
/// Strings are byte strings: subjects are arbitrary bytes and captured
/// ranges are sliced out of them verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Str(Vec<u8>),
    Table(CapTable),
}

impl Value {
    /// Byte-string constructor accepting anything convertible to bytes
    pub fn str(s: impl Into<Vec<u8>>) -> Self {
        Value::Str(s.into())
    }

    /// Host-level type name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "number",
            Value::Bool(_) => "boolean",
            Value::Str(_) => "string",
            Value::Table(_) => "table",
        }
    }

    pub fn as_str(&self) -> Option<&[u8]> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&CapTable> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Key form of this value for ktable map lookups. Only integers and
    /// UTF-8 strings can act as keys.
    pub fn as_map_key(&self) -> Option<MapKey> {
        match self {
            Value::Int(n) => Some(MapKey::Int(*n)),
            Value::Str(s) => String::from_utf8(s.clone()).ok().map(MapKey::Str),
            _ => None,
        }
    }
}

/// Lookup key for ktable maps
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MapKey {
    Int(i64),
    Str(String),
}

impl From<&str> for MapKey {
    fn from(s: &str) -> Self {
        MapKey::Str(s.to_string())
    }
}

impl From<i64> for MapKey {
    fn from(n: i64) -> Self {
        MapKey::Int(n)
    }
}

/// A tagged table value: a positional list plus named entries, in
/// insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CapTable {
    pub list: Vec<Value>,
    pub named: IndexMap<String, Value>,
}

impl CapTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: Value) {
        self.list.push(value);
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.named.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.named.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty() && self.named.is_empty()
    }
}

/// Build a match value of the shape `{name: {pos, text, subs}}`.
///
/// Trailing sub-matches become the `subs` list inside the body table; the
/// list is omitted when there are none.
pub fn create_match(
    name: impl Into<String>,
    pos: usize,
    text: impl Into<Vec<u8>>,
    subs: Vec<Value>,
) -> Value {
    let mut body = CapTable::new();
    body.insert("pos", Value::Int(pos as i64));
    body.insert("text", Value::Str(text.into()));
    if !subs.is_empty() {
        body.insert(
            "subs",
            Value::Table(CapTable {
                list: subs,
                named: IndexMap::new(),
            }),
        );
    }

    let mut outer = CapTable::new();
    outer.insert(name, Value::Table(body));
    Value::Table(outer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names_for_errors() {
        assert_eq!(Value::Int(1).type_name(), "number");
        assert_eq!(Value::str("x").type_name(), "string");
        assert_eq!(Value::Table(CapTable::new()).type_name(), "table");
    }

    #[test]
    fn map_keys_from_values() {
        assert_eq!(Value::Int(7).as_map_key(), Some(MapKey::Int(7)));
        assert_eq!(
            Value::str("k").as_map_key(),
            Some(MapKey::Str("k".to_string()))
        );
        assert_eq!(Value::Bool(true).as_map_key(), None);
    }

    #[test]
    fn create_match_shape() {
        let m = create_match("word", 1, "abc", vec![]);
        let outer = m.as_table().unwrap();
        let body = outer.get("word").unwrap().as_table().unwrap();
        assert_eq!(body.get("pos").unwrap().as_int(), Some(1));
        assert_eq!(body.get("text").unwrap().as_str(), Some(&b"abc"[..]));
        assert!(body.get("subs").is_none());
    }

    #[test]
    fn create_match_with_subs() {
        let sub = create_match("inner", 2, "b", vec![]);
        let m = create_match("outer", 1, "abc", vec![sub]);
        let body = m
            .as_table()
            .unwrap()
            .get("outer")
            .unwrap()
            .as_table()
            .unwrap();
        let subs = body.get("subs").unwrap().as_table().unwrap();
        assert_eq!(subs.list.len(), 1);
    }
}
