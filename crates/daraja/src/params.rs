//! Ordered request parameters and the default/override overlay.
//!
//! Every request body starts as a map of defaults. Caller overrides are
//! overlaid key by key: an override replaces the default unconditionally
//! (an explicit `""` included), defaults fill the keys the caller left out,
//! and keys only the caller knows are appended. Insertion order is kept so
//! bodies serialise with the defaults first.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ordered map of gateway parameter name to JSON value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(Map<String, Value>);

impl Params {
    /// Create an empty parameter map.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a value, keeping the key's original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Value for an exact key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// True if the key is present, whatever its value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parameter names in order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Parameters in order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Borrow the underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume into a JSON object value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Overlay caller overrides onto these defaults.
    ///
    /// Override keys are normalised with [`normalize_key`] first.
    pub fn overlay(&mut self, overrides: Params) {
        for (key, value) in overrides.0 {
            self.0.insert(normalize_key(&key), value);
        }
    }

    /// Copy `PhoneNumber` into an empty `PartyA`, then `PartyA` into an empty
    /// `PhoneNumber`. Runs once, in that order.
    pub fn reconcile_party_and_phone(&mut self) {
        const PARTY_A: &str = "PartyA";
        const PHONE_NUMBER: &str = "PhoneNumber";

        if self.value_is_empty(PARTY_A) && !self.value_is_empty(PHONE_NUMBER) {
            if let Some(phone) = self.0.get(PHONE_NUMBER).cloned() {
                self.0.insert(PARTY_A.to_string(), phone);
            }
        }
        if self.value_is_empty(PHONE_NUMBER) && !self.value_is_empty(PARTY_A) {
            if let Some(party) = self.0.get(PARTY_A).cloned() {
                self.0.insert(PHONE_NUMBER.to_string(), party);
            }
        }
    }

    fn value_is_empty(&self, key: &str) -> bool {
        self.0.get(key).map_or(true, is_empty_value)
    }
}

impl From<Map<String, Value>> for Params {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl IntoIterator for Params {
    type Item = (String, Value);
    type IntoIter = serde_json::map::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl TryFrom<Value> for Params {
    type Error = crate::error::DarajaError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::new()),
            other => Err(crate::error::DarajaError::configuration(format!(
                "request overrides must be a JSON object, got {}",
                other
            ))),
        }
    }
}

/// Upper-case the first character of every whitespace-separated word.
///
/// The rest of each word is left alone, so `partyA` becomes `PartyA` and
/// `callBackURL` becomes `CallBackURL`.
pub fn normalize_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut at_word_start = true;
    for c in key.chars() {
        if at_word_start && !c.is_whitespace() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = c.is_whitespace();
    }
    out
}

/// Emptiness as the gateway's reference clients judge it.
///
/// `null`, `false`, `0`, `""`, `"0"` and empty arrays or objects are empty.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
