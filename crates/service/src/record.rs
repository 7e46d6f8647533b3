//! Record model and identifier generation.

use chrono::{DateTime, SecondsFormat, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const ID_FIELD: &str = "id";
pub const CREATED_AT_FIELD: &str = "createdAt";

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const RANDOM_SUFFIX_LEN: usize = 6;

/// A stored JSON object carrying system-assigned `id` and `createdAt`.
///
/// Field order is preserved on the wire: `id`, `createdAt`, then the caller's
/// keys in the order they were supplied.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Build a new record from caller fields. System fields win over colliding caller keys.
    pub fn create<R: Rng>(fields: Map<String, Value>, now: DateTime<Utc>, rng: &mut R) -> Self {
        let now_ms = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let mut map = Map::with_capacity(fields.len() + 2);
        map.insert(ID_FIELD.to_string(), Value::String(generate_id(now_ms, rng)));
        map.insert(
            CREATED_AT_FIELD.to_string(),
            Value::String(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        for (k, v) in fields {
            if k == ID_FIELD || k == CREATED_AT_FIELD {
                continue;
            }
            map.insert(k, v);
        }
        Self(map)
    }

    /// The record's `id`, if present and a string.
    pub fn id(&self) -> Option<&str> {
        self.0.get(ID_FIELD).and_then(Value::as_str)
    }

    pub fn created_at(&self) -> Option<&str> {
        self.0.get(CREATED_AT_FIELD).and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Lowercase base-36 rendering of `n`.
pub fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::with_capacity(13);
    while n > 0 {
        buf.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    buf.reverse();
    String::from_utf8(buf).unwrap_or_default()
}

/// `base36(now_ms)` followed by six random base-36 characters.
///
/// Not cryptographically secure; collisions are merely unlikely at modest request rates.
pub fn generate_id<R: Rng>(now_ms: u64, rng: &mut R) -> String {
    let mut id = to_base36(now_ms);
    for _ in 0..RANDOM_SUFFIX_LEN {
        id.push(BASE36[rng.gen_range(0..BASE36.len())] as char);
    }
    id
}
