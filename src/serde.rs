//! Serde support: both maps serialize as a map in iteration order and
//! deserialize by inserting entries in the order they are read.
//!
//! The order mode and eviction policy are not part of the serialized form;
//! a deserialized `LinkedHashMap` is insertion-ordered with the policy's
//! `Default`.

use crate::config::Config;
use crate::evict::EvictionPolicy;
use crate::hash_map::HashMap;
use crate::linked_hash_map::LinkedHashMap;
use ::serde::de::{Error, MapAccess, Visitor};
use ::serde::ser::SerializeMap;
use ::serde::{Deserialize, Deserializer, Serialize, Serializer};
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::marker::PhantomData;

// Untrusted length hints must not drive huge allocations.
const MAX_PREALLOC: usize = 4096;

fn config_for(hint: Option<usize>) -> Config {
    let n = hint.unwrap_or(0).min(MAX_PREALLOC);
    Config::default().with_initial_capacity(n.max(1))
}

fn serialize_entries<'a, K, V, I, Ser>(len: usize, entries: I, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
where
    K: Serialize + 'a,
    V: Serialize + 'a,
    I: Iterator<Item = (&'a K, &'a V)>,
    Ser: Serializer,
{
    let mut map = serializer.serialize_map(Some(len))?;
    for (k, v) in entries {
        map.serialize_entry(k, v)?;
    }
    map.end()
}

impl<K, V, S> Serialize for HashMap<K, V, S>
where
    K: Serialize,
    V: Serialize,
{
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        serialize_entries(self.len(), self.iter(), serializer)
    }
}

impl<K, V, S, E> Serialize for LinkedHashMap<K, V, S, E>
where
    K: Serialize,
    V: Serialize,
{
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        serialize_entries(self.len(), self.iter(), serializer)
    }
}

struct HashMapVisitor<K, V, S>(PhantomData<HashMap<K, V, S>>);

impl<'de, K, V, S> Visitor<'de> for HashMapVisitor<K, V, S>
where
    K: Deserialize<'de> + Eq + Hash,
    V: Deserialize<'de>,
    S: BuildHasher + Default,
{
    type Value = HashMap<K, V, S>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut map = HashMap::with_config_and_hasher(config_for(access.size_hint()), S::default())
            .map_err(A::Error::custom)?;
        while let Some((key, value)) = access.next_entry()? {
            map.put(key, value);
        }
        Ok(map)
    }
}

impl<'de, K, V, S> Deserialize<'de> for HashMap<K, V, S>
where
    K: Deserialize<'de> + Eq + Hash,
    V: Deserialize<'de>,
    S: BuildHasher + Default,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(HashMapVisitor(PhantomData))
    }
}

struct LinkedHashMapVisitor<K, V, S, E>(PhantomData<LinkedHashMap<K, V, S, E>>);

impl<'de, K, V, S, E> Visitor<'de> for LinkedHashMapVisitor<K, V, S, E>
where
    K: Deserialize<'de> + Eq + Hash,
    V: Deserialize<'de>,
    S: BuildHasher + Default,
    E: EvictionPolicy<K, V> + Default,
{
    type Value = LinkedHashMap<K, V, S, E>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut map =
            LinkedHashMap::with_config_hasher_and_eviction(config_for(access.size_hint()), S::default(), E::default())
                .map_err(A::Error::custom)?;
        while let Some((key, value)) = access.next_entry()? {
            map.put(key, value);
        }
        Ok(map)
    }
}

impl<'de, K, V, S, E> Deserialize<'de> for LinkedHashMap<K, V, S, E>
where
    K: Deserialize<'de> + Eq + Hash,
    V: Deserialize<'de>,
    S: BuildHasher + Default,
    E: EvictionPolicy<K, V> + Default,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(LinkedHashMapVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use crate::{HashMap, LinkedHashMap, OrderMode};

    #[test]
    fn linked_map_keeps_order_through_json() {
        let mut m = LinkedHashMap::with_order(OrderMode::Access);
        m.put("b".to_string(), 2);
        m.put("a".to_string(), 1);
        m.put("c".to_string(), 3);
        m.get("b");
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, r#"{"a":1,"c":3,"b":2}"#);

        let back: LinkedHashMap<String, i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.order_mode(), OrderMode::Insertion);
        assert_eq!(back.keys().cloned().collect::<Vec<_>>(), ["a", "c", "b"]);
        assert_eq!(back, m);
    }

    #[test]
    fn hash_map_round_trips_contents() {
        let m: HashMap<u32, String> = (0..50).map(|i| (i, i.to_string())).collect();
        let json = serde_json::to_string(&m).unwrap();
        let back: HashMap<u32, String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn duplicate_keys_keep_last_value_and_first_position() {
        let back: LinkedHashMap<String, i32> = serde_json::from_str(r#"{"x":1,"y":2,"x":3}"#).unwrap();
        assert_eq!(back.iter().map(|(k, v)| (k.as_str(), *v)).collect::<Vec<_>>(), [("x", 3), ("y", 2)]);
    }
}
