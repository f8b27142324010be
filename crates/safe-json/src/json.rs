//! The lock-guarded handle.
//!
//! A [`Json`] references one node of a shared document by `(document, path)`.
//! Each handle owns a mutex around that reference, so every call made through
//! one handle is serialized. Handles produced by navigation get a mutex of
//! their own: nothing orders calls made through different handles, even when
//! they address the same node.
//!
//! The document itself sits behind an `RwLock` that is taken once per
//! primitive access and never held across calls. Lock order is always
//! handle first, document second.

use std::fmt;
use std::io::Read;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::coerce;
use crate::error::{JsonError, JsonResult, Kind};
use crate::path::{assign_path, value_at_path, value_at_path_mut, PathStep};

/// Read through a missing location.
static NULL: Value = Value::Null;

type Document = Arc<RwLock<Value>>;

#[derive(Clone)]
struct NodeRef {
    doc: Document,
    path: Vec<PathStep>,
}

impl NodeRef {
    fn detached(value: Value) -> Self {
        Self {
            doc: Arc::new(RwLock::new(value)),
            path: Vec::new(),
        }
    }

    fn child(&self, steps: impl IntoIterator<Item = PathStep>) -> Self {
        let mut path = self.path.clone();
        path.extend(steps);
        Self {
            doc: Arc::clone(&self.doc),
            path,
        }
    }

    /// Run `f` on the referenced node, or on `null` if the path no longer
    /// resolves.
    fn with_read<R>(&self, f: impl FnOnce(&Value) -> R) -> R {
        let doc = self.doc.read().unwrap_or_else(PoisonError::into_inner);
        f(value_at_path(&doc, &self.path).unwrap_or(&NULL))
    }

    /// Run `f` on the referenced node; `None` if the path no longer resolves.
    fn with_write<R>(&self, f: impl FnOnce(Option<&mut Value>) -> R) -> R {
        let mut doc = self.doc.write().unwrap_or_else(PoisonError::into_inner);
        f(value_at_path_mut(&mut doc, &self.path))
    }
}

/// Thread-safe handle to a node of an untyped JSON document.
///
/// Navigation (`get`, `get_path`, `get_index`, `check_get`) never fails: a
/// miss yields a handle over a detached `null`, so chains such as
/// `js.get("a").get("b").must_int(None)` only decide at the final accessor.
///
/// ```
/// use safe_json::Json;
///
/// let js = Json::from_slice(br#"{"a":{"b":1}}"#).unwrap();
/// assert_eq!(js.get("a").get("b").must_int(None), 1);
///
/// js.get("a").set("c", 2).unwrap();
/// assert_eq!(js.encode().unwrap(), br#"{"a":{"b":1,"c":2}}"#.to_vec());
/// ```
pub struct Json {
    node: Mutex<NodeRef>,
}

impl Json {
    /// New document holding an empty object.
    pub fn new() -> Self {
        Self::from_value(Value::Object(Map::new()))
    }

    /// Wrap an existing tree as a new document.
    pub fn from_value(value: Value) -> Self {
        Self::from_node(NodeRef::detached(value))
    }

    /// Parse `raw` as a new document.
    pub fn from_slice(raw: &[u8]) -> JsonResult<Self> {
        serde_json::from_slice(raw)
            .map(Self::from_value)
            .map_err(JsonError::Parse)
    }

    /// Parse a new document from `reader`, blocking until it is drained.
    pub fn from_reader<R: Read>(reader: R) -> JsonResult<Self> {
        serde_json::from_reader(reader)
            .map(Self::from_value)
            .map_err(JsonError::Parse)
    }

    fn from_node(node: NodeRef) -> Self {
        Self {
            node: Mutex::new(node),
        }
    }

    fn sentinel(missed: &dyn fmt::Display) -> Self {
        tracing::trace!(step = %missed, "navigation miss, returning null");
        Self::from_value(Value::Null)
    }

    fn lock(&self) -> MutexGuard<'_, NodeRef> {
        self.node.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Re-point this handle at a freshly parsed document.
    ///
    /// Other handles, including the one this handle was navigated from, keep
    /// their references. On error this handle is left unchanged.
    pub fn load_slice(&self, raw: &[u8]) -> JsonResult<()> {
        let value: Value = serde_json::from_slice(raw).map_err(JsonError::Parse)?;
        let mut node = self.lock();
        tracing::debug!(path = ?node.path, "handle re-pointed at a new document");
        *node = NodeRef::detached(value);
        Ok(())
    }

    // Serialization

    /// Compact JSON bytes of the referenced node.
    pub fn encode(&self) -> JsonResult<Vec<u8>> {
        self.lock()
            .with_read(|v| serde_json::to_vec(v))
            .map_err(JsonError::Encode)
    }

    /// Indented JSON bytes of the referenced node.
    pub fn encode_pretty(&self) -> JsonResult<Vec<u8>> {
        self.lock()
            .with_read(|v| serde_json::to_vec_pretty(v))
            .map_err(JsonError::Encode)
    }

    /// Owned snapshot of the referenced node.
    pub fn to_value(&self) -> Value {
        self.lock().with_read(Value::clone)
    }

    /// Runtime kind of the referenced node; a missing location is `Null`.
    pub fn kind(&self) -> Kind {
        self.lock().with_read(Kind::of)
    }

    /// `true` for `null`, including the sentinel and missing locations.
    pub fn is_null(&self) -> bool {
        self.lock().with_read(Value::is_null)
    }

    // Mutation

    /// Insert or overwrite `key` in the referenced object.
    ///
    /// Fails with [`JsonError::TypeMismatch`] if the node is not an object;
    /// the document is left unchanged.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> JsonResult<()> {
        let key = key.into();
        let value = value.into();
        self.lock().with_write(|slot| match slot {
            Some(Value::Object(map)) => {
                map.insert(key, value);
                Ok(())
            }
            Some(other) => Err(JsonError::mismatch("object", other)),
            None => Err(JsonError::mismatch("object", &NULL)),
        })
    }

    /// Write `value` at `branch`, creating intermediate objects.
    ///
    /// Any non-object found on the way, including the referenced node
    /// itself, is overwritten with an empty object. An empty branch replaces
    /// the referenced node.
    pub fn set_path<I>(&self, branch: I, value: impl Into<Value>)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let branch: Vec<I::Item> = branch.into_iter().collect();
        let value = value.into();
        let node = self.lock();
        node.with_write(|slot| match slot {
            Some(target) => assign_path(target, &branch, value),
            None => {
                tracing::debug!(path = ?node.path, "set_path on a location that no longer exists");
            }
        });
    }

    /// Remove `key` from the referenced object, returning the old value.
    ///
    /// Absent keys and non-object nodes are a no-op.
    pub fn delete(&self, key: &str) -> Option<Value> {
        self.lock().with_write(|slot| match slot {
            Some(Value::Object(map)) => map.remove(key),
            _ => None,
        })
    }

    // Navigation

    /// Handle for `key` of the referenced object, or a null sentinel.
    pub fn get(&self, key: &str) -> Json {
        self.check_get(key).0
    }

    /// Like [`Json::get`], also reporting whether `key` was present.
    pub fn check_get(&self, key: &str) -> (Json, bool) {
        let node = self.lock();
        let found = node.with_read(|v| v.as_object().is_some_and(|map| map.contains_key(key)));
        if found {
            let child = node.child([PathStep::from(key)]);
            (Json::from_node(child), true)
        } else {
            (Json::sentinel(&key), false)
        }
    }

    /// Handle for a nested key path, or a null sentinel on the first miss.
    pub fn get_path<I>(&self, branch: I) -> Json
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let steps: Vec<PathStep> = branch
            .into_iter()
            .map(|step| PathStep::from(step.as_ref()))
            .collect();
        let node = self.lock();
        let found = node.with_read(|v| value_at_path(v, &steps).is_some());
        if found {
            Json::from_node(node.child(steps))
        } else {
            let joined = steps.iter().map(ToString::to_string).collect::<Vec<_>>().join("/");
            Json::sentinel(&joined)
        }
    }

    /// Handle for element `index` of the referenced array, or a null
    /// sentinel.
    pub fn get_index(&self, index: usize) -> Json {
        let node = self.lock();
        let found = node.with_read(|v| v.as_array().is_some_and(|arr| index < arr.len()));
        if found {
            Json::from_node(node.child([PathStep::Index(index)]))
        } else {
            Json::sentinel(&index)
        }
    }

    // Strict accessors

    /// Owned copy of an object node.
    pub fn as_object(&self) -> JsonResult<Map<String, Value>> {
        self.lock().with_read(coerce::object)
    }

    /// Owned copy of an array node.
    pub fn as_array(&self) -> JsonResult<Vec<Value>> {
        self.lock().with_read(coerce::array)
    }

    /// Value of a boolean node.
    pub fn as_bool(&self) -> JsonResult<bool> {
        self.lock().with_read(coerce::boolean)
    }

    /// Owned copy of a string node.
    pub fn as_string(&self) -> JsonResult<String> {
        self.lock().with_read(coerce::string)
    }

    /// UTF-8 bytes of a string node.
    pub fn as_bytes(&self) -> JsonResult<Vec<u8>> {
        self.lock().with_read(coerce::bytes)
    }

    /// Array of strings; `null` elements read as `""`.
    pub fn as_string_array(&self) -> JsonResult<Vec<String>> {
        self.lock().with_read(coerce::string_array)
    }

    /// Any float, or an integer `f64` represents exactly.
    pub fn as_f64(&self) -> JsonResult<f64> {
        self.lock().with_read(coerce::float64)
    }

    /// Integral number that fits a machine word.
    pub fn as_int(&self) -> JsonResult<isize> {
        self.lock().with_read(coerce::int)
    }

    /// Integral number that fits an `i64`.
    pub fn as_i64(&self) -> JsonResult<i64> {
        self.lock().with_read(coerce::int64)
    }

    /// Integral number that fits a `u64`.
    pub fn as_u64(&self) -> JsonResult<u64> {
        self.lock().with_read(coerce::uint64)
    }

    // Lenient accessors: the coerced value, else `default`, else zero.

    /// Iterate an array without handling errors:
    ///
    /// ```
    /// # let js = safe_json::Json::from_slice(br#"{"results":[1,2]}"#).unwrap();
    /// for item in js.get("results").must_array(None) {
    ///     assert!(item.is_number());
    /// }
    /// ```
    pub fn must_array(&self, default: impl Into<Option<Vec<Value>>>) -> Vec<Value> {
        lenient(self.as_array(), default)
    }

    pub fn must_map(
        &self,
        default: impl Into<Option<Map<String, Value>>>,
    ) -> Map<String, Value> {
        lenient(self.as_object(), default)
    }

    pub fn must_string<'a>(&self, default: impl Into<Option<&'a str>>) -> String {
        self.as_string()
            .unwrap_or_else(|_| default.into().unwrap_or_default().to_owned())
    }

    pub fn must_string_array(&self, default: impl Into<Option<Vec<String>>>) -> Vec<String> {
        lenient(self.as_string_array(), default)
    }

    pub fn must_int(&self, default: impl Into<Option<isize>>) -> isize {
        lenient(self.as_int(), default)
    }

    pub fn must_f64(&self, default: impl Into<Option<f64>>) -> f64 {
        lenient(self.as_f64(), default)
    }

    pub fn must_bool(&self, default: impl Into<Option<bool>>) -> bool {
        lenient(self.as_bool(), default)
    }

    pub fn must_i64(&self, default: impl Into<Option<i64>>) -> i64 {
        lenient(self.as_i64(), default)
    }

    pub fn must_u64(&self, default: impl Into<Option<u64>>) -> u64 {
        lenient(self.as_u64(), default)
    }
}

fn lenient<T: Default>(result: JsonResult<T>, default: impl Into<Option<T>>) -> T {
    result.unwrap_or_else(|_| default.into().unwrap_or_default())
}

impl Default for Json {
    fn default() -> Self {
        Self::new()
    }
}

/// A new handle, with its own lock, over the same node.
impl Clone for Json {
    fn clone(&self) -> Self {
        Self::from_node(self.lock().clone())
    }
}

impl fmt::Debug for Json {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.lock();
        f.debug_struct("Json").field("path", &node.path).finish()
    }
}

impl fmt::Display for Json {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self
            .lock()
            .with_read(|v| serde_json::to_string(v))
            .map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl From<Value> for Json {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

impl FromStr for Json {
    type Err = JsonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s)
            .map(Self::from_value)
            .map_err(JsonError::Parse)
    }
}

impl Serialize for Json {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.lock().with_read(|v| v.serialize(serializer))
    }
}

impl<'de> Deserialize<'de> for Json {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}
