//! Lock-guarded handles over an untyped JSON document.
//!
//! [`Json`] wraps a node of a `serde_json::Value` tree together with a mutex.
//! Calls made through one handle are serialized; navigating returns a new
//! handle, with its own mutex, into the same tree.
//!
//! # Example
//!
//! ```
//! use safe_json::Json;
//!
//! let js = Json::new();
//! js.set_path(["a", "b", "c"], 1);
//! assert_eq!(js.get_path(["a", "b", "c"]).as_int().unwrap(), 1);
//!
//! // Misses never fail, only the final accessor decides.
//! assert_eq!(js.get("missing").get("deeper").must_int(42), 42);
//! assert!(js.get("a").as_string().is_err());
//! ```
//!
//! The guarantee is per handle. Handles obtained from the same parent do not
//! exclude each other, and a sequence of calls through a parent may
//! interleave with calls through a child. Callers needing several calls to
//! appear atomic must coordinate outside this crate.

pub mod coerce;
pub mod error;
pub mod json;
pub mod path;

pub use error::{JsonError, JsonResult, Kind};
pub use json::Json;
pub use path::PathStep;

/// Returns the crate version at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
