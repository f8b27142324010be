use std::io;
use std::sync::{Arc, Mutex};

use safe_json::Json;
use serde_json::json;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Captured {
    type Writer = Captured;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

// Kept as the only test in this binary so no other thread registers the
// callsites before the scoped subscriber is installed.
#[test]
fn set_path_and_load_slice_emit_debug_events() {
    let captured = Captured::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(captured.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let root = Json::from_value(json!({"a": 5}));
        root.set_path(["a", "b"], 1);
        assert_eq!(root.to_value(), json!({"a": {"b": 1}}));

        let child = root.get("a");
        root.delete("a");
        child.set_path(["c"], 2);

        child.load_slice(b"[]").unwrap();
    });

    let out = captured.text();
    assert!(out.contains("set_path overwriting non-object with an empty object"), "{out}");
    assert!(out.contains("key=\"a\""), "{out}");
    assert!(out.contains("found=number"), "{out}");
    assert!(out.contains("set_path on a location that no longer exists"), "{out}");
    assert!(out.contains("handle re-pointed at a new document"), "{out}");
    assert!(!out.contains("TRACE"), "{out}");
}
