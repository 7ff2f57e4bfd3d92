//! Reply shaping.

use recolor_engine::ColorTriple;
use serde_json::{Map, Value, json};

use super::DONE_STATUS;

/// Turns a request envelope into its `"done"` reply.
///
/// `status` and `data` are overwritten where they already sit, so every
/// field keeps the position the peer gave it.
pub(super) fn done_reply(batch: &[ColorTriple], mut envelope: Map<String, Value>) -> Value {
    envelope.insert(String::from("status"), Value::from(DONE_STATUS));
    envelope.insert(
        String::from("data"),
        batch
            .iter()
            .map(|color| json!({"r": color.r, "g": color.g, "b": color.b}))
            .collect(),
    );
    Value::Object(envelope)
}
