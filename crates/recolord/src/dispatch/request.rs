//! Validation of inbound messages.

use recolor_engine::{ColorTriple, substitute};
use serde_json::{Map, Value};

use super::RUN_STATUS;
use super::errors::RejectReason;
use super::response::done_reply;

const STATUS_FIELD: &str = "status";
const DATA_FIELD: &str = "data";

/// A `"run"` message that passed validation.
///
/// The whole envelope is kept in the order the peer sent it; the reply
/// overwrites `status` and `data` in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    batch: Vec<ColorTriple>,
    envelope: Map<String, Value>,
}

impl ValidatedRequest {
    /// Colors to recolor, in request order.
    #[must_use]
    pub fn batch(&self) -> &[ColorTriple] {
        &self.batch
    }

    /// The request as received, `status` and `data` included.
    #[must_use]
    pub fn envelope(&self) -> &Map<String, Value> {
        &self.envelope
    }

    /// Recolors the batch and writes it back into the envelope.
    #[must_use]
    pub fn into_reply(self) -> Value {
        let replaced = substitute(&self.batch);
        done_reply(&replaced, self.envelope)
    }
}

/// Checks a decoded message and extracts the batch from it.
///
/// Checks run in order and the first failure wins: the message must be an
/// object, it must carry `status`, `status` must be `"run"`, and `data` must
/// be a list of `{r, g, b}` objects with channels in `0..=255`.
///
/// # Errors
///
/// Returns the [`RejectReason`] of the first failed check.
pub fn validate(message: Value) -> Result<ValidatedRequest, RejectReason> {
    let Value::Object(mut envelope) = message else {
        return Err(RejectReason::malformed_envelope("message is not a JSON object"));
    };
    let status = envelope
        .get(STATUS_FIELD)
        .ok_or_else(|| RejectReason::malformed_envelope("message has no status field"))?;
    if status.as_str() != Some(RUN_STATUS) {
        return Err(RejectReason::unrecognized_status(status.clone()));
    }
    let data = envelope
        .get_mut(DATA_FIELD)
        .map(Value::take)
        .ok_or_else(RejectReason::missing_payload)?;
    let batch = serde_json::from_value(data).map_err(RejectReason::invalid_payload)?;
    Ok(ValidatedRequest { batch, envelope })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[test]
    fn accepts_run_request_and_keeps_the_envelope_order() {
        let request = validate(json!({
            "job": "a-17",
            "status": "run",
            "data": [{"r": 1, "g": 2, "b": 3}],
            "tags": ["x"],
        }))
        .expect("request should validate");

        assert_eq!(request.batch(), &[ColorTriple::new(1, 2, 3)]);
        let keys: Vec<&str> = request.envelope().keys().map(String::as_str).collect();
        assert_eq!(keys, ["job", "status", "data", "tags"]);
    }

    #[test]
    fn accepts_empty_batch() {
        let request = validate(json!({"status": "run", "data": []})).expect("empty batch");
        assert!(request.batch().is_empty());
    }

    #[rstest]
    #[case(json!([1, 2, 3]))]
    #[case(json!("run"))]
    #[case(json!(null))]
    #[case(json!(42))]
    #[case(json!({"data": []}))]
    fn rejects_malformed_envelopes(#[case] message: Value) {
        let reason = validate(message).expect_err("message should be rejected");
        assert!(matches!(reason, RejectReason::MalformedEnvelope { .. }));
    }

    #[rstest]
    #[case(json!("done"))]
    #[case(json!("RUN"))]
    #[case(json!(""))]
    #[case(json!(1))]
    #[case(json!(null))]
    #[case(json!({"run": true}))]
    fn rejects_unrecognised_status(#[case] status: Value) {
        let reason = validate(json!({"status": status, "data": []}))
            .expect_err("status should be rejected");
        assert!(matches!(reason, RejectReason::UnrecognizedStatus { .. }));
    }

    #[test]
    fn status_is_checked_before_payload() {
        let reason = validate(json!({"status": "stop"})).expect_err("rejected");
        assert!(matches!(reason, RejectReason::UnrecognizedStatus { .. }));
    }

    #[rstest]
    #[case(json!({"status": "run"}))]
    #[case(json!({"status": "run", "data": null}))]
    #[case(json!({"status": "run", "data": {"r": 1, "g": 2, "b": 3}}))]
    #[case(json!({"status": "run", "data": [{"r": 1, "g": 2}]}))]
    #[case(json!({"status": "run", "data": [{"r": 300, "g": 0, "b": 0}]}))]
    #[case(json!({"status": "run", "data": [{"r": 1, "g": 2, "b": 3}, "red"]}))]
    fn rejects_malformed_payloads(#[case] message: Value) {
        let reason = validate(message).expect_err("payload should be rejected");
        assert!(matches!(reason, RejectReason::MalformedPayload { .. }));
    }

    #[test]
    fn reply_recolors_every_position() {
        let batch = json!([
            {"r": 5, "g": 5, "b": 5},
            {"r": 5, "g": 5, "b": 5},
            {"r": 9, "g": 9, "b": 9},
        ]);
        let reply = validate(json!({"status": "run", "data": batch, "job": 7}))
            .expect("valid request")
            .into_reply();

        assert_eq!(reply["status"], "done");
        assert_eq!(reply["job"], 7);
        let Some([first, second, third]) = reply["data"].as_array().map(Vec::as_slice) else {
            panic!("data should hold three colors: {reply}");
        };
        assert_eq!(first, second);
        assert_ne!(first, third);
        assert_ne!(first, &json!({"r": 5, "g": 5, "b": 5}));
        assert_ne!(third, &json!({"r": 9, "g": 9, "b": 9}));
    }

    #[test]
    fn reply_keeps_the_request_field_order() {
        let reply = validate(json!({
            "data": [{"r": 1, "g": 1, "b": 1}],
            "job": "a-17",
            "status": "run",
        }))
        .expect("valid request")
        .into_reply();

        let keys: Vec<&str> = reply
            .as_object()
            .expect("reply object")
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, ["data", "job", "status"]);
    }
}
