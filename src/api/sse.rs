//! Server-sent event framing and mapping to [`RunEvent`]s.

use crate::api::wire::{Run, ThreadMessage};
use crate::error::ApiError;
use crate::types::RunEvent;
use serde_json::Value;

/// One `event:`/`data:` frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: String,
    pub data: String,
}

/// Incremental decoder: feed raw bytes, get complete frames.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and drain every frame it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buf.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some((pos, sep_len)) = find_frame_end(&self.buf) {
            let raw = self.buf.drain(..pos + sep_len).collect::<Vec<_>>();
            if let Some(frame) = parse_frame(&String::from_utf8_lossy(&raw[..pos])) {
                frames.push(frame);
            }
        }
        frames
    }

    /// Whether undecoded bytes are left over.
    pub fn has_partial(&self) -> bool {
        self.buf.iter().any(|b| !b.is_ascii_whitespace())
    }
}

/// Position and length of the first blank-line separator.
fn find_frame_end(buf: &[u8]) -> Option<(usize, usize)> {
    let lf = buf.windows(2).position(|w| w == b"\n\n").map(|p| (p, 2));
    let crlf = buf.windows(4).position(|w| w == b"\r\n\r\n").map(|p| (p, 4));
    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}

fn parse_frame(text: &str) -> Option<SseFrame> {
    let mut event = String::new();
    let mut data_lines: Vec<&str> = Vec::new();

    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        if let Some(rest) = line.strip_prefix("event:") {
            event = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix("data:") {
            data_lines.push(rest.strip_prefix(' ').unwrap_or(rest));
        }
    }

    if event.is_empty() && data_lines.is_empty() {
        return None;
    }
    if event.is_empty() {
        event = "message".into();
    }
    Some(SseFrame {
        event,
        data: data_lines.join("\n"),
    })
}

/// Map a frame to a typed run event.
///
/// Unknown event names become [`RunEvent::Unrecognized`]; a known event
/// whose payload does not decode is an error.
pub fn decode_event(frame: &SseFrame) -> Result<RunEvent, ApiError> {
    let event = match frame.event.as_str() {
        "done" => RunEvent::Done,
        "error" => {
            let v: Value = serde_json::from_str(&frame.data).unwrap_or(Value::Null);
            let detail = v["error"]["message"]
                .as_str()
                .or_else(|| v["message"].as_str())
                .map(str::to_string)
                .unwrap_or_else(|| frame.data.clone());
            RunEvent::StreamError(detail)
        }
        "thread.run.created" => {
            let run: Run = serde_json::from_str(&frame.data)?;
            RunEvent::RunCreated { run_id: run.id }
        }
        "thread.message.delta" => {
            let v: Value = serde_json::from_str(&frame.data)?;
            RunEvent::TextDelta(delta_text(&v))
        }
        "thread.message.completed" => {
            let msg: ThreadMessage = serde_json::from_str(&frame.data)?;
            RunEvent::MessageCompleted(msg.text())
        }
        "thread.run.requires_action" => {
            let run: Run = serde_json::from_str(&frame.data)?;
            RunEvent::RequiresAction {
                calls: run.pending_calls(),
                run_id: run.id,
            }
        }
        "thread.run.step.delta" => {
            let v: Value = serde_json::from_str(&frame.data)?;
            let activity = step_activity(&v);
            if activity.is_empty() {
                RunEvent::Unrecognized(frame.event.clone())
            } else {
                RunEvent::ToolActivity(activity)
            }
        }
        "thread.run.completed" => {
            let run: Run = serde_json::from_str(&frame.data)?;
            RunEvent::RunCompleted { run_id: run.id }
        }
        "thread.run.failed"
        | "thread.run.cancelled"
        | "thread.run.expired"
        | "thread.run.incomplete" => {
            let run: Run = serde_json::from_str(&frame.data)?;
            RunEvent::RunFailed {
                detail: run.failure_detail(),
                run_id: run.id,
            }
        }
        other => RunEvent::Unrecognized(other.to_string()),
    };
    Ok(event)
}

/// Concatenate the text fragments of a message delta.
fn delta_text(v: &Value) -> String {
    v["delta"]["content"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter(|p| p["type"] == "text")
                .filter_map(|p| p["text"]["value"].as_str())
                .collect()
        })
        .unwrap_or_default()
}

/// Code interpreter input and log output carried by a run step delta.
fn step_activity(v: &Value) -> String {
    let Some(calls) = v["delta"]["step_details"]["tool_calls"].as_array() else {
        return String::new();
    };

    let mut out = String::new();
    for ci in calls.iter().map(|c| &c["code_interpreter"]) {
        if let Some(input) = ci["input"].as_str() {
            out.push_str(input);
        }
        for output in ci["outputs"].as_array().into_iter().flatten() {
            if let Some(logs) = output["logs"].as_str() {
                out.push('\n');
                out.push_str(logs);
                out.push('\n');
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(event: &str, data: &str) -> SseFrame {
        SseFrame {
            event: event.into(),
            data: data.into(),
        }
    }

    #[test]
    fn test_frames_split_across_chunks() {
        let mut dec = SseDecoder::new();
        assert!(dec.push(b"event: thread.message.delta\nda").is_empty());
        assert!(dec.has_partial());

        let frames = dec.push(b"ta: {\"a\":1}\n\nevent: done\ndata: [DONE]\n\n");
        assert_eq!(
            frames,
            vec![
                frame("thread.message.delta", "{\"a\":1}"),
                frame("done", "[DONE]"),
            ]
        );
        assert!(!dec.has_partial());
    }

    #[test]
    fn test_crlf_frames_and_comments() {
        let mut dec = SseDecoder::new();
        let frames = dec.push(b": keep-alive\r\n\r\nevent: done\r\ndata: [DONE]\r\n\r\n");
        assert_eq!(frames, vec![frame("done", "[DONE]")]);
    }

    #[test]
    fn test_text_delta() {
        let ev = decode_event(&frame(
            "thread.message.delta",
            r#"{"id":"msg_1","object":"thread.message.delta","delta":{"content":[
                {"index":0,"type":"text","text":{"value":"Hel","annotations":[]}}
            ]}}"#,
        ))
        .unwrap();
        assert_eq!(ev, RunEvent::TextDelta("Hel".into()));
    }

    #[test]
    fn test_requires_action_event() {
        let ev = decode_event(&frame(
            "thread.run.requires_action",
            r#"{"id":"run_9","status":"requires_action","required_action":{"type":"submit_tool_outputs",
                "submit_tool_outputs":{"tool_calls":[{"id":"call_1","type":"function",
                "function":{"name":"getRainProbability","arguments":"{\"location\":\"Paris\"}"}}]}}}"#,
        ))
        .unwrap();
        match ev {
            RunEvent::RequiresAction { run_id, calls } => {
                assert_eq!(run_id, "run_9");
                assert_eq!(calls.len(), 1);
                assert_eq!(calls[0].tool_name, "getRainProbability");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_failed_and_unknown_events() {
        let failed = decode_event(&frame(
            "thread.run.failed",
            r#"{"id":"run_1","status":"failed","last_error":{"code":"server_error","message":"oops"}}"#,
        ))
        .unwrap();
        assert_eq!(
            failed,
            RunEvent::RunFailed {
                run_id: "run_1".into(),
                detail: "server_error: oops".into()
            }
        );

        let unknown = decode_event(&frame("thread.run.step.created", "{}")).unwrap();
        assert_eq!(unknown, RunEvent::Unrecognized("thread.run.step.created".into()));
    }

    #[test]
    fn test_code_interpreter_step_delta() {
        let input = decode_event(&frame(
            "thread.run.step.delta",
            r#"{"id":"step_1","object":"thread.run.step.delta","delta":{"step_details":{
                "type":"tool_calls","tool_calls":[{"index":0,"type":"code_interpreter",
                "code_interpreter":{"input":"print(2 + 2)"}}]}}}"#,
        ))
        .unwrap();
        assert_eq!(input, RunEvent::ToolActivity("print(2 + 2)".into()));

        let logs = decode_event(&frame(
            "thread.run.step.delta",
            r#"{"id":"step_1","delta":{"step_details":{"type":"tool_calls","tool_calls":[
                {"index":0,"type":"code_interpreter","code_interpreter":{
                "outputs":[{"index":0,"type":"logs","logs":"4"}]}}]}}}"#,
        ))
        .unwrap();
        assert_eq!(logs, RunEvent::ToolActivity("\n4\n".into()));

        let function_step = decode_event(&frame(
            "thread.run.step.delta",
            r#"{"id":"step_2","delta":{"step_details":{"type":"tool_calls","tool_calls":[
                {"index":0,"type":"function","function":{"arguments":"{}"}}]}}}"#,
        ))
        .unwrap();
        assert_eq!(
            function_step,
            RunEvent::Unrecognized("thread.run.step.delta".into())
        );
    }

    #[test]
    fn test_error_event_detail() {
        let ev = decode_event(&frame("error", r#"{"error":{"message":"overloaded"}}"#)).unwrap();
        assert_eq!(ev, RunEvent::StreamError("overloaded".into()));
    }

    #[test]
    fn test_known_event_with_bad_payload_is_error() {
        assert!(decode_event(&frame("thread.run.completed", "not json")).is_err());
    }
}
