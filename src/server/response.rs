use crate::dispatcher::HandlerResponse;
use may_minihttp::Response;
use serde_json::Value;

pub(crate) fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

const JSON: &str = "Content-Type: application/json";
const TEXT: &str = "Content-Type: text/plain";
/// Only the Prometheus exposition carries the format version.
const PROMETHEUS_TEXT: &str = "Content-Type: text/plain; version=0.0.4";

/// Pick the header line and bytes for a dispatcher response.
///
/// `may_minihttp` only accepts `'static` header lines, so content types are
/// limited to a known set. A string body is sent raw only when the handler
/// asked for `text/plain`; otherwise it is encoded as a JSON string.
fn encode_body(hr: HandlerResponse) -> (&'static str, Vec<u8>) {
    let plain = hr
        .get_header("content-type")
        .is_some_and(|ct| ct.starts_with("text/plain"));
    match hr.body {
        Value::String(s) if plain => (TEXT, s.into_bytes()),
        body => (JSON, body.to_string().into_bytes()),
    }
}

pub fn write_handler_response(res: &mut Response, hr: HandlerResponse) {
    res.status_code(usize::from(hr.status), status_reason(hr.status));
    let (header, body) = encode_body(hr);
    res.header(header);
    res.body_vec(body);
}

pub fn write_json_error(res: &mut Response, status: u16, body: Value) {
    res.status_code(usize::from(status), status_reason(status));
    res.header(JSON);
    res.body_vec(body.to_string().into_bytes());
}

/// Prometheus text exposition.
pub fn write_text(res: &mut Response, status: u16, body: String) {
    res.status_code(usize::from(status), status_reason(status));
    res.header(PROMETHEUS_TEXT);
    res.body_vec(body.into_bytes());
}
