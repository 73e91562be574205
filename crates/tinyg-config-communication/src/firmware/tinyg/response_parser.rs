//! TinyG Response Parser
//!
//! Classifies lines received from the controller. Only [`TinyGReply::Response`]
//! answers a command; everything else is unsolicited.

use serde_json::{Map, Value};
use tinyg_config_core::CodecError;

/// A line received from the controller
#[derive(Debug, Clone, PartialEq)]
pub enum TinyGReply {
    /// Acknowledgement of a command (`{"r":...}`)
    Response {
        /// Value of the `r` key
        payload: Value,
        /// Status code from the `f` footer, if present
        status: Option<u64>,
    },
    /// Unsolicited status report (`{"sr":...}`)
    StatusReport(Value),
    /// Unsolicited queue report (`{"qr":...}`)
    QueueReport(Value),
    /// Exception report (`{"er":...}`)
    Exception {
        /// Status code of the exception
        status: Option<u64>,
        /// Message text
        message: Option<String>,
    },
    /// Any other JSON object
    Other(Value),
}

impl TinyGReply {
    /// True if the footer reports a non-zero status
    pub fn is_rejected(&self) -> bool {
        matches!(self, TinyGReply::Response { status: Some(code), .. } if *code != 0)
    }
}

/// TinyG response parser
#[derive(Debug, Default)]
pub struct TinyGResponseParser;

impl TinyGResponseParser {
    /// Create a new parser
    pub fn new() -> Self {
        Self
    }

    /// Parse one received line
    pub fn parse(&self, line: &str) -> Result<TinyGReply, CodecError> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Err(CodecError::malformed("empty line"));
        }

        let json: Value = serde_json::from_str(trimmed)?;
        let obj = json
            .as_object()
            .ok_or_else(|| CodecError::malformed(format!("reply is not a JSON object: {}", trimmed)))?;

        Ok(Self::classify(obj))
    }

    fn classify(obj: &Map<String, Value>) -> TinyGReply {
        if let Some(payload) = obj.get("r") {
            return TinyGReply::Response {
                payload: payload.clone(),
                status: footer_status(obj),
            };
        }

        if let Some(er) = obj.get("er") {
            return TinyGReply::Exception {
                status: er.get("st").and_then(Value::as_u64),
                message: er.get("msg").and_then(Value::as_str).map(str::to_string),
            };
        }

        if let Some(sr) = obj.get("sr") {
            return TinyGReply::StatusReport(sr.clone());
        }

        if let Some(qr) = obj.get("qr") {
            return TinyGReply::QueueReport(qr.clone());
        }

        TinyGReply::Other(Value::Object(obj.clone()))
    }
}

/// Status code of a `"f":[revision, status, bytes, checksum]` footer
fn footer_status(obj: &Map<String, Value>) -> Option<u64> {
    obj.get("f")?.as_array()?.get(1)?.as_u64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_response() {
        let parser = TinyGResponseParser::new();
        let reply = parser
            .parse(r#"{"r":{"x":{"vm":500}},"f":[1,0,10,4932]}"#)
            .unwrap();
        assert_eq!(
            reply,
            TinyGReply::Response {
                payload: json!({"x": {"vm": 500}}),
                status: Some(0),
            }
        );
        assert!(!reply.is_rejected());
    }

    #[test]
    fn test_parse_rejected_response() {
        let parser = TinyGResponseParser::new();
        let reply = parser.parse(r#"{"r":{},"f":[1,108,12,1234]}"#).unwrap();
        assert!(matches!(reply, TinyGReply::Response { .. }));
        assert!(reply.is_rejected());
    }

    #[test]
    fn test_parse_response_without_footer() {
        let parser = TinyGResponseParser::new();
        let reply = parser.parse(r#"{"r":{"gc":"G21"}}"#).unwrap();
        assert_eq!(
            reply,
            TinyGReply::Response {
                payload: json!({"gc": "G21"}),
                status: None,
            }
        );
    }

    #[test]
    fn test_parse_unsolicited() {
        let parser = TinyGResponseParser::new();
        assert_eq!(
            parser.parse(r#"{"sr":{"posx":1.0}}"#).unwrap(),
            TinyGReply::StatusReport(json!({"posx": 1.0}))
        );
        assert_eq!(
            parser.parse(r#"{"qr":28}"#).unwrap(),
            TinyGReply::QueueReport(json!(28))
        );
        assert_eq!(
            parser
                .parse(r#"{"er":{"fb":440.20,"st":27,"msg":"Initializing"}}"#)
                .unwrap(),
            TinyGReply::Exception {
                status: Some(27),
                message: Some("Initializing".to_string()),
            }
        );
        assert_eq!(
            parser.parse(r#"{"foo":1}"#).unwrap(),
            TinyGReply::Other(json!({"foo": 1}))
        );
        assert!(!parser
            .parse(r#"{"sr":{"stat":3},"f":[1,5,0,0]}"#)
            .unwrap()
            .is_rejected());
    }

    #[test]
    fn test_parse_garbage() {
        let parser = TinyGResponseParser::new();
        assert!(parser.parse("").is_err());
        assert!(parser.parse("tinyg [mm] ok>").is_err());
        assert!(parser.parse("[1, 2]").is_err());
    }
}
