use std::fmt::Write;

use serde::Serialize;
use serde_json::{json, Map};

use crate::{
    scope::{Cause, Scope},
    value::Value,
};

/// Renders a message, its field list and its scope into a single line.
pub trait LogFormatter: Sync + Send {
    fn format(&self, message: &str, fields: &[Value], scope: &Scope) -> String;
}

/// `message key=value key=value - error=<cause>`
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleFormatter;

impl SimpleFormatter {
    pub fn new() -> Self {
        Self
    }

    fn format_cause(&self, buf: &mut String, cause: Option<&Cause>) {
        match cause {
            Some(cause @ (Cause::Success | Cause::Ellipsis)) => {
                let _ = write!(buf, "{}", cause);
            }
            Some(cause) => {
                let _ = write!(buf, "error={}", cause);
            }
            None => buf.push_str("error=<nil>"),
        }
    }
}

impl LogFormatter for SimpleFormatter {
    fn format(&self, message: &str, fields: &[Value], scope: &Scope) -> String {
        let mut buf = String::with_capacity(message.len() + 16 * fields.len());
        let mut sep = "";

        if !message.is_empty() {
            buf.push_str(message);
            sep = " ";
        }

        for (i, field) in fields.iter().enumerate() {
            buf.push_str(sep);
            sep = if i & 1 == 0 { "=" } else { " " };
            buf.push_str(&field.to_text());
        }

        if !scope.is_empty() {
            if !buf.is_empty() {
                buf.push_str(" - ");
            }

            let multiline = scope.len() > 1;
            for cause in scope.causes() {
                if multiline {
                    buf.push_str("\n\t");
                }
                self.format_cause(&mut buf, cause.as_ref());
            }
        }

        buf
    }
}

/// `message {"key":"value","error":"<cause>"}`, compact or indented.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn compact() -> Self {
        Self { pretty: false }
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    fn fold(&self, fields: &[Value], scope: &Scope) -> Option<Map<String, serde_json::Value>> {
        let mut map = Map::new();

        for pair in fields.chunks_exact(2) {
            if let Some(key) = pair[0].as_str() {
                map.insert(key.to_string(), pair[1].to_json()?);
            }
        }

        match scope.causes() {
            [] => {}
            [None] | [Some(Cause::Success)] => {
                map.insert("success".to_string(), json!(true));
            }
            [Some(cause)] => {
                map.insert("error".to_string(), json!(cause.to_string()));
            }
            causes => {
                let errors: Vec<String> = causes
                    .iter()
                    .map(|cause| match cause {
                        Some(cause) => cause.to_string(),
                        None => "<nil>".to_string(),
                    })
                    .collect();
                map.insert("errors".to_string(), json!(errors));
            }
        }

        Some(map)
    }

    fn serialize(&self, map: &Map<String, serde_json::Value>) -> serde_json::Result<String> {
        if !self.pretty {
            return serde_json::to_string(map);
        }

        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
        map.serialize(&mut ser)?;

        // serde_json only ever writes valid UTF-8
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

impl LogFormatter for JsonFormatter {
    fn format(&self, message: &str, fields: &[Value], scope: &Scope) -> String {
        let Some(map) = self.fold(fields, scope) else {
            return message.to_string();
        };

        match self.serialize(&map) {
            Ok(body) if body.is_empty() => message.to_string(),
            Ok(body) if message.is_empty() => body,
            Ok(body) => format!("{} {}", message, body),
            Err(_) => message.to_string(),
        }
    }
}
