//! Output formatting for completion results.

use anyhow::{Result, bail};
use serde_json::Value;
use std::str::FromStr;

use crate::CompletionMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
    /// One `pointer = json` line per leaf value.
    Lines,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw {
            "pretty" => Ok(Self::Pretty),
            "compact" | "json" => Ok(Self::Compact),
            "lines" => Ok(Self::Lines),
            other => bail!("unknown format '{other}' (expected pretty|compact|lines)"),
        }
    }
}

/// Pick the value at a JSON Pointer; the empty pointer selects everything.
pub fn select(map: &CompletionMap, pointer: &str) -> Result<Value> {
    let whole = Value::Object(map.clone().into_iter().collect());
    if pointer.is_empty() {
        return Ok(whole);
    }
    if !pointer.starts_with('/') {
        bail!("pointer must be empty (root) or start with '/'");
    }
    match whole.pointer(pointer) {
        Some(value) => Ok(value.clone()),
        None => bail!("pointer {pointer} not found in result"),
    }
}

pub fn render(value: &Value, format: OutputFormat) -> Result<String> {
    let text = match format {
        OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        OutputFormat::Compact => serde_json::to_string(value)?,
        OutputFormat::Lines => {
            let mut lines = Vec::new();
            flatten("", value, &mut lines)?;
            lines.join("\n")
        }
    };
    Ok(text)
}

fn flatten(prefix: &str, value: &Value, lines: &mut Vec<String>) -> Result<()> {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                flatten(&format!("{prefix}/{}", escape_token(key)), child, lines)?;
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (index, child) in items.iter().enumerate() {
                flatten(&format!("{prefix}/{index}"), child, lines)?;
            }
        }
        leaf => {
            let path = if prefix.is_empty() { "/" } else { prefix };
            lines.push(format!("{path} = {}", serde_json::to_string(leaf)?));
        }
    }
    Ok(())
}

// RFC 6901: '~' before '/'.
fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> CompletionMap {
        let mut map = CompletionMap::new();
        map.insert("appname".into(), json!("hello"));
        map.insert(
            "procs".into(),
            json!({"bar": {"env": [], "port": {"port": 8080, "type": "tcp"}}}),
        );
        map.insert("a/b".into(), json!(["x", {}]));
        map
    }

    #[test]
    fn select_walks_pointer() {
        let map = sample();
        assert_eq!(select(&map, "/procs/bar/port/port").unwrap(), json!(8080));
        assert_eq!(select(&map, "/a~1b/0").unwrap(), json!("x"));
        assert!(select(&map, "").unwrap().is_object());
        assert!(select(&map, "/procs/missing").is_err());
        assert!(select(&map, "procs").is_err());
    }

    #[test]
    fn lines_format_lists_leaves() {
        let value = select(&sample(), "").unwrap();
        let text = render(&value, OutputFormat::Lines).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "/a~1b/0 = \"x\"",
                "/a~1b/1 = {}",
                "/appname = \"hello\"",
                "/procs/bar/env = []",
                "/procs/bar/port/port = 8080",
                "/procs/bar/port/type = \"tcp\"",
            ]
        );
    }

    #[test]
    fn scalar_root_renders_as_single_line() {
        assert_eq!(render(&json!(3), OutputFormat::Lines).unwrap(), "/ = 3");
        assert_eq!(render(&json!({"k": 1}), OutputFormat::Compact).unwrap(), r#"{"k":1}"#);
    }

    #[test]
    fn format_names_parse() {
        assert_eq!(OutputFormat::from_str("pretty").unwrap(), OutputFormat::Pretty);
        assert_eq!(OutputFormat::from_str("json").unwrap(), OutputFormat::Compact);
        assert_eq!(OutputFormat::from_str("lines").unwrap(), OutputFormat::Lines);
        assert!(OutputFormat::from_str("yaml").is_err());
        assert_eq!("compact".parse::<OutputFormat>().unwrap(), OutputFormat::Compact);
    }
}
