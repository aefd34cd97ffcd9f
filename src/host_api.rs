//! Host functions exposed to completion scripts.
//!
//! Scripts get a `json` table (`decode`, `encode`, `load`, `array`,
//! `array_mt`) backed by serde_json, and a `log` table that forwards to the
//! host logger under the `lainscript::script` target.

use log::Level;
use mlua::{Lua, LuaSerdeExt, Value};
use serde_json::Value as JsonValue;
use std::fs;

use crate::convert::{json_to_lua, lua_to_json};

pub const SCRIPT_LOG_TARGET: &str = "lainscript::script";

const PRELUDE: &str = r#"
function json.array(t)
    return setmetatable(t or {}, json.array_mt)
end
"#;

/// Install the host API into the state's globals.
pub fn register(lua: &Lua) -> mlua::Result<()> {
    register_json(lua)?;
    register_log(lua)?;
    lua.load(PRELUDE).set_name("=lainscript-prelude").exec()
}

fn register_json(lua: &Lua) -> mlua::Result<()> {
    let json = lua.create_table()?;

    let decode = lua.create_function(|lua, text: String| {
        let value: JsonValue = serde_json::from_str(&text).map_err(mlua::Error::external)?;
        json_to_lua(lua, &value)
    })?;
    let encode = lua.create_function(|lua, value: Value| {
        let value = lua_to_json(lua, &value)?;
        serde_json::to_string(&value).map_err(mlua::Error::external)
    })?;
    let load = lua.create_function(|lua, path: String| {
        let text = fs::read_to_string(&path)
            .map_err(|err| mlua::Error::runtime(format!("reading {path}: {err}")))?;
        let value: JsonValue = serde_json::from_str(&text)
            .map_err(|err| mlua::Error::runtime(format!("parsing {path}: {err}")))?;
        json_to_lua(lua, &value)
    })?;

    json.set("decode", decode)?;
    json.set("encode", encode)?;
    json.set("load", load)?;
    json.set("array_mt", lua.array_metatable())?;
    lua.globals().set("json", json)
}

fn register_log(lua: &Lua) -> mlua::Result<()> {
    let table = lua.create_table()?;
    for (name, level) in [
        ("debug", Level::Debug),
        ("info", Level::Info),
        ("warn", Level::Warn),
        ("error", Level::Error),
    ] {
        let func = lua.create_function(move |_, message: String| {
            log::log!(target: SCRIPT_LOG_TARGET, level, "{message}");
            Ok(())
        })?;
        table.set(name, func)?;
    }
    lua.globals().set("log", table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn host() -> Lua {
        let lua = Lua::new();
        register(&lua).expect("host api registers");
        lua
    }

    #[test]
    fn decode_maps_null_to_nil() {
        let lua = host();
        let missing: bool = lua
            .load(r#"local t = json.decode('{"a": null, "b": 1}'); return t.a == nil and t.b == 1"#)
            .eval()
            .unwrap();
        assert!(missing);
    }

    #[test]
    fn encode_keeps_marked_empty_arrays() {
        let lua = host();
        let text: String = lua
            .load(r#"return json.encode({list = json.array(), obj = {}})"#)
            .eval()
            .unwrap();
        let value: JsonValue = serde_json::from_str(&text).unwrap();
        assert_eq!(value, json!({"list": [], "obj": {}}));
    }

    #[test]
    fn decode_error_surfaces_to_script() {
        let lua = host();
        let ok: bool = lua
            .load(r#"return (pcall(json.decode, "{not json"))"#)
            .eval()
            .unwrap();
        assert!(!ok);
    }

    #[test]
    fn load_reads_file_and_names_missing_path() {
        let lua = host();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"appname": "hello", "procs": [1, 2]}}"#).unwrap();
        lua.globals()
            .set("path", file.path().display().to_string())
            .unwrap();
        let count: i64 = lua
            .load(r#"local t = json.load(path); assert(t.appname == "hello"); return #t.procs"#)
            .eval()
            .unwrap();
        assert_eq!(count, 2);

        let err = lua
            .load(r#"json.load("/no/such/file.json")"#)
            .exec()
            .expect_err("missing file must fail");
        assert!(err.to_string().contains("/no/such/file.json"));
    }

    #[test]
    fn log_functions_are_callable() {
        let lua = host();
        lua.load(r#"log.debug("d"); log.info("i"); log.warn("w"); log.error("e")"#)
            .exec()
            .unwrap();
    }
}
