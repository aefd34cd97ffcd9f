//! Conversion between Lua values and `serde_json::Value`.
//!
//! Lua tables are ambiguous: the same table type serves as list and map. A
//! table is treated as a JSON array when it carries mlua's array metatable
//! (set by `json.decode` and `json.array`) or when its keys are exactly
//! `1..n`. Everything else becomes an object with stringified keys.

use mlua::{Lua, LuaSerdeExt, SerializeOptions, Table, Value};
use serde_json::{Map, Number, Value as JsonValue};
use std::collections::BTreeMap;
use std::ffi::c_void;

/// Convert any Lua value into JSON. Functions, threads and userdata have no
/// JSON form and become `null` here; inside objects they are dropped.
pub fn lua_to_json(lua: &Lua, value: &Value) -> mlua::Result<JsonValue> {
    let mut seen = Vec::new();
    Ok(convert_value(lua, value, &mut seen)?.unwrap_or(JsonValue::Null))
}

/// Convert a table into a string-keyed map regardless of its shape.
pub fn table_to_map(lua: &Lua, table: &Table) -> mlua::Result<BTreeMap<String, JsonValue>> {
    let mut seen = vec![table.to_pointer()];
    let mut map = BTreeMap::new();
    for pair in table.clone().pairs::<Value, Value>() {
        let (key, value) = pair?;
        let Some(key) = key_to_string(&key) else {
            continue;
        };
        if let Some(value) = convert_value(lua, &value, &mut seen)? {
            map.insert(key, value);
        }
    }
    Ok(map)
}

/// Build the Lua form of a JSON document. `null` maps to `nil` and arrays
/// carry the array metatable so they round-trip as arrays, even when empty.
pub fn json_to_lua(lua: &Lua, value: &JsonValue) -> mlua::Result<Value> {
    let options = SerializeOptions::new()
        .serialize_none_to_null(false)
        .serialize_unit_to_null(false);
    lua.to_value_with(value, options)
}

fn convert_value(
    lua: &Lua,
    value: &Value,
    seen: &mut Vec<*const c_void>,
) -> mlua::Result<Option<JsonValue>> {
    let converted = match value {
        Value::Nil => JsonValue::Null,
        Value::Boolean(flag) => JsonValue::Bool(*flag),
        Value::Integer(int) => JsonValue::from(*int),
        Value::Number(num) => Number::from_f64(*num)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::String(text) => JsonValue::String(text.to_string_lossy().to_string()),
        Value::Table(table) => table_to_json(lua, table, seen)?,
        Value::LightUserData(ud) if ud.0.is_null() => JsonValue::Null,
        _ => return Ok(None),
    };
    Ok(Some(converted))
}

fn table_to_json(
    lua: &Lua,
    table: &Table,
    seen: &mut Vec<*const c_void>,
) -> mlua::Result<JsonValue> {
    let ptr = table.to_pointer();
    if seen.contains(&ptr) {
        return Err(mlua::Error::runtime(
            "cannot convert a table that contains itself",
        ));
    }
    seen.push(ptr);
    let result = if is_array(lua, table)? {
        array_to_json(lua, table, seen)
    } else {
        object_to_json(lua, table, seen)
    };
    seen.pop();
    result
}

fn is_array(lua: &Lua, table: &Table) -> mlua::Result<bool> {
    if let Some(metatable) = table.metatable() {
        if metatable.to_pointer() == lua.array_metatable().to_pointer() {
            return Ok(true);
        }
    }

    let len = table.raw_len();
    if len == 0 {
        return Ok(false);
    }
    let mut count = 0usize;
    for pair in table.clone().pairs::<Value, Value>() {
        let (key, _) = pair?;
        match key {
            Value::Integer(index) if index >= 1 && (index as usize) <= len => count += 1,
            _ => return Ok(false),
        }
    }
    Ok(count == len)
}

fn array_to_json(
    lua: &Lua,
    table: &Table,
    seen: &mut Vec<*const c_void>,
) -> mlua::Result<JsonValue> {
    let len = table.raw_len();
    let mut items = Vec::with_capacity(len);
    for index in 1..=len {
        let item: Value = table.raw_get(index)?;
        items.push(convert_value(lua, &item, seen)?.unwrap_or(JsonValue::Null));
    }
    Ok(JsonValue::Array(items))
}

fn object_to_json(
    lua: &Lua,
    table: &Table,
    seen: &mut Vec<*const c_void>,
) -> mlua::Result<JsonValue> {
    let mut object = Map::new();
    for pair in table.clone().pairs::<Value, Value>() {
        let (key, value) = pair?;
        let Some(key) = key_to_string(&key) else {
            continue;
        };
        if let Some(value) = convert_value(lua, &value, seen)? {
            object.insert(key, value);
        }
    }
    Ok(JsonValue::Object(object))
}

fn key_to_string(key: &Value) -> Option<String> {
    match key {
        Value::String(text) => Some(text.to_string_lossy().to_string()),
        Value::Integer(int) => Some(int.to_string()),
        Value::Number(num) => Number::from_f64(*num).map(|n| n.to_string()),
        Value::Boolean(flag) => Some(flag.to_string()),
        _ => None,
    }
}
