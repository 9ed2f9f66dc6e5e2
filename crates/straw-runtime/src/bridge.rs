use rhai::{Array, Dynamic, EvalAltResult, ImmutableString, Map, Position, FLOAT, INT};
use straw_core::{ComponentInfo, Failure, PropertyMap, StrawValue};

use crate::node::ComponentNode;

pub(crate) type BridgeResult<T> = Result<T, Box<EvalAltResult>>;

/// Converts a script value into the closed value union, `None` for anything
/// else (unit, arrays, maps, handles, function pointers).
pub fn dynamic_to_straw(value: &Dynamic) -> Option<StrawValue> {
    if let Ok(value) = value.as_bool() {
        return Some(StrawValue::Bool(value));
    }
    if let Ok(value) = value.as_int() {
        return Some(StrawValue::Int(value as i64));
    }
    if let Ok(value) = value.as_float() {
        return Some(StrawValue::Float(value as f64));
    }
    if let Ok(value) = value.as_char() {
        return Some(StrawValue::String(value.to_string()));
    }
    if value.is_string() {
        return value.clone().into_string().ok().map(StrawValue::String);
    }
    None
}

pub(crate) fn straw_to_dynamic(value: &StrawValue) -> Dynamic {
    match value {
        StrawValue::Bool(value) => Dynamic::from_bool(*value),
        StrawValue::Int(value) => Dynamic::from_int(*value as INT),
        StrawValue::Float(value) => Dynamic::from_float(*value as FLOAT),
        StrawValue::String(value) => Dynamic::from(ImmutableString::from(value.as_str())),
    }
}

pub(crate) fn properties_to_map(properties: &PropertyMap) -> Map {
    let mut map = Map::new();
    for (key, value) in properties {
        map.insert(key.as_str().into(), straw_to_dynamic(value));
    }
    map
}

pub(crate) fn info_to_map(info: &ComponentInfo) -> Map {
    let mut map = Map::new();
    map.insert("id".into(), Dynamic::from(info.id.clone()));
    map.insert("type".into(), Dynamic::from(info.type_name.clone()));
    map.insert("visible".into(), Dynamic::from_bool(info.visible));
    map.insert("showing".into(), Dynamic::from_bool(info.showing));
    map.insert(
        "properties".into(),
        Dynamic::from_map(properties_to_map(&info.properties)),
    );
    map.insert(
        "capabilities".into(),
        Dynamic::from_array(
            info.capabilities
                .iter()
                .map(|name| Dynamic::from(name.clone()))
                .collect(),
        ),
    );
    map.insert("numChildren".into(), Dynamic::from_int(info.num_children as INT));
    if let Some(children) = &info.children {
        map.insert(
            "children".into(),
            Dynamic::from_array(
                children
                    .iter()
                    .map(|child| Dynamic::from_map(info_to_map(child)))
                    .collect(),
            ),
        );
    }
    map
}

/// Truthiness used by `assertTrue`/`assertFalse`: unit, `false`, zero, empty
/// strings and empty containers are falsy; handles and everything else are truthy.
pub fn dynamic_is_truthy(value: &Dynamic) -> bool {
    if value.is_unit() {
        return false;
    }
    if let Some(value) = dynamic_to_straw(value) {
        return value.is_truthy();
    }
    if value.is_array() {
        return value
            .read_lock::<Array>()
            .map(|array| !array.is_empty())
            .unwrap_or(true);
    }
    if value.is_map() {
        return value
            .read_lock::<Map>()
            .map(|map| !map.is_empty())
            .unwrap_or(true);
    }
    true
}

/// Human rendering of a script value for log lines and failure messages.
/// Strings are emitted raw; nested values inside containers are quoted.
pub fn render_dynamic(value: &Dynamic) -> String {
    if value.is_unit() {
        return "()".to_string();
    }
    if let Some(value) = dynamic_to_straw(value) {
        return value.to_string();
    }
    if let Some(node) = value.clone().try_cast::<ComponentNode>() {
        return node.to_string();
    }
    if let Some(failure) = value.clone().try_cast::<Failure>() {
        return failure.message;
    }
    if value.is_array() {
        let array = value.clone().cast::<Array>();
        let items = array.iter().map(render_nested).collect::<Vec<_>>();
        return format!("[{}]", items.join(", "));
    }
    if value.is_map() {
        let map = value.clone().cast::<Map>();
        let entries = map
            .iter()
            .map(|(key, value)| format!("{}: {}", key, render_nested(value)))
            .collect::<Vec<_>>();
        return format!("#{{{}}}", entries.join(", "));
    }
    value.to_string()
}

fn render_nested(value: &Dynamic) -> String {
    match dynamic_to_straw(value) {
        Some(value) => value.to_literal(),
        None => render_dynamic(value),
    }
}

/// Raises the failure at a script position, usually the call site of the
/// native function that detected it. The origin is recorded on the value too,
/// so scripts that catch it can read it.
pub(crate) fn failure_at(failure: Failure, position: Position) -> Box<EvalAltResult> {
    let failure = with_position(failure, position);
    Box::new(EvalAltResult::ErrorRuntime(Dynamic::from(failure), position))
}

/// Recovers the failure raised at the origin, unwrapping the frames Rhai adds
/// while the error travels through script functions and modules.
pub fn failure_from_eval(error: EvalAltResult) -> Failure {
    match error {
        EvalAltResult::ErrorInFunctionCall(_, _, inner, _)
        | EvalAltResult::ErrorInModule(_, inner, _) => failure_from_eval(*inner),
        EvalAltResult::ErrorRuntime(value, position) => {
            let failure = match value.clone().try_cast::<Failure>() {
                Some(failure) => failure,
                None => Failure::explicit(render_dynamic(&value)),
            };
            with_position(failure, position)
        }
        other => {
            let position = other.position();
            with_position(Failure::internal(other.to_string()), position)
        }
    }
}

/// Keeps an origin recorded earlier, so a caught and rethrown failure still
/// points at the place it was first raised.
fn with_position(failure: Failure, position: Position) -> Failure {
    if failure.origin.is_some() {
        return failure;
    }
    match (position.line(), position.position()) {
        (Some(line), Some(column)) => {
            failure.with_origin(format!("{}:{}", line, column))
        }
        (Some(line), None) => failure.with_origin(line.to_string()),
        _ => failure,
    }
}

/// Operand accepted by equality and ordering predicates.
pub(crate) fn straw_operand(value: &Dynamic, context: &str) -> Result<StrawValue, Failure> {
    dynamic_to_straw(value).ok_or_else(|| {
        Failure::internal(format!(
            "{} expects a boolean, number or string operand, got {}",
            context,
            value.type_name()
        ))
    })
}

pub(crate) fn straw_arguments(args: &[Dynamic], context: &str) -> Result<Vec<StrawValue>, Failure> {
    args.iter()
        .map(|value| straw_operand(value, context))
        .collect()
}
