//! Command argument builder.
//!
//! Translates canonical options (`verbose`, `config`, `check`, ...) into the
//! tool-native tokens declared by a [`ToolDefinition`].

use crate::tool::{OptionKind, ToolDefinition};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Canonical option name → activation value
pub type ActivatedOptions = BTreeMap<String, Value>;

/// `null`, `false`, zero, `""`, `[]` and `{}` leave an option off.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Render an activation value as a single argv token.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Build the argv for `definition`.
///
/// Options are emitted in declaration order; canonical options the tool does
/// not declare are ignored; `files` always come last.
pub fn build_command(
    definition: &ToolDefinition,
    activated: &ActivatedOptions,
    files: &[PathBuf],
) -> Vec<String> {
    let mut argv: Vec<String> = definition.command_sequence.tokens().to_vec();

    for (token, option) in definition.options.iter() {
        let Some(value) = option
            .canonical_name
            .as_deref()
            .and_then(|name| activated.get(name))
            .filter(|v| is_truthy(v))
        else {
            continue;
        };

        match option.kind {
            OptionKind::Flag => argv.push(token.to_string()),
            OptionKind::Value => {
                argv.push(token.to_string());
                argv.push(stringify(value));
            }
            OptionKind::Positional => argv.push(stringify(value)),
        }
    }

    argv.extend(files.iter().map(|f| f.to_string_lossy().into_owned()));
    argv
}
