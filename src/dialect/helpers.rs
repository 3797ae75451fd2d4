//! Shared helper functions for dialect descriptors.
//!
//! Dialects keep their type and default-value tables as static slices and
//! use these helpers to query them, so each descriptor stays a thin list of
//! facts.

use crate::types::ColumnType;

/// Server type name to canonical type.
pub type ServerTypeMap = [(&'static str, ColumnType)];

/// Canonical default expression to server default expression.
pub type DefaultValueMap = [(&'static str, &'static str)];

/// Local default expression for "now".
pub const DEFAULT_CURRENT_TIMESTAMP: &str = "CURRENT_TIMESTAMP";
/// Local default expression for "today".
pub const DEFAULT_CURRENT_DATE: &str = "CURRENT_DATE";
/// Local default expression for a random identifier.
pub const DEFAULT_UUID: &str = "UUID";

// =============================================================================
// Server Type Names
// =============================================================================

/// A server type split into its base name and parenthesized arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerType {
    /// Lowercased base name, modifiers removed (`varchar`, `double precision`).
    pub base: String,
    /// Raw text between the parentheses (`255`, `10,2`), if any.
    pub args: Option<String>,
}

/// Split a catalog type name such as `DECIMAL(10, 2) UNSIGNED`.
pub fn split_server_type(raw: &str) -> ServerType {
    let lowered = raw.trim().to_lowercase();
    let (head, args, tail) = match (lowered.find('('), lowered.rfind(')')) {
        (Some(open), Some(close)) if open < close => (
            lowered[..open].trim().to_string(),
            Some(lowered[open + 1..close].trim().to_string()),
            lowered[close + 1..].trim().to_string(),
        ),
        _ => (lowered.clone(), None, String::new()),
    };

    let mut base = format!("{head} {tail}");
    for modifier in [" unsigned", " zerofill", " signed"] {
        base = base.replace(modifier, "");
    }

    ServerType {
        base: base.split_whitespace().collect::<Vec<_>>().join(" "),
        args,
    }
}

/// Look up a base server type name.
pub fn lookup_server_type(map: &ServerTypeMap, base: &str) -> Option<ColumnType> {
    map.iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(base))
        .map(|(_, ty)| *ty)
}

// =============================================================================
// Default Values
// =============================================================================

/// Translate a canonical default expression to the server form.
pub fn translate_default(map: &DefaultValueMap, local: &str) -> Option<&'static str> {
    map.iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(local.trim()))
        .map(|(_, server)| *server)
}

/// Translate a server default expression back to its canonical form.
pub fn local_default(map: &DefaultValueMap, server: &str) -> Option<&'static str> {
    let wanted = normalize_expression(server);
    map.iter()
        .find(|(_, expr)| normalize_expression(expr) == wanted)
        .map(|(local, _)| *local)
}

fn normalize_expression(expr: &str) -> String {
    expr.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}
