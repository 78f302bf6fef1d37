//! Template interpolation for agent and task text.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static VARIABLE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_\-]*)\}").expect("valid placeholder regex"));

/// Replace `{key}` placeholders with values from `inputs`.
///
/// Only identifiers (letter/underscore first, then alphanumerics, `_` or `-`)
/// are treated as placeholders, so JSON fragments in the template are left
/// alone. Placeholders with no matching input stay as written. Substituted
/// values are not scanned again.
pub fn interpolate(template: &str, inputs: &HashMap<String, String>) -> String {
    if inputs.is_empty() {
        return template.to_string();
    }

    VARIABLE_PATTERN
        .replace_all(template, |caps: &Captures<'_>| match inputs.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}
