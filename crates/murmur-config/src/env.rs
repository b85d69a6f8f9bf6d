use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Expand `{{ env.VAR }}` placeholders in raw config text
///
/// `{{ env.VAR | default("fallback") }}` substitutes the fallback when the
/// variable is unset. Lines whose first non-blank character is `#` are
/// left untouched so commented-out settings never require their variables.
pub fn expand_env(input: &str) -> Result<String, String> {
    fn placeholder() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| {
            Regex::new(r#"\{\{\s*([a-zA-Z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#)
                .expect("must be valid regex")
        })
    }

    let expanded = input
        .split('\n')
        .map(|line| {
            if line.trim_start().starts_with('#') {
                return Ok(line.to_string());
            }

            let mut failure = None;
            let replaced = placeholder().replace_all(line, |captures: &Captures<'_>| {
                match resolve(&captures[1], captures.get(2).map(|m| m.as_str())) {
                    Ok(value) => value,
                    Err(e) => {
                        failure.get_or_insert(e);
                        String::new()
                    }
                }
            });

            match failure {
                Some(e) => Err(e),
                None => Ok(replaced.into_owned()),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(expanded.join("\n"))
}

fn resolve(key: &str, default: Option<&str>) -> Result<String, String> {
    let Some(var_name) = key.strip_prefix("env.").filter(|name| !name.contains('.')) else {
        return Err(format!("only variables scoped with 'env.' are supported: `{key}`"));
    };

    match (std::env::var(var_name), default) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(default)) => Ok(default.to_string()),
        (Err(_), None) => Err(format!("environment variable not found: `{var_name}`")),
    }
}
