use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Matches `{{ scope.NAME }}` with an optional `| default("value")` filter
fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\{\{\s*([A-Za-z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\)\s*)?\}\}"#).expect("must be valid regex")
    })
}

/// Substitute environment placeholders in raw config text
///
/// `{{ env.VAR }}` is replaced with the variable's value and
/// `{{ env.VAR | default("x") }}` falls back to `x` when it is unset.
/// Comment lines are copied verbatim so commented-out secrets never
/// have to exist in the environment.
pub fn expand_env(input: &str) -> Result<String, String> {
    let mut output = String::with_capacity(input.len());

    for line in input.split_inclusive('\n') {
        if line.trim_start().starts_with('#') {
            output.push_str(line);
        } else {
            output.push_str(&expand_line(line)?);
        }
    }

    Ok(output)
}

fn expand_line(line: &str) -> Result<String, String> {
    let mut failure = None;

    let expanded = placeholder().replace_all(line, |captures: &Captures<'_>| {
        let default = captures.get(2).map(|m| m.as_str());
        resolve(&captures[1], default).unwrap_or_else(|e| {
            failure.get_or_insert(e);
            String::new()
        })
    });

    match failure {
        Some(e) => Err(e),
        None => Ok(expanded.into_owned()),
    }
}

fn resolve(key: &str, default: Option<&str>) -> Result<String, String> {
    let Some(name) = key.strip_prefix("env.") else {
        return Err(format!("only variables scoped with 'env.' are supported: `{key}`"));
    };

    match std::env::var(name) {
        Ok(value) => Ok(value),
        Err(_) => default
            .map(str::to_owned)
            .ok_or_else(|| format!("environment variable not found: `{name}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_without_placeholders_is_unchanged() {
        let input = "[upstream]\ntimeout = \"60s\"\n";
        assert_eq!(expand_env(input).unwrap(), input);
    }

    #[test]
    fn provider_url_from_environment() {
        temp_env::with_var("BRIDGE_PROVIDER_A", Some("https://a.example/v1/chat/completions"), || {
            let result = expand_env("provider-a = \"{{ env.BRIDGE_PROVIDER_A }}\"").unwrap();
            assert_eq!(result, "provider-a = \"https://a.example/v1/chat/completions\"");
        });
    }

    #[test]
    fn two_placeholders_on_one_line() {
        temp_env::with_vars([("BRIDGE_HOST", Some("127.0.0.1")), ("BRIDGE_PORT", Some("9000"))], || {
            let result = expand_env("listen_address = \"{{ env.BRIDGE_HOST }}:{{ env.BRIDGE_PORT }}\"").unwrap();
            assert_eq!(result, "listen_address = \"127.0.0.1:9000\"");
        });
    }

    #[test]
    fn unset_variable_is_an_error() {
        temp_env::with_var_unset("BRIDGE_UNSET", || {
            let err = expand_env("key = \"{{ env.BRIDGE_UNSET }}\"").unwrap_err();
            assert!(err.contains("BRIDGE_UNSET"));
        });
    }

    #[test]
    fn default_applies_only_when_unset() {
        temp_env::with_var_unset("BRIDGE_MODEL", || {
            let result = expand_env("m = \"{{ env.BRIDGE_MODEL | default(\"fallback\") }}\"").unwrap();
            assert_eq!(result, "m = \"fallback\"");
        });
        temp_env::with_var("BRIDGE_MODEL", Some("set"), || {
            let result = expand_env("m = \"{{ env.BRIDGE_MODEL | default(\"fallback\") }}\"").unwrap();
            assert_eq!(result, "m = \"set\"");
        });
    }

    #[test]
    fn non_env_scope_is_rejected() {
        let err = expand_env("key = \"{{ vault.SECRET }}\"").unwrap_err();
        assert!(err.contains("only variables scoped with 'env.'"));
    }

    #[test]
    fn comment_lines_are_not_expanded() {
        temp_env::with_var_unset("BRIDGE_UNSET", || {
            let input = "  # provider-c = \"{{ env.BRIDGE_UNSET }}\"\n";
            assert_eq!(expand_env(input).unwrap(), input);
        });
    }
}
