//! Variable interpolation for strings
//!
//! This module replaces `${var}` references in task file commands with task
//! argument values, falling back to environment variables.
//!
//! Declared defaults may refer to each other and to task arguments. Argument
//! and environment values are substituted as they are and never expanded
//! again.

use crate::error::{InterpolationError, InterpolationResult};
use crate::task::TaskArgs;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::env;
use std::sync::OnceLock;

fn var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid interpolation pattern"))
}

/// Build the variable table for a task invocation
///
/// Named arguments override declared defaults; positional arguments are
/// available as `${1}`, `${2}`, ... References inside defaults are expanded
/// here, so the table holds final values.
pub fn task_vars(
    defaults: &HashMap<String, String>,
    args: &TaskArgs,
) -> InterpolationResult<HashMap<String, String>> {
    let mut vars = HashMap::new();
    for (key, value) in &args.named {
        vars.insert(key.clone(), value.clone());
    }
    for (i, value) in args.positional.iter().enumerate() {
        vars.insert((i + 1).to_string(), value.clone());
    }

    let mut expander = Defaults {
        defaults,
        resolved: vars,
        stack: Vec::new(),
    };
    for name in defaults.keys() {
        expander.resolve(name)?;
    }

    Ok(expander.resolved)
}

/// Expands declared defaults on demand
struct Defaults<'a> {
    defaults: &'a HashMap<String, String>,
    resolved: HashMap<String, String>,
    stack: Vec<&'a str>,
}

impl<'a> Defaults<'a> {
    fn resolve(&mut self, name: &'a str) -> InterpolationResult<Option<String>> {
        if let Some(value) = self.resolved.get(name) {
            return Ok(Some(value.clone()));
        }
        let defaults = self.defaults;
        let Some(raw) = defaults.get(name) else {
            return Ok(None);
        };
        if self.stack.contains(&name) {
            return Err(InterpolationError::RecursiveInterpolation);
        }

        self.stack.push(name);
        let mut value = String::with_capacity(raw.len());
        let mut last = 0;
        for caps in var_pattern().captures_iter(raw) {
            let (Some(whole), Some(reference)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            value.push_str(&raw[last..whole.start()]);
            match self.resolve(reference.as_str())? {
                Some(found) => value.push_str(&found),
                None => match env::var(reference.as_str()) {
                    Ok(found) => value.push_str(&found),
                    Err(_) => value.push_str(whole.as_str()),
                },
            }
            last = whole.end();
        }
        value.push_str(&raw[last..]);
        self.stack.pop();

        self.resolved.insert(name.to_string(), value.clone());
        Ok(Some(value))
    }
}

/// Interpolate variables in a string
///
/// Supports:
/// - `${var}` - variable from the table
/// - Environment variables (when not found in the table)
///
/// Unknown references are left as they are.
pub fn interpolate(s: &str, vars: &HashMap<String, String>) -> InterpolationResult<String> {
    substitute(s, vars, false)
}

/// Interpolate with strict mode - errors on undefined variables
pub fn interpolate_strict(s: &str, vars: &HashMap<String, String>) -> InterpolationResult<String> {
    substitute(s, vars, true)
}

/// Single substitution pass over `s`
fn substitute(
    s: &str,
    vars: &HashMap<String, String>,
    strict: bool,
) -> InterpolationResult<String> {
    let mut undefined = None;

    let result = var_pattern().replace_all(s, |caps: &Captures| {
        let var_name = &caps[1];

        if let Some(value) = vars.get(var_name) {
            return value.clone();
        }
        if let Ok(value) = env::var(var_name) {
            return value;
        }

        if undefined.is_none() {
            undefined = Some(var_name.to_string());
        }
        caps[0].to_string()
    });

    match undefined {
        Some(name) if strict => Err(InterpolationError::UndefinedVariable(name)),
        _ => Ok(result.into_owned()),
    }
}

/// Interpolate a list of strings
pub fn interpolate_list(
    list: &[String],
    vars: &HashMap<String, String>,
) -> InterpolationResult<Vec<String>> {
    list.iter()
        .map(|s| interpolate(s, vars))
        .collect::<InterpolationResult<Vec<String>>>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_interpolation() {
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "world".to_string());

        let result = interpolate("Hello, ${name}!", &vars).unwrap();
        assert_eq!(result, "Hello, world!");
    }

    #[test]
    fn test_environment_variable() {
        env::set_var("TEST_VAR_KNIT", "test_value");

        let vars = HashMap::new();
        let result = interpolate("Value: ${TEST_VAR_KNIT}", &vars).unwrap();
        assert_eq!(result, "Value: test_value");

        env::remove_var("TEST_VAR_KNIT");
    }

    #[test]
    fn test_undefined_variable_lenient() {
        let vars = HashMap::new();
        let result = interpolate("Hello, ${undefined_knit_var}!", &vars).unwrap();
        assert_eq!(result, "Hello, ${undefined_knit_var}!");
    }

    #[test]
    fn test_undefined_variable_strict() {
        let vars = HashMap::new();
        let result = interpolate_strict("Hello, ${undefined_knit_var}!", &vars);
        assert_eq!(
            result,
            Err(InterpolationError::UndefinedVariable("undefined_knit_var".to_string()))
        );
    }

    #[test]
    fn test_defaults_refer_to_each_other_and_arguments() {
        let mut defaults = HashMap::new();
        defaults.insert("out".to_string(), "${target}/${profile}".to_string());
        defaults.insert("target".to_string(), "build".to_string());
        defaults.insert("profile".to_string(), "debug".to_string());

        let args = TaskArgs::new().with_named("profile", "release");
        let vars = task_vars(&defaults, &args).unwrap();

        assert_eq!(interpolate("ls ${out}", &vars).unwrap(), "ls build/release");
    }

    #[test]
    fn test_self_reference_is_recursive() {
        let mut defaults = HashMap::new();
        defaults.insert("a".to_string(), "${b}".to_string());
        defaults.insert("b".to_string(), "x${a}".to_string());

        let result = task_vars(&defaults, &TaskArgs::new());
        assert_eq!(result, Err(InterpolationError::RecursiveInterpolation));
    }

    #[test]
    fn test_argument_values_are_not_expanded() {
        env::set_var("KNIT_ARG_ECHO", "from-env");
        let args = TaskArgs::new().with_named("name", "${KNIT_ARG_ECHO}");
        let vars = task_vars(&HashMap::new(), &args).unwrap();

        let result = interpolate("echo ${name}", &vars).unwrap();
        assert_eq!(result, "echo ${KNIT_ARG_ECHO}");
        env::remove_var("KNIT_ARG_ECHO");
    }

    #[test]
    fn test_environment_values_are_not_expanded() {
        env::set_var("KNIT_SELF_REF", "${KNIT_SELF_REF}");

        let result = interpolate("v=${KNIT_SELF_REF}", &HashMap::new()).unwrap();
        assert_eq!(result, "v=${KNIT_SELF_REF}");
        env::remove_var("KNIT_SELF_REF");
    }

    #[test]
    fn test_task_vars_layers_arguments_over_defaults() {
        let mut defaults = HashMap::new();
        defaults.insert("mode".to_string(), "debug".to_string());
        defaults.insert("jobs".to_string(), "4".to_string());

        let args = TaskArgs::new()
            .with_named("mode", "release")
            .with_positional("first");
        let vars = task_vars(&defaults, &args).unwrap();

        assert_eq!(vars["mode"], "release");
        assert_eq!(vars["jobs"], "4");
        assert_eq!(vars["1"], "first");
    }

    #[test]
    fn test_interpolate_list() {
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "test".to_string());

        let list = vec!["file-${name}.txt".to_string(), "static.txt".to_string()];

        let result = interpolate_list(&list, &vars).unwrap();
        assert_eq!(result, vec!["file-test.txt", "static.txt"]);
    }
}
