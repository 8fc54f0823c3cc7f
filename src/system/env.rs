//! Environment variable assignment

use crate::error::{SystemError, SystemResult};
use crate::system::COMMAND_PREFIX;
use std::env;

/// Assign each pair into the process environment
///
/// Every pair is checked before any is assigned, so an invalid entry leaves
/// the environment untouched. Assignments are echoed as
/// `>>> knit-export KEY=VALUE` when `echo` is set.
pub fn set_environment_variables<I, K, V>(vars: I, echo: bool) -> SystemResult<()>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let vars: Vec<(K, V)> = vars.into_iter().collect();

    for (key, value) in &vars {
        validate(key.as_ref(), value.as_ref())?;
    }

    for (key, value) in &vars {
        let (key, value) = (key.as_ref(), value.as_ref());
        if echo {
            println!("{} knit-export {}={}", COMMAND_PREFIX, key, value);
        }
        env::set_var(key, value);
    }

    Ok(())
}

fn validate(key: &str, value: &str) -> SystemResult<()> {
    let reason = if key.is_empty() {
        "name is empty"
    } else if key.contains('=') {
        "name contains '='"
    } else if key.contains('\0') {
        "name contains a NUL byte"
    } else if value.contains('\0') {
        "value contains a NUL byte"
    } else {
        return Ok(());
    };

    Err(SystemError::InvalidEnvironment {
        key: key.to_string(),
        reason: reason.to_string(),
    })
}
