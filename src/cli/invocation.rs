//! Task invocation parsing
//!
//! Turns the positional command line tokens into task requests:
//!
//! - `build` requests a task
//! - `key=value` following a task name is a named argument for that task
//! - `build[a,b,key=value]` carries the arguments inline; bare items are
//!   positional

use crate::error::InvocationError;
use crate::runner::TaskRequest;
use crate::task::TaskArgs;

/// Parse positional tokens into task requests
pub fn parse_invocation<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<TaskRequest>, InvocationError> {
    let mut requests: Vec<TaskRequest> = Vec::new();

    for token in tokens {
        let token = token.as_ref();

        let open = token.find('[');
        let equals = token.find('=');

        if let Some(open) = open.filter(|&open| equals.map_or(true, |eq| open < eq)) {
            requests.push(parse_bracketed(token, open)?);
        } else if let Some((key, value)) = token.split_once('=') {
            if key.is_empty() {
                return Err(InvocationError::Malformed(token.to_string()));
            }
            let request = requests
                .last_mut()
                .ok_or_else(|| InvocationError::DanglingArgument(token.to_string()))?;
            request.args.named.insert(key.to_string(), value.to_string());
        } else if token.is_empty() {
            return Err(InvocationError::Malformed(token.to_string()));
        } else {
            requests.push(TaskRequest::new(token));
        }
    }

    Ok(requests)
}

/// Parse `name[a,b,key=value]`
fn parse_bracketed(token: &str, open: usize) -> Result<TaskRequest, InvocationError> {
    let malformed = || InvocationError::Malformed(token.to_string());

    let name = &token[..open];
    let inner = token[open + 1..].strip_suffix(']').ok_or_else(malformed)?;
    if name.is_empty() || inner.contains(['[', ']']) {
        return Err(malformed());
    }

    let mut args = TaskArgs::new();
    for item in inner.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match item.split_once('=') {
            Some(("", _)) => return Err(malformed()),
            Some((key, value)) => {
                args.named.insert(key.trim().to_string(), value.trim().to_string());
            }
            None => args.positional.push(item.to_string()),
        }
    }

    Ok(TaskRequest::new(name).with_args(args))
}
