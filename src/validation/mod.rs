pub mod allow_list;
pub mod destination;

use serde_json::Value;

pub use allow_list::AllowList;
pub use destination::{Destination, JsonMethod};

/// A create/update payload that passed every check.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointRequest {
    pub usernames: Vec<String>,
    pub label: String,
    pub destination: Destination,
}

/// Why a payload was refused. Only ever logged; callers see one generic
/// rejection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    NotAnObject,
    Usernames,
    Label,
    DestNotString,
    Destination,
    UnlistedUsername,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Rejection::NotAnObject => "body is not an object",
            Rejection::Usernames => "usernames must be a non-empty array of non-empty strings",
            Rejection::Label => "label must be a non-blank string",
            Rejection::DestNotString => "dest must be a string",
            Rejection::Destination => "destination details are invalid for dest",
            Rejection::UnlistedUsername => "usernames contain an unlisted target",
        };
        write!(f, "{reason}")
    }
}

/// Check an endpoint payload, stopping at the first failure:
/// usernames, label, dest, destination details, then the allow-list.
pub fn validate_request(
    body: &Value,
    allow_list: &AllowList,
) -> Result<EndpointRequest, Rejection> {
    let body = body.as_object().ok_or(Rejection::NotAnObject)?;

    let usernames = body
        .get("usernames")
        .and_then(Value::as_array)
        .filter(|names| !names.is_empty())
        .ok_or(Rejection::Usernames)?
        .iter()
        .map(|name| match name.as_str() {
            Some(s) if !s.is_empty() => Ok(s.to_string()),
            _ => Err(Rejection::Usernames),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let label = body
        .get("label")
        .and_then(Value::as_str)
        .filter(|l| !l.trim().is_empty())
        .ok_or(Rejection::Label)?;

    let dest = body
        .get("dest")
        .and_then(Value::as_str)
        .ok_or(Rejection::DestNotString)?;

    let details = body.get("destDetails").unwrap_or(&Value::Null);
    let destination = Destination::parse(dest, details).ok_or(Rejection::Destination)?;

    if !allow_list.contains_all(usernames.as_slice()) {
        return Err(Rejection::UnlistedUsername);
    }

    Ok(EndpointRequest {
        usernames,
        label: label.to_string(),
        destination,
    })
}
