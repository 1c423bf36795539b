//! Endpoint resolution: symbolic call names to HTTP requests
//!
//! A symbolic call name packs an HTTP verb and an endpoint path into one
//! identifier: `getUserCheckins` means `GET /user/checkins.json`. The verb is
//! the leading lowercase run; the remainder becomes a slash-delimited
//! lowercase path, with a separator inserted before every capital letter and
//! before every digit run. Resolution is pure: no I/O, deterministic output.

use crate::error::{Error, Result};
use crate::params::Params;
use foursquare_transport::BasicCredentials;
use http::Method;
use std::collections::VecDeque;

/// Serialization-format suffix appended to every derived path.
const FORMAT_SUFFIX: &str = ".json";

/// A symbolic invocation: a call name plus positional arguments.
#[derive(Debug, Clone)]
pub struct SymbolicCall {
    name: String,
    args: Vec<CallArg>,
}

/// A positional argument to a symbolic call.
///
/// The first `Params` argument is consumed as the request parameter bag.
/// When the client has no consumer key configured, trailing `Text` arguments
/// are read as `username` then `password` for HTTP Basic auth.
#[derive(Debug, Clone)]
pub enum CallArg {
    /// Request parameter bag
    Params(Params),
    /// Plain text argument (basic-auth credential)
    Text(String),
}

impl From<Params> for CallArg {
    fn from(params: Params) -> Self {
        CallArg::Params(params)
    }
}

impl From<String> for CallArg {
    fn from(text: String) -> Self {
        CallArg::Text(text)
    }
}

impl From<&str> for CallArg {
    fn from(text: &str) -> Self {
        CallArg::Text(text.to_string())
    }
}

/// The outcome of resolving a [`SymbolicCall`]: everything the dispatcher
/// needs to issue the request.
///
/// The path always begins with `/`, ends with `.json`, and contains no
/// doubled separators.
#[derive(Debug, Clone)]
pub struct ResolvedRequest {
    /// HTTP method derived from the verb prefix
    pub method: Method,
    /// Endpoint path, e.g. `/user/checkins.json`
    pub path: String,
    /// Request parameter bag, if one was passed
    pub params: Option<Params>,
    /// Basic credentials, only for unauthenticated clients
    pub basic: Option<BasicCredentials>,
}

impl SymbolicCall {
    /// Start a call with the given symbolic name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Append a positional argument.
    pub fn arg(mut self, arg: impl Into<CallArg>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append a parameter bag argument.
    pub fn params(self, params: Params) -> Self {
        self.arg(params)
    }

    /// The raw call name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve this call into a concrete request.
    ///
    /// `consumer_configured` reflects whether the client holds an OAuth
    /// consumer identity; without one, trailing text arguments are
    /// interpreted as basic-auth credentials.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedVerb`] when the verb prefix is not a known
    ///   HTTP method.
    /// - [`Error::MalformedEndpoint`] when nothing remains after the verb,
    ///   which would yield an empty path.
    pub fn resolve(self, consumer_configured: bool) -> Result<ResolvedRequest> {
        let (method, remainder) = split_verb(&self.name)?;
        if remainder.is_empty() {
            return Err(Error::MalformedEndpoint(self.name.clone()));
        }
        let path = derive_path(remainder);

        let mut args = VecDeque::from(self.args);
        let params = if matches!(args.front(), Some(CallArg::Params(_))) {
            match args.pop_front() {
                Some(CallArg::Params(params)) => Some(params),
                _ => None,
            }
        } else {
            None
        };

        let basic = if consumer_configured {
            None
        } else {
            let mut credentials = args.into_iter().filter_map(|arg| match arg {
                CallArg::Text(text) => Some(text),
                CallArg::Params(_) => None,
            });
            match (credentials.next(), credentials.next()) {
                (Some(username), Some(password))
                    if !username.is_empty() && !password.is_empty() =>
                {
                    Some(BasicCredentials::new(username, password))
                }
                _ => None,
            }
        };

        Ok(ResolvedRequest {
            method,
            path,
            params,
            basic,
        })
    }
}

/// Split the call name at the first word boundary (underscore, capital, or
/// digit) and map the verb token onto an HTTP method.
fn split_verb(name: &str) -> Result<(Method, &str)> {
    let boundary = name
        .find(|c: char| c == '_' || c.is_ascii_uppercase() || c.is_ascii_digit())
        .unwrap_or(name.len());
    let verb = &name[..boundary];
    let remainder = name[boundary..].trim_start_matches('_');

    let method = match verb.to_ascii_uppercase().as_str() {
        "GET" => Method::GET,
        "POST" => Method::POST,
        "PUT" => Method::PUT,
        "DELETE" => Method::DELETE,
        "HEAD" => Method::HEAD,
        _ => return Err(Error::UnsupportedVerb(verb.to_string())),
    };
    Ok((method, remainder))
}

/// Transform the post-verb remainder into an endpoint path.
///
/// A separator goes before every capital letter and before every digit run;
/// the result is lowercased, doubled separators collapse to one, and the
/// format suffix is appended. Digit runs stay a single segment, so a
/// trailing id number is not split apart.
fn derive_path(remainder: &str) -> String {
    let mut path = String::with_capacity(remainder.len() + FORMAT_SUFFIX.len() + 2);
    path.push('/');

    let mut in_digit_run = false;
    for ch in remainder.chars() {
        if ch.is_ascii_uppercase() {
            path.push('/');
            path.push(ch.to_ascii_lowercase());
            in_digit_run = false;
        } else if ch.is_ascii_digit() {
            if !in_digit_run {
                path.push('/');
            }
            path.push(ch);
            in_digit_run = true;
        } else {
            path.push(ch);
            in_digit_run = false;
        }
    }

    while path.contains("//") {
        path = path.replace("//", "/");
    }
    path.push_str(FORMAT_SUFFIX);
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn resolve(name: &str) -> Result<ResolvedRequest> {
        SymbolicCall::new(name).resolve(true)
    }

    #[test]
    fn get_user_maps_to_get_user_json() {
        let resolved = resolve("getUser").unwrap();
        assert_eq!(resolved.method, Method::GET);
        assert_eq!(resolved.path, "/user.json");
        assert!(resolved.params.is_none());
    }

    #[test]
    fn post_checkins_with_params_keeps_the_bag() {
        let params = Params::new().text("shout", "hi");
        let resolved = SymbolicCall::new("postCheckins")
            .params(params.clone())
            .resolve(true)
            .unwrap();
        assert_eq!(resolved.method, Method::POST);
        assert_eq!(resolved.path, "/checkins.json");
        assert_eq!(resolved.params, Some(params));
    }

    #[test]
    fn camel_case_becomes_slash_delimited() {
        let resolved = resolve("getUserCheckins").unwrap();
        assert_eq!(resolved.path, "/user/checkins.json");
    }

    #[test]
    fn snake_case_verb_split_is_supported() {
        let resolved = resolve("get_checkins").unwrap();
        assert_eq!(resolved.method, Method::GET);
        assert_eq!(resolved.path, "/checkins.json");
    }

    #[test]
    fn delete_verb_is_recognized() {
        let resolved = resolve("deleteCheckin").unwrap();
        assert_eq!(resolved.method, Method::DELETE);
        assert_eq!(resolved.path, "/checkin.json");
    }

    #[test]
    fn doubled_separator_collapses_to_one() {
        // Leading capital after the verb would otherwise yield "//user/lists"
        let resolved = resolve("getUserLists").unwrap();
        assert_eq!(resolved.path, "/user/lists.json");
        assert!(!resolved.path.contains("//"));
    }

    #[test]
    fn digit_runs_stay_one_segment() {
        let resolved = resolve("getCheckin123").unwrap();
        assert_eq!(resolved.path, "/checkin/123.json");

        let resolved = resolve("get123Checkins").unwrap();
        assert_eq!(resolved.path, "/123/checkins.json");
    }

    #[test]
    fn digit_letter_boundary_splits_once_per_run() {
        let resolved = resolve("getV1History").unwrap();
        assert_eq!(resolved.path, "/v/1/history.json");
    }

    #[test]
    fn unknown_verb_is_rejected() {
        let err = resolve("patchUser").unwrap_err();
        assert!(matches!(err, Error::UnsupportedVerb(verb) if verb == "patch"));
    }

    #[test]
    fn missing_remainder_is_malformed() {
        let err = resolve("get").unwrap_err();
        assert!(matches!(err, Error::MalformedEndpoint(name) if name == "get"));

        let err = resolve("get_").unwrap_err();
        assert!(matches!(err, Error::MalformedEndpoint(_)));
    }

    #[test]
    fn resolution_is_deterministic() {
        let a = resolve("getUserCheckins").unwrap();
        let b = resolve("getUserCheckins").unwrap();
        assert_eq!(a.method, b.method);
        assert_eq!(a.path, b.path);
        assert_eq!(a.params, b.params);
    }

    #[test]
    fn trailing_text_args_become_basic_credentials_without_consumer() {
        let resolved = SymbolicCall::new("getHistory")
            .params(Params::new().text("l", "10"))
            .arg("jmathai")
            .arg("hunter2")
            .resolve(false)
            .unwrap();

        let basic = resolved.basic.expect("credentials expected");
        assert_eq!(basic.username, "jmathai");
        assert_eq!(basic.password.expose_secret(), "hunter2");
        assert_eq!(resolved.params, Some(Params::new().text("l", "10")));
    }

    #[test]
    fn credentials_require_both_parts_non_empty() {
        let resolved = SymbolicCall::new("getHistory")
            .arg("jmathai")
            .resolve(false)
            .unwrap();
        assert!(resolved.basic.is_none());

        let resolved = SymbolicCall::new("getHistory")
            .arg("jmathai")
            .arg("")
            .resolve(false)
            .unwrap();
        assert!(resolved.basic.is_none());
    }

    #[test]
    fn consumer_configured_ignores_credential_args() {
        let resolved = SymbolicCall::new("getHistory")
            .arg("jmathai")
            .arg("hunter2")
            .resolve(true)
            .unwrap();
        assert!(resolved.basic.is_none());
    }

    #[test]
    fn path_invariants_hold_for_valid_names() {
        for name in ["getUser", "postCheckins", "getUserCheckins", "getCheckin123"] {
            let resolved = resolve(name).unwrap();
            assert!(resolved.path.starts_with('/'), "{name}");
            assert!(resolved.path.ends_with(".json"), "{name}");
            assert!(!resolved.path.contains("//"), "{name}");
        }
    }
}
