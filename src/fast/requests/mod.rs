extern crate serde;

pub mod targets;
pub mod token;

use reqwest::{
    header::{HeaderMap, HeaderValue, USER_AGENT},
    Method,
};
use serde::Deserialize;
use std::borrow::Cow;

const NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// User agent sent with every request, including the throughput tests.
pub(crate) fn user_agent() -> String {
    match option_env!("FASTSPEED_BUILD_GIT_HASH") {
        Some(rev) => format!("{}/{} (rev {})", NAME, VERSION, rev),
        None => format!("{}/{}", NAME, VERSION),
    }
}

/// Which fast.com host a request is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Host {
    /// `api.fast.com`, serving the server list.
    Api,
    /// `fast.com`, serving the web app the token is scraped from.
    Web,
}

pub trait Request {
    type Response: for<'de> Deserialize<'de>;

    const METHOD: Method = Method::GET;

    const HOST: Host = Host::Api;

    fn endpoint(&self) -> Cow<'_, str>;

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Ok(value) = HeaderValue::from_str(&user_agent()) {
            headers.insert(USER_AGENT, value);
        }

        headers
    }
}

impl<R: Request> Request for &R {
    type Response = R::Response;

    const METHOD: Method = R::METHOD;

    const HOST: Host = R::HOST;

    fn endpoint(&self) -> Cow<'_, str> {
        (**self).endpoint()
    }

    fn headers(&self) -> HeaderMap {
        (**self).headers()
    }
}
