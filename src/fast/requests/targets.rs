extern crate serde;

use crate::fast::requests::Request;
use crate::fast::server::{ClientInfo, Server};
use serde::Deserialize;
use std::borrow::Cow;

/// The server list, together with what the API knows about the caller.
#[derive(Debug, Deserialize)]
pub struct TargetsResponse {
    #[serde(default)]
    pub targets: Vec<Server>,
    #[serde(default)]
    pub client: Option<ClientInfo>,
}

pub(crate) struct TargetsRequest {
    token: String,
}

impl TargetsRequest {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

impl Request for TargetsRequest {
    type Response = TargetsResponse;

    fn endpoint(&self) -> Cow<'_, str> {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("token", &self.token)
            .append_pair("https", "true")
            .finish();

        format!("/netflix/speedtest/v2?{}", query).into()
    }
}
