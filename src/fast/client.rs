use crate::errors::{to_speed_test_error, SpeedTestError};
use crate::fast::requests::{Host, Request};
use log::debug;
use reqwest::{Client as ReqwestClient, StatusCode};

static API_URL: &str = "https://api.fast.com";
static WEB_URL: &str = "https://fast.com";

#[derive(Debug, Clone)]
pub struct Client {
    client: ReqwestClient,
    api_url: String,
    web_url: String,
}

impl Client {
    pub fn new() -> Self {
        Self::with_base_urls(API_URL, WEB_URL)
    }

    pub fn with_base_urls(
        api_url: impl Into<String>,
        web_url: impl Into<String>,
    ) -> Self {
        Client {
            client: ReqwestClient::new(),
            api_url: api_url.into(),
            web_url: web_url.into(),
        }
    }

    pub async fn send<R: Request>(
        &self,
        request: R,
    ) -> Result<R::Response, SpeedTestError> {
        let url = self.url_for(&request);
        debug!("{} {}", R::METHOD, url);

        let response = self
            .client
            .request(R::METHOD, &url)
            .headers(request.headers())
            .send()
            .await
            .map_err(|e| to_speed_test_error(Box::new(e), "request failed"))?;

        if response.status() == StatusCode::FORBIDDEN {
            return Err(SpeedTestError::token(format!(
                "{} rejected the access token",
                url
            )));
        }

        let response = response
            .error_for_status()
            .map_err(|e| to_speed_test_error(Box::new(e), "request failed"))?;

        let text = response.text().await.map_err(|e| {
            to_speed_test_error(Box::new(e), "reading response failed")
        })?;

        // The API answers in JSON, the web app in HTML and JavaScript.
        let json_error = match serde_json::from_str::<R::Response>(&text) {
            Ok(parsed) => return Ok(parsed),
            Err(e) => e,
        };

        serde_plain::from_str(&text).map_err(|_| {
            SpeedTestError::api(format!(
                "unexpected response from {}: {}",
                url, json_error
            ))
            .with_source(json_error)
        })
    }

    fn url_for<R: Request>(&self, request: &R) -> String {
        let endpoint = request.endpoint();

        if endpoint.starts_with("http://") || endpoint.starts_with("https://")
        {
            return endpoint.into_owned();
        }

        let base = match R::HOST {
            Host::Api => &self.api_url,
            Host::Web => &self.web_url,
        };

        format!(
            "{}/{}",
            base.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}
