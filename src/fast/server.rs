extern crate serde;

use crate::errors::SpeedTestError;
use serde::{Deserialize, Serialize};
use url::Url;

/// Where a server or client is, as reported by the fast.com API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
}

/// A speed test target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub name: String,
    pub url: String,
    /// Byte-range capable download URL, derived by [`Server::set_chunk_size`].
    #[serde(rename = "rburl", default, skip_serializing_if = "Option::is_none")]
    pub range_url: Option<String>,
    #[serde(default)]
    pub location: Location,
}

/// The machine running the test, as seen by the fast.com API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub asn: String,
    #[serde(default)]
    pub isp: String,
    #[serde(default)]
    pub location: Location,
}

impl Server {
    #[cfg(test)]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            range_url: None,
            location: Location::default(),
        }
    }

    pub fn parsed_url(&self) -> Result<Url, SpeedTestError> {
        Url::parse(&self.url).map_err(|e| {
            SpeedTestError::validation(format!(
                "error parsing url for {}: {}",
                self.url, e
            ))
            .with_source(e)
        })
    }

    /// Derive the ranged download URL by appending `range/0-<size>` to the
    /// path of the base URL. The query string is kept as is.
    pub fn set_chunk_size(&mut self, size: u64) -> Result<(), SpeedTestError> {
        let mut url = self.parsed_url()?;

        url.path_segments_mut()
            .map_err(|_| {
                SpeedTestError::validation(format!(
                    "{} cannot be used as a base url",
                    self.url
                ))
            })?
            .pop_if_empty()
            .push("range")
            .push(&format!("0-{}", size));

        self.range_url = Some(url.into());

        Ok(())
    }

    /// Human readable `city, country` label.
    pub fn label(&self) -> String {
        match (self.location.city.is_empty(), self.location.country.is_empty())
        {
            (false, false) => {
                format!("{}, {}", self.location.city, self.location.country)
            }
            (false, true) => self.location.city.clone(),
            (true, false) => self.location.country.clone(),
            (true, true) => self.name.clone(),
        }
    }
}
