use crate::errors::SpeedTestError;
use crate::fast::server::Server;
use crate::fast::tests::throughput::Transfer;
use crate::fast::tests::Direction;
use log::info;
use reqwest::header::{HeaderValue, CACHE_CONTROL};

/// Build the ranged GET repeated by the download test.
///
/// The server's range URL has to be derived with
/// [`Server::set_chunk_size`] first.
pub(crate) fn download_transfer(
    client: &reqwest::Client,
    server: &Server,
) -> Result<Transfer, SpeedTestError> {
    let url = server.range_url.as_deref().ok_or_else(|| {
        SpeedTestError::validation(format!(
            "no range url set for {}",
            server.name
        ))
    })?;

    info!("Beginning Download Test: {}", url);

    let request = client
        .get(url)
        .header(CACHE_CONTROL, HeaderValue::from_static("no-cache"))
        .build()
        .map_err(|e| {
            SpeedTestError::validation(format!(
                "failed to generate http request for {}: {}",
                url, e
            ))
            .with_source(e)
        })?;

    Ok(Transfer::new(Direction::Download, request, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn test_requires_range_url() {
        let client = reqwest::Client::new();
        let server = Server::new("s", "https://example.com/speedtest");

        let err = download_transfer(&client, &server).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_builds_ranged_get() {
        let client = reqwest::Client::new();
        let mut server = Server::new("s", "https://example.com/speedtest?c=us");
        server.set_chunk_size(1024).unwrap();

        let transfer = download_transfer(&client, &server).unwrap();

        assert_eq!(transfer.direction(), Direction::Download);
        assert_eq!(
            transfer.url().as_str(),
            "https://example.com/speedtest/range/0-1024?c=us"
        );
    }

    #[test]
    fn test_rejects_malformed_range_url() {
        let client = reqwest::Client::new();
        let mut server = Server::new("s", "https://example.com");
        server.range_url = Some("::not a url::".to_string());

        assert!(download_transfer(&client, &server).is_err());
    }
}
