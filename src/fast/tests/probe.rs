//! Round-trip time measurement against a single server.
//!
//! Two strategies share the [`Probe`] contract: ICMP echo and timed HTTP
//! GET requests. Which one is used is decided once, when the [`Prober`]
//! is built. Neither strategy retries; one failed sample fails the
//! whole measurement.

use crate::errors::SpeedTestError;
use crate::fast::server::Server;
use crate::fast::tests::connection::{http_client, resolve_host};
use log::debug;
use std::io;
use std::net::IpAddr;
use std::time::Duration;
use surge_ping::{Config, PingIdentifier, PingSequence, ICMP};
use tokio::time::{sleep, Instant};
use url::Url;

/// Per-request timeout of the HTTP strategy.
pub const HTTP_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// How long to wait for each echo reply.
pub const ECHO_TIMEOUT: Duration = Duration::from_secs(2);

/// Pause between consecutive echo requests.
pub const ECHO_INTERVAL: Duration = Duration::from_secs(1);

const ECHO_PAYLOAD: [u8; 56] = [0; 56];

/// Measures the average round-trip time to a server over `count` samples.
pub(crate) trait Probe {
    async fn probe(
        &self,
        server: &Server,
        count: usize,
    ) -> Result<Duration, SpeedTestError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeKind {
    Icmp,
    Http,
}

/// The probe strategy chosen for this run.
#[derive(Debug)]
pub enum Prober {
    Icmp(IcmpProber),
    Http(HttpProber),
}

impl Prober {
    pub fn new(kind: ProbeKind) -> Result<Self, SpeedTestError> {
        Ok(match kind {
            ProbeKind::Icmp => Prober::Icmp(IcmpProber::default()),
            ProbeKind::Http => Prober::Http(HttpProber::new()?),
        })
    }
}

impl Probe for Prober {
    async fn probe(
        &self,
        server: &Server,
        count: usize,
    ) -> Result<Duration, SpeedTestError> {
        match self {
            Prober::Icmp(prober) => prober.probe(server, count).await,
            Prober::Http(prober) => prober.probe(server, count).await,
        }
    }
}

/// Average round-trip time over ICMP echo requests.
#[derive(Debug, Clone)]
pub struct IcmpProber {
    timeout: Duration,
    interval: Duration,
}

impl Default for IcmpProber {
    fn default() -> Self {
        Self { timeout: ECHO_TIMEOUT, interval: ECHO_INTERVAL }
    }
}

impl Probe for IcmpProber {
    async fn probe(
        &self,
        server: &Server,
        count: usize,
    ) -> Result<Duration, SpeedTestError> {
        check_count(count)?;

        let url = probe_url(server)?;
        let ip = resolve_host(&url).await.map_err(|e| {
            SpeedTestError::probe(format!(
                "error resolving {}: {}",
                server.name, e.message
            ))
            .with_source(e)
        })?;

        let config = match ip {
            IpAddr::V4(_) => Config::default(),
            IpAddr::V6(_) => Config::builder().kind(ICMP::V6).build(),
        };

        let client = surge_ping::Client::new(&config).map_err(|e| {
            let error = SpeedTestError::probe(format!(
                "error creating pinger for {}: {}",
                server.name, e
            ));

            let error = if e.kind() == io::ErrorKind::PermissionDenied {
                error.with_suggestion(
                    "ICMP sockets are not permitted here. Run with --no-icmp to measure latency over HTTP.",
                )
            } else {
                error
            };

            error.with_source(e)
        })?;

        let mut pinger =
            client.pinger(ip, PingIdentifier(rand::random())).await;
        pinger.timeout(self.timeout);

        let mut replies = Vec::with_capacity(count);

        for sequence in 0..count {
            if sequence > 0 {
                sleep(self.interval).await;
            }

            match pinger.ping(PingSequence(sequence as u16), &ECHO_PAYLOAD).await
            {
                Ok((_, rtt)) => {
                    debug!("Echo reply from {} ({}) in {:?}", server.name, ip, rtt);
                    replies.push(rtt);
                }
                Err(e) => {
                    debug!("Echo request to {} ({}) lost: {}", server.name, ip, e);
                }
            }
        }

        if replies.is_empty() {
            return Err(SpeedTestError::probe(format!(
                "error probing server {}: all {} echo requests were lost",
                server.name, count
            )));
        }

        Ok(replies.iter().sum::<Duration>() / replies.len() as u32)
    }
}

/// Average round-trip time over sequential HTTP GET requests.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    pub fn new() -> Result<Self, SpeedTestError> {
        Ok(Self { client: http_client(Some(HTTP_PROBE_TIMEOUT))? })
    }
}

impl Probe for HttpProber {
    async fn probe(
        &self,
        server: &Server,
        count: usize,
    ) -> Result<Duration, SpeedTestError> {
        check_count(count)?;

        let url = probe_url(server)?;
        let mut rtt = Duration::ZERO;

        for _ in 0..count {
            let start = Instant::now();

            let response =
                self.client.get(url.clone()).send().await.map_err(|e| {
                    SpeedTestError::probe(format!(
                        "error retrieving response for {}: {}",
                        server.url, e
                    ))
                    .with_source(e)
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(SpeedTestError::probe(format!(
                    "unexpected status code {} for {}",
                    status.as_u16(),
                    server.url
                )));
            }

            response.bytes().await.map_err(|e| {
                SpeedTestError::probe(format!(
                    "error reading response for {}: {}",
                    server.url, e
                ))
                .with_source(e)
            })?;

            rtt += start.elapsed();
        }

        Ok(rtt / count as u32)
    }
}

/// A target whose URL does not parse fails the measurement like any
/// other unreachable server.
fn probe_url(server: &Server) -> Result<Url, SpeedTestError> {
    server.parsed_url().map_err(|e| {
        SpeedTestError::probe(format!(
            "error probing server {}: {}",
            server.name, e.message
        ))
        .with_source(e)
    })
}

fn check_count(count: usize) -> Result<(), SpeedTestError> {
    if count == 0 {
        return Err(SpeedTestError::probe("sample count must be at least 1"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_prober_selection() {
        assert!(matches!(Prober::new(ProbeKind::Icmp).unwrap(), Prober::Icmp(_)));
        assert!(matches!(Prober::new(ProbeKind::Http).unwrap(), Prober::Http(_)));
    }

    #[tokio::test]
    async fn test_http_probe_averages_samples() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/speedtest"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(20)),
            )
            .expect(3)
            .mount(&mock)
            .await;

        let server = Server::new("mock", format!("{}/speedtest", mock.uri()));
        let rtt = HttpProber::new().unwrap().probe(&server, 3).await.unwrap();

        assert!(rtt >= Duration::from_millis(20), "rtt was {:?}", rtt);
        assert!(rtt < HTTP_PROBE_TIMEOUT);
    }

    #[tokio::test]
    async fn test_http_probe_fails_on_status() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&mock)
            .await;

        let server = Server::new("mock", mock.uri());
        let err = HttpProber::new().unwrap().probe(&server, 3).await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::Probe);
        assert!(err.message.contains("unexpected status code 503"));
    }

    #[tokio::test]
    async fn test_http_probe_fails_on_unreachable_server() {
        let server = Server::new("closed", "http://127.0.0.1:9/");
        let err = HttpProber::new().unwrap().probe(&server, 1).await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::Probe);
    }

    #[tokio::test]
    async fn test_probe_rejects_zero_samples() {
        let server = Server::new("any", "http://127.0.0.1:9/");

        assert!(HttpProber::new().unwrap().probe(&server, 0).await.is_err());
        assert!(IcmpProber::default().probe(&server, 0).await.is_err());
    }

    #[tokio::test]
    async fn test_icmp_probe_rejects_bad_url() {
        let server = Server::new("bad", "not a url");
        let err = IcmpProber::default().probe(&server, 1).await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::Probe);
        assert!(err.message.contains("bad"));
    }

    #[tokio::test]
    async fn test_http_probe_rejects_bad_url() {
        let server = Server::new("bad", "not a url");
        let err = HttpProber::new().unwrap().probe(&server, 1).await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::Probe);
        assert_eq!(err.exit_code(), crate::errors::exit_codes::NETWORK_ERROR);
    }
}
