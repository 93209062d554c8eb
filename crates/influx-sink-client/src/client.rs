//! Blocking InfluxDB v2 client.

use crate::line_protocol::write_line;
use crate::{SinkError, SinkResult};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use therm_config_and_utils::InfluxConfig;
use tracing::debug;
use url::Url;

/// Bucket lookup response: `{"buckets": [{"name": ...}, ...]}`.
#[derive(Debug, Deserialize)]
struct BucketsResponse {
    buckets: Vec<BucketDescriptor>,
}

#[derive(Debug, Deserialize)]
struct BucketDescriptor {
    name: String,
}

/// Client for one InfluxDB bucket.
///
/// Required identifiers are validated once in [`InfluxClient::new`]; the per-call paths
/// never re-check them.
pub struct InfluxClient {
    client: Client,
    write_url: Url,
    buckets_url: Url,
    bucket: String,
    auth_header: String,
    measurement: String,
    field: String,
}

impl InfluxClient {
    /// Create a client, failing with [`SinkError::Config`] if any identifier is empty.
    pub fn new(config: &InfluxConfig) -> SinkResult<Self> {
        require("host", &config.host)?;
        require("org", &config.org)?;
        require("bucket", &config.bucket)?;
        require("token", &config.token)?;
        require("measurement", &config.measurement)?;
        require("field", &config.field)?;

        let base = base_url(&config.host)?;

        let mut write_url = endpoint(&base, &["api", "v2", "write"])?;
        write_url
            .query_pairs_mut()
            .append_pair("bucket", &config.bucket)
            .append_pair("org", &config.org)
            .append_pair("precision", "s");

        let mut buckets_url = endpoint(&base, &["api", "v2", "buckets"])?;
        buckets_url
            .query_pairs_mut()
            .append_pair("name", &config.bucket);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| SinkError::Config(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            client,
            write_url,
            buckets_url,
            bucket: config.bucket.clone(),
            auth_header: format!("Token {}", config.token),
            measurement: config.measurement.clone(),
            field: config.field.clone(),
        })
    }

    /// Name of the target bucket.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Fully-qualified write endpoint, including query parameters.
    pub fn write_url(&self) -> &Url {
        &self.write_url
    }

    /// Fully-qualified bucket lookup endpoint.
    pub fn buckets_url(&self) -> &Url {
        &self.buckets_url
    }

    /// Append the line for one reading to a batch payload.
    ///
    /// Fails with [`SinkError::InvalidPoint`] for NaN and infinities, leaving `payload`
    /// untouched.
    pub fn append_line(
        &self,
        payload: &mut String,
        name: &str,
        value: f64,
        timestamp: i64,
    ) -> SinkResult<()> {
        if write_line(payload, &self.measurement, &self.field, name, value, timestamp) {
            Ok(())
        } else {
            Err(SinkError::InvalidPoint(format!(
                "{name}={value} at {timestamp} is not a finite number"
            )))
        }
    }

    /// Write a single point.
    pub fn insert_one(&self, name: &str, value: f64, timestamp: i64) -> SinkResult<()> {
        let mut line = String::with_capacity(self.measurement.len() + self.field.len() + 64);
        self.append_line(&mut line, name, value, timestamp)?;
        self.insert_batch(&line)
    }

    /// Write a pre-built line-protocol payload in one request. No retry.
    pub fn insert_batch(&self, payload: &str) -> SinkResult<()> {
        if payload.is_empty() {
            return Ok(());
        }

        debug!(
            url = %self.write_url,
            lines = payload.lines().count(),
            "Writing points"
        );

        let response = self
            .client
            .post(self.write_url.clone())
            .header(AUTHORIZATION, &self.auth_header)
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .header(ACCEPT, "application/json")
            .body(payload.to_owned())
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(SinkError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }

    /// Whether the configured bucket exists and can be written to.
    ///
    /// Any transport failure, non-200 answer or unparseable body counts as "not ready".
    /// A `true` answer does not guarantee the next write succeeds.
    pub fn bucket_ready(&self) -> bool {
        let response = match self
            .client
            .get(self.buckets_url.clone())
            .header(AUTHORIZATION, &self.auth_header)
            .header(ACCEPT, "application/json")
            .send()
        {
            Ok(response) => response,
            Err(e) => {
                debug!(error = %e, "Bucket probe failed");
                return false;
            }
        };

        if response.status() != StatusCode::OK {
            debug!(status = %response.status(), "Bucket probe rejected");
            return false;
        }

        match response.text() {
            Ok(body) => bucket_listed(&body, &self.bucket),
            Err(e) => {
                debug!(error = %e, "Bucket probe body unreadable");
                false
            }
        }
    }
}

/// Whether a bucket lookup body lists `bucket` by name.
pub fn bucket_listed(body: &str, bucket: &str) -> bool {
    match serde_json::from_str::<BucketsResponse>(body) {
        Ok(parsed) => parsed.buckets.iter().any(|b| b.name == bucket),
        Err(e) => {
            debug!(error = %e, "Bucket probe body is not a bucket list");
            false
        }
    }
}

fn require(what: &str, value: &str) -> SinkResult<()> {
    if value.trim().is_empty() {
        return Err(SinkError::Config(format!("{what} is empty")));
    }
    Ok(())
}

/// `host[:port]` gets `http://`; explicit http/https URLs are kept.
fn base_url(host: &str) -> SinkResult<Url> {
    let raw = if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{host}")
    };

    let url = Url::parse(&raw)
        .map_err(|e| SinkError::Config(format!("invalid host {host:?}: {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(SinkError::Config(format!(
            "unsupported scheme {other:?} in host {host:?}"
        ))),
    }
}

fn endpoint(base: &Url, segments: &[&str]) -> SinkResult<Url> {
    let mut url = base.clone();
    url.set_query(None);
    url.path_segments_mut()
        .map_err(|_| SinkError::Config(format!("host {base} cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
