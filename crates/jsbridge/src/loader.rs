// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Script fetching for `load_script`.
//
// Locations are local paths, `file://` URLs, or `http(s)://` URLs. Every
// failure is reported as `BridgeError::Transport`, never swallowed.

use std::path::PathBuf;
use std::time::Duration;

use jsbridge_core::BridgeConfig;
use jsbridge_core::error::{BridgeError, Result};
use reqwest::Url;
use tracing::{debug, instrument};

/// Where a script is loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptLocation {
    File(PathBuf),
    Remote(Url),
}

impl ScriptLocation {
    /// Parse a location string. Anything that is not a URL with a scheme of
    /// two or more characters is treated as a filesystem path, so Windows
    /// drive letters (`C:\...`) stay paths.
    pub fn parse(location: &str) -> Result<Self> {
        let url = match Url::parse(location) {
            Ok(url) if url.scheme().len() > 1 => url,
            _ => return Ok(Self::File(PathBuf::from(location))),
        };
        match url.scheme() {
            "http" | "https" => Ok(Self::Remote(url)),
            "file" => url
                .to_file_path()
                .map(Self::File)
                .map_err(|()| transport(location, "file URL does not name a local path")),
            other => Err(transport(location, format!("unsupported scheme {other:?}"))),
        }
    }
}

impl std::fmt::Display for ScriptLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Remote(url) => write!(f, "{url}"),
        }
    }
}

fn transport(location: impl ToString, reason: impl ToString) -> BridgeError {
    BridgeError::Transport {
        location: location.to_string(),
        reason: reason.to_string(),
    }
}

/// Fetches script source text, bounded in time and size.
pub struct ScriptLoader {
    client: reqwest::Client,
    timeout: Duration,
    max_bytes: usize,
}

impl ScriptLoader {
    pub fn new(config: &BridgeConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout())
            .build()
            .map_err(|e| BridgeError::Config(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            client,
            timeout: config.fetch_timeout(),
            max_bytes: config.max_script_bytes,
        })
    }

    /// Fetch the source at `location`.
    #[instrument(skip_all, fields(location = %location))]
    pub async fn fetch(&self, location: &ScriptLocation) -> Result<String> {
        let source = match tokio::time::timeout(self.timeout, self.fetch_inner(location)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(transport(
                    location,
                    format!("timed out after {}s", self.timeout.as_secs()),
                ));
            }
        };
        debug!(bytes = source.len(), "script fetched");
        Ok(source)
    }

    async fn fetch_inner(&self, location: &ScriptLocation) -> Result<String> {
        match location {
            ScriptLocation::File(path) => {
                let metadata = tokio::fs::metadata(path)
                    .await
                    .map_err(|e| transport(location, e))?;
                self.check_size(location, metadata.len())?;
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| transport(location, e))
            }
            ScriptLocation::Remote(url) => {
                let mut response = self
                    .client
                    .get(url.clone())
                    .send()
                    .await
                    .map_err(|e| transport(location, format!("request failed: {e}")))?;
                let status = response.status();
                if !status.is_success() {
                    return Err(transport(location, format!("HTTP {status}")));
                }
                if let Some(length) = response.content_length() {
                    self.check_size(location, length)?;
                }
                // Chunked bodies carry no length up front; stop reading as
                // soon as the limit is passed.
                let mut body = Vec::new();
                while let Some(chunk) = response
                    .chunk()
                    .await
                    .map_err(|e| transport(location, format!("failed to read body: {e}")))?
                {
                    self.check_size(location, (body.len() + chunk.len()) as u64)?;
                    body.extend_from_slice(&chunk);
                }
                String::from_utf8(body)
                    .map_err(|e| transport(location, format!("body is not UTF-8: {e}")))
            }
        }
    }

    fn check_size(&self, location: &ScriptLocation, bytes: u64) -> Result<()> {
        if bytes > self.max_bytes as u64 {
            return Err(transport(
                location,
                format!("script is {bytes} bytes, limit is {}", self.max_bytes),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn loader() -> ScriptLoader {
        ScriptLoader::new(&BridgeConfig::default()).unwrap()
    }

    #[test]
    fn parses_locations() {
        assert_eq!(
            ScriptLocation::parse("scripts/app.js").unwrap(),
            ScriptLocation::File(PathBuf::from("scripts/app.js"))
        );
        assert!(matches!(
            ScriptLocation::parse("https://cdn.example.com/lib.js").unwrap(),
            ScriptLocation::Remote(_)
        ));
        assert!(matches!(
            ScriptLocation::parse("C:\\scripts\\app.js").unwrap(),
            ScriptLocation::File(_)
        ));
        assert!(matches!(
            ScriptLocation::parse("ftp://example.com/lib.js"),
            Err(BridgeError::Transport { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn file_urls_become_paths() {
        assert_eq!(
            ScriptLocation::parse("file:///tmp/app.js").unwrap(),
            ScriptLocation::File(PathBuf::from("/tmp/app.js"))
        );
    }

    #[tokio::test]
    async fn reads_local_files() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("lib.js");
        std::fs::write(&script, "function twice(x) { return 2 * x; }").unwrap();

        let source = loader().fetch(&ScriptLocation::File(script)).await.unwrap();
        assert!(source.contains("twice"));
    }

    #[tokio::test]
    async fn missing_file_is_a_transport_error() {
        let dir = tempfile::tempdir().unwrap();
        let location = ScriptLocation::File(dir.path().join("absent.js"));
        assert!(matches!(
            loader().fetch(&location).await,
            Err(BridgeError::Transport { .. })
        ));
    }

    #[tokio::test]
    async fn oversized_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("big.js");
        std::fs::write(&script, "x".repeat(64)).unwrap();

        match small_loader().fetch(&ScriptLocation::File(script)).await {
            Err(BridgeError::Transport { reason, .. }) => assert!(reason.contains("limit")),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetches_remote_scripts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/lib.js"))
            .respond_with(ResponseTemplate::new(200).set_body_string("var remote = true;"))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/lib.js", server.uri())).unwrap();
        let source = loader().fetch(&ScriptLocation::Remote(url)).await.unwrap();
        assert_eq!(source, "var remote = true;");
    }

    fn small_loader() -> ScriptLoader {
        ScriptLoader::new(&BridgeConfig {
            max_script_bytes: 16,
            ..Default::default()
        })
        .unwrap()
    }

    /// Serve `body` once over a chunked response with no Content-Length.
    async fn serve_chunked(body: String) -> Url {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            let mut response = String::from(
                "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n",
            );
            for chunk in body.as_bytes().chunks(8) {
                let text = std::str::from_utf8(chunk).unwrap();
                response.push_str(&format!("{:x}\r\n{text}\r\n", chunk.len()));
            }
            response.push_str("0\r\n\r\n");
            let _ = socket.write_all(response.as_bytes()).await;
        });
        Url::parse(&format!("http://{addr}/big.js")).unwrap()
    }

    #[tokio::test]
    async fn oversized_remote_script_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/big.js"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(64)))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/big.js", server.uri())).unwrap();
        match small_loader().fetch(&ScriptLocation::Remote(url)).await {
            Err(BridgeError::Transport { reason, .. }) => assert!(reason.contains("limit")),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[tokio::test]
    async fn oversized_chunked_script_is_rejected() {
        let url = serve_chunked("x".repeat(64)).await;
        match small_loader().fetch(&ScriptLocation::Remote(url)).await {
            Err(BridgeError::Transport { reason, .. }) => assert!(reason.contains("limit")),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[tokio::test]
    async fn chunked_script_within_limit_is_read() {
        let url = serve_chunked("var ok = 1;".to_owned()).await;
        let source = small_loader().fetch(&ScriptLocation::Remote(url)).await.unwrap();
        assert_eq!(source, "var ok = 1;");
    }

    #[tokio::test]
    async fn http_errors_are_transport_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.js"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/missing.js", server.uri())).unwrap();
        match loader().fetch(&ScriptLocation::Remote(url)).await {
            Err(BridgeError::Transport { reason, .. }) => assert!(reason.contains("404")),
            other => panic!("unexpected result {other:?}"),
        }
    }
}
