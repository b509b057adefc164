//! Dataset input: a local file or an HTTP download.

use anyhow::{bail, Context, Result};
use futures_util::TryStreamExt;
use reqwest::StatusCode;
use std::fmt;
use std::io::{self, Read};
use std::path::PathBuf;
use tokio::io::AsyncRead;
use tokio_util::io::{StreamReader, SyncIoBridge};
use tracing::debug;
use url::Url;

/// Default user agent for dataset downloads
pub const DEFAULT_USER_AGENT: &str = concat!("fdns/", env!("CARGO_PKG_VERSION"));

/// Where the dataset comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A dataset already on disk
    File(PathBuf),
    /// A dataset streamed over HTTP(S)
    Url(Url),
}

impl Source {
    /// Pick the source from the mutually exclusive `--file` / `--url` flags
    pub fn from_args(file: Option<PathBuf>, url: Option<Url>) -> Result<Self> {
        match (file, url) {
            (Some(path), None) => Ok(Self::File(path)),
            (None, Some(url)) => Ok(Self::Url(url)),
            (Some(_), Some(_)) => bail!("--file and --url can't be used together"),
            (None, None) => bail!("one of --file or --url is required"),
        }
    }

    /// Open the source as a blocking byte stream
    ///
    /// Must be called inside a tokio runtime: HTTP bodies are bridged from
    /// the async client to the blocking reader the parser consumes.
    pub async fn open(&self, user_agent: &str) -> Result<Box<dyn Read + Send>> {
        match self {
            Self::File(path) => {
                let file = std::fs::File::open(path)
                    .with_context(|| format!("could not open file {}", path.display()))?;
                Ok(Box::new(file))
            }
            Self::Url(url) => {
                // the payload is a .gz file, so never let the client inflate it
                let client = reqwest::Client::builder()
                    .user_agent(user_agent)
                    .no_gzip()
                    .build()
                    .context("could not create HTTP client")?;

                debug!(url = %url, "requesting dataset");
                let response = client
                    .get(url.clone())
                    .send()
                    .await
                    .with_context(|| format!("could not request {url}"))?;

                let status = response.status();
                if status != StatusCode::OK {
                    bail!(
                        "got status code {} from {url} but expected {}",
                        status.as_u16(),
                        StatusCode::OK.as_u16()
                    );
                }

                let body = Box::pin(response.bytes_stream().map_err(io::Error::other));
                Ok(Box::new(blocking_reader(StreamReader::new(body))))
            }
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

/// Adapt an async reader to the blocking `Read` the parser consumes
///
/// The returned reader must only be used off the async executor, which is
/// what the parser's dispatch thread does.
pub fn blocking_reader<R>(reader: R) -> impl Read + Send + 'static
where
    R: AsyncRead + Unpin + Send + 'static,
{
    SyncIoBridge::new(reader)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_source() {
        let url: Url = "https://opendata.rapid7.com/sonar.fdns_v2/fdns_a.json.gz"
            .parse()
            .unwrap();

        assert_eq!(
            Source::from_args(Some("a.gz".into()), None).unwrap(),
            Source::File("a.gz".into())
        );
        assert_eq!(
            Source::from_args(None, Some(url.clone())).unwrap(),
            Source::Url(url.clone())
        );
        assert!(Source::from_args(Some("a.gz".into()), Some(url)).is_err());
        assert!(Source::from_args(None, None).is_err());
    }

    #[tokio::test]
    async fn missing_file_fails_to_open() {
        let source = Source::File("/nonexistent/fdns_a.json.gz".into());
        let err = source.open(DEFAULT_USER_AGENT).await.err().unwrap();
        assert!(err.to_string().contains("could not open file"));
    }

    #[test]
    fn user_agent_names_the_tool() {
        assert!(DEFAULT_USER_AGENT.starts_with("fdns/"));
    }
}
