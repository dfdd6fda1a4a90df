use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::error::TargetError;

/// The page to extract from: a live URL or a saved HTML file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageTarget {
    Url(String),
    File(PathBuf),
}

impl PageTarget {
    pub fn parse(input: &str) -> Result<Self, TargetError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(TargetError::Empty);
        }
        if input.starts_with("http://") || input.starts_with("https://") {
            return Ok(PageTarget::Url(input.to_string()));
        }
        let path = Path::new(input.strip_prefix("file://").unwrap_or(input));
        if path.is_file() {
            Ok(PageTarget::File(path.to_path_buf()))
        } else {
            Err(TargetError::Unsupported(input.to_string()))
        }
    }

    /// Reads the page's HTML. `timeout` only applies to URLs.
    pub fn load(&self, timeout: Option<Duration>) -> Result<String, TargetError> {
        match self {
            PageTarget::Url(url) => {
                debug!(%url, "fetching page");
                let client = reqwest::blocking::Client::builder()
                    .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
                    .timeout(timeout)
                    .build()?;
                let response = client.get(url).send()?;
                if !response.status().is_success() {
                    return Err(TargetError::Status(response.status()));
                }
                Ok(response.text()?)
            }
            PageTarget::File(path) => {
                debug!(path = %path.display(), "reading page");
                std::fs::read_to_string(path).map_err(|source| TargetError::Read {
                    path: path.clone(),
                    source,
                })
            }
        }
    }
}

impl fmt::Display for PageTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageTarget::Url(url) => f.write_str(url),
            PageTarget::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_urls_and_existing_files() {
        assert_eq!(
            PageTarget::parse("  https://www.perplexity.ai/search/abc ").unwrap(),
            PageTarget::Url("https://www.perplexity.ai/search/abc".into())
        );

        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();
        assert_eq!(
            PageTarget::parse(path.to_str().unwrap()).unwrap(),
            PageTarget::File(path.clone())
        );
        let url = format!("file://{}", path.display());
        assert_eq!(PageTarget::parse(&url).unwrap(), PageTarget::File(path));
    }

    #[test]
    fn rejects_empty_and_unknown_input() {
        assert!(matches!(PageTarget::parse("   "), Err(TargetError::Empty)));
        assert!(matches!(
            PageTarget::parse("/definitely/not/here.html"),
            Err(TargetError::Unsupported(_))
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let target = PageTarget::File(PathBuf::from("/definitely/not/here.html"));
        assert!(matches!(target.load(None), Err(TargetError::Read { .. })));
    }
}
