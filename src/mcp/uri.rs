//! `post://<id>` resource locators
//!
//! This is the only place resource URIs are built or parsed.

use crate::config::cms::RESOURCE_SCHEME;
use crate::error::McpError;

const SEPARATOR: &str = "://";

/// Build the locator of a post
pub fn encode(id: &str) -> String {
    format!("{}{}{}", RESOURCE_SCHEME, SEPARATOR, id)
}

/// Extract the post id from a locator.
///
/// The id must be non-empty and must not contain another `://`. No
/// percent-decoding is done and query/fragment syntax has no meaning.
pub fn decode(uri: &str) -> Result<&str, McpError> {
    uri.strip_prefix(RESOURCE_SCHEME)
        .and_then(|rest| rest.strip_prefix(SEPARATOR))
        .filter(|id| !id.is_empty() && !id.contains(SEPARATOR))
        .ok_or_else(|| McpError::MalformedLocator {
            uri: uri.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        for id in ["674f1c2e9b1d4a0012345678", "a", "with spaces", "x?y#z"] {
            assert_eq!(decode(&encode(id)).unwrap(), id);
        }
    }

    #[test]
    fn test_encode_format() {
        assert_eq!(encode("abc"), "post://abc");
    }

    #[test]
    fn test_rejects_malformed() {
        for uri in [
            "not-a-uri",
            "post://",
            "post:/abc",
            "posts://abc",
            "file://abc",
            "POST://abc",
            " post://abc",
            "post://a://b",
        ] {
            assert!(
                matches!(decode(uri), Err(McpError::MalformedLocator { .. })),
                "{} should be rejected",
                uri
            );
        }
    }
}
