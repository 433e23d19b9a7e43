//! Wire types for the HTTP surface that are not plain engine projections.

use serde::{Deserialize, Serialize};

use crate::engine::VersionInfo;

/// HAL-style link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub href: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub templated: bool,
}

impl Link {
    fn to(href: &str) -> Self {
        Self {
            href: href.to_string(),
            templated: false,
        }
    }

    fn templated(href: &str) -> Self {
        Self {
            href: href.to_string(),
            templated: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Links {
    #[serde(rename = "self")]
    pub self_link: Link,
    pub languages: Link,
    #[serde(rename = "extract-text")]
    pub extract_text: Link,
}

impl Default for Links {
    fn default() -> Self {
        Self {
            self_link: Link::to("/"),
            languages: Link::to("/languages"),
            extract_text: Link::templated("/extract-text{?lang}"),
        }
    }
}

/// Body of `GET /`.
///
/// ```json
/// { "version": "5.3.4", "options": ["leptonica-1.82.0"], "_links": { "self": { "href": "/" } } }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct VersionResponse {
    #[serde(flatten)]
    pub info: VersionInfo,
    #[serde(rename = "_links")]
    pub links: Links,
}

impl From<VersionInfo> for VersionResponse {
    fn from(info: VersionInfo) -> Self {
        Self {
            info,
            links: Links::default(),
        }
    }
}

/// Query string of `POST /extract-text`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractQuery {
    pub lang: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn version_response_is_flat_with_links() {
        let response = VersionResponse::from(VersionInfo {
            version: "5.3.4".into(),
            options: vec!["leptonica-1.82.0".into()],
        });
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({
                "version": "5.3.4",
                "options": ["leptonica-1.82.0"],
                "_links": {
                    "self": { "href": "/" },
                    "languages": { "href": "/languages" },
                    "extract-text": { "href": "/extract-text{?lang}", "templated": true }
                }
            })
        );
    }
}
