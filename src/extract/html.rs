use scraper::{Html, Selector};
use url::Url;

use crate::constants::{CDN_PREFIX_PARAM, DEFAULT_CDN_HOST, DEFAULT_PIAZZA_BASE_URL};
use crate::extract::ExtractError;

/// Visible text and image references pulled out of a rich-text body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedContent {
    /// All text nodes concatenated, entities decoded, boundaries trimmed.
    pub text: String,
    /// Absolute image URLs in document order.
    pub images: Vec<String>,
}

/// Resolves `<img src>` values to absolute URLs.
///
/// Piazza serves uploads through a redirect endpoint that carries the object
/// key in a `prefix` query parameter. Those links are rewritten to point at
/// the CDN directly so downstream consumers can fetch the image without a
/// session.
#[derive(Debug, Clone)]
pub struct ImageResolver {
    site_base: Url,
    cdn_host: String,
}

impl ImageResolver {
    /// Create a resolver for the given site root and CDN host.
    ///
    /// # Errors
    ///
    /// Returns an error if `site_base` is not an absolute URL.
    pub fn new(site_base: &str, cdn_host: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            site_base: Url::parse(site_base)?,
            cdn_host: cdn_host.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve a single `src` attribute value.
    ///
    /// Only links on the site's own host are treated as CDN redirects; other
    /// hosts pass through even if they carry a `prefix` parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::MalformedReference`] if the reference is empty
    /// or cannot be parsed as a URL.
    pub fn resolve(&self, src: &str) -> Result<String, ExtractError> {
        let src = src.trim();
        if src.is_empty() {
            return Err(ExtractError::MalformedReference {
                reference: src.to_string(),
            });
        }

        let absolute = Url::parse(src).is_ok();
        let url = self
            .site_base
            .join(src)
            .map_err(|_| ExtractError::MalformedReference {
                reference: src.to_string(),
            })?;

        let on_site = url.host_str() == self.site_base.host_str();
        let prefix = url
            .query_pairs()
            .find(|(key, _)| on_site && key == CDN_PREFIX_PARAM)
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty());

        Ok(match prefix {
            Some(prefix) => format!("{}/{}", self.cdn_host, prefix.trim_start_matches('/')),
            None if absolute => src.to_string(),
            None => url.to_string(),
        })
    }
}

impl Default for ImageResolver {
    fn default() -> Self {
        Self::new(DEFAULT_PIAZZA_BASE_URL, DEFAULT_CDN_HOST).expect("Invalid default base URL")
    }
}

/// Strip markup from `html` and collect its image references.
///
/// # Errors
///
/// Returns [`ExtractError::MalformedReference`] if any `<img>` has a missing
/// or unusable `src`.
pub fn normalize_html(
    html: &str,
    resolver: &ImageResolver,
) -> Result<NormalizedContent, ExtractError> {
    let fragment = Html::parse_fragment(html);
    let img_selector = Selector::parse("img").expect("Invalid selector");

    let text = fragment
        .root_element()
        .text()
        .collect::<String>()
        .trim()
        .to_string();

    let images = fragment
        .select(&img_selector)
        .map(|img| match img.value().attr("src") {
            Some(src) => resolver.resolve(src),
            None => Err(ExtractError::MalformedReference {
                reference: img.html(),
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(NormalizedContent { text, images })
}
