use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use url::{ParseError, Url};

/// An absolute URL with its fragment and query removed
///
/// Two links that denote the same resource modulo fragment/query normalize to
/// equal values, which is what makes the frontier and discovered set
/// de-duplicate correctly. Ordering and equality use the serialized form.
#[derive(Debug, Clone)]
pub struct NormalizedUrl(Url);

impl NormalizedUrl {
    /// Parses an absolute URL string and strips fragment and query
    ///
    /// # Examples
    ///
    /// ```
    /// use docprint::url::NormalizedUrl;
    ///
    /// let url = NormalizedUrl::parse("https://x.test/docs/a?tab=2#intro").unwrap();
    /// assert_eq!(url.as_str(), "https://x.test/docs/a");
    /// ```
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        Url::parse(input.trim()).map(Self::from_url)
    }

    /// Wraps an already parsed URL, stripping fragment and query
    pub fn from_url(mut url: Url) -> Self {
        url.set_fragment(None);
        url.set_query(None);
        Self(url)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn path(&self) -> &str {
        self.0.path()
    }
}

impl PartialEq for NormalizedUrl {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for NormalizedUrl {}

impl Hash for NormalizedUrl {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl Ord for NormalizedUrl {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for NormalizedUrl {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for NormalizedUrl {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Serialize for NormalizedUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NormalizedUrl {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NormalizedUrl::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Resolves `href` against `base` and normalizes the result
///
/// # Normalization Steps
///
/// 1. Join the href onto the base URL (relative or absolute)
/// 2. Remove the fragment
/// 3. Remove the query string
///
/// A malformed href yields `None`; callers skip it without logging, since
/// broken markup is expected noise on scraped pages.
///
/// # Examples
///
/// ```
/// use docprint::url::normalize;
/// use url::Url;
///
/// let base = Url::parse("https://x.test/docs/").unwrap();
/// let a = normalize("/docs/x?y=1#z", &base).unwrap();
/// let b = normalize("/docs/x", &base).unwrap();
/// assert_eq!(a, b);
/// ```
pub fn normalize(href: &str, base: &Url) -> Option<NormalizedUrl> {
    base.join(href.trim()).ok().map(NormalizedUrl::from_url)
}
