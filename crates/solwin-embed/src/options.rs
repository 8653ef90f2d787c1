//! Embedding configuration and load-URL construction.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// Frame height used when none is configured.
pub const DEFAULT_HEIGHT: &str = "600px";

/// Frame width used when none is configured.
pub const DEFAULT_WIDTH: &str = "100%";

/// Options accepted by [`embed`](crate::embed).
///
/// Every optional field treats an empty string as absent.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmbedOptions {
    /// Id of the element the frame is appended to. Required.
    pub container_id: String,
    /// Maps API key forwarded to the engine as `apiKey`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// CSS height of the frame.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    /// CSS width of the frame.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    /// Address the engine starts at, forwarded as `location`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_location: Option<String>,
}

impl std::fmt::Debug for EmbedOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbedOptions")
            .field("container_id", &self.container_id)
            .field("api_key", &self.api_key().map(|_| "***"))
            .field("height", &self.height())
            .field("width", &self.width())
            .field("default_location", &self.default_location())
            .finish()
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty())
}

impl EmbedOptions {
    /// Options mounting into `container_id` with every default.
    #[must_use]
    pub fn new(container_id: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
            ..Self::default()
        }
    }

    /// Set the maps API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the frame height.
    #[must_use]
    pub fn with_height(mut self, height: impl Into<String>) -> Self {
        self.height = Some(height.into());
        self
    }

    /// Set the frame width.
    #[must_use]
    pub fn with_width(mut self, width: impl Into<String>) -> Self {
        self.width = Some(width.into());
        self
    }

    /// Set the starting address.
    #[must_use]
    pub fn with_default_location(mut self, location: impl Into<String>) -> Self {
        self.default_location = Some(location.into());
        self
    }

    /// Fill fields that are unset here from `defaults`.
    ///
    /// The container id is never taken from `defaults` unless this one is
    /// empty.
    #[must_use]
    pub fn or(mut self, defaults: &Self) -> Self {
        if self.container_id.is_empty() {
            self.container_id.clone_from(&defaults.container_id);
        }
        if self.api_key().is_none() {
            self.api_key.clone_from(&defaults.api_key);
        }
        if self.height().is_none() {
            self.height.clone_from(&defaults.height);
        }
        if self.width().is_none() {
            self.width.clone_from(&defaults.width);
        }
        if self.default_location().is_none() {
            self.default_location.clone_from(&defaults.default_location);
        }
        self
    }

    /// The container id, if non-empty.
    #[must_use]
    pub fn container_id(&self) -> Option<&str> {
        Some(self.container_id.as_str()).filter(|c| !c.is_empty())
    }

    /// The API key, if non-empty.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        non_empty(self.api_key.as_ref())
    }

    /// The starting address, if non-empty.
    #[must_use]
    pub fn default_location(&self) -> Option<&str> {
        non_empty(self.default_location.as_ref())
    }

    /// The configured height, if non-empty.
    #[must_use]
    pub fn height(&self) -> Option<&str> {
        non_empty(self.height.as_ref())
    }

    /// The configured width, if non-empty.
    #[must_use]
    pub fn width(&self) -> Option<&str> {
        non_empty(self.width.as_ref())
    }

    /// Height to apply, falling back to [`DEFAULT_HEIGHT`].
    #[must_use]
    pub fn effective_height(&self) -> &str {
        self.height().unwrap_or(DEFAULT_HEIGHT)
    }

    /// Width to apply, falling back to [`DEFAULT_WIDTH`].
    #[must_use]
    pub fn effective_width(&self) -> &str {
        self.width().unwrap_or(DEFAULT_WIDTH)
    }
}

/// Build the frame load URL: `origin`, then `?` and the query when any
/// parameter is present.
///
/// Parameters appear in the order `apiKey`, `location`. Spaces are encoded
/// as `%20`.
///
/// ```rust
/// use solwin_embed::{EmbedOptions, build_embed_url};
///
/// let options = EmbedOptions::new("c").with_default_location("303 S Technology Ct");
/// assert_eq!(
///     build_embed_url("https://host.example", &options),
///     "https://host.example?location=303%20S%20Technology%20Ct",
/// );
/// ```
#[must_use]
pub fn build_embed_url(origin: &str, options: &EmbedOptions) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    let mut has_params = false;

    if let Some(api_key) = options.api_key() {
        query.append_pair("apiKey", api_key);
        has_params = true;
    }
    if let Some(location) = options.default_location() {
        query.append_pair("location", location);
        has_params = true;
    }

    if !has_params {
        return origin.to_string();
    }

    // form encoding writes spaces as '+'; a literal '+' is already %2B.
    let query = query.finish().replace('+', "%20");
    format!("{origin}?{query}")
}
