//! Shared constants used across the application.

/// User agent string sent with every Piazza RPC request.
pub const CLIENT_USER_AGENT: &str = "piazza-conversation-extractor/0.1";

/// Site root used for RPC calls and for resolving relative image references.
pub const DEFAULT_PIAZZA_BASE_URL: &str = "https://piazza.com";

/// Host that serves uploaded images once the redirect is unwrapped.
pub const DEFAULT_CDN_HOST: &str = "https://cdn-uploads.piazza.com";

/// Query parameter on redirect links that holds the uploaded object key.
pub const CDN_PREFIX_PARAM: &str = "prefix";
