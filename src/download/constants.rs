//! Constants for the download module (referer, timeouts, retry budget).

/// Referer header sent with every artifact request. The image host rejects
/// requests that do not carry it.
pub const DEFAULT_REFERER: &str = "https://www.pixiv.net/";

/// Default per-attempt timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of fetch attempts per job before it is abandoned.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Name of the staging directory kept inside a batch's target directory.
pub const STAGING_DIR_NAME: &str = "temp";
