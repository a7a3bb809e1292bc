use url::Url;

use crate::error::StartvalResult;

/// Append `path` to `base_url`, keeping any path prefix the base already has.
pub fn join_url(base_url: &str, path: &str) -> StartvalResult<Url> {
    let base = if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{base_url}/")
    };

    Ok(Url::parse(&base)?.join(path.trim_start_matches('/'))?)
}
