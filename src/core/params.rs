//! Callback Parameter Codec
//!
//! Detect, extract and strip authorization-flow query parameters.

use url::form_urlencoded;
use url::Url;

use crate::error::{AuthError, ValidationError};
use crate::types::AuthParams;

/// Query keys removed by [`clean_auth_params`].
pub const AUTH_QUERY_KEYS: [&str; 4] = ["code", "state", "error", "error_description"];

/// Parse a URL string, mapping failures to a validation error.
pub fn parse_url(url: &str) -> Result<Url, AuthError> {
    Url::parse(url).map_err(|e| {
        AuthError::Validation(ValidationError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })
    })
}

fn query_value(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// True iff both `code` and `state` keys are present. Empty values count.
pub fn has_auth_params(url: &Url) -> bool {
    extract_auth_params(url).is_some()
}

/// Extract the `code`/`state` pair. Never partially populated.
pub fn extract_auth_params(url: &Url) -> Option<AuthParams> {
    let code = query_value(url, "code")?;
    let state = query_value(url, "state")?;
    Some(AuthParams { code, state })
}

/// Remove authorization-flow keys, keeping every other segment in order.
///
/// Surviving segments are kept byte-for-byte, so encoding is not normalized.
pub fn clean_auth_params(url: &Url) -> Url {
    let mut cleaned = url.clone();

    let Some(query) = url.query() else {
        return cleaned;
    };

    let kept: Vec<&str> = query
        .split('&')
        .filter(|segment| !segment.is_empty())
        .filter(|segment| {
            let key = form_urlencoded::parse(segment.as_bytes())
                .next()
                .map(|(k, _)| k.into_owned())
                .unwrap_or_default();
            !AUTH_QUERY_KEYS.contains(&key.as_str())
        })
        .collect();

    if kept.is_empty() {
        cleaned.set_query(None);
    } else {
        cleaned.set_query(Some(&kept.join("&")));
    }

    cleaned
}

/// String form of [`has_auth_params`]. Unparseable URLs have no params.
pub fn has_auth_params_str(url: &str) -> bool {
    Url::parse(url).map(|u| has_auth_params(&u)).unwrap_or(false)
}

/// String form of [`extract_auth_params`].
pub fn extract_auth_params_str(url: &str) -> Result<Option<AuthParams>, AuthError> {
    Ok(extract_auth_params(&parse_url(url)?))
}

/// String form of [`clean_auth_params`].
pub fn clean_auth_params_str(url: &str) -> Result<String, AuthError> {
    Ok(clean_auth_params(&parse_url(url)?).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_has_auth_params() {
        assert!(has_auth_params(&url("https://app.test/cb?code=abc&state=xyz")));
        assert!(has_auth_params(&url("https://app.test/cb?state=xyz&x=1&code=abc")));
        assert!(!has_auth_params(&url("https://app.test/cb?code=abc")));
        assert!(!has_auth_params(&url("https://app.test/cb?state=xyz")));
        assert!(!has_auth_params(&url("https://app.test/cb")));
    }

    #[test]
    fn test_empty_values_count_as_present() {
        assert!(has_auth_params(&url("https://app.test/cb?code=&state=")));
        assert!(has_auth_params(&url("https://app.test/cb?code&state")));

        let params = extract_auth_params(&url("https://app.test/cb?code=&state=s")).unwrap();
        assert_eq!(params.code, "");
        assert_eq!(params.state, "s");
    }

    #[test]
    fn test_extract_decodes_values() {
        let params =
            extract_auth_params(&url("https://app.test/cb?code=a%2Bb&state=c+d")).unwrap();
        assert_eq!(params.code, "a+b");
        assert_eq!(params.state, "c d");
    }

    #[test]
    fn test_extract_absent_iff_has_is_false() {
        for s in [
            "https://app.test/cb?code=1",
            "https://app.test/cb?state=1",
            "https://app.test/cb?codes=1&states=2",
            "https://app.test/cb?code=1&state=2",
            "https://app.test/cb?code=&state=",
        ] {
            let u = url(s);
            assert_eq!(extract_auth_params(&u).is_some(), has_auth_params(&u), "{}", s);
        }
    }

    #[test]
    fn test_clean_preserves_other_segments() {
        let cleaned = clean_auth_params(&url(
            "https://app.test/courses/7?tab=ratings&code=abc&page=2&state=xyz&error=x&error_description=y#top",
        ));
        assert_eq!(
            cleaned.as_str(),
            "https://app.test/courses/7?tab=ratings&page=2#top"
        );
    }

    #[test]
    fn test_clean_drops_empty_query() {
        let cleaned = clean_auth_params(&url("https://app.test/cb?code=abc&state=xyz"));
        assert_eq!(cleaned.as_str(), "https://app.test/cb");
        assert_eq!(cleaned.query(), None);
    }

    #[test]
    fn test_clean_keeps_raw_encoding() {
        let cleaned = clean_auth_params(&url("https://app.test/?q=a%20b&code=1"));
        assert_eq!(cleaned.query(), Some("q=a%20b"));
    }

    #[test]
    fn test_clean_is_idempotent() {
        for s in [
            "https://app.test/cb?code=abc&state=xyz",
            "https://app.test/cb?keep=1&code=abc&also=2#frag",
            "https://app.test/cb?error=denied&&x=1",
            "https://app.test/cb",
        ] {
            let once = clean_auth_params(&url(s));
            let twice = clean_auth_params(&once);
            assert_eq!(once, twice, "{}", s);
        }
    }

    #[test]
    fn test_string_forms() {
        assert!(has_auth_params_str("https://app.test/?code=1&state=2"));
        assert!(!has_auth_params_str("not a url"));
        assert!(extract_auth_params_str("not a url").is_err());
        assert_eq!(
            clean_auth_params_str("https://app.test/?a=1&state=2").unwrap(),
            "https://app.test/?a=1"
        );
    }
}
