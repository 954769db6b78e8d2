//! Base-URL normalisation and endpoint joining.
//!
//! Settings hold a base URL (used for model listing) and a chat endpoint.
//! Either can be derived from the other, so both directions live here.

/// Path of the chat-completions endpoint relative to the base URL.
pub const CHAT_COMPLETIONS_PATH: &str = "chat/completions";

/// Strip trailing slashes so endpoint paths can be appended safely.
///
/// ```
/// use aireports::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("https://api.example.com/v1/"), "https://api.example.com/v1");
/// assert_eq!(normalize_base_url("https://api.example.com/v1///"), "https://api.example.com/v1");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

/// Join a base URL and an endpoint path with exactly one slash.
///
/// ```
/// use aireports::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("https://api.example.com/v1/", "/models"),
///     "https://api.example.com/v1/models"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{}/{}", normalized_base, endpoint)
}

pub fn chat_completions_url(base_url: &str) -> String {
    construct_api_url(base_url, CHAT_COMPLETIONS_PATH)
}

/// Recover the base URL from a chat endpoint.
///
/// Endpoints that do not end in `/chat/completions` are returned normalised,
/// which matches services that put the chat handler at their root.
///
/// ```
/// use aireports::utils::url::base_url_from_endpoint;
///
/// assert_eq!(
///     base_url_from_endpoint("https://api.example.com/v1/chat/completions"),
///     "https://api.example.com/v1"
/// );
/// ```
pub fn base_url_from_endpoint(endpoint: &str) -> String {
    let normalized = normalize_base_url(endpoint);
    match normalized.strip_suffix(CHAT_COMPLETIONS_PATH) {
        Some(base) => normalize_base_url(base),
        None => normalized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("https://api.example.com/v1"),
            "https://api.example.com/v1"
        );
        assert_eq!(
            normalize_base_url("https://api.example.com/v1///"),
            "https://api.example.com/v1"
        );
        // Pasted values often carry whitespace
        assert_eq!(
            normalize_base_url("  https://api.example.com/ \n"),
            "https://api.example.com"
        );
        assert_eq!(normalize_base_url(""), "");
        assert_eq!(normalize_base_url("///"), "");
    }

    #[test]
    fn test_construct_api_url() {
        assert_eq!(
            construct_api_url("https://api.example.com/v1", "chat/completions"),
            "https://api.example.com/v1/chat/completions"
        );
        assert_eq!(
            construct_api_url("https://api.example.com/v1/", "/chat/completions"),
            "https://api.example.com/v1/chat/completions"
        );
        assert_eq!(
            construct_api_url("https://api.example.com/v1///", "models"),
            "https://api.example.com/v1/models"
        );
    }

    #[test]
    fn chat_url_round_trips_through_base() {
        let endpoint = chat_completions_url("https://api.example.com/v1/");
        assert_eq!(endpoint, "https://api.example.com/v1/chat/completions");
        assert_eq!(
            base_url_from_endpoint(&endpoint),
            "https://api.example.com/v1"
        );
    }

    #[test]
    fn unusual_endpoint_is_its_own_base() {
        assert_eq!(
            base_url_from_endpoint("https://gateway.example.com/llm/"),
            "https://gateway.example.com/llm"
        );
    }
}
