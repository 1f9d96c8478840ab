//! Session cookie handling for the router login

/// Name of the cookie carrying the session key
pub const SESSION_COOKIE: &str = "SESSION";

/// Find the `SESSION=<value>` segment in `Set-Cookie` header values.
///
/// Returns `None` when no header carries the cookie or its value is blank.
pub fn extract_session_token<S: AsRef<str>>(set_cookies: &[S]) -> Option<String> {
    set_cookies
        .iter()
        .flat_map(|header| header.as_ref().split(';'))
        .filter_map(|segment| segment.trim().split_once('='))
        .find(|(name, _)| name.trim() == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_found() {
        let headers = ["SESSION=abc123; path=/; HttpOnly"];
        assert_eq!(extract_session_token(&headers), Some("abc123".to_string()));
    }

    #[test]
    fn test_session_cookie_not_first_segment() {
        let headers = ["lang=en; SESSION=xyz; Secure"];
        assert_eq!(extract_session_token(&headers), Some("xyz".to_string()));
    }

    #[test]
    fn test_session_cookie_in_second_header() {
        let headers = ["theme=dark; path=/", "SESSION=k9; path=/"];
        assert_eq!(extract_session_token(&headers), Some("k9".to_string()));
    }

    #[test]
    fn test_value_keeps_embedded_equals() {
        let headers = ["SESSION=a=b==; path=/"];
        assert_eq!(extract_session_token(&headers), Some("a=b==".to_string()));
    }

    #[test]
    fn test_missing_or_blank_session() {
        let none: [&str; 0] = [];
        assert_eq!(extract_session_token(&none), None);
        assert_eq!(extract_session_token(&["lang=en; path=/"]), None);
        assert_eq!(extract_session_token(&["SESSION=; path=/"]), None);
        assert_eq!(extract_session_token(&["SESSION=   ; path=/"]), None);
        // prefix of another cookie name does not count
        assert_eq!(extract_session_token(&["SESSIONID=abc"]), None);
    }
}
