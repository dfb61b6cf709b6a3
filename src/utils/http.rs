//! HTTP utility functions for extracting request information.

use actix_web::HttpRequest;

/// Header carrying the caller's API key
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Extract client IP address from request headers
///
/// Attempts to extract the real client IP from common proxy headers,
/// falling back to the connection remote address.
pub fn extract_client_ip(req: &HttpRequest) -> String {
    let ip_headers = ["X-Forwarded-For", "X-Real-IP", "CF-Connecting-IP"];

    for header_name in &ip_headers {
        if let Some(header_str) = req.headers().get(*header_name).and_then(|h| h.to_str().ok()) {
            // X-Forwarded-For can contain multiple IPs, take the first one
            let ip = header_str.split(',').next().unwrap_or(header_str).trim();
            if !ip.is_empty() {
                return ip.to_string();
            }
        }
    }

    req.connection_info()
        .peer_addr()
        .unwrap_or("unknown")
        .to_string()
}

/// Extract user agent from request headers
pub fn extract_user_agent(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("User-Agent")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
}

/// Extract a non-blank API key from the request headers
pub fn extract_api_key(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
}

/// Mask a credential for logging, keeping at most its first four characters
pub fn mask_credential(credential: &str) -> String {
    let prefix: String = credential.chars().take(4).collect();
    format!("{prefix}***")
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_extract_client_ip_prefers_forwarded_header() {
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", "203.0.113.7, 10.0.0.1"))
            .to_http_request();
        assert_eq!(extract_client_ip(&req), "203.0.113.7");
    }

    #[test]
    fn test_extract_api_key() {
        let req = TestRequest::default()
            .insert_header((API_KEY_HEADER, "  API_KEY_1 "))
            .to_http_request();
        assert_eq!(extract_api_key(&req).as_deref(), Some("API_KEY_1"));

        let blank = TestRequest::default()
            .insert_header((API_KEY_HEADER, "   "))
            .to_http_request();
        assert_eq!(extract_api_key(&blank), None);

        assert_eq!(extract_api_key(&TestRequest::default().to_http_request()), None);
    }

    #[test]
    fn test_mask_credential() {
        assert_eq!(mask_credential("API_KEY_1"), "API_***");
        assert_eq!(mask_credential("ab"), "ab***");
    }
}
