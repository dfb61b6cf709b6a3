//! Route pattern extraction utilities.

use actix_web::HttpRequest;

/// Route label for metrics
///
/// Uses the matched resource pattern when available so that unmatched paths do
/// not create a label per URL.
pub fn extract_route_pattern(req: &HttpRequest) -> String {
    match req.match_pattern() {
        Some(pattern) => pattern,
        None => "/unmatched".to_string(),
    }
}
