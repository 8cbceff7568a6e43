//! Where to send a user once they have logged in.
//!
//! Only same-site paths are accepted so that the log-in page cannot be used
//! as an open redirect.

use axum::{extract::Request, http::Uri};

use crate::endpoints;

/// Keep the path and query of `raw_url` if it is a local page other than the
/// log-in page.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;

    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }

    local_path_and_query(&uri)
}

fn local_path_and_query(uri: &Uri) -> Option<String> {
    let path_and_query = uri.path_and_query()?.as_str();

    let is_local = path_and_query.starts_with('/') && !path_and_query.starts_with("//");
    let is_log_in_page = uri.path() == endpoints::LOG_IN_VIEW;

    (is_local && !is_log_in_page).then(|| path_and_query.to_owned())
}

/// The log-in page URL that returns the user to `redirect_target` afterwards.
pub fn log_in_url_with_redirect(redirect_target: &str) -> String {
    match serde_urlencoded::to_string([("redirect_url", redirect_target)]) {
        Ok(query) => format!("{}?{}", endpoints::LOG_IN_VIEW, query),
        Err(error) => {
            tracing::error!("Could not encode redirect URL {redirect_target}: {error}");
            endpoints::LOG_IN_VIEW.to_owned()
        }
    }
}

/// The log-in page URL for an unauthenticated `request`.
///
/// HTMX requests to the API come back to the page they were sent from, read
/// from the `HX-Current-URL` header. Page requests come back to themselves.
/// Anything else falls back to the dashboard.
pub fn build_log_in_redirect_url(request: &Request) -> String {
    let target = if request.uri().path().starts_with("/api") {
        redirect_target_from_hx_request(request)
    } else {
        local_path_and_query(request.uri())
    };

    let target = target.unwrap_or_else(|| {
        tracing::warn!(
            "No usable redirect target for {}. Falling back to dashboard.",
            request.uri().path()
        );
        endpoints::DASHBOARD_VIEW.to_owned()
    });

    log_in_url_with_redirect(&target)
}

fn redirect_target_from_hx_request(request: &Request) -> Option<String> {
    let headers = request.headers();
    let is_hx_request = headers
        .get("hx-request")
        .and_then(|header| header.to_str().ok())
        .is_some_and(|header| header.eq_ignore_ascii_case("true"));

    if !is_hx_request {
        return None;
    }

    let current_url = headers
        .get("hx-current-url")
        .and_then(|header| header.to_str().ok())?;

    // HX-Current-URL is absolute, so only its path and query are kept.
    current_url
        .parse::<Uri>()
        .ok()
        .and_then(|uri| local_path_and_query(&uri))
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, extract::Request};

    use crate::endpoints;

    use super::{build_log_in_redirect_url, log_in_url_with_redirect, normalize_redirect_url};

    #[test]
    fn accepts_local_paths() {
        assert_eq!(
            normalize_redirect_url("/transactions?month=2024-02-01"),
            Some("/transactions?month=2024-02-01".to_owned())
        );
    }

    #[test]
    fn rejects_external_and_log_in_urls() {
        for raw_url in [
            "https://example.com",
            "//example.com/goals",
            "goals",
            "/log_in?redirect_url=%2Fgoals",
        ] {
            assert_eq!(normalize_redirect_url(raw_url), None, "{raw_url}");
        }
    }

    #[test]
    fn page_request_redirects_back_to_itself() {
        let request = Request::get("/goals/3").body(Body::empty()).unwrap();

        assert_eq!(
            build_log_in_redirect_url(&request),
            log_in_url_with_redirect("/goals/3")
        );
    }

    #[test]
    fn api_request_uses_current_url() {
        let request = Request::post("/api/goals")
            .header("HX-Request", "true")
            .header("HX-Current-URL", "http://localhost:3000/goals/new")
            .body(Body::empty())
            .unwrap();

        assert_eq!(
            build_log_in_redirect_url(&request),
            log_in_url_with_redirect("/goals/new")
        );
    }

    #[test]
    fn api_request_without_htmx_falls_back_to_dashboard() {
        let request = Request::post("/api/goals").body(Body::empty()).unwrap();

        assert_eq!(
            build_log_in_redirect_url(&request),
            log_in_url_with_redirect(endpoints::DASHBOARD_VIEW)
        );
    }
}
