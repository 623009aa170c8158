use axum::http::HeaderMap;

use crate::tree::PermissionSet;

/// Permissions granted to the caller, read from the header the upstream auth
/// layer sets. A missing header grants nothing, so only unguarded nodes show.
pub fn grants_from_headers(headers: &HeaderMap, header_name: &str) -> PermissionSet {
    PermissionSet::new(
        headers
            .get_all(header_name)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(','))
            .map(str::trim)
            .filter(|name| !name.is_empty()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::PermissionGate;
    use axum::http::HeaderValue;

    #[test]
    fn reads_comma_separated_and_repeated_headers() {
        let mut headers = HeaderMap::new();
        headers.append("x-user-permissions", HeaderValue::from_static("users.view, roles.view"));
        headers.append("x-user-permissions", HeaderValue::from_static("backup.view"));
        let grants = grants_from_headers(&headers, "x-user-permissions");
        assert_eq!(grants.len(), 3);
        assert!(grants.has_permission(Some("backup.view")));
        assert!(!grants.has_permission(Some("menus.edit")));
    }

    #[test]
    fn missing_header_grants_only_public_nodes() {
        let grants = grants_from_headers(&HeaderMap::new(), "x-user-permissions");
        assert!(grants.is_empty());
        assert!(grants.has_permission(None));
        assert!(!grants.has_permission(Some("users.view")));
    }
}
