//! Parameter checks shared by every handler and admin operation.

use regex::Regex;
use uuid::Uuid;

use crate::error::OmagError;

/// The user id must be present on every request.
pub fn validate_user_id(user_id: &str) -> Result<(), OmagError> {
    if user_id.trim().is_empty() {
        return Err(OmagError::invalid_parameter("user_id", "a user id is required"));
    }
    Ok(())
}

pub fn validate_server_name(server_name: &str) -> Result<(), OmagError> {
    if server_name.trim().is_empty() {
        return Err(OmagError::invalid_parameter(
            "server_name",
            "a server name is required",
        ));
    }
    if server_name.contains('/') {
        return Err(OmagError::invalid_parameter(
            "server_name",
            format!("server name '{server_name}' must not contain '/'"),
        ));
    }
    Ok(())
}

/// Reject a missing or blank name-like value.
pub fn validate_name(value: &str, parameter: &str) -> Result<(), OmagError> {
    if value.trim().is_empty() {
        return Err(OmagError::invalid_parameter(
            parameter,
            "a non-empty value is required",
        ));
    }
    Ok(())
}

/// Parse a GUID supplied as text.
pub fn validate_guid(guid: &str, parameter: &str) -> Result<Uuid, OmagError> {
    Uuid::parse_str(guid.trim()).map_err(|e| {
        OmagError::invalid_parameter(parameter, format!("'{guid}' is not a valid GUID: {e}"))
    })
}

/// Search strings are regular expressions and must compile.
pub fn validate_search_string(search_string: &str, parameter: &str) -> Result<Regex, OmagError> {
    if search_string.is_empty() {
        return Err(OmagError::invalid_parameter(
            parameter,
            "a search string is required",
        ));
    }
    Regex::new(search_string).map_err(|e| {
        OmagError::invalid_parameter(
            parameter,
            format!("'{search_string}' is not a valid regular expression: {e}"),
        )
    })
}

/// Resolve the effective page size.
///
/// A `page_size` of 0 means "as many as the server allows"; `max_page_size` of 0 means
/// the server sets no limit.
pub fn validate_paging(page_size: usize, max_page_size: usize) -> Result<usize, OmagError> {
    if max_page_size > 0 && page_size > max_page_size {
        return Err(OmagError::invalid_parameter(
            "page_size",
            format!("page size {page_size} exceeds the maximum of {max_page_size}"),
        ));
    }
    if page_size == 0 {
        return Ok(if max_page_size == 0 {
            usize::MAX
        } else {
            max_page_size
        });
    }
    Ok(page_size)
}

/// Unwrap a required request object.
pub fn validate_object<T>(value: Option<T>, parameter: &str) -> Result<T, OmagError> {
    value.ok_or_else(|| OmagError::invalid_parameter(parameter, "a value is required"))
}

/// URL markers are lower-case words joined by hyphens.
pub fn validate_url_marker(url_marker: &str) -> Result<(), OmagError> {
    let valid = !url_marker.is_empty()
        && url_marker
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !valid {
        return Err(OmagError::invalid_parameter(
            "service_url_marker",
            format!("'{url_marker}' is not a valid service URL marker"),
        ));
    }
    Ok(())
}

/// Parse an absolute http(s) URL.
pub fn validate_url(value: &str, parameter: &str) -> Result<url::Url, OmagError> {
    let parsed = url::Url::parse(value).map_err(|e| {
        OmagError::invalid_parameter(parameter, format!("'{value}' is not a valid URL: {e}"))
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(OmagError::invalid_parameter(
            parameter,
            format!("URL scheme '{scheme}' is not allowed (only http/https)"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_and_server_names() {
        assert!(validate_user_id("garygeeke").is_ok());
        assert!(validate_user_id("  ").is_err());
        assert!(validate_server_name("cocoMDS1").is_ok());
        assert!(validate_server_name("").is_err());
        assert!(validate_server_name("a/b").is_err());
    }

    #[test]
    fn test_validate_guid() {
        let guid = Uuid::new_v4();
        assert_eq!(validate_guid(&guid.to_string(), "guid").unwrap(), guid);

        let err = validate_guid("not-a-guid", "database_guid").unwrap_err();
        assert_eq!(err.parameter_name(), Some("database_guid"));
    }

    #[test]
    fn test_validate_search_string() {
        assert!(validate_search_string("Employee.*", "search_string").is_ok());
        assert!(validate_search_string("", "search_string").is_err());
        assert!(validate_search_string("(unclosed", "search_string").is_err());
    }

    #[test]
    fn test_validate_paging() {
        assert_eq!(validate_paging(10, 100).unwrap(), 10);
        assert_eq!(validate_paging(0, 100).unwrap(), 100);
        assert_eq!(validate_paging(0, 0).unwrap(), usize::MAX);
        assert_eq!(validate_paging(5000, 0).unwrap(), 5000);
        assert!(validate_paging(101, 100).is_err());
    }

    #[test]
    fn test_validate_url_marker() {
        assert!(validate_url_marker("data-manager").is_ok());
        assert!(validate_url_marker("Data Manager").is_err());
        assert!(validate_url_marker("").is_err());
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://localhost:9443", "url").is_ok());
        assert!(validate_url("ftp://example.com", "url").is_err());
        assert!(validate_url("nonsense", "url").is_err());
    }
}
