//! Route paths and the artifact path matcher.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::ArtifactId;

/// Landing page
pub const ROOT_PATH: &str = "/";

/// Browser form submission
pub const UPLOAD_PATH: &str = "/upload";

/// Raw body submission for scripts
pub const RAW_PATH: &str = "/raw";

/// Prefix of artifact retrieval paths
pub const VIEW_PATH: &str = "/view/";

/// Form field carrying the graph description
pub const GRAPH_FORM_FIELD: &str = "graph";

fn view_path_regex() -> &'static Regex {
    static VIEW_PATH_RE: OnceLock<Regex> = OnceLock::new();
    VIEW_PATH_RE.get_or_init(|| {
        Regex::new(r"^/view/([0-9a-f]{32})$").expect("view path pattern is valid")
    })
}

/// Extract the identifier from a retrieval path
///
/// Accepts exactly one segment of 32 lowercase hex characters after
/// `/view/`; anything else is `None`.
pub fn parse_view_path(path: &str) -> Option<ArtifactId> {
    let captures = view_path_regex().captures(path)?;
    ArtifactId::parse(captures.get(1)?.as_str()).ok()
}

/// Build the retrieval path for an identifier
pub fn view_path(id: &ArtifactId) -> String {
    format!("{}{}", VIEW_PATH, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_valid_path() {
        let id = parse_view_path("/view/5b9d37f5337909968412a123cfc00973").unwrap();
        assert_eq!(id.as_str(), "5b9d37f5337909968412a123cfc00973");
    }

    #[test]
    fn test_rejects_invalid_paths() {
        for path in [
            "/view/",
            "/view/abc/def",
            "/view/../etc",
            "/view/5b9d37f5337909968412a123cfc00973/",
            "/view/5b9d37f5337909968412a123cfc0097",
            "/view/5b9d37f5337909968412a123cfc009733",
            "/view/5B9D37F5337909968412A123CFC00973",
            "/view//5b9d37f5337909968412a123cfc00973",
            "/other/5b9d37f5337909968412a123cfc00973",
            "view/5b9d37f5337909968412a123cfc00973",
        ] {
            assert!(parse_view_path(path).is_none(), "accepted {}", path);
        }
    }

    #[test]
    fn test_view_path_round_trip() {
        let id = ArtifactId::parse("00000000000000000000000000000001").unwrap();
        let path = view_path(&id);
        assert_eq!(path, "/view/00000000000000000000000000000001");
        assert_eq!(parse_view_path(&path), Some(id));
    }
}
