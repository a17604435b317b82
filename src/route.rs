//! Console locations a row can navigate to.

use crate::error::{GitspaceError, Result};
use crate::gitspace::GitspaceRecord;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    GitspaceDetail { space: String, gitspace_id: String },
    GitspaceEdit { space: String, gitspace_id: String },
}

impl Route {
    /// Console path for this route, relative to the console root.
    pub fn path(&self) -> String {
        match self {
            Route::GitspaceDetail { space, gitspace_id } => {
                format!("/spaces/{}/gitspaces/{}", space, gitspace_id)
            }
            Route::GitspaceEdit { space, gitspace_id } => {
                format!("/spaces/{}/gitspaces/{}/edit", space, gitspace_id)
            }
        }
    }

    pub fn console_url(&self, console_root: &str) -> String {
        format!("{}{}", console_root.trim_end_matches('/'), self.path())
    }

    pub fn gitspace_id(&self) -> &str {
        match self {
            Route::GitspaceDetail { gitspace_id, .. } | Route::GitspaceEdit { gitspace_id, .. } => {
                gitspace_id
            }
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Receives navigation intents produced by row clicks and the edit action.
pub trait Navigator {
    fn navigate(&mut self, route: &Route);
}

/// Resolve a click on the row body.
///
/// Both the space path and the id must be present and non-empty; otherwise
/// there is no valid detail page to go to.
pub fn row_click(record: &GitspaceRecord) -> Result<Route> {
    match (non_empty(&record.space_path), non_empty(&record.id)) {
        (Some(space), Some(id)) => Ok(Route::GitspaceDetail {
            space: space.to_string(),
            gitspace_id: id.to_string(),
        }),
        _ => Err(GitspaceError::InvalidNavigationTarget),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_click_navigates_to_detail() {
        let record = GitspaceRecord::new("gs1").with_space_path("proj/a");
        let route = row_click(&record).unwrap();
        assert_eq!(
            route,
            Route::GitspaceDetail {
                space: "proj/a".to_string(),
                gitspace_id: "gs1".to_string(),
            }
        );
        assert_eq!(route.path(), "/spaces/proj/a/gitspaces/gs1");
    }

    #[test]
    fn test_row_click_without_space_path_fails() {
        let record = GitspaceRecord::new("gs1");
        let err = row_click(&record).unwrap_err();
        assert!(matches!(err, GitspaceError::InvalidNavigationTarget));
        assert_eq!(err.to_string(), "Wrong identifier for gitspace");
    }

    #[test]
    fn test_row_click_with_empty_id_fails() {
        let record = GitspaceRecord::new("").with_space_path("proj/a");
        assert!(row_click(&record).is_err());
    }

    #[test]
    fn test_row_click_with_empty_space_path_fails() {
        let record = GitspaceRecord::new("gs1").with_space_path("");
        assert!(row_click(&record).is_err());
    }

    #[test]
    fn test_edit_path() {
        let route = Route::GitspaceEdit {
            space: "acct/proj".to_string(),
            gitspace_id: "gs1".to_string(),
        };
        assert_eq!(route.path(), "/spaces/acct/proj/gitspaces/gs1/edit");
    }

    #[test]
    fn test_console_url_joins_root() {
        let route = Route::GitspaceDetail {
            space: "acct/proj".to_string(),
            gitspace_id: "gs1".to_string(),
        };
        assert_eq!(
            route.console_url("https://console.example/ng/"),
            "https://console.example/ng/spaces/acct/proj/gitspaces/gs1"
        );
    }
}
