//! Offline collaborators loaded from a JSON fixture file

use anyhow::Context;
use approval_core::clients::{InMemoryDirectory, InMemoryTemplateStore};
use approval_core::UserTemplate;
use approval_types::{AdminTemplate, DirectoryUser};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
pub struct Fixtures {
    #[serde(default)]
    pub users: Vec<DirectoryUser>,
    #[serde(default)]
    pub user_routes: Vec<UserTemplate>,
    #[serde(default)]
    pub admin_templates: Vec<AdminTemplate>,
}

impl Fixtures {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture file {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse fixture file {}", path.display()))
    }

    pub fn into_collaborators(self) -> (InMemoryDirectory, InMemoryTemplateStore) {
        (
            InMemoryDirectory::new(self.users),
            InMemoryTemplateStore::new(self.user_routes, self.admin_templates),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approval_core::{DirectoryProvider, RouteTemplateStore};
    use std::io::Write;

    #[tokio::test]
    async fn test_load_fixture_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "users": [
                    {{ "id": "u1", "name": "김민수", "role": "EMPLOYEE",
                       "employee_profile": {{ "department": "개발팀" }} }}
                ],
                "admin_templates": [
                    {{ "id": "t1", "name": "기본 결재", "is_default": true, "stages": [] }}
                ]
            }}"#
        )
        .unwrap();

        let fixtures = Fixtures::from_file(file.path()).unwrap();
        let (directory, store) = fixtures.into_collaborators();

        let users = directory.get_users().await.unwrap();
        assert_eq!(users[0].department(), Some("개발팀"));
        assert!(store.get_user_approval_routes().await.unwrap().is_empty());
        assert_eq!(store.get_admin_approval_templates().await.unwrap().len(), 1);
    }
}
