//! Organization directory the route builder picks reviewers from

use crate::constants::UNASSIGNED_ORGANIZATION;
use crate::route::MemberId;
use approval_types::{DirectoryUser, UserRole};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Directory entry reduced to what a step snapshot needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryMember {
    pub id: MemberId,
    pub name: String,
    pub title: Option<String>,
    pub organization: Option<String>,
    pub role: UserRole,
}

impl DirectoryMember {
    pub fn belongs_to(&self, organization: &str) -> bool {
        self.organization.as_deref() == Some(organization)
    }
}

impl From<DirectoryUser> for DirectoryMember {
    fn from(user: DirectoryUser) -> Self {
        let organization = user.department().map(str::to_string);

        Self {
            id: MemberId::new(user.id),
            name: user.name,
            title: user.title,
            organization,
            role: user.role,
        }
    }
}

/// Members of one organization, for the manual picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrganizationNode {
    pub name: String,
    pub members: Vec<DirectoryMember>,
}

/// Full member list in directory iteration order
#[derive(Debug, Clone, Default)]
pub struct Directory {
    members: Vec<DirectoryMember>,
}

impl Directory {
    pub fn new(members: Vec<DirectoryMember>) -> Self {
        Self { members }
    }

    pub fn from_users(users: Vec<DirectoryUser>) -> Self {
        Self::new(users.into_iter().map(DirectoryMember::from).collect())
    }

    pub fn members(&self) -> &[DirectoryMember] {
        &self.members
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn find(&self, id: &MemberId) -> Option<&DirectoryMember> {
        self.members.iter().find(|m| &m.id == id)
    }

    pub fn first_with_role(&self, role: UserRole) -> Option<&DirectoryMember> {
        self.members.iter().find(|m| m.role == role)
    }

    /// Group members by organization, organizations sorted by name.
    /// Members keep directory order inside their group.
    pub fn organization_tree(&self) -> Vec<OrganizationNode> {
        let mut groups: BTreeMap<&str, Vec<DirectoryMember>> = BTreeMap::new();

        for member in &self.members {
            let organization = member
                .organization
                .as_deref()
                .filter(|o| !o.trim().is_empty())
                .unwrap_or(UNASSIGNED_ORGANIZATION);
            groups.entry(organization).or_default().push(member.clone());
        }

        groups
            .into_iter()
            .map(|(name, members)| OrganizationNode {
                name: name.to_string(),
                members,
            })
            .collect()
    }
}
