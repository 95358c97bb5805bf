use std::collections::BTreeSet;

use serde::Serialize;

use crate::models::user::CurrentUser;

pub const HR_GROUP: &str = "hr";
/// Both spellings of the interviewer group are in use; they denote the same role.
pub const INTERVIEWER_GROUPS: &[&str] = &["interviewer", "面试官"];

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Hr,
    Interviewer,
    /// Any group without a policy meaning, kept verbatim.
    Group(String),
}

impl Role {
    /// Group names are matched exactly: no case folding, no trimming.
    pub fn from_group_name(name: &str) -> Role {
        if name == HR_GROUP {
            Role::Hr
        } else if INTERVIEWER_GROUPS.contains(&name) {
            Role::Interviewer
        } else {
            Role::Group(name.to_string())
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    pub fn contains(&self, role: &Role) -> bool {
        self.0.contains(role)
    }

    pub fn is_hr(&self) -> bool {
        self.contains(&Role::Hr)
    }

    pub fn is_interviewer(&self) -> bool {
        self.contains(&Role::Interviewer)
    }
}

impl<S: AsRef<str>> FromIterator<S> for RoleSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        RoleSet(
            iter.into_iter()
                .map(|name| Role::from_group_name(name.as_ref()))
                .collect(),
        )
    }
}

/// Roles derived from the user's group memberships.
pub fn resolve_roles(user: &CurrentUser) -> RoleSet {
    user.groups.iter().collect()
}
