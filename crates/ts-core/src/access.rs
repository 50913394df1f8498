//! Visibility tiers: which time entries an actor may see.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ports::PermissionOracle;
use crate::types::{ProjectId, UserId};

/// The user a report is generated for.
///
/// Always passed explicitly; nothing in the engine reads a "current user"
/// from ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
}

impl Actor {
    pub const fn new(id: UserId) -> Self {
        Self { id }
    }
}

/// Project-level capabilities that grant access to time entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// See every user's time entries on the project.
    SeeProjectTimesheets,
    /// See one's own time entries on the project.
    ViewTimeEntries,
}

impl Capability {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SeeProjectTimesheets => "see_project_timesheets",
            Self::ViewTimeEntries => "view_time_entries",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unrecognized capability names.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown capability: {0}")]
pub struct UnknownCapability(String);

impl FromStr for Capability {
    type Err = UnknownCapability;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "see_project_timesheets" => Ok(Self::SeeProjectTimesheets),
            "view_time_entries" => Ok(Self::ViewTimeEntries),
            _ => Err(UnknownCapability(s.to_string())),
        }
    }
}

/// How much of a project's (or user's) time the actor may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Entries of every user in scope.
    AllUsers,
    /// Only the actor's own entries.
    OwnOnly,
    /// Nothing; the group is silently skipped.
    None,
}

impl Visibility {
    /// The user set to fetch for this tier, or `None` if nothing is fetched.
    ///
    /// `OwnOnly` restricts to the actor even when the actor is not among the
    /// requested users.
    pub fn users(self, in_scope: &[UserId], actor: &Actor) -> Option<BTreeSet<UserId>> {
        match self {
            Self::AllUsers => Some(in_scope.iter().copied().collect()),
            Self::OwnOnly => Some(BTreeSet::from([actor.id])),
            Self::None => None,
        }
    }
}

/// Tier for a project (or an issue, evaluated against its owning project).
pub fn project_visibility(
    oracle: &dyn PermissionOracle,
    actor: &Actor,
    project: ProjectId,
) -> Visibility {
    if oracle.is_admin(actor)
        || oracle.has_capability(actor, Capability::SeeProjectTimesheets, project)
    {
        Visibility::AllUsers
    } else if oracle.has_capability(actor, Capability::ViewTimeEntries, project) {
        Visibility::OwnOnly
    } else {
        Visibility::None
    }
}

/// Tier for a per-user report: admins see anyone, others only themselves.
pub fn user_visibility(oracle: &dyn PermissionOracle, actor: &Actor, user: UserId) -> Visibility {
    if oracle.is_admin(actor) || actor.id == user {
        Visibility::AllUsers
    } else {
        Visibility::None
    }
}

/// An in-memory permission table.
///
/// Loaded up front by a store so lookups during aggregation cannot fail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grants {
    admins: HashSet<UserId>,
    capabilities: HashSet<(UserId, ProjectId, Capability)>,
}

impl Grants {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn admin(mut self, user: UserId) -> Self {
        self.admins.insert(user);
        self
    }

    pub fn grant(mut self, user: UserId, capability: Capability, project: ProjectId) -> Self {
        self.capabilities.insert((user, project, capability));
        self
    }

    pub fn insert_admin(&mut self, user: UserId) {
        self.admins.insert(user);
    }

    pub fn insert_grant(&mut self, user: UserId, capability: Capability, project: ProjectId) {
        self.capabilities.insert((user, project, capability));
    }
}

impl PermissionOracle for Grants {
    fn is_admin(&self, actor: &Actor) -> bool {
        self.admins.contains(&actor.id)
    }

    fn has_capability(&self, actor: &Actor, capability: Capability, project: ProjectId) -> bool {
        self.capabilities.contains(&(actor.id, project, capability))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECT: ProjectId = ProjectId::new(1);
    const ALICE: UserId = UserId::new(1);
    const BOB: UserId = UserId::new(2);

    #[test]
    fn admins_see_all_users() {
        let grants = Grants::new().admin(ALICE);
        assert_eq!(
            project_visibility(&grants, &Actor::new(ALICE), PROJECT),
            Visibility::AllUsers
        );
    }

    #[test]
    fn see_project_timesheets_grants_all_users() {
        let grants = Grants::new().grant(ALICE, Capability::SeeProjectTimesheets, PROJECT);
        assert_eq!(
            project_visibility(&grants, &Actor::new(ALICE), PROJECT),
            Visibility::AllUsers
        );
    }

    #[test]
    fn view_time_entries_grants_own_only() {
        let grants = Grants::new().grant(ALICE, Capability::ViewTimeEntries, PROJECT);
        assert_eq!(
            project_visibility(&grants, &Actor::new(ALICE), PROJECT),
            Visibility::OwnOnly
        );
    }

    #[test]
    fn capabilities_are_per_project() {
        let grants = Grants::new().grant(ALICE, Capability::SeeProjectTimesheets, PROJECT);
        assert_eq!(
            project_visibility(&grants, &Actor::new(ALICE), ProjectId::new(2)),
            Visibility::None
        );
        assert_eq!(
            project_visibility(&grants, &Actor::new(BOB), PROJECT),
            Visibility::None
        );
    }

    #[test]
    fn user_visibility_allows_self_and_admins_only() {
        let grants = Grants::new().admin(ALICE);
        assert_eq!(
            user_visibility(&grants, &Actor::new(ALICE), BOB),
            Visibility::AllUsers
        );
        assert_eq!(
            user_visibility(&grants, &Actor::new(BOB), BOB),
            Visibility::AllUsers
        );
        assert_eq!(
            user_visibility(&grants, &Actor::new(BOB), ALICE),
            Visibility::None
        );
    }

    #[test]
    fn own_only_fetches_the_actor_even_outside_scope() {
        let users = Visibility::OwnOnly.users(&[BOB], &Actor::new(ALICE));
        assert_eq!(users, Some(BTreeSet::from([ALICE])));
        assert_eq!(Visibility::None.users(&[BOB], &Actor::new(ALICE)), None);
        assert_eq!(
            Visibility::AllUsers.users(&[BOB, ALICE], &Actor::new(ALICE)),
            Some(BTreeSet::from([ALICE, BOB]))
        );
    }

    #[test]
    fn capability_names_roundtrip() {
        for capability in [Capability::SeeProjectTimesheets, Capability::ViewTimeEntries] {
            assert_eq!(capability.as_str().parse::<Capability>().unwrap(), capability);
        }
        assert!("edit_time_entries".parse::<Capability>().is_err());
    }
}
