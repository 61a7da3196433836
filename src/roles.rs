//! Speaker to role assignment.
//!
//! In a one-on-one chat the roles follow from the target speaker alone: the
//! target is the `Assistant`, the other person the `User`. With any other
//! number of speakers there is no safe guess, so the caller must list who
//! plays the `User` role; everyone else is left out of the training data.

use serde::Serialize;

use crate::error::{ChatCloneError, Result};
use crate::message::Role;

/// Separator used when several speakers share the `User` role.
pub const USER_SEPARATOR: &str = ", ";

/// Identities reported to the training backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participants {
    pub user: String,
    pub assistant: String,
}

/// Which speaker plays which role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleMapping {
    assistant: String,
    users: Vec<String>,
}

impl RoleMapping {
    /// Infers roles for a one-on-one chat.
    ///
    /// # Errors
    ///
    /// - [`ChatCloneError::UnknownSpeaker`] if `target` is not in `speakers`
    /// - [`ChatCloneError::AmbiguousRoles`] unless there are exactly 2 speakers
    pub fn for_target(target: &str, speakers: &[String]) -> Result<Self> {
        if !speakers.iter().any(|s| s == target) {
            return Err(ChatCloneError::unknown_speaker(target));
        }
        if speakers.len() != 2 {
            return Err(ChatCloneError::AmbiguousRoles {
                count: speakers.len(),
            });
        }
        let users = speakers.iter().filter(|s| *s != target).cloned().collect();
        Ok(Self {
            assistant: target.to_string(),
            users,
        })
    }

    /// Builds a mapping from an explicit list of `User` speakers.
    ///
    /// # Errors
    ///
    /// [`ChatCloneError::InvalidRoleMapping`] if `users` is empty, repeats a
    /// name, or contains the assistant.
    pub fn explicit<I, S>(assistant: impl Into<String>, users: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let assistant = assistant.into();
        let mut mapped: Vec<String> = Vec::new();
        for user in users {
            let user = user.into();
            if user == assistant {
                return Err(ChatCloneError::invalid_roles(format!(
                    "'{user}' cannot be both user and assistant"
                )));
            }
            if mapped.contains(&user) {
                return Err(ChatCloneError::invalid_roles(format!(
                    "'{user}' is listed twice"
                )));
            }
            mapped.push(user);
        }
        if mapped.is_empty() {
            return Err(ChatCloneError::invalid_roles("no user speakers given"));
        }
        Ok(Self {
            assistant,
            users: mapped,
        })
    }

    /// Checks that every mapped speaker actually occurs in the chat.
    pub fn validate_against(&self, speakers: &[String]) -> Result<()> {
        std::iter::once(&self.assistant)
            .chain(&self.users)
            .find(|name| !speakers.contains(name))
            .map_or(Ok(()), |missing| Err(ChatCloneError::unknown_speaker(missing.as_str())))
    }

    /// Role of a speaker, or `None` if the speaker is not part of the mapping.
    pub fn role_of(&self, speaker: &str) -> Option<Role> {
        if speaker == self.assistant {
            Some(Role::Assistant)
        } else if self.users.iter().any(|u| u == speaker) {
            Some(Role::User)
        } else {
            None
        }
    }

    pub fn assistant(&self) -> &str {
        &self.assistant
    }

    pub fn users(&self) -> &[String] {
        &self.users
    }

    /// Participant identities; several users are joined with `", "`.
    pub fn participants(&self) -> Participants {
        Participants {
            user: self.users.join(USER_SEPARATOR),
            assistant: self.assistant.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn speakers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_for_target_two_party() {
        let roles = RoleMapping::for_target("Bob", &speakers(&["Alice", "Bob"])).unwrap();
        assert_eq!(roles.role_of("Bob"), Some(Role::Assistant));
        assert_eq!(roles.role_of("Alice"), Some(Role::User));
        assert_eq!(roles.role_of("Carol"), None);
        assert_eq!(
            roles.participants(),
            Participants {
                user: "Alice".into(),
                assistant: "Bob".into()
            }
        );
    }

    #[test]
    fn test_for_target_unknown() {
        let err = RoleMapping::for_target("Zed", &speakers(&["Alice", "Bob"])).unwrap_err();
        assert!(matches!(err, ChatCloneError::UnknownSpeaker { .. }));
    }

    #[test]
    fn test_for_target_multi_party_is_ambiguous() {
        let err =
            RoleMapping::for_target("Bob", &speakers(&["Alice", "Bob", "Carol"])).unwrap_err();
        assert!(matches!(err, ChatCloneError::AmbiguousRoles { count: 3 }));
    }

    #[test]
    fn test_explicit_mapping() {
        let roles = RoleMapping::explicit("Bob", ["Alice", "Carol"]).unwrap();
        assert_eq!(roles.role_of("Carol"), Some(Role::User));
        assert_eq!(roles.role_of("Dave"), None);
        assert_eq!(roles.participants().user, "Alice, Carol");
        assert_eq!(roles.users(), ["Alice".to_string(), "Carol".to_string()]);
    }

    #[test]
    fn test_explicit_mapping_rejects_inconsistencies() {
        assert!(RoleMapping::explicit("Bob", ["Bob"]).is_err());
        assert!(RoleMapping::explicit("Bob", ["Alice", "Alice"]).is_err());
        assert!(RoleMapping::explicit("Bob", Vec::<String>::new()).is_err());
    }

    #[test]
    fn test_validate_against() {
        let roles = RoleMapping::explicit("Bob", ["Alice"]).unwrap();
        assert!(roles.validate_against(&speakers(&["Alice", "Bob", "Carol"])).is_ok());

        let err = roles.validate_against(&speakers(&["Bob", "Carol"])).unwrap_err();
        assert_eq!(err.to_string(), "Unknown speaker 'Alice'");
    }
}
