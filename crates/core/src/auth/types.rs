use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::AuthError;

/// Role of an already-authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallerRole {
    /// Any signed-in user.
    Regular,
    /// Back-office user allowed to manage partners.
    Elevated,
}

impl CallerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Elevated => "elevated",
        }
    }

    pub fn is_elevated(&self) -> bool {
        matches!(self, Self::Elevated)
    }
}

impl std::fmt::Display for CallerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CallerRole {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "regular" => Ok(Self::Regular),
            "elevated" => Ok(Self::Elevated),
            _ => Err(AuthError::InvalidRole(s.to_string())),
        }
    }
}

/// Identity of the caller, as vouched for by the authentication collaborator.
///
/// The core trusts this value without re-validating it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub id: String,
    pub role: CallerRole,
}

impl Caller {
    pub fn new(id: impl Into<String>, role: CallerRole) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    pub fn regular(id: impl Into<String>) -> Self {
        Self::new(id, CallerRole::Regular)
    }

    pub fn elevated(id: impl Into<String>) -> Self {
        Self::new(id, CallerRole::Elevated)
    }

    pub fn is_elevated(&self) -> bool {
        self.role.is_elevated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role_is_case_insensitive() {
        assert_eq!("Elevated".parse::<CallerRole>(), Ok(CallerRole::Elevated));
        assert_eq!(" regular ".parse::<CallerRole>(), Ok(CallerRole::Regular));
    }

    #[test]
    fn test_parse_unknown_role() {
        assert_eq!(
            "root".parse::<CallerRole>(),
            Err(AuthError::InvalidRole("root".to_string()))
        );
    }

    #[test]
    fn test_caller_constructors() {
        assert!(Caller::elevated("admin-1").is_elevated());
        assert!(!Caller::regular("user-1").is_elevated());
    }
}
