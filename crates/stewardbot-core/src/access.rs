//! Privilege tiers and the identity → tier lookup table
//!
//! Tiers are totally ordered: `Ignored < Public < Whitelisted < Operator`.
//! Whatever a tier may do, every higher tier may do as well, so callers only
//! ever compare tiers with `<`/`>=`.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, StewardError};

/// Privilege tier, ordered from least to most privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Banned identities. Nothing they send is answered.
    Ignored,
    /// Default for identities not listed anywhere.
    Public,
    Whitelisted,
    Operator,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Ignored, Tier::Public, Tier::Whitelisted, Tier::Operator];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Ignored => "ignored",
            Tier::Public => "public",
            Tier::Whitelisted => "whitelisted",
            Tier::Operator => "operator",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = StewardError;

    fn from_str(s: &str) -> Result<Self> {
        Tier::ALL
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StewardError::Config {
                message: format!("unknown tier '{}'", s),
            })
    }
}

/// Read-only mapping from sender identity to privilege tier.
///
/// Built once at startup; there is no way to change membership afterwards.
#[derive(Debug, Clone, Default)]
pub struct AccessTable {
    banned: HashSet<String>,
    members: HashMap<String, Tier>,
}

impl AccessTable {
    /// Build a table from the ban list and explicit tier grants.
    ///
    /// # Errors
    ///
    /// Returns `StewardError::Config` if an identity is granted two tiers,
    /// is both banned and granted, or is granted the `ignored` tier (use the
    /// ban list for that).
    pub fn new<B, M>(banned: B, members: M) -> Result<Self>
    where
        B: IntoIterator,
        B::Item: Into<String>,
        M: IntoIterator<Item = (String, Tier)>,
    {
        let banned: HashSet<String> = banned.into_iter().map(Into::into).collect();
        let mut table: HashMap<String, Tier> = HashMap::new();

        for (identity, tier) in members {
            if tier == Tier::Ignored {
                return Err(StewardError::Config {
                    message: format!(
                        "identity '{}' cannot be granted the ignored tier; add it to the ban list",
                        identity
                    ),
                });
            }
            if banned.contains(&identity) {
                return Err(StewardError::Config {
                    message: format!("identity '{}' is both banned and granted {}", identity, tier),
                });
            }
            if let Some(existing) = table.insert(identity.clone(), tier) {
                return Err(StewardError::Config {
                    message: format!(
                        "identity '{}' is listed as both {} and {}",
                        identity, existing, tier
                    ),
                });
            }
        }

        Ok(Self {
            banned,
            members: table,
        })
    }

    /// Resolve an identity to its tier.
    ///
    /// The ban list is consulted first; unknown identities are `Public`.
    pub fn tier_of(&self, identity: &str) -> Tier {
        if self.banned.contains(identity) {
            return Tier::Ignored;
        }
        self.members.get(identity).copied().unwrap_or(Tier::Public)
    }

    pub fn is_banned(&self, identity: &str) -> bool {
        self.banned.contains(identity)
    }

    /// Identities holding exactly `tier`, sorted. `Ignored` lists the ban list.
    pub fn members_of(&self, tier: Tier) -> Vec<&str> {
        let mut identities: Vec<&str> = match tier {
            Tier::Ignored => self.banned.iter().map(String::as_str).collect(),
            _ => self
                .members
                .iter()
                .filter(|(_, t)| **t == tier)
                .map(|(identity, _)| identity.as_str())
                .collect(),
        };
        identities.sort_unstable();
        identities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> AccessTable {
        AccessTable::new(
            ["spam.example"],
            vec![
                ("helper.example".to_string(), Tier::Whitelisted),
                ("steward.example".to_string(), Tier::Operator),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_tiers_are_totally_ordered() {
        assert!(Tier::Ignored < Tier::Public);
        assert!(Tier::Public < Tier::Whitelisted);
        assert!(Tier::Whitelisted < Tier::Operator);
    }

    #[test]
    fn test_unknown_identity_is_public() {
        assert_eq!(table().tier_of("nobody.example"), Tier::Public);
    }

    #[test]
    fn test_listed_identities_resolve() {
        let table = table();
        assert_eq!(table.tier_of("helper.example"), Tier::Whitelisted);
        assert_eq!(table.tier_of("steward.example"), Tier::Operator);
    }

    #[test]
    fn test_banned_short_circuits() {
        let table = table();
        assert_eq!(table.tier_of("spam.example"), Tier::Ignored);
        assert!(table.is_banned("spam.example"));
    }

    #[test]
    fn test_duplicate_grant_rejected() {
        let result = AccessTable::new(
            Vec::<String>::new(),
            vec![
                ("a".to_string(), Tier::Whitelisted),
                ("a".to_string(), Tier::Operator),
            ],
        );
        assert!(matches!(result, Err(StewardError::Config { .. })));
    }

    #[test]
    fn test_banned_and_granted_rejected() {
        let result = AccessTable::new(["a"], vec![("a".to_string(), Tier::Operator)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_tier_parse_and_display() {
        assert_eq!("Operator".parse::<Tier>().unwrap(), Tier::Operator);
        assert_eq!(Tier::Whitelisted.to_string(), "whitelisted");
        assert!("root".parse::<Tier>().is_err());
    }

    #[test]
    fn test_members_of() {
        let table = table();
        assert_eq!(table.members_of(Tier::Operator), vec!["steward.example"]);
        assert_eq!(table.members_of(Tier::Ignored), vec!["spam.example"]);
        assert!(table.members_of(Tier::Public).is_empty());
    }
}
