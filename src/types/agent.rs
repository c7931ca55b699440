//! Composite federated identifiers: Ugui (user), Ugi (group), Uei (experience)
//!
//! The canonical string form is `id;homeURI;name`, used to carry identities
//! across grids. Equality is two-tier: `==` compares the UUID only (identity
//! equality), while `equals_grid` also requires the origin URI to match.
//! Higher-level permission logic depends on which tier it uses, so both are
//! part of the contract.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::error::ValueError;

fn uris_match(a: &Option<Url>, b: &Option<Url>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        (None, None) => true,
        _ => false,
    }
}

/// Universal user identifier: agent UUID, optional home grid URI, legacy
/// first/last name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ugui {
    pub id: Uuid,
    pub home_uri: Option<Url>,
    pub first_name: String,
    pub last_name: String,
}

impl Ugui {
    pub fn new(id: Uuid, first_name: &str, last_name: &str) -> Self {
        Self {
            id,
            home_uri: None,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        }
    }

    pub fn unknown() -> Self {
        Self::new(Uuid::nil(), "", "")
    }

    pub fn full_name(&self) -> String {
        if self.last_name.is_empty() {
            self.first_name.clone()
        } else {
            format!("{} {}", self.first_name, self.last_name)
        }
    }

    /// Identity plus origin: true only when the UUID and home URI both match.
    pub fn equals_grid(&self, other: &Ugui) -> bool {
        self.id == other.id && uris_match(&self.home_uri, &other.home_uri)
    }
}

impl PartialEq for Ugui {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Ugui {}

impl Hash for Ugui {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Ugui {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.home_uri {
            Some(uri) => write!(f, "{};{};{}", self.id, uri, self.full_name()),
            None => write!(f, "{}", self.id),
        }
    }
}

impl FromStr for Ugui {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fail = || ValueError::ParseFailed {
            target: "Ugui",
            input: s.to_string(),
        };
        let mut parts = s.splitn(3, ';');
        let id = Uuid::parse_str(parts.next().ok_or_else(fail)?.trim()).map_err(|_| fail())?;
        let home_uri = match parts.next() {
            Some(uri) => Some(Url::parse(uri.trim()).map_err(|_| fail())?),
            None => None,
        };
        let (first_name, last_name) = match parts.next() {
            Some(name) => match name.trim().split_once(' ') {
                Some((first, last)) => (first.to_string(), last.to_string()),
                None => (name.trim().to_string(), String::new()),
            },
            None => (String::new(), String::new()),
        };
        Ok(Self {
            id,
            home_uri,
            first_name,
            last_name,
        })
    }
}

/// Universal group identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ugi {
    pub id: Uuid,
    pub grid_uri: Option<Url>,
    pub group_name: String,
}

impl Ugi {
    pub fn new(id: Uuid, group_name: &str) -> Self {
        Self {
            id,
            grid_uri: None,
            group_name: group_name.to_string(),
        }
    }

    pub fn unknown() -> Self {
        Self::new(Uuid::nil(), "")
    }

    pub fn equals_grid(&self, other: &Ugi) -> bool {
        self.id == other.id && uris_match(&self.grid_uri, &other.grid_uri)
    }
}

impl PartialEq for Ugi {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Ugi {}

impl Hash for Ugi {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Ugi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.grid_uri {
            Some(uri) => write!(f, "{};{};{}", self.id, uri, self.group_name),
            None => write!(f, "{}", self.id),
        }
    }
}

impl FromStr for Ugi {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fail = || ValueError::ParseFailed {
            target: "Ugi",
            input: s.to_string(),
        };
        let mut parts = s.splitn(3, ';');
        let id = Uuid::parse_str(parts.next().ok_or_else(fail)?.trim()).map_err(|_| fail())?;
        let grid_uri = match parts.next() {
            Some(uri) => Some(Url::parse(uri.trim()).map_err(|_| fail())?),
            None => None,
        };
        let group_name = parts.next().unwrap_or("").trim().to_string();
        Ok(Self {
            id,
            grid_uri,
            group_name,
        })
    }
}

/// Universal experience identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Uei {
    pub id: Uuid,
    pub api_uri: Option<Url>,
    pub name: String,
}

impl Uei {
    pub fn new(id: Uuid, name: &str) -> Self {
        Self {
            id,
            api_uri: None,
            name: name.to_string(),
        }
    }

    pub fn unknown() -> Self {
        Self::new(Uuid::nil(), "")
    }

    pub fn equals_grid(&self, other: &Uei) -> bool {
        self.id == other.id && uris_match(&self.api_uri, &other.api_uri)
    }
}

impl PartialEq for Uei {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Uei {}

impl Hash for Uei {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Uei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.api_uri {
            Some(uri) => write!(f, "{};{};{}", self.id, uri, self.name),
            None => write!(f, "{}", self.id),
        }
    }
}

impl FromStr for Uei {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fail = || ValueError::ParseFailed {
            target: "Uei",
            input: s.to_string(),
        };
        let mut parts = s.splitn(3, ';');
        let id = Uuid::parse_str(parts.next().ok_or_else(fail)?.trim()).map_err(|_| fail())?;
        let api_uri = match parts.next() {
            Some(uri) => Some(Url::parse(uri.trim()).map_err(|_| fail())?),
            None => None,
        };
        let name = parts.next().unwrap_or("").trim().to_string();
        Ok(Self { id, api_uri, name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::id::UuidExt;

    #[test]
    fn test_ugui_string_round_trip() {
        let mut u = Ugui::new(Uuid::random(), "Test", "User");
        u.home_uri = Some(Url::parse("http://grid.example.com:8002/").unwrap());
        let parsed: Ugui = u.to_string().parse().unwrap();
        assert_eq!(parsed.id, u.id);
        assert_eq!(parsed.home_uri, u.home_uri);
        assert_eq!(parsed.first_name, "Test");
        assert_eq!(parsed.last_name, "User");
    }

    #[test]
    fn test_ugui_bare_uuid_parses() {
        let id = Uuid::random();
        let parsed: Ugui = id.to_string().parse().unwrap();
        assert_eq!(parsed.id, id);
        assert!(parsed.home_uri.is_none());
        assert_eq!(parsed.full_name(), "");
    }

    #[test]
    fn test_equality_tiers() {
        let id = Uuid::random();
        let mut local = Ugui::new(id, "Test", "User");
        let mut foreign = Ugui::new(id, "Test", "User");
        foreign.home_uri = Some(Url::parse("http://other.example.com/").unwrap());

        // Identity equality ignores the origin, grid equality does not.
        assert_eq!(local, foreign);
        assert!(!local.equals_grid(&foreign));
        local.home_uri = foreign.home_uri.clone();
        assert!(local.equals_grid(&foreign));
    }

    #[test]
    fn test_ugi_round_trip() {
        let mut g = Ugi::new(Uuid::random(), "Builders");
        g.grid_uri = Some(Url::parse("http://grid.example.com:8002/").unwrap());
        let parsed: Ugi = g.to_string().parse().unwrap();
        assert_eq!(parsed, g);
        assert_eq!(parsed.group_name, "Builders");
    }

    #[test]
    fn test_malformed_rejected() {
        assert!("not-a-uuid;http://x/;Name".parse::<Ugui>().is_err());
        assert!("".parse::<Uei>().is_err());
    }
}
