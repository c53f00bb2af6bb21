use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub score: u32,
}

/// Who this client is. Created before any network contact and never changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("display name must not be empty")]
    EmptyName,
}

impl Identity {
    pub fn new(name: &str) -> Result<Self, IdentityError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(IdentityError::EmptyName);
        }
        Ok(Self {
            id: uuid::Uuid::new_v4().simple().to_string(),
            name: name.to_string(),
        })
    }
}

/// Participants keyed by id on the wire, kept here in the order they were received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster(Vec<Participant>);

impl Roster {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.0.iter()
    }

    /// Highest score first; equal scores keep roster order.
    pub fn standings(&self) -> Vec<&Participant> {
        let mut ranked: Vec<&Participant> = self.0.iter().collect();
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked
    }
}

impl FromIterator<Participant> for Roster {
    fn from_iter<I: IntoIterator<Item = Participant>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for Roster {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for participant in &self.0 {
            map.serialize_entry(&participant.id, participant)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Roster {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RosterVisitor)
    }
}

struct RosterVisitor;

impl<'de> Visitor<'de> for RosterVisitor {
    type Value = Roster;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of participant id to participant")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Roster, E> {
        Ok(Roster::default())
    }

    fn visit_none<E: de::Error>(self) -> Result<Roster, E> {
        Ok(Roster::default())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Roster, A::Error> {
        let mut entries: Vec<Participant> = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, mut participant)) = map.next_entry::<String, Participant>()? {
            // the map key is authoritative
            participant.id = key;
            match entries.iter_mut().find(|p| p.id == participant.id) {
                Some(existing) => *existing = participant,
                None => entries.push(participant),
            }
        }
        Ok(Roster(entries))
    }
}
