use serde::{Deserialize, Serialize};

use tradepost_core::{DomainError, DomainResult, Entity, Named, PartyId};

/// Party kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartyKind {
    Hunter,
    Merchant,
}

/// Typed reference to the party behind a transaction.
///
/// Replaces the denormalized name+kind string pair: the variant carries the
/// kind and the id supports referential lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartyRef {
    Hunter(PartyId),
    Merchant(PartyId),
}

impl PartyRef {
    pub fn kind(&self) -> PartyKind {
        match self {
            PartyRef::Hunter(_) => PartyKind::Hunter,
            PartyRef::Merchant(_) => PartyKind::Merchant,
        }
    }

    pub fn party_id(&self) -> PartyId {
        match self {
            PartyRef::Hunter(id) | PartyRef::Merchant(id) => *id,
        }
    }
}

/// Race of a hunter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Race {
    Human,
    Elf,
    Dwarf,
    Sorcerer,
}

impl Default for Race {
    fn default() -> Self {
        Race::Human
    }
}

/// Trade of a merchant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MerchantKind {
    Blacksmith,
    Alchemist,
    General,
}

impl Default for MerchantKind {
    fn default() -> Self {
        MerchantKind::Blacksmith
    }
}

/// Party names are unique lookup keys; keep them to plain alphanumerics.
fn validate_name(name: &str) -> DomainResult<String> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    if !name.chars().all(char::is_alphanumeric) {
        return Err(DomainError::validation(
            "name may only contain alphanumeric characters",
        ));
    }
    Ok(name)
}

fn validate_location(location: &str) -> DomainResult<String> {
    let location = location.trim().to_string();
    if location.is_empty() {
        return Err(DomainError::validation("location cannot be empty"));
    }
    Ok(location)
}

/// A buyer-type party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hunter {
    id: PartyId,
    name: String,
    location: String,
    race: Race,
}

impl Hunter {
    pub fn new(
        id: PartyId,
        name: impl Into<String>,
        location: impl Into<String>,
        race: Race,
    ) -> DomainResult<Self> {
        Ok(Self {
            id,
            name: validate_name(&name.into())?,
            location: validate_location(&location.into())?,
            race,
        })
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn race(&self) -> Race {
        self.race
    }

    pub fn apply_patch(&mut self, patch: HunterPatch) -> DomainResult<()> {
        if let Some(name) = patch.name {
            self.name = validate_name(&name)?;
        }
        if let Some(location) = patch.location {
            self.location = validate_location(&location)?;
        }
        if let Some(race) = patch.race {
            self.race = race;
        }
        Ok(())
    }
}

impl Entity for Hunter {
    type Id = PartyId;

    fn id(&self) -> PartyId {
        self.id
    }
}

impl Named for Hunter {
    fn name(&self) -> &str {
        &self.name
    }
}

/// A seller-type party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Merchant {
    id: PartyId,
    name: String,
    location: String,
    kind: MerchantKind,
}

impl Merchant {
    pub fn new(
        id: PartyId,
        name: impl Into<String>,
        location: impl Into<String>,
        kind: MerchantKind,
    ) -> DomainResult<Self> {
        Ok(Self {
            id,
            name: validate_name(&name.into())?,
            location: validate_location(&location.into())?,
            kind,
        })
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn kind(&self) -> MerchantKind {
        self.kind
    }

    pub fn apply_patch(&mut self, patch: MerchantPatch) -> DomainResult<()> {
        if let Some(name) = patch.name {
            self.name = validate_name(&name)?;
        }
        if let Some(location) = patch.location {
            self.location = validate_location(&location)?;
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        Ok(())
    }
}

impl Entity for Merchant {
    type Id = PartyId;

    fn id(&self) -> PartyId {
        self.id
    }
}

impl Named for Merchant {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Whitelisted-field update for a hunter.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HunterPatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub race: Option<Race>,
}

/// Whitelisted-field update for a merchant.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MerchantPatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub kind: Option<MerchantKind>,
}
