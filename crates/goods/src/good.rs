use serde::{Deserialize, Serialize};

use tradepost_core::{DomainError, DomainResult, Entity, GoodId, Named};

/// Upper bound on stock on hand for any single good.
pub const MAX_STOCK: u32 = 1000;

/// Material class of a good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Material {
    Steel,
    Leather,
    Essence,
    Mutagen,
}

impl Default for Material {
    fn default() -> Self {
        Material::Steel
    }
}

impl core::str::FromStr for Material {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "steel" => Ok(Material::Steel),
            "leather" => Ok(Material::Leather),
            "essence" => Ok(Material::Essence),
            "mutagen" => Ok(Material::Mutagen),
            other => Err(DomainError::validation(format!(
                "'{other}' is not a material (expected steel, leather, essence or mutagen)"
            ))),
        }
    }
}

/// A stocked item with a unit price (value in crowns).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Good {
    id: GoodId,
    name: String,
    description: String,
    material: Material,
    weight: f64,
    unit_value: u32,
    stock: u32,
}

impl Good {
    /// Validated constructor. Names are trimmed; stock is bounded at
    /// [`MAX_STOCK`].
    pub fn new(
        id: GoodId,
        name: impl Into<String>,
        description: impl Into<String>,
        material: Material,
        weight: f64,
        unit_value: u32,
        stock: u32,
    ) -> DomainResult<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        let description = description.into().trim().to_string();
        if description.is_empty() {
            return Err(DomainError::validation("description cannot be empty"));
        }
        if !weight.is_finite() || weight <= 0.0 {
            return Err(DomainError::validation("weight must be positive"));
        }
        if stock > MAX_STOCK {
            return Err(DomainError::validation(format!(
                "stock cannot exceed {MAX_STOCK}"
            )));
        }

        Ok(Self {
            id,
            name,
            description,
            material,
            weight,
            unit_value,
            stock,
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn material(&self) -> Material {
        self.material
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn unit_value(&self) -> u32 {
        self.unit_value
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    /// Replace the stock level, holding the 0..=MAX_STOCK invariant.
    pub fn set_stock(&mut self, stock: u32) -> DomainResult<()> {
        if stock > MAX_STOCK {
            return Err(DomainError::invariant(format!(
                "stock cannot exceed {MAX_STOCK}"
            )));
        }
        self.stock = stock;
        Ok(())
    }

    /// Apply a whitelisted-field update, re-running field validation.
    pub fn apply_patch(&mut self, patch: GoodPatch) -> DomainResult<()> {
        if let Some(name) = patch.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(DomainError::validation("name cannot be empty"));
            }
            self.name = name;
        }
        if let Some(description) = patch.description {
            let description = description.trim().to_string();
            if description.is_empty() {
                return Err(DomainError::validation("description cannot be empty"));
            }
            self.description = description;
        }
        if let Some(material) = patch.material {
            self.material = material;
        }
        if let Some(stock) = patch.stock {
            self.set_stock(stock)?;
        }
        Ok(())
    }
}

impl Entity for Good {
    type Id = GoodId;

    fn id(&self) -> GoodId {
        self.id
    }
}

impl Named for Good {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Whitelisted-field update for a good.
///
/// Only these four fields may be changed through the API; any other key in
/// the request body is rejected at deserialization time.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GoodPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub material: Option<Material>,
    pub stock: Option<u32>,
}
