use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use tradepost_core::{Entity, Named};
use tradepost_goods::{Good, Material};
use tradepost_ledger::{NewLineItem, Transaction, TransactionFilter, TransactionKind};
use tradepost_parties::{Hunter, Merchant, MerchantKind, PartyKind, Race};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateGoodRequest {
    pub name: String,
    pub description: String,
    pub material: Option<Material>,
    pub weight: f64,
    pub unit_value: u32,
    pub stock: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct GoodQuery {
    pub name: Option<String>,
    pub description: Option<String>,
    pub material: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateHunterRequest {
    pub name: String,
    pub location: String,
    pub race: Option<Race>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMerchantRequest {
    pub name: String,
    pub location: String,
    pub kind: Option<MerchantKind>,
}

/// `?name=` lookup used by the hunter/merchant collection endpoints.
#[derive(Debug, Deserialize)]
pub struct NameQuery {
    pub name: Option<String>,
}

/// Body of `POST /transactions`.
///
/// Fields are optional so that a missing field is reported as a 400 with
/// a message, not a generic body-rejection.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    pub kind: Option<TransactionKind>,
    pub party_name: Option<String>,
    pub line_items: Option<Vec<NewLineItem>>,
    pub date: Option<DateTime<Utc>>,
}

/// Body of `PATCH /transactions/:id`. Only line items and the date may be
/// updated; any other key is rejected.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateTransactionRequest {
    pub line_items: Vec<NewLineItem>,
    pub date: Option<DateTime<Utc>>,
}

/// Query string of `GET /transactions` and `DELETE /transactions`.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionQuery {
    pub kind: Option<String>,
    pub party_type: Option<String>,
    pub party_name: Option<String>,
    /// UTC calendar day, `YYYY-MM-DD`.
    pub date: Option<String>,
}

impl TransactionQuery {
    /// Parse the raw query strings into a typed filter.
    pub fn into_filter(self) -> Result<TransactionFilter, String> {
        let kind = match self.kind.as_deref() {
            None => None,
            Some(s) => Some(s.parse::<TransactionKind>().map_err(|e| e.to_string())?),
        };
        let party_kind = match self.party_type.as_deref() {
            None => None,
            Some("Hunter") => Some(PartyKind::Hunter),
            Some("Merchant") => Some(PartyKind::Merchant),
            Some(other) => {
                return Err(format!(
                    "'{other}' is not a party type (expected Hunter or Merchant)"
                ));
            }
        };
        let day = match self.date.as_deref() {
            None => None,
            Some(s) => Some(
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .map_err(|_| format!("'{s}' is not a date (expected YYYY-MM-DD)"))?,
            ),
        };

        Ok(TransactionFilter {
            kind,
            party_kind,
            party_name: self.party_name,
            day,
        })
    }
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn good_to_json(good: &Good) -> serde_json::Value {
    serde_json::json!({
        "id": good.id().to_string(),
        "name": good.name(),
        "description": good.description(),
        "material": good.material(),
        "weight": good.weight(),
        "unit_value": good.unit_value(),
        "stock": good.stock(),
    })
}

pub fn hunter_to_json(hunter: &Hunter) -> serde_json::Value {
    serde_json::json!({
        "id": hunter.id().to_string(),
        "name": hunter.name(),
        "location": hunter.location(),
        "race": hunter.race(),
    })
}

pub fn merchant_to_json(merchant: &Merchant) -> serde_json::Value {
    serde_json::json!({
        "id": merchant.id().to_string(),
        "name": merchant.name(),
        "location": merchant.location(),
        "kind": merchant.kind(),
    })
}

pub fn transaction_to_json(tx: &Transaction) -> serde_json::Value {
    let party_type = match tx.party().kind() {
        PartyKind::Hunter => "Hunter",
        PartyKind::Merchant => "Merchant",
    };

    serde_json::json!({
        "id": tx.id().to_string(),
        "date": tx.date().to_rfc3339(),
        "kind": tx.kind().as_str(),
        "party_type": party_type,
        "party_id": tx.party().party_id().to_string(),
        "party_name": tx.party_name(),
        "line_items": tx.line_items().iter().map(|item| {
            serde_json::json!({
                "good_id": item.good_id.to_string(),
                "quantity": item.quantity,
            })
        }).collect::<Vec<_>>(),
        "amount": tx.amount(),
        "total_import": tx.total_import(),
    })
}
