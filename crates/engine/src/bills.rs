//! Bills: amounts owed to or by a person.
//!
//! A bill is either *pending* (an open receivable/payable) or *closed*
//! (settled, immutable audit record). The two states live in two tables,
//! `pending_bills` and `closed_bills`, but every read returns the same
//! [`Bill`] type with an explicit [`BillStatus`].
//!
//! The sign of `amount_minor` carries the direction:
//! - positive: to charge, the person owes the business
//! - negative: to pay, the business owes the person

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CurrencyCode, EngineError, ResultEngine, closed_bills, pending_bills};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    Pending,
    Closed,
}

impl BillStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Closed => "closed",
        }
    }
}

impl TryFrom<&str> for BillStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "closed" => Ok(Self::Closed),
            other => Err(EngineError::Validation(format!(
                "invalid bill status: {other}"
            ))),
        }
    }
}

/// What settled a closed bill. Exactly one link exists per closed bill.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum ClosedBy {
    Transaction(Uuid),
    BillCross(Uuid),
    RevertTransaction(Uuid),
}

impl ClosedBy {
    pub fn transaction_id(self) -> Option<Uuid> {
        match self {
            Self::Transaction(id) => Some(id),
            _ => None,
        }
    }

    pub fn bill_cross_id(self) -> Option<Uuid> {
        match self {
            Self::BillCross(id) => Some(id),
            _ => None,
        }
    }

    pub fn revert_transaction_id(self) -> Option<Uuid> {
        match self {
            Self::RevertTransaction(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    pub id: Uuid,
    pub person_id: Uuid,
    /// Resolved from the person directory when read; empty if unavailable.
    pub person_name: String,
    pub status: BillStatus,
    pub date: NaiveDate,
    pub description: String,
    pub currency: CurrencyCode,
    pub amount_minor: i64,
    /// `None` while pending.
    pub closed_by: Option<ClosedBy>,
    /// Free text attached after closure.
    pub notes: Option<String>,
    /// Closing transaction of the bill this one was reverted from.
    pub parent_transaction_id: Option<Uuid>,
    pub parent_bill_cross_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Bill {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == BillStatus::Pending
    }

    /// `true` for bills the business has to pay out.
    #[must_use]
    pub fn is_to_pay(&self) -> bool {
        self.amount_minor < 0
    }
}

/// Caller-supplied bill fields, used for both creation and update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BillFields {
    pub person_id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    pub currency: String,
    pub amount_minor: i64,
}

/// Checks bill fields in a fixed order and reports the first failure.
///
/// Order: person id, description, amount, currency. Every check is evaluated
/// before the result is picked. `currency_registered` is the answer of the
/// currency registry for `fields.currency`; it is ignored when the code is
/// malformed.
///
/// Amounts may be negative: only zero and `i64::MIN`, which has no
/// opposite, are rejected.
pub fn validate_bill_fields(
    fields: &BillFields,
    currency_registered: bool,
) -> ResultEngine<CurrencyCode> {
    let person = (fields.person_id.is_nil())
        .then(|| EngineError::Validation("person id required".to_string()));
    let description = (fields.description.trim().is_empty())
        .then(|| EngineError::Validation("description required".to_string()));
    let amount = crate::util::check_amount(fields.amount_minor).err();
    let currency = match CurrencyCode::parse(&fields.currency) {
        Ok(code) if currency_registered => Ok(code),
        Ok(code) => Err(EngineError::CurrencyNotRegistered(code.to_string())),
        Err(err) => Err(err),
    };

    if let Some(err) = person.or(description).or(amount) {
        return Err(err);
    }
    currency
}

impl TryFrom<pending_bills::Model> for Bill {
    type Error = EngineError;

    fn try_from(model: pending_bills::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: crate::parse_id(&model.id, "bill")?,
            person_id: crate::parse_id(&model.person_id, "person")?,
            person_name: String::new(),
            status: BillStatus::Pending,
            date: model.date,
            description: model.description,
            currency: CurrencyCode::parse(&model.currency)?,
            amount_minor: model.amount_minor,
            closed_by: None,
            notes: None,
            parent_transaction_id: crate::parse_optional_id(
                model.parent_transaction_id.as_deref(),
                "transaction",
            )?,
            parent_bill_cross_id: crate::parse_optional_id(
                model.parent_bill_cross_id.as_deref(),
                "bill cross",
            )?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl TryFrom<closed_bills::Model> for Bill {
    type Error = EngineError;

    fn try_from(model: closed_bills::Model) -> Result<Self, Self::Error> {
        let status = BillStatus::try_from(model.status.as_str())?;
        if status != BillStatus::Closed {
            return Err(EngineError::Validation(format!(
                "closed bill {} has status {}",
                model.id, model.status
            )));
        }

        let links = [
            crate::parse_optional_id(model.transaction_id.as_deref(), "transaction")?
                .map(ClosedBy::Transaction),
            crate::parse_optional_id(model.bill_cross_id.as_deref(), "bill cross")?
                .map(ClosedBy::BillCross),
            crate::parse_optional_id(model.revert_transaction_id.as_deref(), "transaction")?
                .map(ClosedBy::RevertTransaction),
        ];
        let mut set = links.into_iter().flatten();
        let closed_by = match (set.next(), set.next()) {
            (Some(link), None) => link,
            _ => {
                return Err(EngineError::Validation(format!(
                    "closed bill {} must be linked to exactly one settlement",
                    model.id
                )));
            }
        };

        Ok(Self {
            id: crate::parse_id(&model.id, "bill")?,
            person_id: crate::parse_id(&model.person_id, "person")?,
            person_name: String::new(),
            status,
            date: model.date,
            description: model.description,
            currency: CurrencyCode::parse(&model.currency)?,
            amount_minor: model.amount_minor,
            closed_by: Some(closed_by),
            notes: model.notes,
            parent_transaction_id: crate::parse_optional_id(
                model.parent_transaction_id.as_deref(),
                "transaction",
            )?,
            parent_bill_cross_id: crate::parse_optional_id(
                model.parent_bill_cross_id.as_deref(),
                "bill cross",
            )?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> BillFields {
        BillFields {
            person_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            description: "Diesel advance".to_string(),
            currency: "EUR".to_string(),
            amount_minor: 5555,
        }
    }

    #[test]
    fn valid_fields_return_the_currency() {
        let code = validate_bill_fields(&fields(), true).unwrap();
        assert_eq!(code.as_str(), "EUR");
    }

    #[test]
    fn negative_amounts_are_valid() {
        // Known defect in the legacy HTTP validator: it rejected `amount <= 0`,
        // so "to pay" bills could never be created. Signed amounts are accepted.
        let mut f = fields();
        f.amount_minor = -5555;
        assert!(validate_bill_fields(&f, true).is_ok());
    }

    #[test]
    fn zero_amount_is_rejected() {
        let mut f = fields();
        f.amount_minor = 0;
        assert_eq!(
            validate_bill_fields(&f, true),
            Err(EngineError::Validation("amount must be non-zero".to_string()))
        );
    }

    #[test]
    fn amount_without_opposite_is_rejected() {
        let mut f = fields();
        f.amount_minor = i64::MIN;
        assert_eq!(
            validate_bill_fields(&f, true),
            Err(EngineError::Validation("amount out of range".to_string()))
        );

        f.amount_minor = -i64::MAX;
        assert!(validate_bill_fields(&f, true).is_ok());
    }

    #[test]
    fn first_failing_check_wins() {
        let f = BillFields {
            person_id: Uuid::nil(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            description: "  ".to_string(),
            currency: "eur".to_string(),
            amount_minor: 0,
        };
        assert_eq!(
            validate_bill_fields(&f, false),
            Err(EngineError::Validation("person id required".to_string()))
        );

        let f = BillFields {
            person_id: Uuid::new_v4(),
            ..f
        };
        assert_eq!(
            validate_bill_fields(&f, false),
            Err(EngineError::Validation("description required".to_string()))
        );

        let f = BillFields {
            description: "Tolls".to_string(),
            ..f
        };
        assert_eq!(
            validate_bill_fields(&f, false),
            Err(EngineError::Validation("amount must be non-zero".to_string()))
        );

        let f = BillFields {
            amount_minor: -100,
            ..f
        };
        assert!(matches!(
            validate_bill_fields(&f, false),
            Err(EngineError::Validation(msg)) if msg.starts_with("invalid currency code")
        ));
    }

    #[test]
    fn unregistered_currency_is_reported_as_such() {
        let mut f = fields();
        f.currency = "XAF".to_string();
        assert_eq!(
            validate_bill_fields(&f, false),
            Err(EngineError::CurrencyNotRegistered("XAF".to_string()))
        );
    }

    fn closed_model() -> closed_bills::Model {
        let now = Utc::now();
        closed_bills::Model {
            id: Uuid::new_v4().to_string(),
            person_id: Uuid::new_v4().to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            description: "Freight Milan-Turin".to_string(),
            currency: "EUR".to_string(),
            amount_minor: 12000,
            status: "closed".to_string(),
            transaction_id: Some(Uuid::new_v4().to_string()),
            bill_cross_id: None,
            revert_transaction_id: None,
            notes: None,
            parent_transaction_id: None,
            parent_bill_cross_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn closed_model_with_one_link_converts() {
        let model = closed_model();
        let tx_id = model.transaction_id.clone().unwrap();
        let bill = Bill::try_from(model).unwrap();
        assert_eq!(bill.status, BillStatus::Closed);
        assert_eq!(
            bill.closed_by.and_then(ClosedBy::transaction_id),
            Some(Uuid::parse_str(&tx_id).unwrap())
        );
    }

    #[test]
    fn closed_model_needs_exactly_one_link() {
        let mut none = closed_model();
        none.transaction_id = None;
        assert!(Bill::try_from(none).is_err());

        let mut two = closed_model();
        two.bill_cross_id = Some(Uuid::new_v4().to_string());
        assert!(Bill::try_from(two).is_err());
    }
}
