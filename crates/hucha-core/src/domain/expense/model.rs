//! Expense entity and categorical attributes

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Expense category. A closed set, persisted by name so re-ordering the
/// definition is not a schema migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Food,
    Transport,
    Entertainment,
    Health,
    Education,
    Shopping,
    Utilities,
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Food,
        Category::Transport,
        Category::Entertainment,
        Category::Health,
        Category::Education,
        Category::Shopping,
        Category::Utilities,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "FOOD",
            Self::Transport => "TRANSPORT",
            Self::Entertainment => "ENTERTAINMENT",
            Self::Health => "HEALTH",
            Self::Education => "EDUCATION",
            Self::Shopping => "SHOPPING",
            Self::Utilities => "UTILITIES",
            Self::Other => "OTHER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "FOOD" => Some(Self::Food),
            "TRANSPORT" => Some(Self::Transport),
            "ENTERTAINMENT" => Some(Self::Entertainment),
            "HEALTH" => Some(Self::Health),
            "EDUCATION" => Some(Self::Education),
            "SHOPPING" => Some(Self::Shopping),
            "UTILITIES" => Some(Self::Utilities),
            "OTHER" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Payment method. Closed set, persisted by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    DebitCard,
    CreditCard,
    BankTransfer,
    DigitalWallet,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "CASH",
            Self::DebitCard => "DEBIT_CARD",
            Self::CreditCard => "CREDIT_CARD",
            Self::BankTransfer => "BANK_TRANSFER",
            Self::DigitalWallet => "DIGITAL_WALLET",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CASH" => Some(Self::Cash),
            "DEBIT_CARD" => Some(Self::DebitCard),
            "CREDIT_CARD" => Some(Self::CreditCard),
            "BANK_TRANSFER" => Some(Self::BankTransfer),
            "DIGITAL_WALLET" => Some(Self::DigitalWallet),
            _ => None,
        }
    }
}

/// A persisted expense record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: i64,
    pub description: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub amount: Decimal,
    pub category: Category,
    pub payment_method: PaymentMethod,
    pub date: NaiveDate,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Decoded create/update request body, prior to validation.
///
/// Every field is optional so the validator can report all missing fields in
/// one per-field diagnostic map instead of failing on the first.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseInput {
    pub description: Option<String>,
    #[serde(default, with = "rust_decimal::serde::arbitrary_precision_option")]
    pub amount: Option<Decimal>,
    pub category: Option<String>,
    pub payment_method: Option<String>,
    pub date: Option<NaiveDate>,
}

/// A fully validated expense, ready to persist
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub description: String,
    pub amount: Decimal,
    pub category: Category,
    pub payment_method: PaymentMethod,
    pub date: NaiveDate,
}
