// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{LedgerError, LedgerResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    Cash,
    Card,
}

impl PaymentType {
    pub const ALL: [PaymentType; 2] = [PaymentType::Cash, PaymentType::Card];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Cash => "cash",
            PaymentType::Card => "card",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    Add,
    Subtract,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Add => "add",
            OperationType::Subtract => "subtract",
        }
    }

    /// Applies the direction to a non-negative magnitude.
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            OperationType::Add => amount,
            OperationType::Subtract => -amount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    IncomeSource,
    ExpenseCategory,
}

impl CategoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::IncomeSource => "income_source",
            CategoryKind::ExpenseCategory => "expense_category",
        }
    }

    /// The operation a category of this kind is paired with in breakdowns.
    pub fn operation(&self) -> OperationType {
        match self {
            CategoryKind::IncomeSource => OperationType::Add,
            CategoryKind::ExpenseCategory => OperationType::Subtract,
        }
    }
}

impl FromStr for PaymentType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(PaymentType::Cash),
            "card" => Ok(PaymentType::Card),
            other => Err(LedgerError::validation(format!(
                "unknown payment type '{}', expected cash|card",
                other
            ))),
        }
    }
}

impl FromStr for OperationType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "add" => Ok(OperationType::Add),
            "subtract" => Ok(OperationType::Subtract),
            other => Err(LedgerError::validation(format!(
                "unknown operation type '{}', expected add|subtract",
                other
            ))),
        }
    }
}

impl FromStr for CategoryKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income_source" | "income" => Ok(CategoryKind::IncomeSource),
            "expense_category" | "expense" => Ok(CategoryKind::ExpenseCategory),
            other => Err(LedgerError::validation(format!(
                "unknown category type '{}', expected income|expense",
                other
            ))),
        }
    }
}

macro_rules! sql_text_enum {
    ($($ty:ty),*) => {$(
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: LedgerError| FromSqlError::Other(Box::new(e)))
            }
        }
    )*};
}

sql_text_enum!(PaymentType, OperationType, CategoryKind);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub chat_id: i64,
    pub amount: Decimal,
    pub payment_type: PaymentType,
    pub operation_type: OperationType,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub category_id: Option<i64>,
    pub quantity: Option<Decimal>,
    pub unit_price: Option<Decimal>,
    pub cost: Option<Decimal>,
}

impl Transaction {
    pub fn signed_amount(&self) -> Decimal {
        self.operation_type.signed(self.amount)
    }
}

/// A transaction as submitted for appending; id and timestamp are assigned
/// by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub chat_id: i64,
    pub amount: Decimal,
    pub payment_type: PaymentType,
    pub operation_type: OperationType,
    pub description: Option<String>,
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub category_id: Option<i64>,
    pub quantity: Option<Decimal>,
    pub unit_price: Option<Decimal>,
    pub cost: Option<Decimal>,
}

impl NewTransaction {
    pub fn new(
        chat_id: i64,
        amount: Decimal,
        payment_type: PaymentType,
        operation_type: OperationType,
    ) -> Self {
        NewTransaction {
            chat_id,
            amount,
            payment_type,
            operation_type,
            description: None,
            user_id: None,
            username: None,
            category_id: None,
            quantity: None,
            unit_price: None,
            cost: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub chat_id: i64,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: CategoryKind,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub cash: Decimal,
    pub card: Decimal,
}

impl Balance {
    pub fn total(&self) -> LedgerResult<Decimal> {
        self.cash
            .checked_add(self.card)
            .ok_or(LedgerError::Overflow("total balance"))
    }

    pub fn get(&self, payment_type: PaymentType) -> Decimal {
        match payment_type {
            PaymentType::Cash => self.cash,
            PaymentType::Card => self.card,
        }
    }
}
