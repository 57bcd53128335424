//! Financial-statement fields extracted from document text by a language model.

pub mod anthropic;
mod lenient;
pub mod schema;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use schema::{TOOL_DESCRIPTION, TOOL_NAME};

pub const UNKNOWN_COMPANY: &str = "Unknown";

/// Outcome of one extraction call.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityExtraction {
    /// The model returned a matching tool invocation.
    Structured(FinancialEntities),
    /// The call succeeded but the response held no matching tool invocation.
    NoMatch,
    /// The call itself failed.
    CallFailed(String),
}

/// Maps document text onto [`FinancialEntities`].
#[async_trait]
pub trait EntityExtractor: Send + Sync {
    async fn extract(&self, text: &str) -> EntityExtraction;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialEntities {
    #[serde(default = "unknown_company", deserialize_with = "lenient::company")]
    pub company_name: String,
    #[serde(default)]
    pub assets: Assets,
    #[serde(default)]
    pub liabilities_and_equity: LiabilitiesAndEquity,
    #[serde(default)]
    pub income_statement: IncomeStatement,
}

fn unknown_company() -> String {
    UNKNOWN_COMPANY.to_string()
}

impl Default for FinancialEntities {
    /// The canonical "nothing found" record: company "Unknown", every numeric
    /// leaf 0.0.
    fn default() -> Self {
        Self {
            company_name: unknown_company(),
            assets: Assets::default(),
            liabilities_and_equity: LiabilitiesAndEquity::default(),
            income_statement: IncomeStatement::default(),
        }
    }
}

impl FinancialEntities {
    /// Parses a tool-invocation input object. Missing or null leaves become
    /// 0.0; anything that is not an object is rejected.
    pub fn from_tool_input(input: serde_json::Value) -> serde_json::Result<Self> {
        if !input.is_object() {
            return Err(serde::de::Error::custom(format!(
                "expected an object, got {}",
                input
            )));
        }
        serde_json::from_value(input)
    }
}

// Every numeric leaf below accepts numbers, numeric strings or null.

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Assets {
    pub current_assets: CurrentAssets,
    pub non_current_assets: NonCurrentAssets,
    #[serde(deserialize_with = "lenient::number")]
    pub total_assets: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentAssets {
    #[serde(deserialize_with = "lenient::number")]
    pub cash_and_cash_equivalents: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub short_term_investments: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub accounts_receivable: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub inventory: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub prepaid_expenses: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub other_current_assets: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub total_current_assets: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NonCurrentAssets {
    #[serde(deserialize_with = "lenient::number")]
    pub property_plant_and_equipment: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub intangible_assets: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub goodwill: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub long_term_investments: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub other_non_current_assets: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub total_non_current_assets: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiabilitiesAndEquity {
    pub liabilities: Liabilities,
    pub equity: Equity,
    #[serde(deserialize_with = "lenient::number")]
    pub total_liabilities_and_equity: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Liabilities {
    pub current_liabilities: CurrentLiabilities,
    pub non_current_liabilities: NonCurrentLiabilities,
    #[serde(deserialize_with = "lenient::number")]
    pub total_liabilities: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentLiabilities {
    #[serde(deserialize_with = "lenient::number")]
    pub accounts_payable: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub short_term_debt: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub accrued_expenses: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub deferred_revenue: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub other_current_liabilities: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub total_current_liabilities: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NonCurrentLiabilities {
    #[serde(deserialize_with = "lenient::number")]
    pub long_term_debt: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub deferred_tax_liabilities: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub other_non_current_liabilities: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub total_non_current_liabilities: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Equity {
    #[serde(deserialize_with = "lenient::number")]
    pub common_stock: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub additional_paid_in_capital: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub retained_earnings: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub treasury_stock: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub total_equity: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncomeStatement {
    pub revenue: Revenue,
    pub expenses: Expenses,
    #[serde(deserialize_with = "lenient::number")]
    pub operating_income: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub net_income: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Revenue {
    #[serde(deserialize_with = "lenient::number")]
    pub total_revenue: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub cost_of_revenue: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub gross_profit: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Expenses {
    #[serde(deserialize_with = "lenient::number")]
    pub operating_expenses: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub research_and_development: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub selling_general_and_administrative: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub depreciation_and_amortization: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub interest_expense: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub income_tax_expense: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub total_expenses: f64,
}
