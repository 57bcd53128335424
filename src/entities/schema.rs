use once_cell::sync::Lazy;
use serde_json::{json, Map, Value};

pub const TOOL_NAME: &str = "extract_financial_entities";
pub const TOOL_DESCRIPTION: &str =
    "Extracts the balance sheet and income statement of a company from a financial document.";

fn numbers(fields: &[&str]) -> Map<String, Value> {
    fields
        .iter()
        .map(|field| (field.to_string(), json!({ "type": "number" })))
        .collect()
}

fn object(properties: Map<String, Value>) -> Value {
    json!({ "type": "object", "properties": properties })
}

fn with(mut properties: Map<String, Value>, extra: &[(&str, Value)]) -> Map<String, Value> {
    for (key, value) in extra {
        properties.insert(key.to_string(), value.clone());
    }
    properties
}

/// JSON schema of the tool input. Only the four top-level groups are required.
pub static INPUT_SCHEMA: Lazy<Value> = Lazy::new(|| {
    let current_assets = numbers(&[
        "cash_and_cash_equivalents",
        "short_term_investments",
        "accounts_receivable",
        "inventory",
        "prepaid_expenses",
        "other_current_assets",
        "total_current_assets",
    ]);
    let non_current_assets = numbers(&[
        "property_plant_and_equipment",
        "intangible_assets",
        "goodwill",
        "long_term_investments",
        "other_non_current_assets",
        "total_non_current_assets",
    ]);
    let assets = with(
        numbers(&["total_assets"]),
        &[
            ("current_assets", object(current_assets)),
            ("non_current_assets", object(non_current_assets)),
        ],
    );

    let current_liabilities = numbers(&[
        "accounts_payable",
        "short_term_debt",
        "accrued_expenses",
        "deferred_revenue",
        "other_current_liabilities",
        "total_current_liabilities",
    ]);
    let non_current_liabilities = numbers(&[
        "long_term_debt",
        "deferred_tax_liabilities",
        "other_non_current_liabilities",
        "total_non_current_liabilities",
    ]);
    let liabilities = with(
        numbers(&["total_liabilities"]),
        &[
            ("current_liabilities", object(current_liabilities)),
            ("non_current_liabilities", object(non_current_liabilities)),
        ],
    );
    let equity = numbers(&[
        "common_stock",
        "additional_paid_in_capital",
        "retained_earnings",
        "treasury_stock",
        "total_equity",
    ]);
    let liabilities_and_equity = with(
        numbers(&["total_liabilities_and_equity"]),
        &[
            ("liabilities", object(liabilities)),
            ("equity", object(equity)),
        ],
    );

    let revenue = numbers(&["total_revenue", "cost_of_revenue", "gross_profit"]);
    let expenses = numbers(&[
        "operating_expenses",
        "research_and_development",
        "selling_general_and_administrative",
        "depreciation_and_amortization",
        "interest_expense",
        "income_tax_expense",
        "total_expenses",
    ]);
    let income_statement = with(
        numbers(&["operating_income", "net_income"]),
        &[
            ("revenue", object(revenue)),
            ("expenses", object(expenses)),
        ],
    );

    json!({
        "type": "object",
        "properties": {
            "company_name": { "type": "string" },
            "assets": object(assets),
            "liabilities_and_equity": object(liabilities_and_equity),
            "income_statement": object(income_statement),
        },
        "required": ["company_name", "assets", "liabilities_and_equity", "income_statement"],
    })
});

pub fn tool_definition() -> Value {
    json!({
        "name": TOOL_NAME,
        "description": TOOL_DESCRIPTION,
        "input_schema": INPUT_SCHEMA.clone(),
    })
}

/// The user message sent alongside the tool definition.
pub fn prompt(text: &str) -> String {
    format!(
        "<document>\n{}\n</document>\n\n\
         Use the {} tool to map the financial statements in the document above onto its schema.\n\
         When the statements show several date columns, use the most recent one.\n\
         Apply any scale stated in the document (for example \"in thousands\" or \"in millions\") \
         so every number is in whole currency units.\n\
         If you can't find a specific value, use 0.0 as the default.",
        text, TOOL_NAME
    )
}
