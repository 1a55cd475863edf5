use crate::models::ExpenseKey;
use crate::utils::Quarter;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row per (tax id, legal name, year, quarter) after the global reduce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedRecord {
    #[serde(rename = "CNPJ")]
    pub tax_id: String,
    #[serde(rename = "RazaoSocial")]
    pub legal_name: String,
    #[serde(rename = "Ano")]
    pub year: i32,
    #[serde(rename = "Trimestre")]
    pub quarter: Quarter,
    #[serde(rename = "ValorDespesas")]
    pub total_expense: Decimal,
}

impl ConsolidatedRecord {
    pub fn new(
        tax_id: String,
        legal_name: String,
        year: i32,
        quarter: Quarter,
        total_expense: Decimal,
    ) -> Self {
        Self {
            tax_id,
            legal_name,
            year,
            quarter,
            total_expense,
        }
    }

    pub fn from_key(key: ExpenseKey, total_expense: Decimal) -> Self {
        Self::new(key.tax_id, key.legal_name, key.year, key.quarter, total_expense)
    }
}

/// A consolidated record with the registry attributes recovered by tax id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    #[serde(rename = "CNPJ")]
    pub tax_id: String,
    #[serde(rename = "RazaoSocial")]
    pub legal_name: String,
    #[serde(rename = "Ano")]
    pub year: i32,
    #[serde(rename = "Trimestre")]
    pub quarter: Quarter,
    #[serde(rename = "ValorDespesas")]
    pub total_expense: Decimal,
    #[serde(rename = "REGISTRO_OPERADORA")]
    pub registration_id: Option<u32>,
    #[serde(rename = "Modalidade")]
    pub category: String,
    #[serde(rename = "UF")]
    pub region: String,
}

impl EnrichedRecord {
    pub fn from_consolidated(
        record: &ConsolidatedRecord,
        registration_id: Option<u32>,
        category: String,
        region: String,
    ) -> Self {
        Self {
            tax_id: record.tax_id.clone(),
            legal_name: record.legal_name.clone(),
            year: record.year,
            quarter: record.quarter,
            total_expense: record.total_expense,
            registration_id,
            category,
            region,
        }
    }

    /// Whether the bulk loader can attach this row to an operator.
    pub fn is_loadable(&self) -> bool {
        self.registration_id.is_some()
    }
}
