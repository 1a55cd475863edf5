use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Expense statistics for one (legal name, region) group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollupRecord {
    #[serde(rename = "RazaoSocial")]
    pub legal_name: String,
    #[serde(rename = "UF")]
    pub region: String,
    #[serde(rename = "Total_Despesas")]
    pub total_expense: Decimal,
    #[serde(rename = "Media_Trimestral")]
    pub mean_quarterly_expense: Decimal,
    /// Sample standard deviation; `None` with fewer than two observations.
    #[serde(rename = "Desvio_Padrao")]
    pub stddev_quarterly_expense: Option<Decimal>,
    #[serde(skip)]
    pub observations: usize,
}
