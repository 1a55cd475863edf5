use serde::{Deserialize, Serialize};

/// One row of the operator registry (Relatorio_cadop).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorEntry {
    pub registration_id: u32,
    pub tax_id: String,
    pub legal_name: String,
    pub category: String,
    pub region: String,
}

impl OperatorEntry {
    pub fn new(
        registration_id: u32,
        tax_id: String,
        legal_name: String,
        category: String,
        region: String,
    ) -> Self {
        Self {
            registration_id,
            tax_id,
            legal_name,
            category,
            region,
        }
    }
}
