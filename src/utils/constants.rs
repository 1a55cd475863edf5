/// Registry column names
pub const REGISTRY_ID_COLUMN: &str = "REGISTRO_OPERADORA";
pub const REGISTRY_TAX_ID_COLUMN: &str = "CNPJ";
pub const REGISTRY_NAME_COLUMN: &str = "Razao_Social";
pub const REGISTRY_CATEGORY_COLUMN: &str = "Modalidade";
pub const REGISTRY_REGION_COLUMN: &str = "UF";

/// Transaction column names
pub const TRANSACTION_DATE_COLUMN: &str = "DATA";
pub const TRANSACTION_ID_COLUMN: &str = "REG_ANS";
pub const TRANSACTION_CODE_COLUMN: &str = "CD_CONTA_CONTABIL";
pub const TRANSACTION_VALUE_COLUMN: &str = "VL_SALDO_FINAL";

/// Archive entry names
pub const CONSOLIDATED_ENTRY: &str = "despesas_consolidadas.csv";
pub const ENRICHED_ENTRY: &str = "despesas_consolidadas_enriquecidas.csv";
pub const ROLLUP_ENTRY: &str = "despesas_agregadas.csv";

/// Sentinels
pub const EXPENSE_CODE_PREFIX: &str = "411";
pub const UNIDENTIFIED_LEGAL_NAME: &str = "RAZAO NAO IDENTIFICADA";
pub const NOT_IDENTIFIED: &str = "NOT IDENTIFIED";

/// Processing defaults
pub const DEFAULT_BLOCK_SIZE: usize = 100_000;
/// The published `Relatorio_cadop.csv` export is `;`-delimited
pub const DEFAULT_REGISTRY_DELIMITER: char = ';';
pub const DEFAULT_TRANSACTION_DELIMITER: char = ';';
pub const DEFAULT_COMPRESSION: &str = "deflate";
pub const DEFAULT_ENCODING: &str = "utf-8";
pub const OUTPUT_DELIMITER: u8 = b';';
pub const STATISTIC_DECIMAL_PLACES: u32 = 2;

/// Tax identifier layout
pub const TAX_ID_LENGTH: usize = 14;
