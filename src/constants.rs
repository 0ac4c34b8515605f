/// Vendor endpoint and request defaults
pub const DEFAULT_API_URL: &str = "https://api.adaptiveinsights.com/api/v32";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 3000;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;

pub const CALLER_NAME: &str = "Airbyte - auto";

// Connector names (used for the binaries and logging)
pub const ADAPTIVE_CONNECTOR: &str = "source-adaptive";
pub const ADAPTIVE_INSIGHTS_CONNECTOR: &str = "source-adaptive-insights";

// Stream name prefixes, suffixed with the configured version
pub const EXPORT_DATA_STREAM_PREFIX: &str = "exportData";
pub const EXPORT_DATA_LONG_STREAM_PREFIX: &str = "exportDataLong";

/// Identity columns of a wide export, in output order. Every other column is a period.
pub const ACCOUNT_NAME_COLUMN: &str = "Account Name";
pub const ACCOUNT_CODE_COLUMN: &str = "Account Code";
pub const LEVEL_NAME_COLUMN: &str = "Level Name";
pub const GL_ACCOUNT_COLUMN: &str = "GL Account Name";
pub const LOCATION_COLUMN: &str = "Location Name";
pub const CONTRACT_COLUMN: &str = "Contract Name";
pub const ASSIGNMENT_COLUMN: &str = "Assignment Name";

pub const IDENTITY_COLUMNS: [&str; 7] = [
    ACCOUNT_NAME_COLUMN,
    ACCOUNT_CODE_COLUMN,
    LEVEL_NAME_COLUMN,
    GL_ACCOUNT_COLUMN,
    LOCATION_COLUMN,
    CONTRACT_COLUMN,
    ASSIGNMENT_COLUMN,
];

pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Record ids are reduced modulo 10^12 (twelve decimal digits).
pub const RECORD_ID_MODULUS: u128 = 1_000_000_000_000;

pub const JSON_SCHEMA_DRAFT: &str = "http://json-schema.org/draft-07/schema#";
