#[derive(Debug, thiserror::Error)]
pub enum UnitsError {
    #[error("Missing {what}")]
    NullInput { what: &'static str },
    #[error("Cannot parse a number from '{text}' (locale {locale})")]
    MalformedLiteral { text: String, locale: String },
    #[error("Unit '{unit}' not found for quantity {quantity}")]
    UnknownUnit { quantity: String, unit: String },
    #[error("Dimension mismatch: computed {computed}, expected {expected}")]
    DimensionMismatch { computed: String, expected: String },
    #[error("Ratio {ratio} outside the range [0, 1]")]
    RangeViolation { ratio: f64 },
    #[error("Cannot {operation} absolute quantity {quantity}")]
    AbsoluteOperand {
        quantity: String,
        operation: &'static str,
    },
    #[error("Quantity {name} is already registered")]
    DuplicateQuantity { name: String },
    #[error("Invalid definition of {quantity}: {reason}")]
    InvalidDefinition { quantity: String, reason: String },
    #[error("Failed to parse unit table: {0}")]
    Table(#[from] toml::de::Error),
}

pub type Result<T, E = UnitsError> = std::result::Result<T, E>;
