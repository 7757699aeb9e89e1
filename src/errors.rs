use thiserror::Error;

use crate::codec::OrderField;

/// Errors produced while validating, encoding or decoding an [`Order`](crate::orders::Order).
///
/// Every variant is recoverable per record; nothing here should bring a process down.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("malformed record: expected {expected} fields, found {found}")]
    MalformedRecord { expected: usize, found: usize },

    #[error("malformed record: bad escape sequence at byte {position}")]
    BadEscape { position: usize },

    #[error("field {index} ({field}) could not be parsed: `{value}`")]
    FieldParse {
        index: usize,
        field: OrderField,
        value: String,
    },

    #[error("invalid order: {0}")]
    InvalidOrder(String),

    #[error("field {0} contains the record delimiter or a reserved character")]
    DelimiterInField(OrderField),
}

impl OrderError {
    /// True for errors caused by the record's framing rather than a single field.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            OrderError::MalformedRecord { .. } | OrderError::BadEscape { .. }
        )
    }

    /// Positional index of the offending field, if the error names one.
    pub fn field_index(&self) -> Option<usize> {
        match self {
            OrderError::FieldParse { index, .. } => Some(*index),
            OrderError::DelimiterInField(field) => Some(field.index()),
            _ => None,
        }
    }
}

pub type OrderResult<T> = Result<T, OrderError>;
