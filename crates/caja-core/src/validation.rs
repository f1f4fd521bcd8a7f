//! # Validation Module
//!
//! Input checks that run before anything is sent to the backend.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Host UI form                                                  │
//! │  └── Immediate feedback (empty fields)                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Terminal command (Rust)                                       │
//! │  └── THIS MODULE: product draft rules, operator name, amounts           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: REST backend                                                  │
//! │  └── Unique code, stock arbitration ({detail} on rejection)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lengths are counted in characters, not bytes, so `Añejo` is five long.

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::ProductDraft;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum characters in a product code.
pub const MAX_CODE_LEN: usize = 100;

/// Maximum characters in a product name.
pub const MAX_NAME_LEN: usize = 255;

/// Maximum characters in an operator name.
pub const MAX_OPERATOR_LEN: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a product code (SKU / barcode text).
///
/// ```rust
/// use caja_core::validation::validate_code;
///
/// assert!(validate_code("7802100001234").is_ok());
/// assert!(validate_code("  ").is_err());
/// ```
pub fn validate_code(code: &str) -> ValidationResult<()> {
    validate_text("code", code, MAX_CODE_LEN)
}

/// Validates a product display name.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_text("name", name, MAX_NAME_LEN)
}

/// Validates the name of the operator opening the cash box.
pub fn validate_operator_name(operator: &str) -> ValidationResult<()> {
    validate_text("operator_name", operator, MAX_OPERATOR_LEN)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price. Zero is rejected: the store never lists free items.
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a count that may be zero (stock, reorder threshold).
pub fn validate_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Product Draft
// =============================================================================

/// Validates a product create/update body.
///
/// ## Rules
/// ```text
/// code               1..=100 chars
/// name               1..=255 chars
/// purchase_price     > 0
/// sale_price         > 0 and >= purchase_price
/// stock              >= 0
/// reorder_threshold  >= 0
/// ```
///
/// Returns the first failure, checked in the order above.
pub fn validate_product_draft(draft: &ProductDraft) -> ValidationResult<()> {
    validate_code(&draft.code)?;
    validate_product_name(&draft.name)?;
    validate_price("purchase_price", draft.purchase_price)?;
    validate_price("sale_price", draft.sale_price)?;

    if draft.sale_price < draft.purchase_price {
        return Err(ValidationError::BelowField {
            field: "sale_price".to_string(),
            other: "purchase_price".to_string(),
        });
    }

    validate_non_negative("stock", draft.stock)?;
    validate_non_negative("reorder_threshold", draft.reorder_threshold)?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
