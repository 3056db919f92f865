//! # Validation Module
//!
//! Input validation for the PVZ ledger.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Transport (outside this repo)                                │
//! │  └── Decoding, principal resolution                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: PvzService (Rust)                                            │
//! │  └── THIS MODULE: cities, ids, product types, date windows             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (status IN ('in_progress', 'close'))                        │
//! │  ├── Partial UNIQUE index: one open reception per pickup point         │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::{DEFAULT_ALLOWED_CITIES, MAX_PRODUCT_TYPE_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Cities
// =============================================================================

/// The fixed whitelist of cities a pickup point may be registered in.
///
/// ## Example
/// ```rust
/// use pvz_core::AllowedCities;
///
/// let cities = AllowedCities::default();
/// assert!(cities.validate("Moscow").is_ok());
/// assert!(cities.validate("Novosibirsk").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedCities(Vec<String>);

impl AllowedCities {
    /// Number of cities the whitelist must hold.
    pub const SIZE: usize = 3;

    /// Builds a whitelist from configuration.
    ///
    /// ## Rules
    /// - Exactly [`AllowedCities::SIZE`] entries
    /// - No blank entries, no duplicates (after trimming)
    pub fn new<I, S>(cities: I) -> ValidationResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list: Vec<String> = Vec::with_capacity(Self::SIZE);

        for city in cities {
            let city = city.as_ref().trim();
            if city.is_empty() {
                return Err(ValidationError::Required {
                    field: "allowed city".to_string(),
                });
            }
            if list.iter().any(|c| c == city) {
                return Err(ValidationError::InvalidFormat {
                    field: "allowed cities".to_string(),
                    reason: format!("'{}' is listed twice", city),
                });
            }
            list.push(city.to_string());
        }

        if list.len() != Self::SIZE {
            return Err(ValidationError::InvalidFormat {
                field: "allowed cities".to_string(),
                reason: format!("expected {} cities, got {}", Self::SIZE, list.len()),
            });
        }

        Ok(AllowedCities(list))
    }

    /// Checks `city` against the whitelist and returns the canonical spelling.
    pub fn validate(&self, city: &str) -> ValidationResult<String> {
        let city = city.trim();

        if city.is_empty() {
            return Err(ValidationError::Required {
                field: "city".to_string(),
            });
        }

        self.0
            .iter()
            .find(|allowed| allowed.as_str() == city)
            .cloned()
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "city".to_string(),
                allowed: self.0.clone(),
            })
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl Default for AllowedCities {
    fn default() -> Self {
        AllowedCities(DEFAULT_ALLOWED_CITIES.iter().map(|c| c.to_string()).collect())
    }
}

// =============================================================================
// Products
// =============================================================================

/// Validates a product type and returns it trimmed.
///
/// ## Rules
/// - Must not be empty
/// - At most [`MAX_PRODUCT_TYPE_LEN`] characters
pub fn validate_product_type(product_type: &str) -> ValidationResult<String> {
    let product_type = product_type.trim();

    if product_type.is_empty() {
        return Err(ValidationError::Required {
            field: "type".to_string(),
        });
    }

    if product_type.chars().count() > MAX_PRODUCT_TYPE_LEN {
        return Err(ValidationError::TooLong {
            field: "type".to_string(),
            max: MAX_PRODUCT_TYPE_LEN,
        });
    }

    Ok(product_type.to_string())
}

// =============================================================================
// Identifiers
// =============================================================================

/// Parses a UUID supplied by a caller.
///
/// ## Example
/// ```rust
/// use pvz_core::validation::parse_id;
///
/// assert!(parse_id("pvzId", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(parse_id("pvzId", "not-a-uuid").is_err());
/// ```
pub fn parse_id(field: &str, raw: &str) -> ValidationResult<Uuid> {
    let raw = raw.trim();

    if raw.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Uuid::parse_str(raw).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })
}

// =============================================================================
// Date Windows
// =============================================================================

/// Parses an RFC 3339 timestamp and normalizes it to UTC.
pub fn parse_timestamp(field: &str, raw: &str) -> ValidationResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("expected an RFC 3339 timestamp ({})", e),
        })
}

/// Inclusive `[start, end]` filter on reception open time.
pub type DateWindow = (Option<DateTime<Utc>>, Option<DateTime<Utc>>);

/// Parses the optional `startDate`/`endDate` pair of a report request.
///
/// Blank strings count as absent. Both bounds are inclusive.
pub fn parse_report_window(start: Option<&str>, end: Option<&str>) -> ValidationResult<DateWindow> {
    let parse = |field: &str, raw: Option<&str>| -> ValidationResult<Option<DateTime<Utc>>> {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => parse_timestamp(field, raw).map(Some),
            None => Ok(None),
        }
    };

    let start = parse("startDate", start)?;
    let end = parse("endDate", end)?;

    if let (Some(s), Some(e)) = (start, end) {
        if s > e {
            return Err(ValidationError::InvertedRange {
                start_field: "startDate".to_string(),
                end_field: "endDate".to_string(),
            });
        }
    }

    Ok((start, end))
}

// =============================================================================
// Unit Tests
// =============================================================================
