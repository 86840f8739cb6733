//! Article-level constants and enums.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum length of article names and supplier commercial names.
pub const MAX_NAME_LEN: u64 = 255;

/// Tax category applied to an article's base price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaxCategory {
    General,
    Reduced,
    SuperReduced,
    Exempt,
}

impl TaxCategory {
    pub const ALL: [TaxCategory; 4] = [
        TaxCategory::General,
        TaxCategory::Reduced,
        TaxCategory::SuperReduced,
        TaxCategory::Exempt,
    ];

    /// Stored and wire form.
    pub fn as_str(self) -> &'static str {
        match self {
            TaxCategory::General => "general",
            TaxCategory::Reduced => "reduced",
            TaxCategory::SuperReduced => "super-reduced",
            TaxCategory::Exempt => "exempt",
        }
    }
}

impl fmt::Display for TaxCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaxCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaxCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid tax category '{s}'. Must be one of: general, reduced, \
                     super-reduced, exempt"
                ))
            })
    }
}

/// Lets `sqlx` decode the `tax_category` TEXT column straight into the enum.
impl TryFrom<String> for TaxCategory {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
