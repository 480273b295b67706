//! Plan tiers for the card product.
//!
//! The tier is a closed enumeration; it controls which provider price is
//! charged and whether a PDF document is attached to the confirmation email.

use serde::{Deserialize, Serialize};

/// Product plan tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    /// Card page only.
    Basic,
    /// Card page plus a generated PDF keepsake.
    Premium,
}

impl PlanTier {
    /// Parse a plan string from client input or event metadata.
    ///
    /// `"basic"` maps to `Basic`; anything else is treated as `Premium`,
    /// matching the two-way price selection of the checkout flow.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("basic") {
            Self::Basic
        } else {
            Self::Premium
        }
    }

    /// The wire representation used in metadata and stored records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Premium => "premium",
        }
    }

    /// Whether this tier ships a PDF attachment with the confirmation email.
    pub fn includes_pdf(&self) -> bool {
        matches!(self, Self::Premium)
    }
}
