//! Membership plan catalog entries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{Money, PlanId, ValidationError};

use super::proration::{PlanLength, PlanTerms};

/// How long a plan grants access once purchased.
///
/// The catalog only offers this fixed set of durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanDuration {
    #[serde(rename = "1_MONTH")]
    OneMonth,
    #[serde(rename = "3_MONTHS")]
    ThreeMonths,
    #[serde(rename = "6_MONTHS")]
    SixMonths,
    #[serde(rename = "12_MONTHS")]
    TwelveMonths,
    #[serde(rename = "LIFETIME")]
    Lifetime,
}

impl PlanDuration {
    /// Length of the plan window in days, `None` for lifetime.
    pub fn days(&self) -> Option<u32> {
        match self {
            PlanDuration::OneMonth => Some(30),
            PlanDuration::ThreeMonths => Some(90),
            PlanDuration::SixMonths => Some(180),
            PlanDuration::TwelveMonths => Some(365),
            PlanDuration::Lifetime => None,
        }
    }

    pub fn is_lifetime(&self) -> bool {
        matches!(self, PlanDuration::Lifetime)
    }

    pub fn length(&self) -> PlanLength {
        self.days()
            .and_then(PlanLength::days)
            .unwrap_or(PlanLength::Unlimited)
    }

    /// Storage/wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanDuration::OneMonth => "1_MONTH",
            PlanDuration::ThreeMonths => "3_MONTHS",
            PlanDuration::SixMonths => "6_MONTHS",
            PlanDuration::TwelveMonths => "12_MONTHS",
            PlanDuration::Lifetime => "LIFETIME",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PlanDuration::OneMonth => "1 Month",
            PlanDuration::ThreeMonths => "3 Months",
            PlanDuration::SixMonths => "6 Months",
            PlanDuration::TwelveMonths => "12 Months",
            PlanDuration::Lifetime => "Lifetime",
        }
    }
}

impl fmt::Display for PlanDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for PlanDuration {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "1_MONTH" => Ok(PlanDuration::OneMonth),
            "3_MONTHS" => Ok(PlanDuration::ThreeMonths),
            "6_MONTHS" => Ok(PlanDuration::SixMonths),
            "12_MONTHS" => Ok(PlanDuration::TwelveMonths),
            "LIFETIME" => Ok(PlanDuration::Lifetime),
            other => Err(ValidationError::invalid_format(
                "duration",
                format!("unknown plan duration '{}'", other),
            )),
        }
    }
}

/// A purchasable membership plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipPlan {
    pub id: PlanId,
    pub name: String,
    pub duration: PlanDuration,
    /// Price charged, in the smallest currency unit.
    pub price: Money,
    /// List price shown struck-through next to `price`.
    pub original_price: Option<Money>,
    /// Inactive plans stay readable for existing members but cannot be bought.
    pub is_active: bool,
}

impl MembershipPlan {
    /// Creates an active plan.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank.
    pub fn new(
        id: PlanId,
        name: impl Into<String>,
        duration: PlanDuration,
        price: Money,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        Ok(Self {
            id,
            name,
            duration,
            price,
            original_price: None,
            is_active: true,
        })
    }

    pub fn with_original_price(mut self, original_price: Money) -> Self {
        self.original_price = Some(original_price);
        self
    }

    pub fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn is_lifetime(&self) -> bool {
        self.duration.is_lifetime()
    }

    /// The pricing inputs the proration rule needs.
    pub fn terms(&self) -> PlanTerms {
        PlanTerms {
            plan_id: self.id,
            price: self.price,
            length: self.duration.length(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_map_to_days() {
        assert_eq!(PlanDuration::OneMonth.days(), Some(30));
        assert_eq!(PlanDuration::TwelveMonths.days(), Some(365));
        assert_eq!(PlanDuration::Lifetime.days(), None);
    }

    #[test]
    fn lifetime_duration_has_unlimited_length() {
        assert_eq!(PlanDuration::Lifetime.length(), PlanLength::Unlimited);
        assert_eq!(PlanDuration::ThreeMonths.length(), PlanLength::days(90).unwrap());
    }

    #[test]
    fn duration_serializes_as_catalog_code() {
        let json = serde_json::to_string(&PlanDuration::ThreeMonths).unwrap();
        assert_eq!(json, "\"3_MONTHS\"");
        let parsed: PlanDuration = serde_json::from_str("\"LIFETIME\"").unwrap();
        assert_eq!(parsed, PlanDuration::Lifetime);
    }

    #[test]
    fn duration_parses_case_insensitively() {
        assert_eq!("6_months".parse::<PlanDuration>().unwrap(), PlanDuration::SixMonths);
        assert!("2_WEEKS".parse::<PlanDuration>().is_err());
    }

    #[test]
    fn plan_requires_name() {
        let result = MembershipPlan::new(
            PlanId::new(),
            "  ",
            PlanDuration::OneMonth,
            Money::new(100_000).unwrap(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn plan_terms_carry_price_and_length() {
        let plan = MembershipPlan::new(
            PlanId::new(),
            "Quarterly",
            PlanDuration::ThreeMonths,
            Money::new(250_000).unwrap(),
        )
        .unwrap()
        .with_original_price(Money::new(300_000).unwrap());

        let terms = plan.terms();
        assert_eq!(terms.plan_id, plan.id);
        assert_eq!(terms.price.amount(), 250_000);
        assert_eq!(terms.length, PlanLength::days(90).unwrap());
        assert_eq!(plan.original_price.unwrap().amount(), 300_000);
    }
}
