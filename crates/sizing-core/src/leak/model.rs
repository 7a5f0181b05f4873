//! Revenue leak input and assessment types

use serde::{Deserialize, Serialize};

use crate::schema::{SchemaError, Validate, Violations};

/// Business metrics to assess
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueLeakInput {
    /// Monthly revenue in currency units
    pub revenue: f64,
    /// Conversion rate in percent (0-100)
    pub conversion_rate: f64,
    /// Lead response time in minutes
    pub response_time_minutes: f64,
}

impl Validate for RevenueLeakInput {
    fn validate(&self) -> Result<(), SchemaError> {
        let mut v = Violations::new();
        v.positive("revenue", self.revenue);
        v.within("conversionRate", self.conversion_rate, 0.0, 100.0);
        v.non_negative("responseTimeMinutes", self.response_time_minutes);
        v.finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    /// low <= 30 < medium <= 70 < high
    pub fn from_score(score: u8) -> Self {
        if score > 70 {
            RiskBand::High
        } else if score > 30 {
            RiskBand::Medium
        } else {
            RiskBand::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskBand::Low => "low",
            RiskBand::Medium => "medium",
            RiskBand::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemediationKind {
    Critical,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Remediation {
    #[serde(rename = "type")]
    pub kind: RemediationKind,
    pub issue: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueLeakResult {
    pub risk_score: u8,
    pub monthly_leak: u64,
    pub band: RiskBand,
    pub remediation: Vec<Remediation>,
}
