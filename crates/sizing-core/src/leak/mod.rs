//! Revenue leak scoring
//!
//! Turns conversion rate and lead response time into a 0-100 risk score,
//! an estimated monthly loss and an ordered remediation list.

mod model;

pub use model::{
    Remediation, RemediationKind, RevenueLeakInput, RevenueLeakResult, RiskBand,
};

use tracing::debug;

/// Conversion rate (percent) treated as healthy
pub const BASELINE_CONVERSION: f64 = 3.0;
/// Response time (minutes) with no risk attached
pub const RESPONSE_FREE_MINUTES: f64 = 5.0;
/// Response time (minutes) at which time risk saturates
pub const RESPONSE_SATURATION_MINUTES: f64 = 60.0;

pub const CONVERSION_WEIGHT: f64 = 0.6;
pub const RESPONSE_WEIGHT: f64 = 0.4;

/// Fraction of revenue lost at full risk
pub const LEAK_FACTOR: f64 = 0.30;

/// Below this conversion rate checkout friction is flagged
pub const CHECKOUT_FRICTION_CONVERSION: f64 = 1.5;
/// Above this response time intake latency becomes critical
pub const CRITICAL_RESPONSE_MINUTES: f64 = 30.0;

impl RevenueLeakInput {
    pub fn score(&self) -> RevenueLeakResult {
        score_leak(self.revenue, self.conversion_rate, self.response_time_minutes)
    }
}

/// Score revenue leak risk
pub fn score_leak(
    revenue: f64,
    conversion_rate: f64,
    response_time_minutes: f64,
) -> RevenueLeakResult {
    let conv_risk = ((BASELINE_CONVERSION - conversion_rate) / 2.5).clamp(0.0, 1.0);
    let time_risk = ((response_time_minutes - RESPONSE_FREE_MINUTES)
        / (RESPONSE_SATURATION_MINUTES - RESPONSE_FREE_MINUTES))
        .clamp(0.0, 1.0);

    let weighted = conv_risk * CONVERSION_WEIGHT + time_risk * RESPONSE_WEIGHT;
    let risk_score = (weighted * 100.0).round().clamp(0.0, 100.0) as u8;
    let monthly_leak = (revenue * weighted * LEAK_FACTOR).round().max(0.0) as u64;
    let band = RiskBand::from_score(risk_score);

    let remediation = remediation_for(band, conversion_rate, response_time_minutes);

    debug!(
        risk_score = risk_score,
        band = band.as_str(),
        monthly_leak = monthly_leak,
        "Revenue leak scored"
    );

    RevenueLeakResult {
        risk_score,
        monthly_leak,
        band,
        remediation,
    }
}

fn remediation_for(band: RiskBand, conversion_rate: f64, response_time_minutes: f64) -> Vec<Remediation> {
    let mut items = Vec::new();

    if conversion_rate < CHECKOUT_FRICTION_CONVERSION {
        items.push(Remediation {
            kind: RemediationKind::Critical,
            issue: format!("Conversion rate of {conversion_rate}% indicates checkout friction."),
            action: "Optimize checkout flow friction (likely drop-off point).".to_string(),
            link: Some("/services#conversion".to_string()),
        });
    }

    if response_time_minutes > RESPONSE_FREE_MINUTES {
        let kind = if response_time_minutes > CRITICAL_RESPONSE_MINUTES {
            RemediationKind::Critical
        } else {
            RemediationKind::Warning
        };
        items.push(Remediation {
            kind,
            issue: format!("Leads wait {response_time_minutes} minutes for a first response."),
            action: "Automate initial lead response (< 5 mins).".to_string(),
            link: Some("/services#automation".to_string()),
        });
    }

    match band {
        RiskBand::High => items.push(Remediation {
            kind: RemediationKind::Critical,
            issue: "Combined risk indicates systemic revenue loss.".to_string(),
            action: "Full architectural audit recommended.".to_string(),
            link: Some("/contact".to_string()),
        }),
        RiskBand::Medium => items.push(Remediation {
            kind: RemediationKind::Warning,
            issue: "Moderate leakage across the funnel.".to_string(),
            action: "Prioritise targeted funnel optimization.".to_string(),
            link: Some("/services".to_string()),
        }),
        RiskBand::Low => {}
    }

    if items.is_empty() {
        items.push(Remediation {
            kind: RemediationKind::Info,
            issue: "Systems nominal.".to_string(),
            action: "Systems healthy. Focus on scaling traffic.".to_string(),
            link: None,
        });
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_risk_scenario() {
        let result = score_leak(100_000.0, 1.0, 45.0);

        // conv 0.8, time 40/55; 0.48 + 0.2909 = 0.7709
        assert_eq!(result.risk_score, 77);
        assert_eq!(result.band, RiskBand::High);
        assert_eq!(result.monthly_leak, 23127);

        let kinds: Vec<_> = result.remediation.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RemediationKind::Critical,
                RemediationKind::Critical,
                RemediationKind::Critical
            ]
        );
        assert_eq!(result.remediation[2].link.as_deref(), Some("/contact"));
    }

    #[test]
    fn test_healthy_business_is_nominal() {
        let result = score_leak(50_000.0, 4.0, 2.0);

        assert_eq!(result.risk_score, 0);
        assert_eq!(result.monthly_leak, 0);
        assert_eq!(result.band, RiskBand::Low);
        assert_eq!(result.remediation.len(), 1);
        assert_eq!(result.remediation[0].kind, RemediationKind::Info);
        assert!(result.remediation[0].link.is_none());
    }

    #[test]
    fn test_slow_response_warns_below_thirty_minutes() {
        let result = score_leak(50_000.0, 3.0, 20.0);

        // time risk 15/55 -> score 11
        assert_eq!(result.risk_score, 11);
        assert_eq!(result.band, RiskBand::Low);
        assert_eq!(result.remediation.len(), 1);
        assert_eq!(result.remediation[0].kind, RemediationKind::Warning);
    }

    #[test]
    fn test_medium_band_adds_optimization_entry() {
        let result = score_leak(50_000.0, 2.0, 30.0);

        // conv 0.4 * 0.6 = 0.24, time 25/55 * 0.4 = 0.1818 -> 42
        assert_eq!(result.risk_score, 42);
        assert_eq!(result.band, RiskBand::Medium);
        let last = result.remediation.last().unwrap();
        assert_eq!(last.kind, RemediationKind::Warning);
        assert_eq!(result.remediation.len(), 2);
    }

    #[test]
    fn test_conversion_risk_saturates_near_zero() {
        let full = score_leak(10_000.0, 0.0, 0.0);
        let quarter = score_leak(10_000.0, 0.5, 0.0);

        assert_eq!(full.risk_score, 60);
        assert_eq!(quarter.risk_score, 60);
        assert_eq!(full.monthly_leak, 1800);
    }

    #[test]
    fn test_maximum_risk() {
        let result = score_leak(1_000.0, 0.0, 120.0);
        assert_eq!(result.risk_score, 100);
        assert_eq!(result.monthly_leak, 300);
    }

    #[test]
    fn test_band_partition() {
        for score in 0..=100u8 {
            let band = RiskBand::from_score(score);
            let expected = if score <= 30 {
                RiskBand::Low
            } else if score <= 70 {
                RiskBand::Medium
            } else {
                RiskBand::High
            };
            assert_eq!(band, expected);
        }
    }

    #[test]
    fn test_input_validation() {
        let err = crate::schema::parse_request::<RevenueLeakInput>(
            br#"{"revenue": 0, "conversionRate": 120, "responseTimeMinutes": -1}"#,
        )
        .unwrap_err();
        let fields: Vec<_> = err.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["revenue", "conversionRate", "responseTimeMinutes"]);
    }

    #[test]
    fn test_input_score_matches_function() {
        let input = RevenueLeakInput {
            revenue: 75_000.0,
            conversion_rate: 1.2,
            response_time_minutes: 12.0,
        };
        assert_eq!(input.score(), score_leak(75_000.0, 1.2, 12.0));
    }
}
