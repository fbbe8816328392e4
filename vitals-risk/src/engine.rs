//! Threshold tables and scoring for the three monitored conditions.
//!
//! Each evaluator accumulates points from the bands that fire, clamps the
//! total to 100 and derives the tier once from the universal breakpoints.
//! Oxygen saturation is the only input allowed to impose a tier floor.

use chrono::{DateTime, Utc};
use vitals_core::{Condition, EngineConfig, RiskInsight, RiskTier, VitalsSnapshot};

const MAX_SEVERITY: u32 = 100;

/// A threshold that fires when the reading is at or above `threshold`.
struct Band {
    threshold: f64,
    points: u32,
    factor: &'static str,
}

impl Band {
    const fn new(threshold: f64, points: u32, factor: &'static str) -> Self {
        Self {
            threshold,
            points,
            factor,
        }
    }
}

// Tables are ordered from the most severe band down; only the first match counts.
const GLUCOSE_BANDS: [Band; 3] = [
    Band::new(200.0, 80, "significantly elevated blood glucose"),
    Band::new(140.0, 60, "elevated blood glucose"),
    Band::new(110.0, 30, "borderline high blood glucose"),
];

const SYSTOLIC_BANDS: [Band; 3] = [
    Band::new(180.0, 50, "extremely high systolic blood pressure"),
    Band::new(140.0, 30, "high systolic blood pressure"),
    Band::new(130.0, 10, "elevated systolic blood pressure"),
];

const DIASTOLIC_BANDS: [Band; 3] = [
    Band::new(120.0, 50, "extremely high diastolic blood pressure"),
    Band::new(90.0, 30, "high diastolic blood pressure"),
    Band::new(80.0, 10, "elevated diastolic blood pressure"),
];

const NORMAL_GLUCOSE_POINTS: u32 = 5;
const NORMAL_GLUCOSE: &str = "normal blood glucose";
const NORMAL_BLOOD_PRESSURE: &str = "blood pressure within normal range";
const NORMAL_CARDIOVASCULAR: &str = "cardiovascular vitals within normal range";

const HEAVY_WEIGHT_KG: f64 = 100.0;
const SENIOR_AGE: f64 = 60.0;
const MIDDLE_AGE: f64 = 40.0;

const TACHYCARDIA_BPM: f64 = 100.0;
const BRADYCARDIA_BPM: f64 = 60.0;
const STRAIN_SYSTOLIC: f64 = 140.0;
const STRAIN_DIASTOLIC: f64 = 90.0;
const HYPOXEMIA_SPO2: f64 = 90.0;
const LOW_NORMAL_SPO2: f64 = 95.0;

/// Recommendation text per tier for one condition.
struct Advice {
    critical: &'static str,
    high: &'static str,
    moderate: &'static str,
    low: &'static str,
}

impl Advice {
    fn for_tier(&self, tier: RiskTier) -> &'static str {
        match tier {
            RiskTier::Critical => self.critical,
            RiskTier::High => self.high,
            RiskTier::Moderate => self.moderate,
            RiskTier::Low => self.low,
        }
    }
}

const DIABETES_ADVICE: Advice = Advice {
    critical: "URGENT: Contact your healthcare provider immediately. Blood glucose is at a dangerous level.",
    high: "Schedule an appointment with your healthcare provider. Reduce sugar intake and monitor glucose levels carefully.",
    moderate: "Monitor blood glucose more frequently. Reduce refined carbohydrates and increase physical activity.",
    low: "Continue healthy eating habits and regular exercise.",
};

const HYPERTENSION_ADVICE: Advice = Advice {
    critical: "URGENT: Seek immediate medical attention. Your blood pressure is at a crisis level.",
    high: "Contact your healthcare provider today. Consider medication adjustment and lifestyle changes.",
    moderate: "Reduce sodium intake and schedule a follow-up with your healthcare provider.",
    low: "Maintain a low-sodium diet. Continue regular blood pressure monitoring.",
};

const CARDIOVASCULAR_ADVICE: Advice = Advice {
    critical: "URGENT: Seek immediate cardiology attention. Multiple cardiovascular risk factors detected.",
    high: "Schedule an appointment with a cardiologist. Consider a medication review and lifestyle adjustments.",
    moderate: "Increase regular cardio exercise and keep monitoring heart rate and oxygen levels.",
    low: "Maintain heart-healthy habits including regular exercise and a balanced diet.",
};

#[derive(Default)]
struct Score {
    points: u32,
    factors: Vec<String>,
    floor: Option<RiskTier>,
}

impl Score {
    fn add(&mut self, points: u32, factor: &str) {
        self.points = self.points.saturating_add(points);
        self.factors.push(factor.to_string());
    }

    fn add_band(&mut self, band: &Band) {
        self.add(band.points, band.factor);
    }

    fn raise_floor(&mut self, tier: RiskTier) {
        self.floor = Some(self.floor.map_or(tier, |current| current.max(tier)));
    }

    fn severity(&self) -> u8 {
        // Bounded by MAX_SEVERITY, so the narrowing is lossless.
        self.points.min(MAX_SEVERITY) as u8
    }

    fn tier(&self) -> RiskTier {
        let tier = RiskTier::from_severity(self.severity());
        self.floor.map_or(tier, |floor| tier.max(floor))
    }

    fn into_insight(
        self,
        snapshot: &VitalsSnapshot,
        condition: Condition,
        advice: &Advice,
        at: DateTime<Utc>,
    ) -> RiskInsight {
        let severity = self.severity();
        let risk_tier = self.tier();
        RiskInsight {
            subject_id: snapshot.subject_id.clone(),
            condition,
            severity,
            risk_tier,
            factors: self.factors,
            recommendation: advice.for_tier(risk_tier).to_string(),
            timestamp: at,
        }
    }
}

fn highest_band(bands: &[Band], value: f64) -> Option<&Band> {
    bands.iter().find(|band| value >= band.threshold)
}

/// Diabetes risk from blood glucose, with weight and age as secondary inputs.
pub fn evaluate_diabetes(snapshot: &VitalsSnapshot, config: &EngineConfig) -> Option<RiskInsight> {
    evaluate_diabetes_at(snapshot, config, Utc::now())
}

pub fn evaluate_diabetes_at(
    snapshot: &VitalsSnapshot,
    config: &EngineConfig,
    at: DateTime<Utc>,
) -> Option<RiskInsight> {
    let glucose = snapshot.blood_glucose?;
    let mut score = Score::default();

    match highest_band(&GLUCOSE_BANDS, glucose) {
        Some(band) => score.add_band(band),
        None => score.add(NORMAL_GLUCOSE_POINTS, NORMAL_GLUCOSE),
    }

    // Body metrics only count when the reading carries a weight; age falls
    // back to the configured default.
    if let Some(weight) = snapshot.weight {
        if weight > HEAVY_WEIGHT_KG {
            score.add(15, "body weight above 100 kg");
        }

        let age = snapshot.effective_age(config);
        if age > SENIOR_AGE {
            score.add(10, "age over 60");
        } else if age > MIDDLE_AGE {
            score.add(5, "age over 40");
        }
    }

    Some(score.into_insight(snapshot, Condition::Diabetes, &DIABETES_ADVICE, at))
}

/// Hypertension risk; needs both systolic and diastolic pressure.
pub fn evaluate_hypertension(
    snapshot: &VitalsSnapshot,
    config: &EngineConfig,
) -> Option<RiskInsight> {
    evaluate_hypertension_at(snapshot, config, Utc::now())
}

pub fn evaluate_hypertension_at(
    snapshot: &VitalsSnapshot,
    _config: &EngineConfig,
    at: DateTime<Utc>,
) -> Option<RiskInsight> {
    let (systolic, diastolic) = snapshot.blood_pressure()?;
    let mut score = Score::default();

    if let Some(band) = highest_band(&SYSTOLIC_BANDS, systolic) {
        score.add_band(band);
    }
    if let Some(band) = highest_band(&DIASTOLIC_BANDS, diastolic) {
        score.add_band(band);
    }
    if score.factors.is_empty() {
        score.add(0, NORMAL_BLOOD_PRESSURE);
    }

    Some(score.into_insight(
        snapshot,
        Condition::Hypertension,
        &HYPERTENSION_ADVICE,
        at,
    ))
}

/// Cardiovascular risk from heart rate, blood pressure and oxygen saturation.
/// Any one of the three inputs is enough.
pub fn evaluate_cardiovascular(
    snapshot: &VitalsSnapshot,
    config: &EngineConfig,
) -> Option<RiskInsight> {
    evaluate_cardiovascular_at(snapshot, config, Utc::now())
}

pub fn evaluate_cardiovascular_at(
    snapshot: &VitalsSnapshot,
    _config: &EngineConfig,
    at: DateTime<Utc>,
) -> Option<RiskInsight> {
    let blood_pressure = snapshot.blood_pressure();
    if snapshot.heart_rate.is_none()
        && blood_pressure.is_none()
        && snapshot.oxygen_saturation.is_none()
    {
        return None;
    }

    let mut score = Score::default();

    if let Some(heart_rate) = snapshot.heart_rate {
        if heart_rate > TACHYCARDIA_BPM {
            score.add(20, "elevated heart rate");
        } else if heart_rate < BRADYCARDIA_BPM {
            score.add(15, "low heart rate");
        }
    }

    if let Some((systolic, diastolic)) = blood_pressure {
        if systolic >= STRAIN_SYSTOLIC || diastolic >= STRAIN_DIASTOLIC {
            score.add(25, "blood pressure strain");
        }
    }

    if let Some(saturation) = snapshot.oxygen_saturation {
        if saturation < HYPOXEMIA_SPO2 {
            score.add(40, "low oxygen saturation");
            score.raise_floor(RiskTier::Critical);
        } else if saturation < LOW_NORMAL_SPO2 {
            score.add(20, "below-normal oxygen saturation");
            score.raise_floor(RiskTier::Moderate);
        }
    }

    if score.factors.is_empty() {
        score.add(0, NORMAL_CARDIOVASCULAR);
    }

    Some(score.into_insight(
        snapshot,
        Condition::Cardiovascular,
        &CARDIOVASCULAR_ADVICE,
        at,
    ))
}

/// Run every condition model against one snapshot.
///
/// Conditions whose required inputs are missing are skipped. Callers must not
/// rely on the order of the returned insights.
pub fn analyze(snapshot: &VitalsSnapshot, config: &EngineConfig) -> Vec<RiskInsight> {
    analyze_at(snapshot, config, Utc::now())
}

pub fn analyze_at(
    snapshot: &VitalsSnapshot,
    config: &EngineConfig,
    at: DateTime<Utc>,
) -> Vec<RiskInsight> {
    let implausible = snapshot.implausible_fields();
    if !implausible.is_empty() {
        tracing::warn!(
            subject = %snapshot.subject_id,
            fields = ?implausible,
            "Scoring snapshot with implausible vitals"
        );
    }

    let insights: Vec<RiskInsight> = [
        evaluate_diabetes_at(snapshot, config, at),
        evaluate_hypertension_at(snapshot, config, at),
        evaluate_cardiovascular_at(snapshot, config, at),
    ]
    .into_iter()
    .flatten()
    .collect();

    for insight in &insights {
        tracing::debug!(
            subject = %insight.subject_id,
            condition = %insight.condition,
            severity = insight.severity,
            tier = %insight.risk_tier,
            "Risk insight produced"
        );
    }

    insights
}

/// Whether an insight goes down the urgent alert path: severity above the
/// configured threshold, or a critical tier.
pub fn needs_urgent_attention(insight: &RiskInsight, config: &EngineConfig) -> bool {
    insight.severity > config.alert_severity_threshold || insight.is_critical()
}

pub fn urgent_insights<'a>(
    insights: &'a [RiskInsight],
    config: &EngineConfig,
) -> Vec<&'a RiskInsight> {
    insights
        .iter()
        .filter(|insight| needs_urgent_attention(insight, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap()
    }

    fn subject() -> VitalsSnapshot {
        VitalsSnapshot::new("patient-7")
    }

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn glucose_above_200_is_critical() {
        let insight =
            evaluate_diabetes_at(&subject().with_blood_glucose(210.0), &config(), at()).unwrap();
        assert_eq!(insight.condition, Condition::Diabetes);
        assert_eq!(insight.severity, 80);
        assert_eq!(insight.risk_tier, RiskTier::Critical);
        assert_eq!(insight.factors, vec!["significantly elevated blood glucose"]);
        assert!(insight.recommendation.starts_with("URGENT"));
        assert_eq!(insight.timestamp, at());
    }

    #[test]
    fn glucose_bands_use_lower_bound_inclusive() {
        let cases = [
            (200.0, 80, RiskTier::Critical),
            (199.9, 60, RiskTier::High),
            (140.0, 60, RiskTier::High),
            (139.0, 30, RiskTier::Moderate),
            (110.0, 30, RiskTier::Moderate),
            (109.9, 5, RiskTier::Low),
        ];
        for (glucose, severity, tier) in cases {
            let insight =
                evaluate_diabetes_at(&subject().with_blood_glucose(glucose), &config(), at())
                    .unwrap();
            assert_eq!(insight.severity, severity, "glucose {glucose}");
            assert_eq!(insight.risk_tier, tier, "glucose {glucose}");
        }
    }

    #[test]
    fn normal_glucose_still_emits_low_insight() {
        let insight =
            evaluate_diabetes_at(&subject().with_blood_glucose(92.0), &config(), at()).unwrap();
        assert_eq!(insight.severity, 5);
        assert_eq!(insight.risk_tier, RiskTier::Low);
        assert_eq!(insight.factors, vec!["normal blood glucose"]);
        assert_eq!(
            insight.recommendation,
            "Continue healthy eating habits and regular exercise."
        );
    }

    #[test]
    fn weight_and_age_add_to_glucose_band() {
        let snapshot = subject()
            .with_blood_glucose(150.0)
            .with_weight(112.0)
            .with_age(67.0);
        let insight = evaluate_diabetes_at(&snapshot, &config(), at()).unwrap();
        assert_eq!(insight.severity, 85);
        assert_eq!(insight.risk_tier, RiskTier::Critical);
        assert_eq!(
            insight.factors,
            vec!["elevated blood glucose", "body weight above 100 kg", "age over 60"]
        );
    }

    #[test]
    fn default_age_applies_once_weight_is_known() {
        let snapshot = subject().with_blood_glucose(120.0).with_weight(70.0);
        let insight = evaluate_diabetes_at(&snapshot, &config(), at()).unwrap();
        assert_eq!(insight.severity, 35);
        assert_eq!(
            insight.factors,
            vec!["borderline high blood glucose", "age over 40"]
        );

        let young = EngineConfig {
            default_age: 30.0,
            ..config()
        };
        let insight = evaluate_diabetes_at(&snapshot, &young, at()).unwrap();
        assert_eq!(insight.severity, 30);
    }

    #[test]
    fn diabetes_severity_is_clamped() {
        let snapshot = subject()
            .with_blood_glucose(420.0)
            .with_weight(140.0)
            .with_age(80.0);
        let insight = evaluate_diabetes_at(&snapshot, &config(), at()).unwrap();
        assert_eq!(insight.severity, 100);
        assert_eq!(insight.factors.len(), 3);
    }

    #[test]
    fn diabetes_needs_glucose() {
        let snapshot = subject().with_weight(130.0).with_age(70.0);
        assert!(evaluate_diabetes_at(&snapshot, &config(), at()).is_none());
    }

    #[test]
    fn hypertensive_crisis_clamps_to_100() {
        let snapshot = subject().with_blood_pressure(185.0, 125.0);
        let insight = evaluate_hypertension_at(&snapshot, &config(), at()).unwrap();
        assert_eq!(insight.severity, 100);
        assert_eq!(insight.risk_tier, RiskTier::Critical);
        assert_eq!(
            insight.factors,
            vec![
                "extremely high systolic blood pressure",
                "extremely high diastolic blood pressure"
            ]
        );
    }

    #[test]
    fn hypertension_takes_highest_band_per_side() {
        let snapshot = subject().with_blood_pressure(150.0, 85.0);
        let insight = evaluate_hypertension_at(&snapshot, &config(), at()).unwrap();
        assert_eq!(insight.severity, 40);
        assert_eq!(insight.risk_tier, RiskTier::Moderate);
        assert_eq!(
            insight.factors,
            vec!["high systolic blood pressure", "elevated diastolic blood pressure"]
        );
    }

    #[test]
    fn stage_two_on_both_sides_is_high() {
        let snapshot = subject().with_blood_pressure(160.0, 95.0);
        let insight = evaluate_hypertension_at(&snapshot, &config(), at()).unwrap();
        assert_eq!(insight.severity, 60);
        assert_eq!(insight.risk_tier, RiskTier::High);
        assert!(insight.recommendation.starts_with("Contact your healthcare provider today"));
    }

    #[test]
    fn normal_pressure_emits_low_insight() {
        let snapshot = subject().with_blood_pressure(118.0, 76.0);
        let insight = evaluate_hypertension_at(&snapshot, &config(), at()).unwrap();
        assert_eq!(insight.severity, 0);
        assert_eq!(insight.risk_tier, RiskTier::Low);
        assert_eq!(insight.factors, vec!["blood pressure within normal range"]);
    }

    #[test]
    fn half_a_blood_pressure_is_ignored() {
        let mut snapshot = subject().with_heart_rate(72.0);
        snapshot.systolic_bp = Some(190.0);

        assert!(evaluate_hypertension_at(&snapshot, &config(), at()).is_none());

        let cardio = evaluate_cardiovascular_at(&snapshot, &config(), at()).unwrap();
        assert_eq!(cardio.severity, 0);
        assert!(!cardio.factors.iter().any(|f| f == "blood pressure strain"));
    }

    #[test]
    fn resting_heart_and_good_oxygen_are_low() {
        let snapshot = subject().with_heart_rate(70.0).with_oxygen_saturation(99.0);
        let insight = evaluate_cardiovascular_at(&snapshot, &config(), at()).unwrap();
        assert_eq!(insight.severity, 0);
        assert_eq!(insight.risk_tier, RiskTier::Low);
        assert_eq!(
            insight.factors,
            vec!["cardiovascular vitals within normal range"]
        );
    }

    #[test]
    fn low_oxygen_forces_critical_tier() {
        let snapshot = subject().with_oxygen_saturation(87.0);
        let insight = evaluate_cardiovascular_at(&snapshot, &config(), at()).unwrap();
        assert_eq!(insight.severity, 40);
        assert_eq!(insight.risk_tier, RiskTier::Critical);
        assert_eq!(insight.factors, vec!["low oxygen saturation"]);
    }

    #[test]
    fn borderline_oxygen_sets_moderate_floor() {
        let snapshot = subject().with_oxygen_saturation(94.0);
        let insight = evaluate_cardiovascular_at(&snapshot, &config(), at()).unwrap();
        assert_eq!(insight.severity, 20);
        assert_eq!(insight.risk_tier, RiskTier::Moderate);

        let snapshot = subject().with_oxygen_saturation(90.0);
        let insight = evaluate_cardiovascular_at(&snapshot, &config(), at()).unwrap();
        assert_eq!(insight.factors, vec!["below-normal oxygen saturation"]);

        let snapshot = subject().with_oxygen_saturation(95.0);
        let insight = evaluate_cardiovascular_at(&snapshot, &config(), at()).unwrap();
        assert_eq!(insight.severity, 0);
    }

    #[test]
    fn floor_never_lowers_breakpoint_tier() {
        let snapshot = subject()
            .with_heart_rate(130.0)
            .with_blood_pressure(150.0, 95.0)
            .with_oxygen_saturation(92.0);
        let insight = evaluate_cardiovascular_at(&snapshot, &config(), at()).unwrap();
        assert_eq!(insight.severity, 65);
        assert_eq!(insight.risk_tier, RiskTier::High);
        assert_eq!(
            insight.factors,
            vec![
                "elevated heart rate",
                "blood pressure strain",
                "below-normal oxygen saturation"
            ]
        );
    }

    #[test]
    fn slow_heart_rate_is_flagged() {
        let snapshot = subject().with_heart_rate(48.0);
        let insight = evaluate_cardiovascular_at(&snapshot, &config(), at()).unwrap();
        assert_eq!(insight.severity, 15);
        assert_eq!(insight.risk_tier, RiskTier::Low);
        assert_eq!(insight.factors, vec!["low heart rate"]);
    }

    #[test]
    fn cardiovascular_needs_some_input() {
        let snapshot = subject().with_blood_glucose(100.0).with_weight(90.0);
        assert!(evaluate_cardiovascular_at(&snapshot, &config(), at()).is_none());
    }

    #[test]
    fn empty_snapshot_yields_nothing() {
        assert!(analyze_at(&subject(), &config(), at()).is_empty());
    }

    #[test]
    fn healthy_snapshot_is_low_everywhere() {
        let snapshot = subject()
            .with_blood_glucose(90.0)
            .with_blood_pressure(110.0, 70.0)
            .with_heart_rate(65.0);
        let insights = analyze_at(&snapshot, &config(), at());
        assert_eq!(insights.len(), 3);
        assert!(insights.iter().all(|i| i.risk_tier == RiskTier::Low));
        assert!(urgent_insights(&insights, &config()).is_empty());
    }

    #[test]
    fn analyze_is_repeatable_for_a_fixed_instant() {
        let snapshot = subject()
            .with_blood_glucose(171.0)
            .with_blood_pressure(142.0, 88.0)
            .with_oxygen_saturation(91.0);
        assert_eq!(
            analyze_at(&snapshot, &config(), at()),
            analyze_at(&snapshot, &config(), at())
        );
    }

    #[test]
    fn implausible_values_are_scored_anyway() {
        let snapshot = subject().with_heart_rate(-12.0);
        let insights = analyze_at(&snapshot, &config(), at());
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].factors, vec!["low heart rate"]);
    }

    #[test]
    fn alert_threshold_is_independent_of_tiers() {
        let snapshot = subject().with_blood_glucose(150.0).with_weight(105.0);
        let insight = evaluate_diabetes_at(&snapshot, &config(), at()).unwrap();
        // 60 + 15 + 5 (default age 45)
        assert_eq!(insight.severity, 80);
        assert!(needs_urgent_attention(&insight, &config()));

        let high = RiskInsight {
            severity: 72,
            risk_tier: RiskTier::High,
            ..insight.clone()
        };
        assert!(needs_urgent_attention(&high, &config()));

        let strict = EngineConfig {
            alert_severity_threshold: 90,
            ..config()
        };
        assert!(!needs_urgent_attention(&high, &strict));
        assert!(needs_urgent_attention(&insight, &strict));
    }

    #[test]
    fn critical_tier_alerts_below_threshold() {
        let snapshot = subject().with_oxygen_saturation(85.0);
        let insight = evaluate_cardiovascular_at(&snapshot, &config(), at()).unwrap();
        assert_eq!(insight.severity, 40);
        assert!(needs_urgent_attention(&insight, &config()));
    }
}
