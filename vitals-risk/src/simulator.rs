//! Pseudo-random vitals generator for demos and dashboards without devices.
//!
//! Readings are drawn from in-range intervals that depend on a health profile.
//! Scheduling repeated generation belongs to the caller.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use vitals_core::{VitalsError, VitalsSnapshot};

/// Shapes the ranges a simulated subject's readings fall into.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HealthProfile {
    #[default]
    Healthy,
    Diabetes,
    Hypertension,
    Cardiovascular,
}

impl HealthProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthProfile::Healthy => "healthy",
            HealthProfile::Diabetes => "diabetes",
            HealthProfile::Hypertension => "hypertension",
            HealthProfile::Cardiovascular => "cardiovascular",
        }
    }

    fn ranges(&self) -> VitalRanges {
        let healthy = VitalRanges::default();
        match self {
            HealthProfile::Healthy => healthy,
            HealthProfile::Diabetes => VitalRanges {
                glucose: (120, 180),
                ..healthy
            },
            HealthProfile::Hypertension => VitalRanges {
                systolic: (130, 160),
                diastolic: (85, 100),
                ..healthy
            },
            HealthProfile::Cardiovascular => VitalRanges {
                heart_rate: (80, 110),
                systolic: (125, 145),
                ..healthy
            },
        }
    }
}

impl fmt::Display for HealthProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HealthProfile {
    type Err = VitalsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "healthy" => Ok(HealthProfile::Healthy),
            "diabetes" => Ok(HealthProfile::Diabetes),
            "hypertension" => Ok(HealthProfile::Hypertension),
            "cardiovascular" => Ok(HealthProfile::Cardiovascular),
            other => Err(VitalsError::Parse(format!("unknown health profile: {other}"))),
        }
    }
}

/// Inclusive integer ranges the base readings are drawn from.
#[derive(Debug, Clone, Copy)]
struct VitalRanges {
    glucose: (u32, u32),
    systolic: (u32, u32),
    diastolic: (u32, u32),
    heart_rate: (u32, u32),
    oxygen: (u32, u32),
    weight: (u32, u32),
}

impl Default for VitalRanges {
    fn default() -> Self {
        Self {
            glucose: (80, 120),
            systolic: (110, 130),
            diastolic: (70, 85),
            heart_rate: (60, 100),
            oxygen: (95, 100),
            weight: (65, 74),
        }
    }
}

const GLUCOSE_VARIATION_PCT: f64 = 15.0;
const OXYGEN_VARIATION_PCT: f64 = 5.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct VitalsSimulator {
    profile: HealthProfile,
}

impl VitalsSimulator {
    pub fn new(profile: HealthProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> HealthProfile {
        self.profile
    }

    /// Draw one reading for `subject_id`.
    pub fn generate<R: Rng + ?Sized>(&self, subject_id: &str, rng: &mut R) -> VitalsSnapshot {
        let ranges = self.profile.ranges();

        let glucose = with_variation(pick(rng, ranges.glucose), GLUCOSE_VARIATION_PCT, rng);
        let oxygen = with_variation(pick(rng, ranges.oxygen), OXYGEN_VARIATION_PCT, rng).min(100.0);

        VitalsSnapshot {
            subject_id: subject_id.to_string(),
            blood_glucose: Some(glucose),
            systolic_bp: Some(pick(rng, ranges.systolic)),
            diastolic_bp: Some(pick(rng, ranges.diastolic)),
            heart_rate: Some(pick(rng, ranges.heart_rate)),
            oxygen_saturation: Some(oxygen),
            weight: Some(pick(rng, ranges.weight)),
            age: None,
            recorded_at: None,
        }
    }

    pub fn generate_series<R: Rng + ?Sized>(
        &self,
        subject_id: &str,
        count: usize,
        rng: &mut R,
    ) -> Vec<VitalsSnapshot> {
        (0..count).map(|_| self.generate(subject_id, rng)).collect()
    }
}

fn pick<R: Rng + ?Sized>(rng: &mut R, (min, max): (u32, u32)) -> f64 {
    f64::from(rng.gen_range(min..=max))
}

/// Jitter `value` by up to ±`percent`, rounded to one decimal.
fn with_variation<R: Rng + ?Sized>(value: f64, percent: f64, rng: &mut R) -> f64 {
    let jitter = value * (percent / 100.0) * rng.gen_range(-1.0f64..=1.0);
    ((value + jitter) * 10.0).round() / 10.0
}
