//! Mô hình dữ liệu lõi cho engine đánh giá nguy cơ từ chỉ số sống.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cấu hình engine: ngưỡng cảnh báo và giá trị mặc định.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Severity (0-100) lớn hơn ngưỡng này sẽ đi vào luồng cảnh báo khẩn.
    /// Độc lập với các mốc phân tầng nguy cơ.
    pub alert_severity_threshold: u8,
    /// Tuổi giả định (năm) khi snapshot không có tuổi.
    pub default_age: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            alert_severity_threshold: 70,
            default_age: 45.0,
        }
    }
}

/// Nhóm bệnh lý được theo dõi.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Diabetes,
    Hypertension,
    Cardiovascular,
}

impl Condition {
    pub const ALL: [Condition; 3] = [
        Condition::Diabetes,
        Condition::Hypertension,
        Condition::Cardiovascular,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Diabetes => "diabetes",
            Condition::Hypertension => "hypertension",
            Condition::Cardiovascular => "cardiovascular",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tầng nguy cơ, sắp xếp tăng dần theo mức độ nghiêm trọng.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskTier {
    /// Phân tầng theo các mốc cố định: <20, <50, <75, còn lại.
    pub fn from_severity(severity: u8) -> Self {
        match severity {
            0..=19 => RiskTier::Low,
            20..=49 => RiskTier::Moderate,
            50..=74 => RiskTier::High,
            _ => RiskTier::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Moderate => "moderate",
            RiskTier::High => "high",
            RiskTier::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Một lần đo chỉ số sống của một người.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VitalsSnapshot {
    pub subject_id: String,
    /// mg/dL
    #[serde(default)]
    pub blood_glucose: Option<f64>,
    /// mmHg
    #[serde(default, rename = "systolicBP")]
    pub systolic_bp: Option<f64>,
    /// mmHg
    #[serde(default, rename = "diastolicBP")]
    pub diastolic_bp: Option<f64>,
    /// nhịp/phút
    #[serde(default)]
    pub heart_rate: Option<f64>,
    /// phần trăm, 0-100
    #[serde(default)]
    pub oxygen_saturation: Option<f64>,
    /// kg
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub age: Option<f64>,
    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
}

impl VitalsSnapshot {
    pub fn new(subject_id: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            ..Self::default()
        }
    }

    pub fn with_blood_glucose(mut self, value: f64) -> Self {
        self.blood_glucose = Some(value);
        self
    }

    pub fn with_blood_pressure(mut self, systolic: f64, diastolic: f64) -> Self {
        self.systolic_bp = Some(systolic);
        self.diastolic_bp = Some(diastolic);
        self
    }

    pub fn with_heart_rate(mut self, value: f64) -> Self {
        self.heart_rate = Some(value);
        self
    }

    pub fn with_oxygen_saturation(mut self, value: f64) -> Self {
        self.oxygen_saturation = Some(value);
        self
    }

    pub fn with_weight(mut self, value: f64) -> Self {
        self.weight = Some(value);
        self
    }

    pub fn with_age(mut self, value: f64) -> Self {
        self.age = Some(value);
        self
    }

    /// Cặp (tâm thu, tâm trương) khi có đủ cả hai giá trị.
    pub fn blood_pressure(&self) -> Option<(f64, f64)> {
        Some((self.systolic_bp?, self.diastolic_bp?))
    }

    /// Tuổi thực tế hoặc tuổi mặc định theo cấu hình.
    pub fn effective_age(&self, config: &EngineConfig) -> f64 {
        self.age.unwrap_or(config.default_age)
    }

    /// Tên các trường mang giá trị phi sinh lý (không hữu hạn, âm,
    /// SpO2 trên 100). Chỉ dùng để cảnh báo, không chặn việc tính điểm.
    pub fn implausible_fields(&self) -> Vec<&'static str> {
        let fields = [
            ("bloodGlucose", self.blood_glucose),
            ("systolicBP", self.systolic_bp),
            ("diastolicBP", self.diastolic_bp),
            ("heartRate", self.heart_rate),
            ("oxygenSaturation", self.oxygen_saturation),
            ("weight", self.weight),
            ("age", self.age),
        ];

        fields
            .into_iter()
            .filter_map(|(name, value)| {
                let value = value?;
                let out_of_range = !value.is_finite()
                    || value < 0.0
                    || (name == "oxygenSaturation" && value > 100.0);
                out_of_range.then_some(name)
            })
            .collect()
    }
}

/// Kết quả đánh giá nguy cơ cho một nhóm bệnh lý.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RiskInsight {
    pub subject_id: String,
    pub condition: Condition,
    /// 0-100, đã được giới hạn.
    pub severity: u8,
    pub risk_tier: RiskTier,
    /// Lý do theo thứ tự đánh giá, không bao giờ rỗng.
    pub factors: Vec<String>,
    pub recommendation: String,
    pub timestamp: DateTime<Utc>,
}

impl RiskInsight {
    pub fn is_critical(&self) -> bool {
        self.risk_tier == RiskTier::Critical
    }
}

/// Lỗi chung khi đọc dữ liệu đầu vào.
#[derive(Debug, thiserror::Error)]
pub enum VitalsError {
    #[error("Dữ liệu đầu vào thiếu thông tin tối thiểu")]
    MissingData,
    #[error("Không đọc được dữ liệu: {0}")]
    Parse(String),
    #[error("Lỗi khác: {0}")]
    Other(String),
}
