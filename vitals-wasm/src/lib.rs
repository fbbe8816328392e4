//! Bridge WASM <-> JavaScript cho engine đánh giá nguy cơ.

use serde::Deserialize;
use serde_wasm_bindgen::{from_value, to_value};
use vitals_core::{EngineConfig, RiskInsight, VitalsError};
use wasm_bindgen::prelude::*;

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct JsEngineConfig {
    #[serde(default)]
    alert_severity_threshold: Option<u8>,
    #[serde(default)]
    default_age: Option<f64>,
}

impl From<JsEngineConfig> for EngineConfig {
    fn from(cfg: JsEngineConfig) -> Self {
        let mut base = EngineConfig::default();
        if let Some(threshold) = cfg.alert_severity_threshold {
            base.alert_severity_threshold = threshold;
        }
        if let Some(age) = cfg.default_age {
            base.default_age = age;
        }
        base
    }
}

/// Chấm điểm một snapshot chỉ số sống, trả về mảng insight.
#[wasm_bindgen(js_name = analyzeVitals)]
pub fn analyze_vitals(snapshot: JsValue, config: Option<JsValue>) -> Result<JsValue, JsValue> {
    let insights = score(snapshot, config)?.0;
    to_value(&insights)
        .map_err(|err| JsValue::from_str(&format!("Không serialize insight: {err}")))
}

/// Chỉ trả về các insight cần cảnh báo khẩn.
#[wasm_bindgen(js_name = urgentAlerts)]
pub fn urgent_alerts(snapshot: JsValue, config: Option<JsValue>) -> Result<JsValue, JsValue> {
    let (insights, cfg) = score(snapshot, config)?;
    let urgent = vitals_risk::urgent_insights(&insights, &cfg);
    to_value(&urgent)
        .map_err(|err| JsValue::from_str(&format!("Không serialize cảnh báo: {err}")))
}

fn score(
    snapshot: JsValue,
    config: Option<JsValue>,
) -> Result<(Vec<RiskInsight>, EngineConfig), JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let snapshot_value = from_value::<serde_json::Value>(snapshot)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được JSON snapshot: {err}")))?;

    let cfg = match config {
        Some(js_cfg) if !js_cfg.is_undefined() && !js_cfg.is_null() => {
            let cfg: JsEngineConfig = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Không đọc được config: {err}")))?;
            EngineConfig::from(cfg)
        }
        _ => EngineConfig::default(),
    };

    let insights = vitals_risk::analyze_snapshot_value(&snapshot_value, &cfg)
        .map_err(|err| JsValue::from_str(&format_vitals_error(err)))?;

    Ok((insights, cfg))
}

fn format_vitals_error(err: VitalsError) -> String {
    format!("Vitals error: {err}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn js_config_overrides_defaults_selectively() {
        let cfg: JsEngineConfig =
            serde_json::from_str(r#"{"alertSeverityThreshold": 55}"#).expect("config hợp lệ");
        let merged = EngineConfig::from(cfg);
        assert_eq!(merged.alert_severity_threshold, 55);
        assert_eq!(merged.default_age, 45.0);
    }

    #[test]
    fn empty_js_config_is_default() {
        assert_eq!(
            EngineConfig::from(JsEngineConfig::default()),
            EngineConfig::default()
        );
    }

    #[test]
    fn errors_are_prefixed() {
        assert_eq!(
            format_vitals_error(VitalsError::MissingData),
            "Vitals error: Dữ liệu đầu vào thiếu thông tin tối thiểu"
        );
    }
}
