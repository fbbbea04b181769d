use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Node widths and heights are rounded up to this grid before
    /// layering so column widths stay stable under input jitter.
    pub grid_unit: f32,
    pub column_gap: f32,
    /// Vertical distance walked between a node's bottom and the next
    /// node's body top; sized to absorb the title band.
    pub vertical_gap: f32,
    pub title_height: f32,
    pub port_start_offset: f32,
    pub port_spacing: f32,
    /// Maximum leftward-correction sweeps before residual violations
    /// are accepted.
    pub correction_budget: usize,
    pub reroute_clearance: f32,
    pub reroute_step: f32,
    pub reroute_inset: f32,
    /// Node x positions closer than this are treated as the same
    /// column when ordering for reindex.
    pub column_tolerance: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            grid_unit: 10.0,
            column_gap: 100.0,
            vertical_gap: 60.0,
            title_height: 30.0,
            port_start_offset: 30.0,
            port_spacing: 20.0,
            correction_budget: 20,
            reroute_clearance: 50.0,
            reroute_step: 20.0,
            reroute_inset: 50.0,
            column_tolerance: 10.0,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    grid_unit: Option<f32>,
    column_gap: Option<f32>,
    vertical_gap: Option<f32>,
    title_height: Option<f32>,
    port_start_offset: Option<f32>,
    port_spacing: Option<f32>,
    correction_budget: Option<usize>,
    reroute_clearance: Option<f32>,
    reroute_step: Option<f32>,
    reroute_inset: Option<f32>,
    column_tolerance: Option<f32>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<LayoutConfig> {
    let mut config = LayoutConfig::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = serde_json::from_str(&contents)?;

    if let Some(v) = parsed.grid_unit {
        config.grid_unit = v;
    }
    if let Some(v) = parsed.column_gap {
        config.column_gap = v;
    }
    if let Some(v) = parsed.vertical_gap {
        config.vertical_gap = v;
    }
    if let Some(v) = parsed.title_height {
        config.title_height = v;
    }
    if let Some(v) = parsed.port_start_offset {
        config.port_start_offset = v;
    }
    if let Some(v) = parsed.port_spacing {
        config.port_spacing = v;
    }
    if let Some(v) = parsed.correction_budget {
        config.correction_budget = v;
    }
    if let Some(v) = parsed.reroute_clearance {
        config.reroute_clearance = v;
    }
    if let Some(v) = parsed.reroute_step {
        config.reroute_step = v;
    }
    if let Some(v) = parsed.reroute_inset {
        config.reroute_inset = v;
    }
    if let Some(v) = parsed.column_tolerance {
        config.column_tolerance = v;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_yields_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.grid_unit, 10.0);
        assert_eq!(config.correction_budget, 20);
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let parsed: ConfigFile = serde_json::from_str(r#"{"column_gap": 80}"#).unwrap();
        let mut config = LayoutConfig::default();
        if let Some(v) = parsed.column_gap {
            config.column_gap = v;
        }
        assert_eq!(config.column_gap, 80.0);
        assert_eq!(config.vertical_gap, 60.0);
    }
}
