use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use servicearea_core::loading::ServiceAreaConfig;

/// Contents of the TOML configuration file
///
/// ```toml
/// threads = 8
///
/// [service_area]
/// network_distance = 800.0
/// buffer_distance = 50.0
///
/// [service_area.network]
/// precision = 1e-6
/// intersection_degree = 3
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub threads: Option<usize>,
    pub service_area: Option<ServiceAreaConfig>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Values given on the command line, overriding the file
#[derive(Debug, Default, Clone, Copy)]
pub struct Overrides {
    pub network_distance: Option<f64>,
    pub buffer_distance: Option<f64>,
    pub points_per_chunk: Option<usize>,
}

/// Merge file values and command line overrides
pub fn resolve(file: Option<ServiceAreaConfig>, overrides: Overrides) -> Result<ServiceAreaConfig> {
    let mut config = match file {
        Some(config) => config,
        None => {
            let (Some(network_distance), Some(buffer_distance)) =
                (overrides.network_distance, overrides.buffer_distance)
            else {
                bail!(
                    "network and buffer distances are required, \
                     either in the config file or as --network-distance/--buffer-distance"
                );
            };
            ServiceAreaConfig::new(network_distance, buffer_distance)
        }
    };

    if let Some(network_distance) = overrides.network_distance {
        config.network_distance = network_distance;
    }
    if let Some(buffer_distance) = overrides.buffer_distance {
        config.buffer_distance = buffer_distance;
    }
    if let Some(points_per_chunk) = overrides.points_per_chunk {
        config.points_per_chunk = points_per_chunk;
    }

    Ok(config)
}
