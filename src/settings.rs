use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{Mutex, PoisonError, RwLock},
};

use crate::error::PipelineError;

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Glucose thresholds in mmol/L drawn as horizontal lines on the chart.
///
/// Fields missing from a saved record fall back to their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub hypo: f64,
    pub target: f64,
    /// Level that should not be exceeded for more than about an hour a day.
    pub medium: f64,
    pub hyper: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            hypo: 3.9,
            target: 5.5,
            medium: 7.8,
            hyper: 10.0,
        }
    }
}

impl ThresholdConfig {
    pub const FIELDS: [&'static str; 4] = ["hypo", "target", "medium", "hyper"];

    /// Build a config from user-entered text in `hypo, target, medium, hyper`
    /// order. Every value must be a finite number greater than zero.
    pub fn from_inputs(inputs: [&str; 4]) -> Result<Self, PipelineError> {
        let mut values = [0.0f64; 4];
        for ((slot, raw), field) in values.iter_mut().zip(inputs).zip(Self::FIELDS) {
            *slot = parse_level(field, raw)?;
        }
        let [hypo, target, medium, hyper] = values;
        Ok(Self {
            hypo,
            target,
            medium,
            hyper,
        })
    }

    /// Check that every level is a positive number.
    pub fn validate(&self) -> Result<(), PipelineError> {
        for (field, value) in Self::FIELDS.into_iter().zip(self.values()) {
            if !(value.is_finite() && value > 0.0) {
                return Err(PipelineError::InvalidThresholdInput {
                    field,
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }

    /// `hypo < target < medium < hyper`. Recommended, never enforced.
    pub fn is_ordered(&self) -> bool {
        self.hypo < self.target && self.target < self.medium && self.medium < self.hyper
    }

    pub fn values(&self) -> [f64; 4] {
        [self.hypo, self.target, self.medium, self.hyper]
    }
}

fn parse_level(field: &'static str, raw: &str) -> Result<f64, PipelineError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value > 0.0)
        .ok_or_else(|| PipelineError::InvalidThresholdInput {
            field,
            value: raw.to_string(),
        })
}

/// Persistence for the threshold record.
pub trait ThresholdBackend: Send + Sync {
    /// `Ok(None)` when nothing has been saved.
    fn load(&self) -> Result<Option<ThresholdConfig>>;
    fn save(&self, config: &ThresholdConfig) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Thresholds stored as pretty-printed JSON in a single file.
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ThresholdBackend for JsonFileBackend {
    fn load(&self) -> Result<Option<ThresholdConfig>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;
        let config = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid settings in {}", self.path.display()))?;
        Ok(Some(config))
    }

    fn save(&self, config: &ThresholdConfig) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory {}", parent.display())
            })?;
        }
        let serialized = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err)
                .with_context(|| format!("Failed to remove settings {}", self.path.display())),
        }
    }
}

/// In-process record, for tests and one-shot runs.
#[derive(Default)]
pub struct MemoryBackend {
    saved: Mutex<Option<ThresholdConfig>>,
}

impl ThresholdBackend for MemoryBackend {
    fn load(&self) -> Result<Option<ThresholdConfig>> {
        Ok(*self.saved.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn save(&self, config: &ThresholdConfig) -> Result<()> {
        *self.saved.lock().unwrap_or_else(PoisonError::into_inner) = Some(*config);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.saved.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Current thresholds plus the backend they persist to.
pub struct ThresholdStore<B: ThresholdBackend> {
    backend: B,
    current: RwLock<ThresholdConfig>,
}

impl<B: ThresholdBackend> ThresholdStore<B> {
    /// Load the saved record, falling back to defaults when it is absent,
    /// unreadable or holds non-positive levels.
    pub fn open(backend: B) -> Self {
        let current = match backend.load() {
            Ok(Some(config)) => match config.validate() {
                Ok(()) => config,
                Err(err) => {
                    log_warn!("Ignoring saved glucose levels: {err}");
                    ThresholdConfig::default()
                }
            },
            Ok(None) => ThresholdConfig::default(),
            Err(err) => {
                log_warn!("Failed to load saved glucose levels: {err:#}");
                ThresholdConfig::default()
            }
        };

        Self {
            backend,
            current: RwLock::new(current),
        }
    }

    pub fn current(&self) -> ThresholdConfig {
        *self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Validate user text and persist it. On any failure the previous
    /// thresholds stay in effect.
    pub fn save_inputs(&self, inputs: [&str; 4]) -> Result<ThresholdConfig> {
        let config = ThresholdConfig::from_inputs(inputs)?;
        self.save(config)?;
        Ok(config)
    }

    pub fn save(&self, config: ThresholdConfig) -> Result<()> {
        config.validate()?;
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        self.backend.save(&config)?;
        *guard = config;
        log_info!("Saved glucose levels {:?}", config.values());
        Ok(())
    }

    /// Return to defaults and drop the saved record.
    pub fn reset(&self) -> ThresholdConfig {
        let defaults = ThresholdConfig::default();
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = defaults;
        if let Err(err) = self.backend.clear() {
            log_warn!("Failed to clear saved glucose levels: {err:#}");
        }
        defaults
    }
}
