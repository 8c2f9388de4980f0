//! Flat JSON file of named scenarios

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::ScenarioInputs;
use crate::error::{ModelError, ModelResult};

/// Named scenarios persisted as one JSON object `{ name: inputs }`
#[derive(Debug, Clone)]
pub struct ScenarioStore {
    path: PathBuf,
}

impl ScenarioStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every saved scenario; a missing file is an empty store
    pub fn load_all(&self) -> ModelResult<BTreeMap<String, ScenarioInputs>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    /// Look up a single scenario by name
    pub fn get(&self, name: &str) -> ModelResult<ScenarioInputs> {
        self.load_all()?
            .remove(name)
            .ok_or_else(|| ModelError::ScenarioNotFound(name.to_string()))
    }

    /// Insert or overwrite a scenario
    pub fn save(&self, name: &str, inputs: &ScenarioInputs) -> ModelResult<()> {
        let mut scenarios = self.load_all()?;
        scenarios.insert(name.to_string(), inputs.clone());
        self.write_all(&scenarios)
    }

    /// Remove a scenario, returning whether it existed
    pub fn delete(&self, name: &str) -> ModelResult<bool> {
        let mut scenarios = self.load_all()?;
        if scenarios.remove(name).is_none() {
            return Ok(false);
        }
        self.write_all(&scenarios)?;
        Ok(true)
    }

    fn write_all(&self, scenarios: &BTreeMap<String, ScenarioInputs>) -> ModelResult<()> {
        let json = serde_json::to_string_pretty(scenarios)?;
        fs::write(&self.path, json)?;
        log::debug!("saved {} scenarios to {}", scenarios.len(), self.path.display());
        Ok(())
    }
}
