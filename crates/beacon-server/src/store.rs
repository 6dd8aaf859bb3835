//! Experiment Store
//!
//! In-memory, keyed by UUID. Experiments live as long as the process.

use beacon_vpn::Experiment;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;
use uuid::Uuid;

const FALLBACK_NAME: &str = "unnamed-experiment";

/// Two-word name like `grateful-heron`
pub fn random_petname() -> String {
    petname::petname(2, "-").unwrap_or_else(|| FALLBACK_NAME.to_string())
}

/// Experiment store
#[derive(Default)]
pub struct ExperimentStore {
    experiments: DashMap<String, Experiment>,
    next_id: AtomicU64,
}

impl ExperimentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an experiment under a fresh UUID and return that UUID
    ///
    /// Assigns the sequence ID, and a generated name when none was given.
    pub fn add(&self, mut exp: Experiment) -> String {
        if exp.name.trim().is_empty() {
            exp.name = random_petname();
            info!("Assigned experiment name: {}", exp.name);
        }

        exp.id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        exp.uuid = Uuid::new_v4().simple().to_string();

        let uuid = exp.uuid.clone();
        self.experiments.insert(uuid.clone(), exp);
        uuid
    }

    pub fn get(&self, uuid: &str) -> Option<Experiment> {
        self.experiments.get(uuid).map(|e| e.value().clone())
    }

    /// All experiments, oldest first
    pub fn list(&self) -> Vec<Experiment> {
        let mut all: Vec<Experiment> = self.experiments.iter().map(|e| e.value().clone()).collect();
        all.sort_by_key(|e| e.id);
        all
    }

    pub fn len(&self) -> usize {
        self.experiments.len()
    }
}
