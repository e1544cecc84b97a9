//! Saved prompt history.
//!
//! Persistence goes through the [`PromptStore`] trait so the analysis code
//! can be exercised without touching disk. [`JsonFileStore`] keeps the
//! records as a JSON array in a local data directory; [`MemoryStore`] keeps
//! them in memory. [`History`] owns the loaded records and the current
//! selection and writes every change straight back to its store.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PromptCostError, Result};

/// File holding the saved prompts.
pub const PROMPTS_FILE: &str = "prompts.json";
/// File holding the ids of selected prompts.
pub const SELECTION_FILE: &str = "selected.json";

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// A committed prompt. Costs are never stored; they are recomputed from the
/// current catalog whenever the record is displayed or exported.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub id: String,
    pub text: String,
    /// Creation time in epoch milliseconds.
    pub timestamp: i64,
    pub tokens: usize,
    pub estimated_output_tokens: usize,
}

// ---------------------------------------------------------------------------
// Storage trait
// ---------------------------------------------------------------------------

/// Backend for prompt records and the selection set.
pub trait PromptStore {
    /// Load all records. Unreadable or corrupt data yields an empty list.
    fn load(&self) -> Result<Vec<Prompt>>;

    /// Replace all records.
    fn save(&mut self, prompts: &[Prompt]) -> Result<()>;

    /// Remove all records and the selection.
    fn clear(&mut self) -> Result<()>;

    fn load_selection(&self) -> Result<Vec<String>>;

    fn save_selection(&mut self, ids: &[String]) -> Result<()>;
}

/// In-memory store, used by tests and one-shot runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    prompts: Vec<Prompt>,
    selection: Vec<String>,
}

impl PromptStore for MemoryStore {
    fn load(&self) -> Result<Vec<Prompt>> {
        Ok(self.prompts.clone())
    }

    fn save(&mut self, prompts: &[Prompt]) -> Result<()> {
        self.prompts = prompts.to_vec();
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.prompts.clear();
        self.selection.clear();
        Ok(())
    }

    fn load_selection(&self) -> Result<Vec<String>> {
        Ok(self.selection.clone())
    }

    fn save_selection(&mut self, ids: &[String]) -> Result<()> {
        self.selection = ids.to_vec();
        Ok(())
    }
}

/// JSON files in a local directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store in the platform data directory (e.g. `~/.local/share/promptcost`).
    pub fn default_location() -> Result<Self> {
        ProjectDirs::from("", "", "promptcost")
            .map(|dirs| Self::new(dirs.data_dir()))
            .ok_or_else(|| PromptCostError::config("could not determine a data directory"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_json<T: for<'de> Deserialize<'de> + Default>(&self, name: &str) -> Result<T> {
        let path = self.dir.join(name);
        if !path.exists() {
            return Ok(T::default());
        }
        let content = std::fs::read(&path)
            .map_err(|e| PromptCostError::io(format!("reading '{}'", path.display()), e))?;
        // Invalid UTF-8 surfaces here as a parse error too.
        match serde_json::from_slice(&content) {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!("discarding unreadable store file '{}': {err}", path.display());
                Ok(T::default())
            }
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            PromptCostError::io(format!("creating directory '{}'", self.dir.display()), e)
        })?;
        let path = self.dir.join(name);
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| PromptCostError::serialization(format!("encoding '{name}'"), e))?;
        std::fs::write(&path, json)
            .map_err(|e| PromptCostError::io(format!("writing '{}'", path.display()), e))
    }

    fn remove(&self, name: &str) -> Result<()> {
        let path = self.dir.join(name);
        if path.exists() {
            std::fs::remove_file(&path)
                .map_err(|e| PromptCostError::io(format!("removing '{}'", path.display()), e))?;
        }
        Ok(())
    }
}

impl PromptStore for JsonFileStore {
    fn load(&self) -> Result<Vec<Prompt>> {
        let prompts: Vec<Prompt> = self.read_json(PROMPTS_FILE)?;
        debug!(count = prompts.len(), dir = %self.dir.display(), "loaded prompt history");
        Ok(prompts)
    }

    fn save(&mut self, prompts: &[Prompt]) -> Result<()> {
        debug!(count = prompts.len(), "saving prompt history");
        self.write_json(PROMPTS_FILE, prompts)
    }

    fn clear(&mut self) -> Result<()> {
        self.remove(PROMPTS_FILE)?;
        self.remove(SELECTION_FILE)
    }

    fn load_selection(&self) -> Result<Vec<String>> {
        self.read_json(SELECTION_FILE)
    }

    fn save_selection(&mut self, ids: &[String]) -> Result<()> {
        self.write_json(SELECTION_FILE, ids)
    }
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// Saved prompts (newest first) plus the selected subset.
#[derive(Debug)]
pub struct History<S: PromptStore> {
    store: S,
    prompts: Vec<Prompt>,
    selected: Vec<String>,
}

impl<S: PromptStore> History<S> {
    /// Load records and selection from `store`. Selected ids that no longer
    /// match a record are dropped.
    pub fn open(store: S) -> Result<Self> {
        let prompts = store.load()?;
        let mut selected = store.load_selection()?;
        selected.retain(|id| prompts.iter().any(|p| &p.id == id));
        Ok(Self {
            store,
            prompts,
            selected,
        })
    }

    pub fn prompts(&self) -> &[Prompt] {
        &self.prompts
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Prompt> {
        self.prompts.iter().find(|p| p.id == id)
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.iter().any(|s| s == id)
    }

    pub fn selected_ids(&self) -> &[String] {
        &self.selected
    }

    /// Selected records, in history order.
    pub fn selected_prompts(&self) -> Vec<Prompt> {
        self.prompts
            .iter()
            .filter(|p| self.is_selected(&p.id))
            .cloned()
            .collect()
    }

    /// Save a draft as a new record at the front of the history.
    ///
    /// Blank drafts are ignored and return `None`. The id is the timestamp
    /// in decimal, bumped until it is unique.
    pub fn commit(
        &mut self,
        text: &str,
        tokens: usize,
        estimated_output_tokens: usize,
        timestamp: i64,
    ) -> Result<Option<Prompt>> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        let mut n = timestamp;
        while self.get(&n.to_string()).is_some() {
            n += 1;
        }

        let prompt = Prompt {
            id: n.to_string(),
            text: text.to_string(),
            timestamp,
            tokens,
            estimated_output_tokens,
        };
        self.prompts.insert(0, prompt.clone());
        self.store.save(&self.prompts)?;
        Ok(Some(prompt))
    }

    /// Remove one record (and its selection).
    pub fn delete(&mut self, id: &str) -> Result<Prompt> {
        let index = self
            .prompts
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| PromptCostError::not_found(id))?;
        let removed = self.prompts.remove(index);
        self.store.save(&self.prompts)?;
        if self.is_selected(id) {
            self.selected.retain(|s| s != id);
            self.store.save_selection(&self.selected)?;
        }
        Ok(removed)
    }

    /// Remove every record and the selection.
    pub fn clear(&mut self) -> Result<usize> {
        let count = self.prompts.len();
        self.prompts.clear();
        self.selected.clear();
        self.store.clear()?;
        Ok(count)
    }

    /// Flip selection of `id`; returns whether it is now selected.
    pub fn toggle_select(&mut self, id: &str) -> Result<bool> {
        if self.get(id).is_none() {
            return Err(PromptCostError::not_found(id));
        }
        let now_selected = if self.is_selected(id) {
            self.selected.retain(|s| s != id);
            false
        } else {
            self.selected.push(id.to_string());
            true
        };
        self.store.save_selection(&self.selected)?;
        Ok(now_selected)
    }

    pub fn select(&mut self, ids: &[String]) -> Result<()> {
        for id in ids {
            if self.get(id).is_none() {
                return Err(PromptCostError::not_found(id.as_str()));
            }
            if !self.is_selected(id) {
                self.selected.push(id.clone());
            }
        }
        self.store.save_selection(&self.selected)
    }

    pub fn deselect(&mut self, ids: &[String]) -> Result<()> {
        self.selected.retain(|s| !ids.contains(s));
        self.store.save_selection(&self.selected)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
