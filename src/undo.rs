//! Undo/Redo system for feature edits.
//!
//! This module implements the Command pattern to enable undo/redo functionality
//! for committed edits to markers and harmonic sets. Each command stores enough
//! information to reverse its effect on a [`FeatureStore`]. Doppler fits are
//! transient measurements and are never recorded.

use crate::coords::DomainPoint;
use crate::feature_store::FeatureStore;
use crate::model::{AnalysisMarker, FeatureId, HarmonicSet};

// ============================================================================
// Command Types
// ============================================================================

/// A committed edit that can be undone and redone.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// A marker was created
    AddMarker {
        /// The marker as created
        marker: AnalysisMarker,
        /// Position in the marker list
        index: usize,
    },
    /// A marker was deleted
    RemoveMarker {
        /// The marker that was removed (stored for undo)
        marker: AnalysisMarker,
        /// Position it occupied
        index: usize,
    },
    /// A marker was dragged or nudged
    MoveMarker {
        id: FeatureId,
        old: DomainPoint,
        new: DomainPoint,
    },
    /// A harmonic set was created
    AddHarmonicSet { set: HarmonicSet, index: usize },
    /// A harmonic set was deleted
    RemoveHarmonicSet { set: HarmonicSet, index: usize },
    /// A harmonic set's anchor time and/or spacing changed
    ModifyHarmonicSet {
        id: FeatureId,
        /// (anchor_time, spacing) before the edit
        old: (f64, f64),
        /// (anchor_time, spacing) after the edit
        new: (f64, f64),
    },
    /// All markers were cleared
    ClearMarkers { markers: Vec<AnalysisMarker> },
    /// All harmonic sets were cleared
    ClearHarmonicSets { sets: Vec<HarmonicSet> },
}

impl Command {
    /// Get a human-readable description of this command
    pub fn description(&self) -> String {
        match self {
            Command::AddMarker { .. } => "Add marker".to_string(),
            Command::RemoveMarker { .. } => "Delete marker".to_string(),
            Command::MoveMarker { .. } => "Move marker".to_string(),
            Command::AddHarmonicSet { .. } => "Add harmonic set".to_string(),
            Command::RemoveHarmonicSet { .. } => "Delete harmonic set".to_string(),
            Command::ModifyHarmonicSet { .. } => "Adjust harmonic set".to_string(),
            Command::ClearMarkers { markers } => format!("Clear {} markers", markers.len()),
            Command::ClearHarmonicSets { sets } => format!("Clear {} harmonic sets", sets.len()),
        }
    }
}

// ============================================================================
// Undo Stack
// ============================================================================

/// Configuration for the undo stack
#[derive(Debug, Clone)]
pub struct UndoConfig {
    /// Maximum number of commands to keep in history
    pub max_history: usize,
}

impl Default for UndoConfig {
    fn default() -> Self {
        Self {
            max_history: crate::constants::DEFAULT_MAX_HISTORY,
        }
    }
}

/// The undo/redo history stack.
///
/// When a new command is pushed, the redo stack is cleared. Undo moves the
/// latest command to the redo stack and redo moves it back.
#[derive(Debug, Clone, Default)]
pub struct UndoStack {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    config: UndoConfig,
}

impl UndoStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: UndoConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Record a command. This clears the redo stack.
    pub fn push(&mut self, command: Command) {
        log::debug!("📝 Undo: pushed '{}'", command.description());
        self.undo_stack.push(command);
        self.redo_stack.clear();

        if self.undo_stack.len() > self.config.max_history {
            let excess = self.undo_stack.len() - self.config.max_history;
            self.undo_stack.drain(..excess);
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Pop a command for undoing, moving it to the redo stack.
    pub fn pop_undo(&mut self) -> Option<Command> {
        let cmd = self.undo_stack.pop()?;
        log::debug!("⏪ Undo: '{}'", cmd.description());
        self.redo_stack.push(cmd.clone());
        Some(cmd)
    }

    /// Pop a command for redoing, moving it back to the undo stack.
    pub fn pop_redo(&mut self) -> Option<Command> {
        let cmd = self.redo_stack.pop()?;
        log::debug!("⏩ Redo: '{}'", cmd.description());
        self.undo_stack.push(cmd.clone());
        Some(cmd)
    }

    /// Description of the command that would be undone
    pub fn undo_description(&self) -> Option<String> {
        self.undo_stack.last().map(|c| c.description())
    }

    /// Description of the command that would be redone
    pub fn redo_description(&self) -> Option<String> {
        self.redo_stack.last().map(|c| c.description())
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}

// ============================================================================
// Undo/Redo Execution
// ============================================================================

/// Undo the latest command. Returns false if there was nothing to undo.
pub fn undo_command(stack: &mut UndoStack, store: &mut FeatureStore) -> bool {
    let Some(cmd) = stack.pop_undo() else {
        return false;
    };
    apply_undo(&cmd, store);
    true
}

/// Redo the latest undone command. Returns false if there was nothing to redo.
pub fn redo_command(stack: &mut UndoStack, store: &mut FeatureStore) -> bool {
    let Some(cmd) = stack.pop_redo() else {
        return false;
    };
    apply_redo(&cmd, store);
    true
}

fn apply_undo(cmd: &Command, store: &mut FeatureStore) {
    match cmd {
        Command::AddMarker { marker, .. } => {
            store.remove_marker(marker.id);
        }
        Command::RemoveMarker { marker, index } => {
            store.restore_marker(marker.clone(), *index);
        }
        Command::MoveMarker { id, old, .. } => {
            store.move_marker(*id, *old);
        }
        Command::AddHarmonicSet { set, .. } => {
            store.remove_harmonic_set(set.id);
        }
        Command::RemoveHarmonicSet { set, index } => {
            store.restore_harmonic_set(set.clone(), *index);
        }
        Command::ModifyHarmonicSet { id, old, .. } => {
            store.update_harmonic_set(*id, old.0, old.1);
        }
        Command::ClearMarkers { markers } => {
            for (index, marker) in markers.iter().enumerate() {
                store.restore_marker(marker.clone(), index);
            }
        }
        Command::ClearHarmonicSets { sets } => {
            for (index, set) in sets.iter().enumerate() {
                store.restore_harmonic_set(set.clone(), index);
            }
        }
    }
    log::debug!("⏪ Undid '{}'", cmd.description());
}

fn apply_redo(cmd: &Command, store: &mut FeatureStore) {
    match cmd {
        Command::AddMarker { marker, index } => {
            store.restore_marker(marker.clone(), *index);
        }
        Command::RemoveMarker { marker, .. } => {
            store.remove_marker(marker.id);
        }
        Command::MoveMarker { id, new, .. } => {
            store.move_marker(*id, *new);
        }
        Command::AddHarmonicSet { set, index } => {
            store.restore_harmonic_set(set.clone(), *index);
        }
        Command::RemoveHarmonicSet { set, .. } => {
            store.remove_harmonic_set(set.id);
        }
        Command::ModifyHarmonicSet { id, new, .. } => {
            store.update_harmonic_set(*id, new.0, new.1);
        }
        Command::ClearMarkers { .. } => {
            store.clear_markers();
        }
        Command::ClearHarmonicSets { .. } => {
            store.clear_harmonic_sets();
        }
    }
    log::debug!("⏩ Redid '{}'", cmd.description());
}

// ============================================================================
// Tests
// ============================================================================
