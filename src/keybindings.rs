//! Keyboard shortcuts for the editor.
//!
//! One key per edit mode, plus undo/redo. The engine is UI-agnostic, so
//! keys are a small crate-local enum a shell maps its real key events onto.

use serde::{Deserialize, Serialize};

use crate::editor::EditMode;

/// Keys the engine reacts to. A UI shell translates its native key codes
/// into these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    A,
    C,
    D,
    E,
    N,
    S,
    V,
    Y,
    Z,
    Enter,
    Escape,
    Delete,
}

/// Keybinding configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    /// Switch to View mode (also clears the selection)
    pub mode_view: Key,
    /// Switch to EditVertices mode
    pub mode_edit: Key,
    /// Switch to DeletePolygon mode
    pub mode_delete: Key,
    /// Switch to Slice mode
    pub mode_slice: Key,
    /// Switch to AddPoints mode
    pub mode_add_points: Key,
    /// Switch to CreatePolygon mode
    pub mode_create: Key,
    /// Undo the last completed operation
    pub undo: Key,
    /// Redo a previously undone operation
    pub redo: Key,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            mode_view: Key::V,
            mode_edit: Key::E,
            mode_delete: Key::D,
            mode_slice: Key::S,
            mode_add_points: Key::A,
            mode_create: Key::N,
            undo: Key::Z,
            redo: Key::Y,
        }
    }
}

impl KeyBindings {
    /// Create new keybindings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the edit mode that corresponds to a key press, if any.
    pub fn mode_for_key(&self, key: Key) -> Option<EditMode> {
        if key == self.mode_view {
            Some(EditMode::View)
        } else if key == self.mode_edit {
            Some(EditMode::EditVertices)
        } else if key == self.mode_delete {
            Some(EditMode::DeletePolygon)
        } else if key == self.mode_slice {
            Some(EditMode::Slice)
        } else if key == self.mode_add_points {
            Some(EditMode::AddPoints)
        } else if key == self.mode_create {
            Some(EditMode::CreatePolygon)
        } else {
            None
        }
    }

    /// Get the key bound to a mode.
    pub fn key_for_mode(&self, mode: EditMode) -> Key {
        match mode {
            EditMode::View => self.mode_view,
            EditMode::EditVertices => self.mode_edit,
            EditMode::DeletePolygon => self.mode_delete,
            EditMode::Slice => self.mode_slice,
            EditMode::AddPoints => self.mode_add_points,
            EditMode::CreatePolygon => self.mode_create,
        }
    }

    /// Check if a key is already used by another binding.
    /// Returns a description of the conflicting binding, if any.
    pub fn key_conflict(&self, key: Key, exclude: Option<EditMode>) -> Option<String> {
        for mode in EditMode::all() {
            if exclude != Some(*mode) && self.key_for_mode(*mode) == key {
                return Some(format!("{} mode", mode.name()));
            }
        }
        if key == self.undo {
            return Some("undo".to_string());
        }
        if key == self.redo {
            return Some("redo".to_string());
        }
        None
    }
}
