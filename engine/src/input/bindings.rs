//! Input Bindings Module
//!
//! Maps physical keys to directional movement actions. Several keys may drive
//! the same action (letter key plus arrow key), but each key drives at most one.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::KeyCode;

/// Directional movement actions that keys can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MoveAction {
    Forward,
    Backward,
    Left,
    Right,
}

impl MoveAction {
    pub const ALL: [MoveAction; 4] = [
        MoveAction::Forward,
        MoveAction::Backward,
        MoveAction::Left,
        MoveAction::Right,
    ];
}

/// Key to action lookup used by the input tracker.
///
/// Serialized as one list of keys per action:
///
/// ```json
/// { "forward": ["W", "ArrowUp"], "backward": ["S"], "left": ["A"], "right": ["D"] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "BindingTable", into = "BindingTable")]
pub struct KeyBindings {
    key_to_action: HashMap<KeyCode, MoveAction>,
}

impl Default for KeyBindings {
    /// Letter keys and arrow keys:
    /// - W / ArrowUp = Forward
    /// - S / ArrowDown = Backward
    /// - A / ArrowLeft = Left
    /// - D / ArrowRight = Right
    fn default() -> Self {
        let mut bindings = Self::empty();
        bindings.bind(KeyCode::W, MoveAction::Forward);
        bindings.bind(KeyCode::ArrowUp, MoveAction::Forward);
        bindings.bind(KeyCode::S, MoveAction::Backward);
        bindings.bind(KeyCode::ArrowDown, MoveAction::Backward);
        bindings.bind(KeyCode::A, MoveAction::Left);
        bindings.bind(KeyCode::ArrowLeft, MoveAction::Left);
        bindings.bind(KeyCode::D, MoveAction::Right);
        bindings.bind(KeyCode::ArrowRight, MoveAction::Right);
        bindings
    }
}

impl KeyBindings {
    /// Bindings with no keys at all.
    pub fn empty() -> Self {
        Self {
            key_to_action: HashMap::new(),
        }
    }

    /// Bind a key to an action, replacing whatever that key drove before.
    /// Other keys bound to the same action keep their binding.
    pub fn bind(&mut self, key: KeyCode, action: MoveAction) {
        if key == KeyCode::Unknown {
            return;
        }
        self.key_to_action.insert(key, action);
    }

    pub fn unbind_key(&mut self, key: KeyCode) {
        self.key_to_action.remove(&key);
    }

    /// Remove every key bound to `action`.
    pub fn unbind_action(&mut self, action: MoveAction) {
        self.key_to_action.retain(|_, a| *a != action);
    }

    pub fn action_for(&self, key: KeyCode) -> Option<MoveAction> {
        self.key_to_action.get(&key).copied()
    }

    /// All keys bound to `action`, sorted for stable display.
    pub fn keys_for(&self, action: MoveAction) -> Vec<KeyCode> {
        let mut keys: Vec<KeyCode> = self
            .key_to_action
            .iter()
            .filter(|(_, a)| **a == action)
            .map(|(k, _)| *k)
            .collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.key_to_action.len()
    }

    pub fn is_empty(&self) -> bool {
        self.key_to_action.is_empty()
    }
}

#[derive(Serialize, Deserialize)]
struct BindingTable {
    #[serde(default)]
    forward: Vec<KeyCode>,
    #[serde(default)]
    backward: Vec<KeyCode>,
    #[serde(default)]
    left: Vec<KeyCode>,
    #[serde(default)]
    right: Vec<KeyCode>,
}

impl From<BindingTable> for KeyBindings {
    fn from(table: BindingTable) -> Self {
        let mut bindings = KeyBindings::empty();
        for (keys, action) in [
            (table.forward, MoveAction::Forward),
            (table.backward, MoveAction::Backward),
            (table.left, MoveAction::Left),
            (table.right, MoveAction::Right),
        ] {
            for key in keys {
                bindings.bind(key, action);
            }
        }
        bindings
    }
}

impl From<KeyBindings> for BindingTable {
    fn from(bindings: KeyBindings) -> Self {
        Self {
            forward: bindings.keys_for(MoveAction::Forward),
            backward: bindings.keys_for(MoveAction::Backward),
            left: bindings.keys_for(MoveAction::Left),
            right: bindings.keys_for(MoveAction::Right),
        }
    }
}
