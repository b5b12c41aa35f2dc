//! A trivial `WorldInterface` for unit and integration tests.

use crate::world::WorldInterface;

/// Records what was asked of it instead of doing anything; `in_inventory`
/// answers from a fixed set given at construction.
#[derive(Default)]
pub struct NullWorld {
    inventory: Vec<String>,
    moves: Vec<(String, String)>,
    output: Vec<String>,
}

impl NullWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inventory(items: &[&str]) -> Self {
        Self {
            inventory: items.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn moves(&self) -> &[(String, String)] {
        &self.moves
    }

    pub fn output_log(&self) -> &[String] {
        &self.output
    }
}

impl WorldInterface for NullWorld {
    fn in_inventory(&self, label: &str) -> bool {
        self.inventory.iter().any(|item| item == label)
    }

    fn move_item(&mut self, label: &str, destination: &str) -> bool {
        self.moves.push((label.to_string(), destination.to_string()));
        true
    }

    fn output(&mut self, text: &str) -> bool {
        self.output.push(text.to_string());
        true
    }
}
