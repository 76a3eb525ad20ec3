//! Two-list drag-and-drop store: items are relocated between and within the
//! `available` and `placed` lists, never created or destroyed.

use std::{collections::HashMap, fmt, str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::BoardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListName {
    Available,
    #[serde(alias = "dropped")]
    Placed,
}

impl fmt::Display for ListName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available => f.write_str("available"),
            Self::Placed => f.write_str("placed"),
        }
    }
}

impl FromStr for ListName {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "available" => Ok(Self::Available),
            "placed" | "dropped" => Ok(Self::Placed),
            other => Err(format!("unknown list `{other}`; expected available or placed")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub id: String,
    pub name: String,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoopReason {
    ItemNotFound,
    IndexOutOfBounds,
}

#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardOutcome {
    Applied,
    Unchanged(NoopReason),
}

impl BoardOutcome {
    pub fn is_applied(self) -> bool {
        self == Self::Applied
    }
}

/// Both lists are held behind `Arc`s that are swapped for fresh ones on every
/// applied operation, so `Arc::ptr_eq` tells observers whether anything changed.
#[derive(Debug, Clone)]
pub struct ReorderableListStore {
    available: Arc<Vec<ListItem>>,
    placed: Arc<Vec<ListItem>>,
}

impl ReorderableListStore {
    pub fn new(available: Vec<ListItem>, placed: Vec<ListItem>) -> Result<Self, BoardError> {
        let mut seen: HashMap<&str, ListName> = HashMap::new();
        let tagged = available
            .iter()
            .map(|item| (ListName::Available, item))
            .chain(placed.iter().map(|item| (ListName::Placed, item)));
        for (list, item) in tagged {
            if let Some(first) = seen.insert(item.id.as_str(), list) {
                return Err(BoardError::DuplicateId {
                    id: item.id.clone(),
                    first,
                    second: list,
                });
            }
        }

        Ok(Self {
            available: Arc::new(available),
            placed: Arc::new(placed),
        })
    }

    pub fn list(&self, name: ListName) -> &Arc<Vec<ListItem>> {
        match name {
            ListName::Available => &self.available,
            ListName::Placed => &self.placed,
        }
    }

    pub fn available(&self) -> &Arc<Vec<ListItem>> {
        &self.available
    }

    pub fn placed(&self) -> &Arc<Vec<ListItem>> {
        &self.placed
    }

    /// Takes `item_id` out of `from` and appends it to the end of `to`.
    pub fn move_item(&mut self, item_id: &str, from: ListName, to: ListName) -> BoardOutcome {
        let Some(position) = self.list(from).iter().position(|item| item.id == item_id) else {
            debug!(item_id, %from, %to, "move ignored: item not in source list");
            return BoardOutcome::Unchanged(NoopReason::ItemNotFound);
        };

        let mut source = self.list(from).as_ref().clone();
        let item = source.remove(position);
        let (available, placed) = if from == to {
            source.push(item);
            match from {
                ListName::Available => (source, self.placed.as_ref().clone()),
                ListName::Placed => (self.available.as_ref().clone(), source),
            }
        } else {
            let mut target = self.list(to).as_ref().clone();
            target.push(item);
            match from {
                ListName::Available => (source, target),
                ListName::Placed => (target, source),
            }
        };

        self.replace(available, placed);
        debug!(item_id, %from, %to, "moved board item");
        BoardOutcome::Applied
    }

    pub fn move_to_placed(&mut self, item_id: &str) -> BoardOutcome {
        self.move_item(item_id, ListName::Available, ListName::Placed)
    }

    pub fn move_to_available(&mut self, item_id: &str) -> BoardOutcome {
        self.move_item(item_id, ListName::Placed, ListName::Available)
    }

    /// Relocates the element at `drag_index` to `hover_index`, shifting the
    /// elements in between.
    pub fn reorder(
        &mut self,
        list: ListName,
        drag_index: usize,
        hover_index: usize,
    ) -> BoardOutcome {
        let len = self.list(list).len();
        if drag_index >= len || hover_index >= len {
            debug!(%list, drag_index, hover_index, len, "reorder ignored: index out of bounds");
            return BoardOutcome::Unchanged(NoopReason::IndexOutOfBounds);
        }

        let mut reordered = self.list(list).as_ref().clone();
        let item = reordered.remove(drag_index);
        reordered.insert(hover_index, item);

        let (available, placed) = match list {
            ListName::Available => (reordered, self.placed.as_ref().clone()),
            ListName::Placed => (self.available.as_ref().clone(), reordered),
        };
        self.replace(available, placed);
        debug!(%list, drag_index, hover_index, "reordered board list");
        BoardOutcome::Applied
    }

    pub fn contains(&self, item_id: &str) -> Option<ListName> {
        [ListName::Available, ListName::Placed]
            .into_iter()
            .find(|&name| self.list(name).iter().any(|item| item.id == item_id))
    }

    fn replace(&mut self, available: Vec<ListItem>, placed: Vec<ListItem>) {
        self.available = Arc::new(available);
        self.placed = Arc::new(placed);
    }
}

#[cfg(test)]
#[path = "tests/board_tests.rs"]
mod tests;
