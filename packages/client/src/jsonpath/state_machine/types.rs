//! Parse frame types
//!
//! A frame is pushed for every container (and, transiently, for every scalar)
//! while it is being read. Retained frames build their value; the others only
//! remember which child is currently in flight so that nothing of an
//! unmatched subtree outlives its closing bracket.

use hashbrown::HashSet;
use serde_json::{Map, Value};

use crate::jsonpath::pattern::FrameKey;

/// Children of a container frame
#[derive(Debug)]
pub(crate) enum Children<T> {
    /// The frame or an ancestor matches: children are kept
    Retained(T),
    /// Nothing to keep: only the in-flight child slot is tracked
    Sparse(SparseSlots),
}

/// Kind-specific state of a frame
#[derive(Debug)]
pub(crate) enum FrameKind {
    Object {
        children: Children<Map<String, Value>>,
        /// Last key read, the key of the next child
        pending_key: Option<String>,
    },
    Array {
        children: Children<Vec<Value>>,
        next_index: usize,
    },
    /// Transient frame for a string, number, boolean or null
    Scalar { value: Option<Value> },
}

/// One open value on the parse stack
#[derive(Debug)]
pub(crate) struct Frame {
    pub(crate) kind: FrameKind,
    /// Key under which the value attaches to its parent, `None` for the root
    pub(crate) key: Option<FrameKey>,
    /// Index of the pattern this frame matches, fixed at creation
    pub(crate) matches: Option<usize>,
    /// `true` iff this frame or an ancestor matches
    pub(crate) retain: bool,
}

impl Frame {
    pub(crate) fn object(key: Option<FrameKey>, matches: Option<usize>, retain: bool) -> Self {
        let children = if retain {
            Children::Retained(Map::new())
        } else {
            Children::Sparse(SparseSlots::default())
        };
        Self {
            kind: FrameKind::Object { children, pending_key: None },
            key,
            matches,
            retain,
        }
    }

    pub(crate) fn array(key: Option<FrameKey>, matches: Option<usize>, retain: bool) -> Self {
        let children = if retain {
            Children::Retained(Vec::new())
        } else {
            Children::Sparse(SparseSlots::default())
        };
        Self {
            kind: FrameKind::Array { children, next_index: 0 },
            key,
            matches,
            retain,
        }
    }

    pub(crate) fn scalar(
        value: Value,
        key: Option<FrameKey>,
        matches: Option<usize>,
        retain: bool,
    ) -> Self {
        Self {
            kind: FrameKind::Scalar { value: retain.then_some(value) },
            key,
            matches,
            retain,
        }
    }

    /// Name used in structural error messages
    pub(crate) fn kind_name(&self) -> &'static str {
        match self.kind {
            FrameKind::Object { .. } => "object",
            FrameKind::Array { .. } => "array",
            FrameKind::Scalar { .. } => "value",
        }
    }

    /// Key the next child will be attached under
    pub(crate) fn next_child_key(&mut self) -> FrameKey {
        match &mut self.kind {
            FrameKind::Object { pending_key, .. } => {
                FrameKey::Key(pending_key.clone().unwrap_or_default())
            }
            FrameKind::Array { next_index, .. } => {
                let index = *next_index;
                *next_index += 1;
                FrameKey::Index(index)
            }
            FrameKind::Scalar { .. } => FrameKey::Index(0),
        }
    }

    /// Record that a child is now being read under `key`
    ///
    /// Returns `true` if a sparse slot was opened.
    pub(crate) fn open_slot(&mut self, key: &FrameKey) -> bool {
        match &mut self.kind {
            FrameKind::Object { children: Children::Sparse(slots), .. }
            | FrameKind::Array { children: Children::Sparse(slots), .. } => {
                slots.open(key.clone());
                true
            }
            _ => false,
        }
    }

    /// Attach a closed child, or drop its slot when this frame is not retained
    ///
    /// Returns `true` if a sparse slot was released.
    pub(crate) fn attach(&mut self, key: FrameKey, value: Option<Value>) -> bool {
        match (&mut self.kind, key) {
            (FrameKind::Object { children: Children::Sparse(slots), .. }, key)
            | (FrameKind::Array { children: Children::Sparse(slots), .. }, key) => {
                slots.release(&key)
            }
            (FrameKind::Object { children: Children::Retained(fields), .. }, FrameKey::Key(key)) => {
                if let Some(value) = value {
                    fields.insert(key, value);
                }
                false
            }
            (FrameKind::Array { children: Children::Retained(items), .. }, _) => {
                if let Some(value) = value {
                    items.push(value);
                }
                false
            }
            _ => false,
        }
    }

    /// Finished value of a retained frame
    pub(crate) fn into_value(self) -> Option<Value> {
        match self.kind {
            FrameKind::Object { children: Children::Retained(fields), .. } => {
                Some(Value::Object(fields))
            }
            FrameKind::Array { children: Children::Retained(items), .. } => Some(Value::Array(items)),
            FrameKind::Scalar { value } => value,
            FrameKind::Object { children: Children::Sparse(_), .. }
            | FrameKind::Array { children: Children::Sparse(_), .. } => None,
        }
    }
}

/// Deletable, key-addressed slots of a non-retained container
///
/// Holds at most the child currently being read; the slot is removed as soon
/// as that child closes, without compacting or shifting anything.
#[derive(Debug, Default)]
pub(crate) struct SparseSlots {
    live: HashSet<FrameKey>,
}

impl SparseSlots {
    pub(crate) fn open(&mut self, key: FrameKey) {
        self.live.insert(key);
    }

    pub(crate) fn release(&mut self, key: &FrameKey) -> bool {
        self.live.remove(key)
    }
}
