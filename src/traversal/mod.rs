//! Cross-zone traversal state machine.

mod core;

pub use self::core::{Traversal, TraversalCoordinator, TraversalState};
