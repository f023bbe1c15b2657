//! Forest model and tree controller behind the `tvt` terminal editor.
//!
//! [`tree::model`] holds the pure structural operations; [`tree::TreeController`]
//! wraps them with expansion, lazy loading, inline drafts and drag-and-drop
//! state, and can own the forest or forward edits to an external owner.

pub mod error;
pub mod tree;
