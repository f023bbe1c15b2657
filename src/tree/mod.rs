pub mod controller;
pub mod draft;
pub mod loader;
pub mod model;
pub mod node;
pub mod rows;
pub mod store;

pub use controller::{ConfirmRemoval, EditState, Expansion, TreeController};
pub use loader::{ChildLoader, LoadOutcome};
pub use node::{DropDestination, DropPosition, NodeId, NodeRef, Nodes, TreeNode};
pub use store::{ControlledStore, OwnedStore, TreeStore};
