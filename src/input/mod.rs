//! Input handling and tool state machine.
//!
//! This module translates native scene notifications into document store
//! mutations. The router never touches the scene graph; the reconciler brings
//! the scene back in line with whatever the router changed.

pub mod events;
pub mod router;
pub mod tool;

pub use events::{Key, MouseButton, SceneEvent};
pub use router::{ActiveView, ChosenAsset, InputRouter};
pub use tool::Tool;
