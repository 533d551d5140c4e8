pub mod config;
pub mod document;
pub mod dom;
pub mod emitter;
pub mod id;
pub mod parser;
pub mod records;
pub mod selector;
pub mod style;

pub use config::{EditorConfig, SandboxPolicy};
pub use document::{Document, ElementData, NodeData};
pub use dom::{AdjacentPosition, EventKind, ListenTarget, ListenerSet, NodeType, PageDom};
pub use id::ModeId;
pub use selector::{Selector, SelectorList};
pub use style::InlineStyle;

// Re-export geometry and graph types so downstream crates share one version.
pub use kurbo::{Point, Rect};
pub use petgraph::graph::NodeIndex;
