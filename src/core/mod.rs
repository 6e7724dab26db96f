//! Core remote-control modules - exports, pages, icons, UI bridge
//!
//! These modules know nothing about HTTP or about a particular host.

pub mod exports;
pub mod icons;
pub mod page;
pub mod ui_bridge;

// Re-exports for convenience
pub use exports::{ExportRegistry, ExportedResource, MacroDescriptor, Resource, ResourceKind};
pub use icons::IconPool;
pub use page::{Action, Page, Section};
pub use ui_bridge::{CallOutcome, UiCallBridge, UiDispatcher, UiQueue, ui_channel};
