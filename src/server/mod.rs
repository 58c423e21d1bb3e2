//! Server-side extension machinery
//!
//! This module provides:
//! - The extension manager and its self-listing `extensions` resource
//! - The filesystem loader for convention-based discovery
//! - A builder owning the startup load sequence

pub mod builder;
pub mod extension_registry;
pub mod loader;

pub use builder::ExtensionManagerBuilder;
pub use extension_registry::{
    ExtensionFactory, ExtensionManager, ExtensionsController, FactoryRef, FactoryTable,
    LoadOutcome,
};
pub use loader::ExtensionLoader;
