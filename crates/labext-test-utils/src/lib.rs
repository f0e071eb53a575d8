//! Shared test utilities for the labextension workspace.
//!
//! This crate provides standardised fixtures so crate test suites do not each
//! rebuild sandboxes by hand. It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`sandbox`]: [`TestSandbox`], a temporary tree laid out like the Jupyter
//!   directory tiers
//! - [`package`]: [`TestPackage`] builder for packages bundling labextensions

pub mod package;
pub mod sandbox;

pub use package::TestPackage;
pub use sandbox::TestSandbox;
