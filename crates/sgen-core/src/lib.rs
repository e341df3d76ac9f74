//! # SGen Core - Stylesheet Compiler
//!
//! `sgen-core` compiles YAML stylesheets into Swift appearance proxies: typed
//! design tokens with per-trait conditional values, style inheritance,
//! theme switching between stylesheets, and animation timelines.
//!
//! ## Pipeline
//!
//! 1. [`preprocess`]: rewrites shorthand markers so the source is valid YAML.
//! 2. [`loader`]: builds the [`ir`] tree, parsing every scalar with the
//!    [`rhs`] value language and every conditional key with [`condition`].
//! 3. [`registry`]: links stylesheets to their base stylesheet.
//! 4. [`resolve`]: injects shadow styles, resolves redirects and marks
//!    overrides.
//! 5. [`generate`]: renders Swift.
//!
//! ## Quick Start
//!
//! ```rust
//! use sgen_core::{prepare, Generator, LoadOptions, Loader, Registry, Settings};
//!
//! let source = r#"
//! Button for UIButton:
//!   cornerRadius: 4
//! "#;
//!
//! let loader = Loader::new(LoadOptions::default());
//! let sheet = loader.load_str("Default", source, None).unwrap();
//!
//! let mut registry = Registry::new();
//! registry.register(sheet).unwrap();
//! registry.link().unwrap();
//!
//! let settings = Settings::default();
//! prepare(&mut registry, &settings).unwrap();
//!
//! let files = Generator::new(&registry, &settings).unwrap().generate_all().unwrap();
//! assert_eq!(files[0].name, "Default.generated.swift");
//! assert!(files[0].content.contains("class ButtonAppearanceProxy"));
//! ```

pub mod condition;
pub mod error;
pub mod generate;
pub mod ir;
pub mod loader;
pub mod preprocess;
pub mod registry;
pub mod resolve;
pub mod rhs;
pub mod settings;
pub mod util;

pub use condition::Condition;
pub use error::{ColorError, ConditionError, Error, GeneratorError, ResolveError, Result, RhsError};
pub use generate::{GeneratedFile, Generator};
pub use ir::{Property, PropertyValue, Style, Stylesheet};
pub use loader::{LoadOptions, Loader, SymbolFont};
pub use registry::{Registry, StyleId, StylesheetId};
pub use resolve::prepare;
pub use rhs::{ParseContext, RhsValue};
pub use settings::{ImportSettings, Settings};
