//! Autoglot - bidirectional i18n source transformer
//!
//! Autoglot rewrites JavaScript, TypeScript and Vue single-file components so
//! that natural-language string literals become translation calls, collecting
//! the texts into a locale file. The revert pass turns those calls back into
//! literals for one locale, writing copies under an output directory.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (`transform`, `revert`, `init`)
//! - `config`: Configuration file loading and validation
//! - `core`: Dialect routing, both passes, locale files and batch runs
//! - `issues`: Issue type definitions and reporting
//! - `utils`: Shared path helpers

pub mod cli;
pub mod config;
pub mod core;
pub mod issues;
pub mod utils;
