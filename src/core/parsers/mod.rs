//! Parser adapters.
//!
//! - `script`: JS/TS/JSX/TSX via swc, with document-offset mapping
//! - `markup`: component documents (`.vue`) as a tree of byte ranges

pub mod markup;
pub mod script;
