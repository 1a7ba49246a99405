//! CSS engine: scanner, block assembler, selector/property parser, document model.

pub mod tokenizer;
pub mod assembler;
pub mod error;
pub mod model;
pub mod parser;
pub mod stylesheet;
