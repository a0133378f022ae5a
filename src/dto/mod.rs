pub mod chunk;
pub mod document;
