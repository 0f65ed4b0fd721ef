// Module structure for mongolog.

// Core parsing
pub mod parser;

// Process plumbing
pub mod conf;
pub mod runtime;
