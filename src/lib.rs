// Library exports for geostyle

pub mod category;
pub mod classify;
pub mod config;
pub mod csv_reader;
pub mod graph;
pub mod palette;
pub mod parser;
pub mod runtime;
pub mod simplify;
pub mod style;
