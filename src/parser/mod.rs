// Styling command DSL parser

pub mod ast;
pub mod command;
pub mod lexer;

// Public API re-exports
pub use ast::{
    CategorizedCommand, Command, GraduatedCommand, HeatmapCommand, SimplifyCommand, StatsCommand,
};
pub use command::parse_command;
