// Command parsers for the styling DSL

use super::ast::{
    CategorizedCommand, Command, GraduatedCommand, HeatmapCommand, SimplifyCommand, StatsCommand,
};
use super::lexer::{boolean_literal, identifier, number_literal, string_literal, ws};
use crate::classify::MAX_CLASSES;
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::{eof, map},
    error::{Error, ErrorKind},
    multi::separated_list0,
    IResult,
};

/// Argument value as written; interpretation depends on the key
#[derive(Debug, Clone, PartialEq)]
enum ArgValue {
    Ident(String), // field: population, palette: Blues
    Text(String),  // palette: "Blues", field: "pop density"
    Number(f64),   // classes: 5, tolerance: 0.01
    Flag(bool),    // invert: true
}

impl ArgValue {
    fn into_text(self) -> Option<String> {
        match self {
            ArgValue::Ident(s) | ArgValue::Text(s) => Some(s),
            _ => None,
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            ArgValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Whole class count in `1..=MAX_CLASSES`
    fn as_count(&self) -> Option<usize> {
        self.as_number()
            .filter(|n| *n >= 1.0 && *n <= MAX_CLASSES as f64 && n.fract() == 0.0)
            .map(|n| n as usize)
    }

    fn as_flag(&self) -> Option<bool> {
        match self {
            ArgValue::Flag(b) => Some(*b),
            _ => None,
        }
    }
}

/// A key that is present but malformed, or a required key that is missing.
/// Reported as a failure so `alt` does not go on to try other commands.
fn invalid(input: &str) -> nom::Err<Error<&str>> {
    nom::Err::Failure(Error::new(input, ErrorKind::Verify))
}

fn arg_value(input: &str) -> IResult<&str, ArgValue> {
    alt((
        map(boolean_literal, ArgValue::Flag),
        map(identifier, ArgValue::Ident),
        map(string_literal, ArgValue::Text),
        map(number_literal, ArgValue::Number),
    ))(input)
}

/// Parse a single `key: value` argument
fn argument(input: &str) -> IResult<&str, (String, ArgValue)> {
    let (input, key) = ws(identifier)(input)?;
    let (input, _) = ws(char(':'))(input)?;
    let (input, value) = ws(arg_value)(input)?;
    Ok((input, (key, value)))
}

/// Parse `name(key: value, ...)` and return the argument list
fn call<'a>(name: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, Vec<(String, ArgValue)>> {
    move |input| {
        let (input, _) = ws(tag(name))(input)?;
        let (input, _) = ws(char('('))(input)?;
        let (input, args) = separated_list0(ws(char(',')), argument)(input)?;
        let (input, _) = ws(char(')'))(input)?;
        Ok((input, args))
    }
}

/// Parse a stats command
/// Format: stats(field: population)
pub fn parse_stats(input: &str) -> IResult<&str, Command> {
    let (rest, args) = call("stats")(input)?;

    let mut field = None;
    for (key, value) in args {
        if key == "field" {
            field = Some(value.into_text().ok_or_else(|| invalid(input))?);
        }
    }

    let field = field.ok_or_else(|| invalid(input))?;
    Ok((rest, Command::Stats(StatsCommand { field })))
}

/// Parse a graduated (class breaks) command
/// Format: graduated(field: pop, method: "quantile", classes: 5, palette: "Blues", invert: true)
pub fn parse_graduated(input: &str) -> IResult<&str, Command> {
    let (rest, args) = call("graduated")(input)?;

    let mut cmd = GraduatedCommand::default();
    let mut field = None;
    for (key, value) in args {
        match key.as_str() {
            "field" => field = Some(value.into_text().ok_or_else(|| invalid(input))?),
            "method" => cmd.method = Some(value.into_text().ok_or_else(|| invalid(input))?),
            "classes" => cmd.classes = Some(value.as_count().ok_or_else(|| invalid(input))?),
            "palette" => cmd.palette = Some(value.into_text().ok_or_else(|| invalid(input))?),
            "invert" => cmd.invert = Some(value.as_flag().ok_or_else(|| invalid(input))?),
            _ => {} // Ignore unknown keys
        }
    }

    cmd.field = field.ok_or_else(|| invalid(input))?;
    Ok((rest, Command::Graduated(cmd)))
}

/// Parse a categorized (unique values) command
/// Format: categorized(field: landuse, palette: "Set2")
pub fn parse_categorized(input: &str) -> IResult<&str, Command> {
    let (rest, args) = call("categorized")(input)?;

    let mut cmd = CategorizedCommand::default();
    let mut field = None;
    for (key, value) in args {
        match key.as_str() {
            "field" => field = Some(value.into_text().ok_or_else(|| invalid(input))?),
            "palette" => cmd.palette = Some(value.into_text().ok_or_else(|| invalid(input))?),
            _ => {}
        }
    }

    cmd.field = field.ok_or_else(|| invalid(input))?;
    Ok((rest, Command::Categorized(cmd)))
}

/// Parse a heatmap gradient command
/// Format: heatmap() or heatmap(palette: "Fire")
pub fn parse_heatmap(input: &str) -> IResult<&str, Command> {
    let (rest, args) = call("heatmap")(input)?;

    let mut cmd = HeatmapCommand::default();
    for (key, value) in args {
        if key == "palette" {
            cmd.palette = Some(value.into_text().ok_or_else(|| invalid(input))?);
        }
    }

    Ok((rest, Command::Heatmap(cmd)))
}

/// Parse a path simplification command
/// Format: simplify(x: lng, y: lat, tolerance: 0.001, high_quality: true)
pub fn parse_simplify(input: &str) -> IResult<&str, Command> {
    let (rest, args) = call("simplify")(input)?;

    let mut cmd = SimplifyCommand::default();
    let mut x = None;
    let mut y = None;
    for (key, value) in args {
        match key.as_str() {
            "x" => x = Some(value.into_text().ok_or_else(|| invalid(input))?),
            "y" => y = Some(value.into_text().ok_or_else(|| invalid(input))?),
            "tolerance" => cmd.tolerance = Some(value.as_number().ok_or_else(|| invalid(input))?),
            "high_quality" => cmd.high_quality = Some(value.as_flag().ok_or_else(|| invalid(input))?),
            _ => {}
        }
    }

    cmd.x = x.ok_or_else(|| invalid(input))?;
    cmd.y = y.ok_or_else(|| invalid(input))?;
    Ok((rest, Command::Simplify(cmd)))
}

/// Parse a complete command, rejecting trailing input
pub fn parse_command(input: &str) -> IResult<&str, Command> {
    let (input, command) = alt((
        parse_stats,
        parse_graduated,
        parse_categorized,
        parse_heatmap,
        parse_simplify,
    ))(input)?;

    // Consume trailing whitespace and ensure end of input
    let (input, _) = ws(eof)(input)?;

    Ok((input, command))
}
