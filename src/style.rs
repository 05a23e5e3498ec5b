// Stroke dash patterns ("5, 10" style dash arrays)

use nom::{
    branch::alt,
    character::complete::{char, multispace0, multispace1},
    combinator::{all_consuming, value},
    multi::separated_list1,
    number::complete::double,
    sequence::delimited,
    IResult,
};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StyleError {
    #[error("invalid dash array '{0}'")]
    InvalidDashArray(String),
    #[error("dash lengths must be finite and non-negative, got {0}")]
    InvalidDashLength(f64),
}

fn separator(input: &str) -> IResult<&str, ()> {
    alt((
        value((), delimited(multispace0, char(','), multispace0)),
        value((), multispace1),
    ))(input)
}

/// Parse a dash array such as `"5, 10"` or `"4 2 1 2"`.
/// An empty string, `"none"` or `"solid"` is a solid stroke (no dashes).
pub fn parse_dash_array(input: &str) -> Result<Vec<f64>, StyleError> {
    let trimmed = input.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("none")
        || trimmed.eq_ignore_ascii_case("solid")
    {
        return Ok(Vec::new());
    }

    let (_, dashes) = all_consuming(separated_list1(separator, double))(trimmed)
        .map_err(|_| StyleError::InvalidDashArray(input.to_string()))?;

    if let Some(&bad) = dashes.iter().find(|d| !d.is_finite() || **d < 0.0) {
        return Err(StyleError::InvalidDashLength(bad));
    }
    Ok(dashes)
}

/// Render a dash array back into its comma-separated form
pub fn format_dash_array(dashes: &[f64]) -> String {
    dashes
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dash_array_commas() {
        assert_eq!(parse_dash_array("5, 10"), Ok(vec![5.0, 10.0]));
        assert_eq!(parse_dash_array("5,10,2.5"), Ok(vec![5.0, 10.0, 2.5]));
    }

    #[test]
    fn test_parse_dash_array_whitespace() {
        assert_eq!(parse_dash_array(" 4 2  1 2 "), Ok(vec![4.0, 2.0, 1.0, 2.0]));
        assert_eq!(parse_dash_array("4 , 2"), Ok(vec![4.0, 2.0]));
    }

    #[test]
    fn test_parse_dash_array_solid() {
        assert_eq!(parse_dash_array(""), Ok(vec![]));
        assert_eq!(parse_dash_array("  "), Ok(vec![]));
        assert_eq!(parse_dash_array("None"), Ok(vec![]));
        assert_eq!(parse_dash_array("solid"), Ok(vec![]));
    }

    #[test]
    fn test_parse_dash_array_rejects_garbage() {
        assert!(matches!(parse_dash_array("5, abc"), Err(StyleError::InvalidDashArray(_))));
        assert!(matches!(parse_dash_array("5,,10"), Err(StyleError::InvalidDashArray(_))));
        assert!(matches!(parse_dash_array("5,"), Err(StyleError::InvalidDashArray(_))));
    }

    #[test]
    fn test_parse_dash_array_rejects_negative() {
        assert_eq!(parse_dash_array("5, -2"), Err(StyleError::InvalidDashLength(-2.0)));
    }

    #[test]
    fn test_format_dash_array() {
        assert_eq!(format_dash_array(&[5.0, 10.0, 2.5]), "5,10,2.5");
        assert_eq!(format_dash_array(&[]), "");
    }
}
