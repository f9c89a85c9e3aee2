//! Unit expression parser using pest

use pest::error::InputLocation;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::error::{Error, MalformedReason, Result};
use crate::types::UnitExpression;

#[derive(Parser)]
#[grammar = "parser/grammar.pest"]
struct UnitParser;

/// Parse the textual form of a compound unit.
///
/// This is purely syntactic: names are kept as written and are not checked
/// against any catalog. Use [`crate::Engine::parse_units`] to resolve them.
pub fn parse_unit_expression(input: &str) -> Result<UnitExpression> {
    let text = input.trim();

    let mut pairs = UnitParser::parse(Rule::unit_expression, text).map_err(|e| {
        let pos = match e.location {
            InputLocation::Pos(p) => p,
            InputLocation::Span((start, _)) => start,
        };
        Error::malformed(input, classify_failure(text, pos))
    })?;

    let mut expr = UnitExpression::new();
    let Some(root) = pairs.next() else {
        return Ok(expr);
    };

    for side in root.into_inner() {
        let sign = match side.as_rule() {
            Rule::numerator => 1,
            Rule::denominator => -1,
            _ => continue,
        };
        for term in side.into_inner() {
            let (name, exponent) = build_term(input, term)?;
            // i64::MIN cannot be negated
            let exponent = exponent.checked_mul(sign).ok_or_else(|| {
                Error::malformed(input, MalformedReason::InvalidExponent(exponent.to_string()))
            })?;
            expr.add_term(&name, exponent)?;
        }
    }

    Ok(expr)
}

fn build_term(input: &str, term: Pair<'_, Rule>) -> Result<(String, i64)> {
    let mut inner = term.into_inner();
    let name = inner
        .next()
        .map(|p| p.as_str().to_string())
        .ok_or_else(|| Error::malformed(input, MalformedReason::EmptyTerm))?;

    let mut exponent: i64 = 1;
    for pair in inner {
        let raw = pair.as_str();
        let invalid = || Error::malformed(input, MalformedReason::InvalidExponent(raw.to_string()));
        let value: i64 = raw.parse().map_err(|_| invalid())?;
        exponent = exponent
            .checked_mul(value)
            .filter(|e| *e != i64::MIN)
            .ok_or_else(invalid)?;
    }

    Ok((name, exponent))
}

/// Turn a pest failure offset into one of the documented syntax errors.
fn classify_failure(text: &str, pos: usize) -> MalformedReason {
    let pos = pos.min(text.len());
    let (before, after) = text.split_at(pos);
    let next = after.chars().next();

    if next == Some('/') && before.contains('/') {
        return MalformedReason::MultipleDivisions;
    }

    // the term being read when parsing stopped
    let term_start = before.rfind(['*', '/']).map_or(0, |i| i + 1);
    let term = &before[term_start..];

    if let Some(caret) = term.rfind('^') {
        let exponent_start = term_start + caret + 1;
        let exponent_end = text[exponent_start..]
            .find(['*', '/', '^'])
            .map_or(text.len(), |i| exponent_start + i);
        return MalformedReason::InvalidExponent(text[exponent_start..exponent_end].to_string());
    }

    match next {
        None | Some('*') | Some('/') => MalformedReason::EmptyTerm,
        Some(c) => MalformedReason::UnexpectedCharacter(c),
    }
}
