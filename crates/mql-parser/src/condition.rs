//! Condition grammar: OR / AND / NOT over comparisons, membership tests,
//! tag filters and nested queries

use crate::combinators::{
    Input, PResult, backtrack, commit, cut, integer, joined_words, keyword, quoted_string, symbol,
    word, ws,
};
use crate::query::query;
use mql_ast::{ComparisonOp, Condition, QueryValue};
use winnow::error::ErrMode;

/// Words that end a bare property name
const PROPERTY_STOP: &[&str] = &[
    "and", "or", "not", "in", "tagged", "with", "where", "select", "from", "group", "order", "as",
    "by", "of", "property",
];

/// Words that end a bare value
///
/// Deliberately smaller than the property stop set so values like
/// `in progress` parse without quoting.
const VALUE_STOP: &[&str] = &[
    "and", "or", "where", "select", "from", "group", "order", "as", "tagged",
];

/// Parse a full condition (entry point)
pub fn condition(input: &mut Input<'_>) -> PResult<Condition> {
    or_condition(input)
}

fn or_condition(input: &mut Input<'_>) -> PResult<Condition> {
    let mut operands = vec![and_condition(input)?];
    while keyword(input, "or").is_ok() {
        operands.push(and_condition(input).map_err(commit)?);
    }
    Ok(Condition::or(operands))
}

fn and_condition(input: &mut Input<'_>) -> PResult<Condition> {
    let mut operands = vec![unary_condition(input)?];
    while keyword(input, "and").is_ok() {
        operands.push(unary_condition(input).map_err(commit)?);
    }
    Ok(Condition::and(operands))
}

fn unary_condition(input: &mut Input<'_>) -> PResult<Condition> {
    if keyword(input, "not").is_ok() {
        let inner = unary_condition(input).map_err(commit)?;
        return Ok(inner.not());
    }
    if symbol(input, "(").is_ok() {
        let inner = condition(input).map_err(commit)?;
        symbol(input, ")").map_err(|_| cut())?;
        return Ok(inner);
    }
    primary(input)
}

fn primary(input: &mut Input<'_>) -> PResult<Condition> {
    let checkpoint = *input;

    if keyword(input, "tagged").is_ok() {
        keyword(input, "with").map_err(|_| cut())?;
        let tag = match try_quoted(input)? {
            Some(text) => text,
            None => joined_words(input, VALUE_STOP).map_err(|_| cut())?,
        };
        return Ok(Condition::TaggedWith(tag));
    }

    let property = match property_term(input) {
        Ok(name) => name,
        Err(err) => {
            *input = checkpoint;
            return Err(err);
        }
    };

    if keyword(input, "in").is_ok() {
        // NUMBER IN / NUMBERS IN is membership on the built-in Number property
        let property = if property.eq_ignore_ascii_case("number")
            || property.eq_ignore_ascii_case("numbers")
        {
            "Number".to_string()
        } else {
            property
        };
        symbol(input, "(").map_err(|_| cut())?;

        let nested = *input;
        if keyword(input, "select").is_ok() {
            *input = nested;
            let subquery = query(input).map_err(commit)?;
            symbol(input, ")").map_err(|_| cut())?;
            return Ok(Condition::InQuery {
                property,
                query: Box::new(subquery),
            });
        }

        let values = value_list(input).map_err(commit)?;
        symbol(input, ")").map_err(|_| cut())?;
        return Ok(Condition::In { property, values });
    }

    match comparison_op(input) {
        Ok(op) => {
            let value = value_term(input).map_err(commit)?;
            Ok(Condition::compare(property, op, value))
        }
        Err(err) => {
            *input = checkpoint;
            Err(err)
        }
    }
}

/// Parse a property name: `PROPERTY word`, a quoted name, or a run of
/// bare words
fn property_term(input: &mut Input<'_>) -> PResult<String> {
    if keyword(input, "property").is_ok() {
        // Explicit marker: the next term is a property name even if it
        // collides with a keyword
        if let Some(name) = try_quoted(input)? {
            return Ok(name);
        }
        return word(input).map(str::to_string).map_err(|_| cut());
    }
    if let Some(name) = try_quoted(input)? {
        return Ok(name);
    }
    joined_words(input, PROPERTY_STOP)
}

/// Parse a comparison operator; longest symbols first
pub(crate) fn comparison_op(input: &mut Input<'_>) -> PResult<ComparisonOp> {
    ws(input)?;
    const OPERATORS: &[(&str, ComparisonOp)] = &[
        (">=", ComparisonOp::GreaterOrEqual),
        ("<=", ComparisonOp::LessOrEqual),
        ("!=", ComparisonOp::NotEqual),
        ("=", ComparisonOp::Equal),
        (">", ComparisonOp::Greater),
        ("<", ComparisonOp::Less),
    ];
    for (sym, op) in OPERATORS {
        if let Some(rest) = input.strip_prefix(sym) {
            *input = rest;
            return Ok(*op);
        }
    }
    Err(backtrack())
}

/// Parse one comparison value
pub(crate) fn value_term(input: &mut Input<'_>) -> PResult<QueryValue> {
    if let Some(text) = try_quoted(input)? {
        return Ok(QueryValue::Literal(text));
    }

    // Parenthesized project-variable reference
    if symbol(input, "(").is_ok() {
        let name = variable_name(input)?;
        symbol(input, ")").map_err(|_| cut())?;
        return Ok(QueryValue::Variable(name));
    }

    // THIS CARD [.property]
    let checkpoint = *input;
    if keyword(input, "this").is_ok() {
        match this_card_tail(input) {
            Ok(value) => return Ok(value),
            Err(_) => *input = checkpoint,
        }
    }

    // NUMBER n card reference
    let checkpoint = *input;
    if keyword(input, "number").is_ok() {
        if let Ok(n) = integer(input) {
            return Ok(QueryValue::CardNumber(n));
        }
        *input = checkpoint;
    }

    joined_words(input, VALUE_STOP).map(QueryValue::Literal)
}

fn this_card_tail(input: &mut Input<'_>) -> PResult<QueryValue> {
    let w = word(input)?;
    let lower = w.to_ascii_lowercase();
    if lower == "card" {
        return Ok(QueryValue::ThisCard);
    }
    if lower == "card." {
        // Quoted property name after the dot
        let property = quoted_string(input)?;
        return Ok(QueryValue::ThisCardProperty(property));
    }
    if lower.starts_with("card.") {
        return Ok(QueryValue::ThisCardProperty(w[5..].to_string()));
    }
    Err(backtrack())
}

fn variable_name(input: &mut Input<'_>) -> PResult<String> {
    match input.find(')') {
        Some(pos) => {
            let name = input[..pos]
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");
            *input = &input[pos..];
            if name.is_empty() { Err(cut()) } else { Ok(name) }
        }
        None => Err(cut()),
    }
}

fn value_list(input: &mut Input<'_>) -> PResult<Vec<QueryValue>> {
    let mut values = vec![value_term(input)?];
    while symbol(input, ",").is_ok() {
        values.push(value_term(input).map_err(commit)?);
    }
    Ok(values)
}

/// Try a quoted string: absent is fine, unterminated propagates as a cut
fn try_quoted(input: &mut Input<'_>) -> PResult<Option<String>> {
    match quoted_string(input) {
        Ok(text) => Ok(Some(text)),
        Err(ErrMode::Cut(e)) => Err(ErrMode::Cut(e)),
        Err(_) => Ok(None),
    }
}
