//! Query clause grammar: SELECT / FROM TREE / WHERE / GROUP BY /
//! ORDER BY / AS OF around the condition grammar

use crate::combinators::{
    Input, PResult, commit, cut, joined_words, keyword, quoted_string, symbol,
};
use crate::condition::condition;
use mql_ast::{OrderByColumn, Query, SortDirection};
use winnow::error::ErrMode;

/// Words that end a bare column, tree name or AS OF value
const CLAUSE_STOP: &[&str] = &[
    "from", "where", "group", "order", "as", "select", "tagged", "by", "of", "asc", "desc",
    "ascending", "descending",
];

/// Parse a query: every clause optional, in fixed order. A clause-less
/// input parses as a bare condition.
pub fn query(input: &mut Input<'_>) -> PResult<Query> {
    let mut parsed = Query::default();

    if keyword(input, "select").is_ok() {
        parsed.select = column_list(input).map_err(commit)?;
    }
    if keyword(input, "from").is_ok() {
        keyword(input, "tree").map_err(|_| cut())?;
        parsed.tree = Some(name_term(input).map_err(commit)?);
    }
    if keyword(input, "where").is_ok() {
        parsed.condition = Some(condition(input).map_err(commit)?);
    } else if parsed.select.is_empty() && parsed.tree.is_none() {
        // Bare filter string: the whole text is the condition
        let checkpoint = *input;
        match condition(input) {
            Ok(cond) => parsed.condition = Some(cond),
            Err(ErrMode::Cut(e)) => return Err(ErrMode::Cut(e)),
            Err(_) => *input = checkpoint,
        }
    }
    if keyword(input, "group").is_ok() {
        keyword(input, "by").map_err(|_| cut())?;
        parsed.group_by = column_list(input).map_err(commit)?;
    }
    if keyword(input, "order").is_ok() {
        keyword(input, "by").map_err(|_| cut())?;
        parsed.order_by = order_list(input).map_err(commit)?;
    }
    if keyword(input, "as").is_ok() {
        keyword(input, "of").map_err(|_| cut())?;
        parsed.as_of = Some(name_term(input).map_err(commit)?);
    }

    Ok(parsed)
}

/// A quoted name or a run of bare words
fn name_term(input: &mut Input<'_>) -> PResult<String> {
    match quoted_string(input) {
        Ok(name) => Ok(name),
        Err(ErrMode::Cut(e)) => Err(ErrMode::Cut(e)),
        Err(_) => joined_words(input, CLAUSE_STOP),
    }
}

fn column_list(input: &mut Input<'_>) -> PResult<Vec<String>> {
    let mut columns = vec![name_term(input)?];
    while symbol(input, ",").is_ok() {
        columns.push(name_term(input).map_err(commit)?);
    }
    Ok(columns)
}

fn order_list(input: &mut Input<'_>) -> PResult<Vec<OrderByColumn>> {
    let mut columns = vec![order_column(input)?];
    while symbol(input, ",").is_ok() {
        columns.push(order_column(input).map_err(commit)?);
    }
    Ok(columns)
}

fn order_column(input: &mut Input<'_>) -> PResult<OrderByColumn> {
    let property = name_term(input)?;
    let direction = if keyword(input, "desc").is_ok() || keyword(input, "descending").is_ok() {
        SortDirection::Descending
    } else if keyword(input, "asc").is_ok() || keyword(input, "ascending").is_ok() {
        SortDirection::Ascending
    } else {
        SortDirection::Ascending
    };
    Ok(OrderByColumn {
        property,
        direction,
    })
}
