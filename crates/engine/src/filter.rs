//! The filter mini-language.
//!
//! ```text
//! filter    := cond (JOIN cond)*
//! JOIN      := "AND" | "OR"            -- case-insensitive, no precedence
//! cond      := ident op scalar | ident set_op "(" list ")"
//! op        := "=" | "!=" | ">" | ">=" | "<" | "<="
//! set_op    := "=" | "!="
//! ```
//!
//! Operator matching is first-longest (`<=` before `<`, `!=` before `=`).
//! `field=null` / `field!=null` compare against absence. Comparisons
//! coerce dynamically per call site: a numeric stored value pulls the
//! right-hand side into a numeric comparison; otherwise both sides compare
//! as strings. A coercion that fails degrades the condition to false, it
//! never aborts the verb.
//!
//! Joins fold left in input order with no precedence. Mixing `AND` and
//! `OR` in one chain is applied as written; runs of a like join flatten
//! naturally. This mirrors the language as deployed and is deliberate.
//!
//! The expression list compiles once into a [`Filter`]; evaluation per
//! record re-parses nothing.

use std::collections::BTreeSet;

use tidemark_core::{Error, Record, Result, Scalar};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Join {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl Op {
    fn holds(self, ord: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            Op::Eq => ord == Equal,
            Op::Ne => ord != Equal,
            Op::Gt => ord == Greater,
            Op::Ge => ord != Less,
            Op::Lt => ord == Less,
            Op::Le => ord != Greater,
        }
    }
}

#[derive(Debug, Clone)]
enum Cond {
    Compare {
        field: String,
        op: Op,
        rhs: String,
    },
    Member {
        field: String,
        negate: bool,
        set: BTreeSet<String>,
    },
}

/// A compiled filter predicate over decoded records.
#[derive(Debug, Clone)]
pub struct Filter {
    first: Cond,
    rest: Vec<(Join, Cond)>,
}

// First-longest operator table: two-char operators before their one-char
// prefixes.
const OPERATORS: &[(&str, Op)] = &[
    ("!=", Op::Ne),
    (">=", Op::Ge),
    ("<=", Op::Le),
    ("=", Op::Eq),
    (">", Op::Gt),
    ("<", Op::Lt),
];

fn ident_len(expr: &str) -> usize {
    let mut len = 0;
    for (i, c) in expr.char_indices() {
        let ok = if i == 0 {
            c.is_ascii_alphabetic() || c == '_'
        } else {
            c.is_ascii_alphanumeric() || c == '_'
        };
        if !ok {
            break;
        }
        len = i + c.len_utf8();
    }
    len
}

/// Parse a CSV membership list. Items may be double-quoted; a doubled
/// quote inside a quoted item escapes to one literal quote.
fn parse_list(body: &str, expr: &str) -> Result<BTreeSet<String>> {
    let mut set = BTreeSet::new();
    let mut chars = body.chars().peekable();

    loop {
        let mut item = String::new();
        match chars.peek() {
            None => {
                // A trailing comma is tolerated; an entirely empty list
                // is a parse failure.
                if set.is_empty() {
                    return Err(Error::FilterParse {
                        expression: expr.to_string(),
                    });
                }
                break;
            }
            Some('"') => {
                chars.next();
                let mut closed = false;
                while let Some(c) = chars.next() {
                    if c == '"' {
                        if chars.peek() == Some(&'"') {
                            chars.next();
                            item.push('"');
                        } else {
                            closed = true;
                            break;
                        }
                    } else {
                        item.push(c);
                    }
                }
                if !closed {
                    return Err(Error::FilterParse {
                        expression: expr.to_string(),
                    });
                }
                // Only a comma (or the end) may follow a closing quote
                match chars.next() {
                    None => {
                        set.insert(item);
                        break;
                    }
                    Some(',') => {
                        set.insert(item);
                        continue;
                    }
                    Some(_) => {
                        return Err(Error::FilterParse {
                            expression: expr.to_string(),
                        })
                    }
                }
            }
            Some(_) => {
                for c in chars.by_ref() {
                    if c == ',' {
                        break;
                    }
                    item.push(c);
                }
                set.insert(item);
                if chars.peek().is_none() {
                    break;
                }
            }
        }
    }
    Ok(set)
}

fn parse_cond(expr: &str) -> Result<Cond> {
    let field_len = ident_len(expr);
    if field_len == 0 {
        return Err(Error::FilterParse {
            expression: expr.to_string(),
        });
    }
    let field = expr[..field_len].to_string();
    let rest = &expr[field_len..];

    for (symbol, op) in OPERATORS {
        if let Some(rhs) = rest.strip_prefix(symbol) {
            if matches!(op, Op::Eq | Op::Ne) && rhs.starts_with('(') && rhs.ends_with(')') {
                let set = parse_list(&rhs[1..rhs.len() - 1], expr)?;
                return Ok(Cond::Member {
                    field,
                    negate: *op == Op::Ne,
                    set,
                });
            }
            return Ok(Cond::Compare {
                field,
                op: *op,
                rhs: rhs.to_string(),
            });
        }
    }
    Err(Error::FilterParse {
        expression: expr.to_string(),
    })
}

fn join_of(token: &str) -> Option<Join> {
    if token.eq_ignore_ascii_case("and") {
        Some(Join::And)
    } else if token.eq_ignore_ascii_case("or") {
        Some(Join::Or)
    } else {
        None
    }
}

fn eval_compare(record: &Record, field: &str, op: Op, rhs: &str) -> bool {
    let value = record.get(field).unwrap_or(&Scalar::Null);

    // null on the right compares against absence
    if rhs == "null" {
        return match op {
            Op::Eq => value.is_null(),
            Op::Ne => !value.is_null(),
            _ => false,
        };
    }

    if let Some(lhs) = value.as_number() {
        match rhs.parse::<f64>() {
            Ok(r) => {
                return lhs
                    .partial_cmp(&r)
                    .map(|ord| op.holds(ord))
                    .unwrap_or(false)
            }
            // Incompatible types: equality falls back to string
            // comparison, ordering degrades to false.
            Err(_) => {
                if !matches!(op, Op::Eq | Op::Ne) {
                    return false;
                }
            }
        }
    }

    op.holds(value.to_string().as_str().cmp(rhs))
}

fn eval(cond: &Cond, record: &Record) -> bool {
    match cond {
        Cond::Compare { field, op, rhs } => eval_compare(record, field, *op, rhs),
        Cond::Member { field, negate, set } => {
            let text = record
                .get(field)
                .unwrap_or(&Scalar::Null)
                .to_string();
            set.contains(&text) != *negate
        }
    }
}

impl Filter {
    /// Compile an expression token list into a predicate.
    pub fn parse(tokens: &[String]) -> Result<Filter> {
        let mut it = tokens.iter();
        let first = match it.next() {
            Some(tok) => parse_cond(tok)?,
            None => {
                return Err(Error::FilterParse {
                    expression: String::new(),
                })
            }
        };
        let mut rest = Vec::new();
        while let Some(tok) = it.next() {
            let join = join_of(tok).ok_or_else(|| Error::FilterParse {
                expression: tok.clone(),
            })?;
            let cond = match it.next() {
                Some(tok) => parse_cond(tok)?,
                None => {
                    return Err(Error::FilterParse {
                        expression: tok.clone(),
                    })
                }
            };
            rest.push((join, cond));
        }
        Ok(Filter { first, rest })
    }

    /// Apply the predicate to one decoded record. Joins fold left in
    /// input order.
    pub fn matches(&self, record: &Record) -> bool {
        let mut acc = eval(&self.first, record);
        for (join, cond) in &self.rest {
            let value = eval(cond, record);
            acc = match join {
                Join::And => acc && value,
                Join::Or => acc || value,
            };
        }
        acc
    }
}
