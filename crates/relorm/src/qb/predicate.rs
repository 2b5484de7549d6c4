//! WHERE predicates: templates with named parameters, criteria maps, and raw SQL.
//!
//! Template text is passed through verbatim except for parameter references:
//!
//! - `:name` binds the named value (or inlines it when it is raw SQL)
//! - `:...name` expands a list into `p0, p1, ...`
//! - `::` is a cast and is left alone
//! - anything inside `'..'`, `".."` or `` `..` `` is left alone
//!
//! When the builder is scoped to an alias, `alias.property` is rewritten to the
//! escaped physical column of that property.

use crate::dialect::Dialect;
use crate::error::{OrmError, OrmResult};
use crate::metadata::{EntityRef, MetadataResolver};
use crate::qb::expr::{Params, RawSql, ValueExpr};
use crate::qb::param::{ParamBinder, SqlBuf};
use crate::value::Value;
use std::iter::Peekable;
use std::str::CharIndices;

/// How a predicate joins the ones before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    /// `AND`
    And,
    /// `OR`
    Or,
}

impl Connector {
    pub(crate) const fn as_sql(self) -> &'static str {
        match self {
            Connector::And => " AND ",
            Connector::Or => " OR ",
        }
    }
}

/// One WHERE condition.
#[derive(Clone, Debug)]
pub enum Predicate {
    /// SQL text with `:name` references into `params`.
    Template {
        /// Condition text.
        sql: String,
        /// Named values referenced by the text.
        params: Params,
    },
    /// Property/value pairs, each compared for equality and joined with AND.
    Criteria(Params),
    /// Verbatim SQL.
    Raw(RawSql),
}

/// What a predicate needs to know about its statement.
pub(crate) struct PredicateContext<'a> {
    pub dialect: &'a dyn Dialect,
    pub resolver: &'a dyn MetadataResolver,
    pub entity: Option<&'a EntityRef>,
    pub alias: Option<&'a str>,
}

impl PredicateContext<'_> {
    /// Physical column for a property, or the name itself when the target is a bare table.
    pub(crate) fn column(&self, property: &str) -> OrmResult<String> {
        match self.entity {
            Some(entity) => self.resolver.resolve_column(entity, property),
            None => Ok(property.to_string()),
        }
    }
}

impl Predicate {
    pub(crate) fn compile(
        &self,
        ctx: &PredicateContext<'_>,
        binder: &mut ParamBinder,
        out: &mut SqlBuf,
    ) -> OrmResult<()> {
        match self {
            Predicate::Template { sql, params } => compile_template(sql, params, ctx, binder, out),
            Predicate::Criteria(criteria) => compile_criteria(criteria, ctx, binder, out),
            Predicate::Raw(raw) => {
                out.push_str(&raw.render());
                Ok(())
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn take_ident(chars: &mut Peekable<CharIndices<'_>>) -> String {
    let mut ident = String::new();
    while let Some(&(_, c)) = chars.peek() {
        if !is_ident_char(c) {
            break;
        }
        ident.push(c);
        chars.next();
    }
    ident
}

/// Copy a quoted section, honoring doubled closing quotes.
fn copy_quoted(quote: char, chars: &mut Peekable<CharIndices<'_>>, out: &mut String) {
    out.push(quote);
    while let Some((_, c)) = chars.next() {
        out.push(c);
        if c == quote {
            match chars.peek() {
                Some(&(_, next)) if next == quote => {
                    out.push(next);
                    chars.next();
                }
                _ => return,
            }
        }
    }
}

fn compile_template(
    sql: &str,
    params: &Params,
    ctx: &PredicateContext<'_>,
    binder: &mut ParamBinder,
    out: &mut SqlBuf,
) -> OrmResult<()> {
    let mut text = String::with_capacity(sql.len());
    let mut chars = sql.char_indices().peekable();
    let mut prev: Option<char> = None;

    while let Some((pos, c)) = chars.next() {
        match c {
            '\'' | '"' | '`' => {
                copy_quoted(c, &mut chars, &mut text);
                prev = Some(c);
                continue;
            }
            ':' => {
                if let Some(&(_, ':')) = chars.peek() {
                    chars.next();
                    text.push_str("::");
                    prev = Some(':');
                    continue;
                }
                let spread = sql[pos + 1..].starts_with("...");
                let name_start = if spread { pos + 4 } else { pos + 1 };
                let starts_name = sql[name_start..].chars().next().is_some_and(is_ident_start);
                if !starts_name {
                    text.push(c);
                    prev = Some(c);
                    continue;
                }
                if spread {
                    for _ in 0..3 {
                        chars.next();
                    }
                }
                let name = take_ident(&mut chars);
                out.push_str(&text);
                text.clear();
                bind_reference(&name, spread, params, binder, out)?;
                prev = name.chars().last();
                continue;
            }
            c if is_ident_start(c) && !prev.is_some_and(|p| is_ident_char(p) || p == '.') => {
                let mut word = String::from(c);
                word.push_str(&take_ident(&mut chars));
                prev = word.chars().last();

                let Some(alias) = ctx.alias.filter(|a| *a == word) else {
                    text.push_str(&word);
                    continue;
                };
                if !matches!(chars.peek(), Some(&(_, '.'))) {
                    text.push_str(&word);
                    continue;
                }
                chars.next();
                let property = take_ident(&mut chars);
                if property.is_empty() {
                    text.push_str(alias);
                    text.push('.');
                    prev = Some('.');
                    continue;
                }
                let column = ctx.column(&property)?;
                text.push_str(&ctx.dialect.escape_identifier(&column));
                prev = property.chars().last();
                continue;
            }
            _ => {}
        }
        text.push(c);
        prev = Some(c);
    }

    out.push_str(&text);
    Ok(())
}

fn bind_reference(
    name: &str,
    spread: bool,
    params: &Params,
    binder: &mut ParamBinder,
    out: &mut SqlBuf,
) -> OrmResult<()> {
    let value = params.get(name).ok_or_else(|| OrmError::unresolved(name))?;
    match value {
        ValueExpr::Literal(v) => {
            let p = binder.bind(name, v.clone())?;
            out.push_param(p);
        }
        ValueExpr::Null => {
            let p = binder.bind(name, Value::Null)?;
            out.push_param(p);
        }
        ValueExpr::Raw(raw) => {
            out.push_str(&raw.render());
        }
        ValueExpr::List(values) if spread => {
            let list = binder.bind_list(name, values.clone())?;
            out.push_list(list);
        }
        ValueExpr::List(_) => {
            return Err(OrmError::validation(format!(
                "list parameter '{name}' must be referenced as ':...{name}'"
            )));
        }
    }
    Ok(())
}

fn compile_criteria(
    criteria: &Params,
    ctx: &PredicateContext<'_>,
    binder: &mut ParamBinder,
    out: &mut SqlBuf,
) -> OrmResult<()> {
    if criteria.is_empty() {
        return Err(OrmError::validation("where_criteria: criteria cannot be empty"));
    }
    for (i, (property, value)) in criteria.iter().enumerate() {
        if i > 0 {
            out.push_str(" AND ");
        }
        let column = ctx.column(property)?;
        let quoted = ctx.dialect.escape_identifier(&column);
        out.push_str(&quoted);
        match value {
            ValueExpr::Literal(v) => {
                out.push_str(" = ");
                let p = binder.bind_generated(&format!("where_{column}"), v.clone());
                out.push_param(p);
            }
            ValueExpr::Null => {
                out.push_str(" IS NULL");
            }
            ValueExpr::Raw(raw) => {
                out.push_str(" = ");
                out.push_str(&raw.render());
            }
            ValueExpr::List(values) if values.is_empty() => {
                // Nothing can match an empty list.
                out.push_str(" IN (NULL)");
            }
            ValueExpr::List(values) => {
                out.push_str(" IN (");
                for (j, v) in values.iter().enumerate() {
                    if j > 0 {
                        out.push_str(", ");
                    }
                    let p = binder.bind_generated(&format!("where_{column}"), v.clone());
                    out.push_param(p);
                }
                out.push_str(")");
            }
        }
    }
    Ok(())
}
