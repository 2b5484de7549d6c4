//! Parameter binding and placeholder rendering.
//!
//! Compilers never write placeholder text directly. They bind a value, get back a
//! [`Placeholder`] slot, and push it into a [`SqlBuf`]. Once the whole statement is
//! assembled, [`ParamBinder::finalize`] walks the buffer in SQL order and renders each
//! slot in the dialect's syntax, so ordinals always follow textual position regardless
//! of the order in which clauses were compiled.

use crate::dialect::{DialectKind, PlaceholderStyle};
use crate::error::{OrmError, OrmResult};
use crate::value::Value;
use std::collections::HashMap;

/// Opaque handle to a bound value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placeholder(usize);

/// Opaque handle to a bound list; renders as its current elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListPlaceholder(usize);

#[derive(Debug, Clone)]
struct Slot {
    name: String,
    value: Value,
    generated: bool,
    live: bool,
}

#[derive(Debug, Clone)]
struct ListSlot {
    name: String,
    elements: Vec<usize>,
}

/// Assigns names to bound values for one compile pass.
///
/// - Re-binding a user name overwrites the earlier value (last write wins); every
///   occurrence of that name then sees the final value.
/// - In strict mode a re-bind whose value type differs fails with
///   [`OrmError::DuplicateParameter`].
/// - Generated names never shadow user names: a generated name is suffixed until
///   unique, and a user name that lands on a generated one moves the generated slot
///   to a fresh name.
/// - A list is bound as one unit. Its elements get generated names (`<name>_<i>`),
///   and re-binding the list name replaces the whole list everywhere it is used.
#[derive(Debug, Default)]
pub struct ParamBinder {
    slots: Vec<Slot>,
    by_name: HashMap<String, usize>,
    lists: Vec<ListSlot>,
    lists_by_name: HashMap<String, usize>,
    strict: bool,
}

impl ParamBinder {
    /// Create a binder. `strict` rejects type-conflicting re-binds.
    pub fn new(strict: bool) -> Self {
        Self {
            strict,
            ..Self::default()
        }
    }

    /// Bind a user-supplied name.
    pub fn bind(&mut self, name: &str, value: Value) -> OrmResult<Placeholder> {
        if self.lists_by_name.contains_key(name) {
            return Err(mixed_kinds(name));
        }
        if let Some(&idx) = self.by_name.get(name) {
            if !self.slots[idx].generated {
                let slot = &mut self.slots[idx];
                if self.strict && !slot.value.same_kind(&value) {
                    return Err(OrmError::DuplicateParameter {
                        name: name.to_string(),
                        existing: slot.value.type_name(),
                        incoming: value.type_name(),
                    });
                }
                tracing::trace!(target: "relorm.sql", name, "parameter rebound; last write wins");
                slot.value = value;
                return Ok(Placeholder(idx));
            }

            let renamed = self.fresh_name(name, Some(name));
            tracing::trace!(
                target: "relorm.sql",
                name,
                renamed = %renamed,
                "generated parameter renamed to make room for user parameter"
            );
            self.slots[idx].name = renamed.clone();
            self.by_name.insert(renamed, idx);
            self.by_name.remove(name);
        }

        Ok(self.push(name.to_string(), value, false))
    }

    /// Bind a value under a generated name derived from `base`.
    pub fn bind_generated(&mut self, base: &str, value: Value) -> Placeholder {
        let name = self.fresh_name(base, None);
        self.push(name, value, true)
    }

    /// Bind a user-supplied list name.
    ///
    /// Re-binding the same name replaces the list: earlier occurrences render the
    /// final elements too. In strict mode the element type must not change.
    pub fn bind_list(&mut self, name: &str, values: Vec<Value>) -> OrmResult<ListPlaceholder> {
        if self
            .by_name
            .get(name)
            .is_some_and(|&idx| !self.slots[idx].generated)
        {
            return Err(mixed_kinds(name));
        }

        let Some(list) = self.lists_by_name.get(name).copied() else {
            let elements = values
                .into_iter()
                .enumerate()
                .map(|(i, v)| self.bind_generated(&format!("{name}_{i}"), v).0)
                .collect();
            self.lists.push(ListSlot {
                name: name.to_string(),
                elements,
            });
            let list = self.lists.len() - 1;
            self.lists_by_name.insert(name.to_string(), list);
            return Ok(ListPlaceholder(list));
        };

        let old = std::mem::take(&mut self.lists[list].elements);
        if self.strict {
            if let (Some(&first), Some(incoming)) = (old.first(), values.first()) {
                let existing = &self.slots[first].value;
                if !existing.same_kind(incoming) {
                    let err = OrmError::DuplicateParameter {
                        name: name.to_string(),
                        existing: existing.type_name(),
                        incoming: incoming.type_name(),
                    };
                    self.lists[list].elements = old;
                    return Err(err);
                }
            }
        }

        tracing::trace!(target: "relorm.sql", name, "list rebound; last write wins");
        let mut elements = Vec::with_capacity(values.len());
        let mut values = values.into_iter();
        for idx in old {
            match values.next() {
                Some(v) => {
                    self.slots[idx].value = v;
                    elements.push(idx);
                }
                None => self.retire(idx),
            }
        }
        for v in values {
            let i = elements.len();
            elements.push(self.bind_generated(&format!("{name}_{i}"), v).0);
        }
        self.lists[list].elements = elements;
        Ok(ListPlaceholder(list))
    }

    /// Current elements of a bound list.
    pub fn list_values(&self, list: ListPlaceholder) -> Vec<&Value> {
        self.lists[list.0]
            .elements
            .iter()
            .map(|&idx| &self.slots[idx].value)
            .collect()
    }

    /// The name a list is bound under.
    pub fn list_name(&self, list: ListPlaceholder) -> &str {
        &self.lists[list.0].name
    }

    /// The value currently bound to `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.by_name.get(name).map(|&idx| &self.slots[idx].value)
    }

    /// The name a placeholder is bound under.
    pub fn name_of(&self, placeholder: Placeholder) -> &str {
        &self.slots[placeholder.0].name
    }

    /// Number of bound names.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.live).count()
    }

    /// Whether nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names in binding order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots
            .iter()
            .filter(|s| s.live)
            .map(|s| s.name.as_str())
    }

    fn push(&mut self, name: String, value: Value, generated: bool) -> Placeholder {
        let idx = self.slots.len();
        self.by_name.insert(name.clone(), idx);
        self.slots.push(Slot {
            name,
            value,
            generated,
            live: true,
        });
        Placeholder(idx)
    }

    /// Drop a list element that a shorter re-bind no longer covers.
    fn retire(&mut self, idx: usize) {
        let slot = &mut self.slots[idx];
        slot.live = false;
        if self.by_name.get(&slot.name) == Some(&idx) {
            self.by_name.remove(&slot.name);
        }
    }

    fn fresh_name(&self, base: &str, avoid: Option<&str>) -> String {
        let taken = |n: &str| self.by_name.contains_key(n) || avoid == Some(n);
        if !taken(base) {
            return base.to_string();
        }
        let mut i = 1usize;
        loop {
            let candidate = format!("{base}_{i}");
            if !taken(&candidate) {
                return candidate;
            }
            i += 1;
        }
    }

    /// Render `buf` with `style` placeholders and collect the driver-facing binding.
    pub fn finalize(&self, buf: &SqlBuf, style: PlaceholderStyle) -> (String, ParameterBinding) {
        let mut sql = String::with_capacity(buf.text_len() + buf.chunks.len() * 3);
        let mut binding = ParameterBinding::default();
        let mut ordinals: HashMap<usize, usize> = HashMap::new();

        let mut render = |idx: usize, sql: &mut String| {
            let slot = &self.slots[idx];
            if !ordinals.contains_key(&idx) {
                binding.named.push((slot.name.clone(), slot.value.clone()));
            }
            let ordinal = if style.is_positional() {
                binding.ordered.push(slot.value.clone());
                ordinals.insert(idx, binding.ordered.len());
                binding.ordered.len()
            } else {
                *ordinals.entry(idx).or_insert_with(|| {
                    binding.ordered.push(slot.value.clone());
                    binding.ordered.len()
                })
            };
            sql.push_str(&style.render(ordinal));
        };

        for chunk in &buf.chunks {
            match chunk {
                Chunk::Text(text) => sql.push_str(text),
                Chunk::Param(Placeholder(idx)) => render(*idx, &mut sql),
                Chunk::List(ListPlaceholder(list)) => {
                    let elements = &self.lists[*list].elements;
                    // Matches nothing, and keeps `IN ()` out of the SQL.
                    if elements.is_empty() {
                        sql.push_str("NULL");
                    }
                    for (i, &idx) in elements.iter().enumerate() {
                        if i > 0 {
                            sql.push_str(", ");
                        }
                        render(idx, &mut sql);
                    }
                }
            }
        }

        (sql, binding)
    }
}

fn mixed_kinds(name: &str) -> OrmError {
    OrmError::validation(format!(
        "parameter '{name}' is used both as a list and as a single value"
    ))
}

/// The parameter set handed to the driver.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterBinding {
    ordered: Vec<Value>,
    named: Vec<(String, Value)>,
}

impl ParameterBinding {
    /// Values in placeholder order (what positional/indexed drivers consume).
    pub fn values(&self) -> &[Value] {
        &self.ordered
    }

    /// Name/value pairs in order of first appearance in the SQL.
    pub fn named(&self) -> &[(String, Value)] {
        &self.named
    }

    /// Value bound under `name`, if it appears in the statement.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.named.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Number of values sent to the driver.
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Whether no values are sent.
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

#[derive(Debug, Clone)]
enum Chunk {
    Text(String),
    Param(Placeholder),
    List(ListPlaceholder),
}

/// SQL text interleaved with placeholder slots.
#[derive(Debug, Clone, Default)]
pub struct SqlBuf {
    chunks: Vec<Chunk>,
}

impl SqlBuf {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw SQL.
    pub fn push_str(&mut self, sql: &str) -> &mut Self {
        if sql.is_empty() {
            return self;
        }
        match self.chunks.last_mut() {
            Some(Chunk::Text(last)) => last.push_str(sql),
            _ => self.chunks.push(Chunk::Text(sql.to_string())),
        }
        self
    }

    /// Append a placeholder slot.
    pub fn push_param(&mut self, placeholder: Placeholder) -> &mut Self {
        self.chunks.push(Chunk::Param(placeholder));
        self
    }

    /// Append a list slot.
    pub fn push_list(&mut self, list: ListPlaceholder) -> &mut Self {
        self.chunks.push(Chunk::List(list));
        self
    }

    /// Append another buffer.
    pub fn append(&mut self, other: SqlBuf) -> &mut Self {
        for chunk in other.chunks {
            match chunk {
                Chunk::Text(t) => {
                    self.push_str(&t);
                }
                Chunk::Param(p) => {
                    self.push_param(p);
                }
                Chunk::List(l) => {
                    self.push_list(l);
                }
            }
        }
        self
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Number of placeholder and list slots written.
    pub fn param_count(&self) -> usize {
        self.chunks
            .iter()
            .filter(|c| !matches!(c, Chunk::Text(_)))
            .count()
    }

    fn text_len(&self) -> usize {
        self.chunks
            .iter()
            .map(|c| match c {
                Chunk::Text(t) => t.len(),
                Chunk::Param(_) | Chunk::List(_) => 0,
            })
            .sum()
    }
}

/// A compiled statement: SQL text, its parameters and the dialect it targets.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    /// SQL text with dialect placeholders.
    pub sql: String,
    /// Parameters for the driver.
    pub params: ParameterBinding,
    /// Dialect the SQL was rendered for.
    pub dialect: DialectKind,
}
