//! Compiler from module definition expressions to [`PathwayGraph`]s.
//!
//! ## Grammar
//!
//! A definition is built from identifiers (KOs) and four separators, tried in
//! this priority order at the outermost bracket depth of an expression:
//!
//! | Separator | Meaning | Weight of each operand |
//! |-----------|---------|------------------------|
//! | `,` | alternatives (OR) | parent weight |
//! | ` ` | sequence (AND) | parent weight / N |
//! | `+` | complex subunits (AND) | parent weight / N |
//! | `-` | first operand required, the rest optional | parent weight, then 0 |
//!
//! Parentheses group sub-expressions. A leading `-` marks the following
//! identifier (or group) as optional, and the literal `--` stands for a step
//! with no known identifier.
//!
//! Alternatives share the same start and end node. Sequences allocate a fresh
//! node between consecutive operands, so the weights along any chain add up
//! to the weight of the expression they came from (1.0 for a whole module).

use thiserror::Error;
use tracing::debug;

use crate::core::graph::{NodeId, PathwayGraph, END_NODE, MISSING_STEP_LABEL, START_NODE};

/// Helper function to convert usize count to f64 with explicit precision loss allowance
#[inline]
fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Module {module}: unbalanced parentheses in '{fragment}'")]
    UnbalancedParentheses { module: String, fragment: String },

    #[error("Module {module}: empty expression where an identifier is expected in '{fragment}'")]
    EmptyExpression { module: String, fragment: String },

    #[error("Module {module}: missing separator next to a bracketed group in '{fragment}'")]
    MissingSeparator { module: String, fragment: String },
}

impl ParseError {
    /// Module the error was raised for
    #[must_use]
    pub fn module(&self) -> &str {
        match self {
            Self::UnbalancedParentheses { module, .. }
            | Self::EmptyExpression { module, .. }
            | Self::MissingSeparator { module, .. } => module,
        }
    }
}

/// Separator kinds in the order they are tried when splitting an expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeparatorKind {
    Comma,
    Space,
    Plus,
    Minus,
}

impl SeparatorKind {
    /// Splitting priority within one bracket depth
    pub const PRIORITY: [SeparatorKind; 4] = [Self::Comma, Self::Space, Self::Plus, Self::Minus];

    #[must_use]
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            b',' => Some(Self::Comma),
            b' ' => Some(Self::Space),
            b'+' => Some(Self::Plus),
            b'-' => Some(Self::Minus),
            _ => None,
        }
    }
}

/// Compile one module definition into a graph.
///
/// # Errors
///
/// Returns `ParseError::UnbalancedParentheses` if brackets do not pair up,
/// `ParseError::EmptyExpression` if an operand is empty (e.g. `K1,,K2` or `()`),
/// or `ParseError::MissingSeparator` if an operand touches a bracketed group
/// without a separator (e.g. `K1(K2)`).
pub fn compile_definition(module: &str, definition: &str) -> Result<PathwayGraph, ParseError> {
    let expression = normalize_definition(definition);

    if expression.is_empty() {
        return Err(ParseError::EmptyExpression {
            module: module.to_string(),
            fragment: definition.to_string(),
        });
    }
    check_balance(module, &expression)?;

    let mut builder = GraphBuilder::new(module);
    builder.compile(&expression, START_NODE, END_NODE, 1.0)?;
    let graph = builder.finish();

    debug!(
        "Compiled {}: {} nodes, {} edges",
        module,
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

/// Canonical whitespace: single spaces, none inside brackets or around `,`/`+`.
///
/// Whitespace around `-` is left alone because `K1 -K2` and `K1-K2` mean
/// different things.
#[must_use]
pub fn normalize_definition(definition: &str) -> String {
    let collapsed = definition.split_whitespace().collect::<Vec<_>>().join(" ");
    let bytes = collapsed.as_bytes();

    let mut out = String::with_capacity(collapsed.len());
    for (i, c) in collapsed.char_indices() {
        if c == ' ' {
            let prev = i.checked_sub(1).map(|p| bytes[p]);
            let next = bytes.get(i + 1).copied();
            if matches!(prev, Some(b'(' | b',' | b'+')) || matches!(next, Some(b')' | b',' | b'+'))
            {
                continue;
            }
        }
        out.push(c);
    }
    out
}

fn check_balance(module: &str, expression: &str) -> Result<(), ParseError> {
    let mut open: Vec<usize> = Vec::new();
    for (i, b) in expression.bytes().enumerate() {
        match b {
            b'(' => open.push(i),
            b')' => {
                if open.pop().is_none() {
                    return Err(ParseError::UnbalancedParentheses {
                        module: module.to_string(),
                        fragment: expression[..=i].to_string(),
                    });
                }
            }
            _ => {}
        }
    }
    match open.first() {
        Some(&i) => Err(ParseError::UnbalancedParentheses {
            module: module.to_string(),
            fragment: expression[i..].to_string(),
        }),
        None => Ok(()),
    }
}

/// Remove brackets that enclose the whole expression, repeatedly: `((A B))` -> `A B`
fn strip_enclosing_parens(mut expression: &str) -> &str {
    while expression.starts_with('(') && expression.ends_with(')') {
        let mut depth = 0usize;
        let mut closes_at = None;
        for (i, b) in expression.bytes().enumerate() {
            match b {
                b'(' => depth += 1,
                b')' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        closes_at = Some(i);
                        break;
                    }
                }
                _ => {}
            }
        }
        if closes_at != Some(expression.len() - 1) {
            break;
        }
        expression = &expression[1..expression.len() - 1];
    }
    expression
}

/// Pick the split for an expression: the highest-priority separator kind at
/// bracket depth 0, with all its positions. A minus at position 0 is a prefix,
/// not a separator.
fn find_split(expression: &str) -> Option<(SeparatorKind, Vec<usize>)> {
    let mut found: [Vec<usize>; 4] = Default::default();
    let mut depth = 0usize;

    for (i, b) in expression.bytes().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => {
                if i == 0 && b == b'-' {
                    continue;
                }
                if let Some(kind) = SeparatorKind::from_byte(b) {
                    let slot = SeparatorKind::PRIORITY
                        .iter()
                        .position(|k| *k == kind)
                        .unwrap_or_default();
                    found[slot].push(i);
                }
            }
            _ => {}
        }
    }

    SeparatorKind::PRIORITY
        .into_iter()
        .zip(found)
        .find(|(_, positions)| !positions.is_empty())
}

/// An operand with no separators and no brackets
fn is_identifier(expression: &str) -> bool {
    !expression.is_empty()
        && !expression
            .bytes()
            .any(|b| b == b'(' || b == b')' || SeparatorKind::from_byte(b).is_some())
}

/// Mutable compilation context shared by every recursive step for one module
pub struct GraphBuilder<'a> {
    module: &'a str,
    graph: PathwayGraph,
}

impl<'a> GraphBuilder<'a> {
    #[must_use]
    pub fn new(module: &'a str) -> Self {
        Self {
            module,
            graph: PathwayGraph::new(),
        }
    }

    /// Compile `expression` between `start` and `end` with the given weight
    ///
    /// # Errors
    ///
    /// See [`compile_definition`].
    pub fn compile(
        &mut self,
        expression: &str,
        start: NodeId,
        end: NodeId,
        weight: f64,
    ) -> Result<(), ParseError> {
        let inner = strip_enclosing_parens(expression);
        if inner.is_empty() {
            return Err(self.empty(expression));
        }

        if inner == "--" {
            self.graph
                .add_edge(start, end, MISSING_STEP_LABEL, 0.0, true);
            return Ok(());
        }

        match find_split(inner) {
            Some((kind, positions)) => self.compile_split(inner, kind, &positions, start, end, weight),
            None => self.compile_operand(inner, start, end, weight),
        }
    }

    fn compile_split(
        &mut self,
        expression: &str,
        kind: SeparatorKind,
        positions: &[usize],
        start: NodeId,
        end: NodeId,
        weight: f64,
    ) -> Result<(), ParseError> {
        let mut parts = Vec::with_capacity(positions.len() + 1);
        let mut from = 0;
        for &pos in positions {
            parts.push(&expression[from..pos]);
            from = pos + 1;
        }
        parts.push(&expression[from..]);

        if parts.iter().any(|p| p.is_empty()) {
            return Err(self.empty(expression));
        }

        match kind {
            SeparatorKind::Comma => {
                for part in parts {
                    self.compile(part, start, end, weight)?;
                }
                Ok(())
            }
            SeparatorKind::Space | SeparatorKind::Plus => {
                let share = weight / count_to_f64(parts.len());
                self.compile_chain(&parts, start, end, |_| share)
            }
            SeparatorKind::Minus => {
                self.compile_chain(&parts, start, end, |i| if i == 0 { weight } else { 0.0 })
            }
        }
    }

    /// Chain operands start -> n1 -> ... -> end, allocating each node just
    /// before the operand that leads into it
    fn compile_chain(
        &mut self,
        parts: &[&str],
        start: NodeId,
        end: NodeId,
        weight_of: impl Fn(usize) -> f64,
    ) -> Result<(), ParseError> {
        let mut from = start;
        for (i, part) in parts.iter().enumerate() {
            let to = if i + 1 == parts.len() {
                end
            } else {
                self.graph.add_node()
            };
            self.compile(part, from, to, weight_of(i))?;
            from = to;
        }
        Ok(())
    }

    fn compile_operand(
        &mut self,
        expression: &str,
        start: NodeId,
        end: NodeId,
        weight: f64,
    ) -> Result<(), ParseError> {
        if let Some(operand) = expression.strip_prefix('-') {
            if operand.is_empty() {
                return Err(self.empty(expression));
            }
            if is_identifier(operand) {
                self.graph.add_edge(start, end, operand, 0.0, true);
                return Ok(());
            }
            // Negated group: everything inside is optional
            return self.compile(operand, start, end, 0.0);
        }

        if !is_identifier(expression) {
            return Err(ParseError::MissingSeparator {
                module: self.module.to_string(),
                fragment: expression.to_string(),
            });
        }

        self.graph
            .add_edge(start, end, expression, weight, weight == 0.0);
        Ok(())
    }

    fn empty(&self, fragment: &str) -> ParseError {
        ParseError::EmptyExpression {
            module: self.module.to_string(),
            fragment: fragment.to_string(),
        }
    }

    /// Finalize the graph: build the label index, adjacency, and topological order
    #[must_use]
    pub fn finish(mut self) -> PathwayGraph {
        self.graph.rebuild_indexes();
        self.graph
    }
}
