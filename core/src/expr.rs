//! Dependency expressions.
//!
//! The registry gates features and requirement blocks on boolean
//! expressions over feature names:
//!
//! ```text
//! expr    := or_term (',' or_term)*      ; ',' is OR
//! or_term := and_term ('+' and_term)*    ; '+' is AND, binds tighter
//! and_term := NAME | '(' expr ')'
//! ```
//!
//! Text is parsed once into a [`DependencyExpr`] tree, which is then
//! evaluated against a set of active names or compiled to a C preprocessor
//! guard.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::ExprError;

/// A parsed dependency expression.
///
/// `All` and `Any` produced by [`parse`](Self::parse) always hold at least
/// two children; single-child groups collapse into the child.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DependencyExpr {
    /// The empty expression. Always satisfied.
    Always,
    /// A single feature or extension name.
    Name(String),
    /// Every child must hold (`+`).
    All(Vec<DependencyExpr>),
    /// At least one child must hold (`,`).
    Any(Vec<DependencyExpr>),
}

impl DependencyExpr {
    /// Parses `text` into an expression tree.
    ///
    /// A blank string parses to [`DependencyExpr::Always`].
    ///
    /// # Errors
    ///
    /// Unbalanced parentheses, empty terms (`"A,,B"`, `"A+"`, `"()"`), and
    /// parentheses in the middle of a name are rejected with the byte index
    /// of the offending position.
    ///
    /// # Examples
    ///
    /// ```
    /// use vk_dispatch_core::DependencyExpr;
    ///
    /// let expr = DependencyExpr::parse("(A,B)+C").unwrap();
    /// assert_eq!(expr.to_guard(), "(defined(A) || defined(B)) && defined(C)");
    ///
    /// assert!(DependencyExpr::parse("(A+B").is_err());
    /// assert_eq!(DependencyExpr::parse("").unwrap(), DependencyExpr::Always);
    /// ```
    pub fn parse(text: &str) -> Result<Self, ExprError> {
        if text.trim().is_empty() {
            return Ok(Self::Always);
        }
        parse_any(text, 0)
    }

    /// Evaluates the expression against the set of currently active names.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::BTreeSet;
    /// use vk_dispatch_core::DependencyExpr;
    ///
    /// let active: BTreeSet<String> = ["A", "C"].into_iter().map(String::from).collect();
    /// assert!(DependencyExpr::parse("A+B,C").unwrap().is_satisfied_by(&active));
    /// assert!(!DependencyExpr::parse("A+B").unwrap().is_satisfied_by(&active));
    /// ```
    pub fn is_satisfied_by(&self, active: &BTreeSet<String>) -> bool {
        match self {
            Self::Always => true,
            Self::Name(name) => active.contains(name),
            Self::All(children) => children.iter().all(|child| child.is_satisfied_by(active)),
            Self::Any(children) => children.iter().any(|child| child.is_satisfied_by(active)),
        }
    }

    /// Compiles the expression to a preprocessor condition.
    ///
    /// Names become `defined(NAME)`, AND joins with `" && "`, OR joins with
    /// `" || "`, and compound children of compound nodes are parenthesized.
    /// [`DependencyExpr::Always`] compiles to an empty string.
    pub fn to_guard(&self) -> String {
        match self {
            Self::Always => String::new(),
            Self::Name(name) => format!("defined({name})"),
            Self::All(children) => join_guards(children, " && "),
            Self::Any(children) => join_guards(children, " || "),
        }
    }

    /// Like [`to_guard`](Self::to_guard) but wrapped in parentheses when the
    /// expression is compound.
    pub fn to_nested_guard(&self) -> String {
        if self.is_compound() {
            format!("({})", self.to_guard())
        } else {
            self.to_guard()
        }
    }

    pub fn is_always(&self) -> bool {
        matches!(self, Self::Always)
    }

    pub fn is_compound(&self) -> bool {
        matches!(self, Self::All(children) | Self::Any(children) if children.len() > 1)
    }

    /// Every name mentioned anywhere in the expression.
    pub fn names(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, names: &mut BTreeSet<&'a str>) {
        match self {
            Self::Always => {}
            Self::Name(name) => {
                names.insert(name);
            }
            Self::All(children) | Self::Any(children) => {
                for child in children {
                    child.collect_names(names);
                }
            }
        }
    }
}

/// Renders the expression back in registry syntax.
impl fmt::Display for DependencyExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (children, separator) = match self {
            Self::Always => return Ok(()),
            Self::Name(name) => return f.write_str(name),
            Self::All(children) => (children, '+'),
            Self::Any(children) => (children, ','),
        };
        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                write!(f, "{separator}")?;
            }
            if child.is_compound() {
                write!(f, "({child})")?;
            } else {
                write!(f, "{child}")?;
            }
        }
        Ok(())
    }
}

/// Parses and evaluates `expression` in one step.
pub fn satisfies(expression: &str, active: &BTreeSet<String>) -> Result<bool, ExprError> {
    DependencyExpr::parse(expression).map(|expr| expr.is_satisfied_by(active))
}

/// Parses and compiles `expression` to a header guard in one step.
///
/// # Examples
///
/// ```
/// use vk_dispatch_core::expr::to_guard;
///
/// assert_eq!(
///     to_guard("VK_KHR_get_physical_device_properties2,VK_VERSION_1_1").unwrap(),
///     "defined(VK_KHR_get_physical_device_properties2) || defined(VK_VERSION_1_1)"
/// );
/// ```
pub fn to_guard(expression: &str) -> Result<String, ExprError> {
    DependencyExpr::parse(expression).map(|expr| expr.to_guard())
}

fn join_guards(children: &[DependencyExpr], operator: &str) -> String {
    children
        .iter()
        .map(DependencyExpr::to_nested_guard)
        .collect::<Vec<_>>()
        .join(operator)
}

fn parse_any(text: &str, base: usize) -> Result<DependencyExpr, ExprError> {
    let segments = split_top_level(text, ',', base)?;
    if segments.len() == 1 {
        return parse_all(text, base);
    }
    segments
        .into_iter()
        .map(|(at, segment)| parse_all(segment, at))
        .collect::<Result<Vec<_>, _>>()
        .map(DependencyExpr::Any)
}

fn parse_all(text: &str, base: usize) -> Result<DependencyExpr, ExprError> {
    let segments = split_top_level(text, '+', base)?;
    if segments.len() == 1 {
        return parse_term(text, base);
    }
    segments
        .into_iter()
        .map(|(at, segment)| parse_term(segment, at))
        .collect::<Result<Vec<_>, _>>()
        .map(DependencyExpr::All)
}

fn parse_term(text: &str, base: usize) -> Result<DependencyExpr, ExprError> {
    let leading = text.len() - text.trim_start().len();
    let term = text.trim();
    let at = base + leading;
    if term.is_empty() {
        return Err(ExprError::EmptyTerm { index: at });
    }

    if term.starts_with('(') {
        let close = matching_close(term, at)?;
        if close + 1 != term.len() {
            return Err(ExprError::MisplacedParen {
                index: at + close + 1,
            });
        }
        let inner = &term[1..close];
        if inner.trim().is_empty() {
            return Err(ExprError::EmptyTerm { index: at + 1 });
        }
        return parse_any(inner, at + 1);
    }

    if let Some(offset) = term.find(['(', ')']) {
        return Err(ExprError::MisplacedParen { index: at + offset });
    }
    Ok(DependencyExpr::Name(term.to_string()))
}

/// Byte offset of the `)` closing the `(` at offset 0 of `term`.
fn matching_close(term: &str, base: usize) -> Result<usize, ExprError> {
    let mut depth = 0usize;
    for (offset, ch) in term.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(offset);
                }
            }
            _ => {}
        }
    }
    Err(ExprError::UnmatchedOpen { index: base })
}

/// Splits `text` on `separator` wherever the paren depth is zero.
///
/// Returns each segment paired with its byte offset in the input
/// expression, so errors deeper in the parse can report absolute positions.
fn split_top_level(
    text: &str,
    separator: char,
    base: usize,
) -> Result<Vec<(usize, &str)>, ExprError> {
    let mut segments = Vec::new();
    let mut open = Vec::new();
    let mut start = 0;

    for (offset, ch) in text.char_indices() {
        match ch {
            '(' => open.push(offset),
            ')' => {
                if open.pop().is_none() {
                    return Err(ExprError::UnmatchedClose {
                        index: base + offset,
                    });
                }
            }
            c if c == separator && open.is_empty() => {
                segments.push((base + start, &text[start..offset]));
                start = offset + c.len_utf8();
            }
            _ => {}
        }
    }

    if let Some(&offset) = open.first() {
        return Err(ExprError::UnmatchedOpen {
            index: base + offset,
        });
    }
    segments.push((base + start, &text[start..]));
    Ok(segments)
}
