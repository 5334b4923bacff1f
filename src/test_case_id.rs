//! Structured identity of a benchmark test case
//!
//! A test case is displayed as `Namespace.Class.Method(var: value, ...)`.
//! Parsing that display string back yields a [`TestCaseId`] with a total
//! order: names compare case-insensitively, then variables pairwise (key,
//! then value), and a strict prefix sorts first. Integer-looking values
//! compare numerically, so `N: 2` sorts before `N: 10`. Keys and text
//! values ignore case too, so equality matches a case-insensitive
//! comparison of display names.

use crate::error::{Result, StatsError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Value of one test-case variable
///
/// Text values compare and hash case-insensitively.
#[derive(Debug, Clone)]
pub enum VariableValue {
    Int(i64),
    Str(String),
}

impl VariableValue {
    /// Integer when the text parses as one, otherwise the text itself
    pub fn parse(text: &str) -> Self {
        match text.parse::<i64>() {
            Ok(value) => VariableValue::Int(value),
            Err(_) => VariableValue::Str(text.to_string()),
        }
    }
}

impl Ord for VariableValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (VariableValue::Int(a), VariableValue::Int(b)) => a.cmp(b),
            (VariableValue::Str(a), VariableValue::Str(b)) => compare_ignore_case(a, b),
            (VariableValue::Int(_), VariableValue::Str(_)) => Ordering::Less,
            (VariableValue::Str(_), VariableValue::Int(_)) => Ordering::Greater,
        }
    }
}

impl PartialEq for VariableValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VariableValue {}

impl Hash for VariableValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            VariableValue::Int(v) => {
                0u8.hash(state);
                v.hash(state);
            }
            VariableValue::Str(s) => {
                1u8.hash(state);
                hash_ignore_case(s, state);
            }
        }
    }
}

impl PartialOrd for VariableValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for VariableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableValue::Int(v) => write!(f, "{v}"),
            VariableValue::Str(s) => write!(f, "{}", s.replace(',', "\\,")),
        }
    }
}

/// A named variable of a parameterized test case
#[derive(Debug, Clone)]
pub struct TestCaseVariable {
    pub name: String,
    pub value: VariableValue,
}

impl TestCaseVariable {
    pub fn new(name: impl Into<String>, value: VariableValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

impl PartialEq for TestCaseVariable {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TestCaseVariable {}

impl Ord for TestCaseVariable {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_ignore_case(&self.name, &other.name).then_with(|| self.value.cmp(&other.value))
    }
}

impl PartialOrd for TestCaseVariable {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Parsed test-case identity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TestCaseId {
    name: String,
    variables: Vec<TestCaseVariable>,
}

impl TestCaseId {
    pub fn new(name: impl Into<String>, variables: Vec<TestCaseVariable>) -> Self {
        Self {
            name: name.into(),
            variables,
        }
    }

    /// Parse a display string
    ///
    /// Never fails: text without a well-formed `( ... )` section becomes a
    /// bare name, and variable entries without a `key: value` shape are
    /// skipped.
    ///
    /// # Example
    /// ```
    /// use benchdiff::test_case_id::{TestCaseId, VariableValue};
    ///
    /// let id = TestCaseId::parse("MyClass.MySampleTest(N: 2, X: 4)");
    /// assert_eq!(id.name(), "MyClass.MySampleTest");
    /// assert_eq!(id.variables()[0].value, VariableValue::Int(2));
    /// assert_eq!(id.display_name(), "MyClass.MySampleTest(N: 2, X: 4)");
    /// ```
    pub fn parse(display_name: &str) -> Self {
        let text = display_name.trim();
        let Some(open) = text.find('(') else {
            return Self::new(text, Vec::new());
        };

        let name = text[..open].trim();
        let rest = &text[open + 1..];
        let Some(close) = rest.rfind(')') else {
            return Self::new(name, Vec::new());
        };

        let variables = split_unescaped(&rest[..close])
            .into_iter()
            .filter_map(|entry| {
                let (key, value) = entry.split_once(':')?;
                let key = key.trim();
                if key.is_empty() {
                    return None;
                }
                Some(TestCaseVariable::new(key, VariableValue::parse(value.trim())))
            })
            .collect();

        Self::new(name, variables)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variables(&self) -> &[TestCaseVariable] {
        &self.variables
    }

    /// Canonical `Name(key: value, ...)` form; a bare name when there are
    /// no variables
    pub fn display_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TestCaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.variables.is_empty() {
            return Ok(());
        }
        write!(f, "(")?;
        for (i, variable) in self.variables.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", variable.name, variable.value)?;
        }
        write!(f, ")")
    }
}

impl Ord for TestCaseId {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_ignore_case(&self.name, &other.name)
            .then_with(|| self.variables.iter().cmp(other.variables.iter()))
    }
}

impl PartialOrd for TestCaseId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for TestCaseId {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TestCaseId {}

impl Hash for TestCaseId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_ignore_case(&self.name, state);
        for variable in &self.variables {
            hash_ignore_case(&variable.name, state);
            variable.value.hash(state);
        }
    }
}

impl From<String> for TestCaseId {
    fn from(display_name: String) -> Self {
        Self::parse(&display_name)
    }
}

impl From<&str> for TestCaseId {
    fn from(display_name: &str) -> Self {
        Self::parse(display_name)
    }
}

impl From<TestCaseId> for String {
    fn from(id: TestCaseId) -> Self {
        id.display_name()
    }
}

/// Compare two possibly-absent identities
///
/// # Errors
///
/// [`StatsError::MissingTestCaseId`] when either side is absent
pub fn try_compare(a: Option<&TestCaseId>, b: Option<&TestCaseId>) -> Result<Ordering> {
    match (a, b) {
        (Some(a), Some(b)) => Ok(a.cmp(b)),
        _ => Err(StatsError::MissingTestCaseId),
    }
}

/// Sort by test-case identity, or descending by display name when some
/// item has no identity
///
/// Returns `false` when the fallback order was used.
pub fn sort_by_test_case_id<T, F>(items: &mut [T], id_of: F) -> bool
where
    F: Fn(&T) -> Option<&TestCaseId>,
{
    if items.iter().all(|item| id_of(item).is_some()) {
        items.sort_by(|a, b| try_compare(id_of(a), id_of(b)).unwrap_or(Ordering::Equal));
        return true;
    }

    let display = |item: &T| id_of(item).map(TestCaseId::display_name).unwrap_or_default();
    items.sort_by_cached_key(|item| std::cmp::Reverse(display(item)));
    false
}

fn compare_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// Hashes the same lowered characters [`compare_ignore_case`] compares
fn hash_ignore_case<H: Hasher>(text: &str, state: &mut H) {
    for c in text.chars().flat_map(char::to_lowercase) {
        c.hash(state);
    }
    0xffu8.hash(state);
}

/// Split on commas not preceded by a backslash, unescaping `\,`
fn split_unescaped(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&',') => {
                current.push(',');
                chars.next();
            }
            ',' => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);
    parts
}
