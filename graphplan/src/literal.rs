use std::fmt;
use std::sync::Arc;

/// An interned symbolic constant: a predicate name (`At`) or an argument
/// (`C1`, `SFO`). Cheap to clone and compare.
pub type Symbol = Arc<str>;

pub fn sym(s: impl AsRef<str>) -> Symbol {
    Arc::from(s.as_ref())
}

/// A ground atomic predicate such as `At(C1, SFO)`: a symbol plus an ordered
/// tuple of argument symbols. No polarity here — `Lit` (see [`crate::state`])
/// is where a literal's truth value is attached; a `GroundLiteral` is just
/// the shape of the predicate itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroundLiteral {
    pub predicate: Symbol,
    pub args: Vec<Symbol>,
}

impl GroundLiteral {
    pub fn new(predicate: impl AsRef<str>, args: impl IntoIterator<Item = Symbol>) -> Self {
        GroundLiteral {
            predicate: sym(predicate),
            args: args.into_iter().collect(),
        }
    }
}

impl fmt::Display for GroundLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.predicate)?;
        for (i, a) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{a}")?;
        }
        write!(f, ")")
    }
}
