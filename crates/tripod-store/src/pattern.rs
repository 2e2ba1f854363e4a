//! Triple patterns: triples where any position may be a variable.

use oxrdf::{BlankNode, Literal, NamedNode, Subject, Term, Triple, Variable};

/// One position of a [`TriplePattern`]: a concrete term or a variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TermPattern {
    Term(Term),
    Variable(Variable),
}

impl TermPattern {
    pub fn is_variable(&self) -> bool {
        matches!(self, TermPattern::Variable(_))
    }

    pub fn as_term(&self) -> Option<&Term> {
        match self {
            TermPattern::Term(t) => Some(t),
            TermPattern::Variable(_) => None,
        }
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            TermPattern::Term(_) => None,
            TermPattern::Variable(v) => Some(v),
        }
    }
}

impl From<Term> for TermPattern {
    fn from(t: Term) -> Self {
        TermPattern::Term(t)
    }
}

impl From<Variable> for TermPattern {
    fn from(v: Variable) -> Self {
        TermPattern::Variable(v)
    }
}

impl From<NamedNode> for TermPattern {
    fn from(n: NamedNode) -> Self {
        TermPattern::Term(n.into())
    }
}

impl From<BlankNode> for TermPattern {
    fn from(b: BlankNode) -> Self {
        TermPattern::Term(b.into())
    }
}

impl From<Literal> for TermPattern {
    fn from(l: Literal) -> Self {
        TermPattern::Term(l.into())
    }
}

impl From<Subject> for TermPattern {
    fn from(s: Subject) -> Self {
        TermPattern::Term(Term::from(s))
    }
}

/// A triple where any position may be a variable.
///
/// Repeated occurrences of the same variable within one query denote the
/// same binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TriplePattern {
    pub subject: TermPattern,
    pub predicate: TermPattern,
    pub object: TermPattern,
}

impl TriplePattern {
    pub fn new(
        subject: impl Into<TermPattern>,
        predicate: impl Into<TermPattern>,
        object: impl Into<TermPattern>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// True when no position is a variable.
    pub fn is_concrete(&self) -> bool {
        !self.subject.is_variable() && !self.predicate.is_variable() && !self.object.is_variable()
    }

    /// Convert a concrete, well-formed pattern into a triple.
    ///
    /// Returns `None` when a position is a variable, the subject is a
    /// literal, or the predicate is not a named node.
    pub fn to_triple(&self) -> Option<Triple> {
        let subject = match self.subject.as_term()? {
            Term::NamedNode(n) => Subject::NamedNode(n.clone()),
            Term::BlankNode(b) => Subject::BlankNode(b.clone()),
            Term::Literal(_) => return None,
        };
        let predicate = match self.predicate.as_term()? {
            Term::NamedNode(n) => n.clone(),
            _ => return None,
        };
        let object = self.object.as_term()?.clone();
        Some(Triple::new(subject, predicate, object))
    }
}

impl From<Triple> for TriplePattern {
    fn from(t: Triple) -> Self {
        Self {
            subject: TermPattern::Term(Term::from(t.subject)),
            predicate: TermPattern::Term(Term::from(t.predicate)),
            object: TermPattern::Term(t.object),
        }
    }
}
