//! Statement tree for Python source
//!
//! Only block structure is modelled. Expressions, headers and simple
//! statements are kept as source text and written back verbatim.

/// One statement of a statement list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// Any statement without a body
    Simple(Simple),
    /// Active-line marker for the given source line
    Marker(usize),
    If(If),
    /// `for` / `while`, optionally `async`
    Loop(Loop),
    Try(Try),
    /// `with`, optionally `async`
    With(Clause),
    /// `def` / `class`, optionally decorated
    Def(Def),
    Match(Match),
}

/// Statement kept as text; may span continuation lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Simple {
    pub line: usize,
    pub text: String,
}

/// Header line plus indented body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub line: usize,
    /// Header text up to and including its colon
    pub header: String,
    pub body: Vec<Stmt>,
}

/// `if` statement; `elif` chains are nested `If`s in `orelse`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct If {
    pub line: usize,
    pub header: String,
    pub body: Vec<Stmt>,
    pub orelse: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loop {
    pub line: usize,
    pub header: String,
    pub body: Vec<Stmt>,
    pub orelse: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Try {
    pub line: usize,
    pub body: Vec<Stmt>,
    /// `except` clauses with their headers
    pub handlers: Vec<Clause>,
    pub orelse: Vec<Stmt>,
    pub finalbody: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Def {
    /// Line of the `def` / `class` keyword, not of the first decorator
    pub line: usize,
    /// Decorator lines, `@` included
    pub decorators: Vec<String>,
    pub header: String,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub line: usize,
    pub header: String,
    /// `case` clauses
    pub cases: Vec<Clause>,
}

impl Stmt {
    /// Source line the statement starts on
    pub fn line(&self) -> usize {
        match self {
            Stmt::Simple(s) => s.line,
            Stmt::Marker(line) => *line,
            Stmt::If(s) => s.line,
            Stmt::Loop(s) => s.line,
            Stmt::Try(s) => s.line,
            Stmt::With(s) => s.line,
            Stmt::Def(s) => s.line,
            Stmt::Match(s) => s.line,
        }
    }

    /// Rebuild the statement with `f` applied to every nested statement list
    pub fn map_bodies(self, f: fn(Vec<Stmt>) -> Vec<Stmt>) -> Stmt {
        let clause = |c: Clause| Clause {
            body: f(c.body),
            ..c
        };

        match self {
            Stmt::Simple(_) | Stmt::Marker(_) => self,
            Stmt::If(s) => Stmt::If(If {
                body: f(s.body),
                orelse: f(s.orelse),
                ..s
            }),
            Stmt::Loop(s) => Stmt::Loop(Loop {
                body: f(s.body),
                orelse: f(s.orelse),
                ..s
            }),
            Stmt::Try(s) => Stmt::Try(Try {
                body: f(s.body),
                handlers: s.handlers.into_iter().map(clause).collect(),
                orelse: f(s.orelse),
                finalbody: f(s.finalbody),
                ..s
            }),
            Stmt::With(c) => Stmt::With(clause(c)),
            Stmt::Def(s) => Stmt::Def(Def {
                body: f(s.body),
                ..s
            }),
            Stmt::Match(s) => Stmt::Match(Match {
                cases: s.cases.into_iter().map(clause).collect(),
                ..s
            }),
        }
    }

    /// Number of statements in this subtree, markers excluded
    pub fn count(&self) -> usize {
        let list = |stmts: &[Stmt]| stmts.iter().map(Stmt::count).sum::<usize>();
        let own = usize::from(!matches!(self, Stmt::Marker(_)));

        own + match self {
            Stmt::Simple(_) | Stmt::Marker(_) => 0,
            Stmt::If(s) => list(&s.body) + list(&s.orelse),
            Stmt::Loop(s) => list(&s.body) + list(&s.orelse),
            Stmt::Try(s) => {
                list(&s.body)
                    + s.handlers.iter().map(|h| list(&h.body)).sum::<usize>()
                    + list(&s.orelse)
                    + list(&s.finalbody)
            }
            Stmt::With(c) => list(&c.body),
            Stmt::Def(s) => list(&s.body),
            Stmt::Match(s) => s.cases.iter().map(|c| list(&c.body)).sum(),
        }
    }
}
