//! Statement tree rewrites and source rendering

use super::ast::{Clause, Simple, Stmt, Try};
use crate::languages::markers::active_line_marker;

const INDENT: &str = "    ";

/// Put a marker in front of every statement of every statement list
pub fn add_active_line_markers(stmts: Vec<Stmt>) -> Vec<Stmt> {
    let mut out = Vec::with_capacity(stmts.len() * 2);
    for stmt in stmts {
        if matches!(stmt, Stmt::Marker(_)) {
            out.push(stmt);
            continue;
        }
        out.push(Stmt::Marker(stmt.line()));
        out.push(stmt.map_bodies(add_active_line_markers));
    }
    out
}

/// One `try` around everything, printing the traceback of any `Exception`
pub fn wrap_in_try(stmts: Vec<Stmt>) -> Stmt {
    let simple = |text: &str| {
        Stmt::Simple(Simple {
            line: 1,
            text: text.to_string(),
        })
    };

    let mut body = vec![simple("import traceback")];
    body.extend(stmts);

    Stmt::Try(Try {
        line: 1,
        body,
        handlers: vec![Clause {
            line: 1,
            header: "except Exception:".to_string(),
            body: vec![simple("traceback.print_exc()")],
        }],
        orelse: Vec::new(),
        finalbody: Vec::new(),
    })
}

/// Write statements back as source with four-space indentation.
///
/// No blank lines are emitted: an interactive interpreter would take one as
/// the end of the enclosing compound statement.
pub fn render(stmts: &[Stmt]) -> String {
    let mut out = String::new();
    render_block(stmts, 0, &mut out);
    if out.ends_with('\n') {
        out.pop();
    }
    out
}

fn render_block(stmts: &[Stmt], depth: usize, out: &mut String) {
    for stmt in stmts {
        render_stmt(stmt, depth, out);
    }
}

fn emit(text: &str, depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str(text);
    out.push('\n');
}

fn render_clause(header: &str, body: &[Stmt], depth: usize, out: &mut String) {
    emit(header, depth, out);
    render_block(body, depth + 1, out);
}

fn render_stmt(stmt: &Stmt, depth: usize, out: &mut String) {
    match stmt {
        Stmt::Simple(s) => emit(&s.text, depth, out),
        Stmt::Marker(line) => emit(
            &format!("print(\"{}\")", active_line_marker(*line)),
            depth,
            out,
        ),
        Stmt::If(s) => {
            render_clause(&s.header, &s.body, depth, out);
            if !s.orelse.is_empty() {
                render_clause("else:", &s.orelse, depth, out);
            }
        }
        Stmt::Loop(s) => {
            render_clause(&s.header, &s.body, depth, out);
            if !s.orelse.is_empty() {
                render_clause("else:", &s.orelse, depth, out);
            }
        }
        Stmt::Try(s) => {
            render_clause("try:", &s.body, depth, out);
            for handler in &s.handlers {
                render_clause(&handler.header, &handler.body, depth, out);
            }
            if !s.orelse.is_empty() {
                render_clause("else:", &s.orelse, depth, out);
            }
            if !s.finalbody.is_empty() {
                render_clause("finally:", &s.finalbody, depth, out);
            }
        }
        Stmt::With(c) => render_clause(&c.header, &c.body, depth, out),
        Stmt::Def(s) => {
            for decorator in &s.decorators {
                emit(decorator, depth, out);
            }
            render_clause(&s.header, &s.body, depth, out);
        }
        Stmt::Match(s) => {
            emit(&s.header, depth, out);
            for case in &s.cases {
                render_clause(&case.header, &case.body, depth + 1, out);
            }
        }
    }
}
