//! Property-based tests for Python instrumentation
//!
//! Generated programs of nested blocks must keep their statements intact and
//! gain exactly one marker per statement.

use linecast::languages::markers::{detect_active_line, strip_marker_lines};
use linecast::languages::python::{instrument_source, parse, transform, wrap_source};
use proptest::prelude::*;

/// Generated statement: a simple assignment or a block header with a body
#[derive(Debug, Clone)]
enum Gen {
    Simple(u8),
    Block(&'static str, Vec<Gen>),
}

fn statement() -> impl Strategy<Value = Gen> {
    let leaf = (0u8..100).prop_map(Gen::Simple);
    leaf.prop_recursive(3, 24, 4, |inner| {
        (
            prop_oneof![
                Just("if flag:"),
                Just("for i in range(2):"),
                Just("while False:"),
                Just("with ctx:"),
                Just("def f():"),
            ],
            prop::collection::vec(inner, 1..4),
        )
            .prop_map(|(header, body)| Gen::Block(header, body))
    })
}

fn program() -> impl Strategy<Value = Vec<Gen>> {
    prop::collection::vec(statement(), 1..6)
}

fn render(stmts: &[Gen], depth: usize, out: &mut Vec<String>) {
    for stmt in stmts {
        let indent = "    ".repeat(depth);
        match stmt {
            Gen::Simple(n) => out.push(format!("{}x{} = {}", indent, n, n)),
            Gen::Block(header, body) => {
                out.push(format!("{}{}", indent, header));
                render(body, depth + 1, out);
            }
        }
    }
}

fn source_of(stmts: &[Gen]) -> String {
    let mut lines = Vec::new();
    render(stmts, 0, &mut lines);
    lines.join("\n")
}

fn count(stmts: &[Gen]) -> usize {
    stmts
        .iter()
        .map(|stmt| match stmt {
            Gen::Simple(_) => 1,
            Gen::Block(_, body) => 1 + count(body),
        })
        .sum()
}

proptest! {
    #[test]
    fn test_stripping_markers_restores_the_program(stmts in program()) {
        let source = source_of(&stmts);
        let instrumented = instrument_source(&source).unwrap();
        prop_assert_eq!(strip_marker_lines(&instrumented), source);
    }

    #[test]
    fn test_one_marker_per_statement(stmts in program()) {
        let source = source_of(&stmts);
        let tree = parse(&source).unwrap();
        let expected = count(&stmts);

        prop_assert_eq!(tree.iter().map(|s| s.count()).sum::<usize>(), expected);

        let instrumented = instrument_source(&source).unwrap();
        let markers: Vec<usize> = instrumented.lines().filter_map(detect_active_line).collect();
        prop_assert_eq!(markers.len(), expected);
    }

    #[test]
    fn test_markers_follow_source_order(stmts in program()) {
        let source = source_of(&stmts);
        let instrumented = instrument_source(&source).unwrap();
        let markers: Vec<usize> = instrumented.lines().filter_map(detect_active_line).collect();

        prop_assert!(markers.windows(2).all(|pair| pair[0] < pair[1]));
        prop_assert_eq!(markers, (1..=count(&stmts)).collect::<Vec<_>>());
    }

    #[test]
    fn test_marker_sits_directly_above_its_statement(stmts in program()) {
        let source = source_of(&stmts);
        let source_lines: Vec<&str> = source.lines().collect();
        let instrumented = instrument_source(&source).unwrap();
        let lines: Vec<&str> = instrumented.lines().collect();

        for (index, line) in lines.iter().enumerate() {
            if let Some(number) = detect_active_line(line) {
                prop_assert_eq!(lines[index + 1], source_lines[number - 1]);
            }
        }
    }

    #[test]
    fn test_wrapped_program_is_parseable(stmts in program()) {
        let source = source_of(&stmts);
        let wrapped = wrap_source(&instrument_source(&source).unwrap()).unwrap();
        let tree = parse(&wrapped).unwrap();

        prop_assert_eq!(tree.len(), 1);
        prop_assert_eq!(transform::render(&tree), wrapped);
    }
}
