#![allow(dead_code)]
use std::path::Path;

use geolang::ast::Program;
use geolang::parser;
use test_support::bench_cases;

const PROGRAMS_DIR: &str = "tests/programs";

/// `(case name, program text)` for every fixture benchmarked under `tag`.
pub fn workloads(tag: &str) -> Vec<(String, String)> {
    let cases =
        bench_cases(Path::new(PROGRAMS_DIR), tag).unwrap_or_else(|err| panic!("load cases: {err}"));
    assert!(!cases.is_empty(), "no bench cases tagged '{tag}'");
    cases
        .into_iter()
        .map(|case| {
            let source = case
                .program()
                .unwrap_or_else(|err| panic!("read {}: {err}", case.name));
            (case.name, source)
        })
        .collect()
}

pub fn load_program(label: &str, source: &str) -> Program {
    parser::parse(source).unwrap_or_else(|err| panic!("parse {label}: {err}"))
}
