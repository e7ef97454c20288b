use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CaseClass {
    RuntimeSuccess,
    FrontendError,
    RuntimeError,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct BenchConfig {
    pub enabled: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExpectedOutcome {
    /// Display form of the value `main` returns.
    pub result: Option<String>,
    pub stdout_file: Option<String>,
    /// Debug form of the error kind, e.g. `DivisionByZero`.
    pub error_kind: Option<String>,
    pub error_contains: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CaseSpec {
    pub class: CaseClass,
    #[serde(default)]
    pub bench: BenchConfig,
    pub expected: ExpectedOutcome,
}

#[derive(Debug, Clone)]
pub struct Case {
    pub name: String,
    pub dir: PathBuf,
    pub program_path: PathBuf,
    pub spec: CaseSpec,
}

impl Case {
    pub fn read_text(&self, relative_path: &str) -> Result<String> {
        fs::read_to_string(self.dir.join(relative_path))
            .with_context(|| format!("Reading {} fixture file {}", self.name, relative_path))
    }

    pub fn program(&self) -> Result<String> {
        fs::read_to_string(&self.program_path)
            .with_context(|| format!("Reading program for {}", self.name))
    }

    /// Expected stdout, empty when the case names no stdout file.
    pub fn expected_stdout(&self) -> Result<String> {
        match self.spec.expected.stdout_file.as_deref() {
            Some(file) => self.read_text(file),
            None => Ok(String::new()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let expected = &self.spec.expected;
        match self.spec.class {
            CaseClass::RuntimeSuccess => ensure!(
                expected.result.is_some() && expected.error_kind.is_none(),
                "Case {} must name a result and no error_kind",
                self.name
            ),
            CaseClass::FrontendError | CaseClass::RuntimeError => ensure!(
                expected.error_kind.is_some() && expected.result.is_none(),
                "Case {} must name an error_kind and no result",
                self.name
            ),
        }
        if self.spec.bench.enabled {
            ensure!(
                !self.spec.bench.tags.is_empty(),
                "Case {} has bench enabled but no tags",
                self.name
            );
        }
        Ok(())
    }
}

pub fn load_cases(programs_dir: &Path) -> Result<Vec<Case>> {
    let mut cases = Vec::new();

    for entry in
        fs::read_dir(programs_dir).with_context(|| format!("Reading {}", programs_dir.display()))?
    {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }

        let case_path = path.join("case.yaml");
        if !case_path.exists() {
            continue;
        }

        let program_path = path.join("program.geo");
        ensure!(
            program_path.exists(),
            "Missing program.geo for case {}",
            path.display()
        );

        let case_name = path
            .file_name()
            .and_then(|value| value.to_str())
            .map(str::to_string)
            .with_context(|| format!("Invalid case directory name {}", path.display()))?;
        let case_raw = fs::read_to_string(&case_path)
            .with_context(|| format!("Reading {}", case_path.display()))?;
        let spec: CaseSpec = serde_yaml::from_str(&case_raw)
            .with_context(|| format!("Parsing {}", case_path.display()))?;

        let case = Case {
            name: case_name,
            dir: path,
            program_path,
            spec,
        };
        case.validate()?;
        cases.push(case);
    }

    ensure!(
        !cases.is_empty(),
        "No test cases found in {}",
        programs_dir.display()
    );
    cases.sort_by(|left, right| left.name.cmp(&right.name));
    Ok(cases)
}

/// Cases whose bench config is enabled and carries `tag`.
pub fn bench_cases(programs_dir: &Path, tag: &str) -> Result<Vec<Case>> {
    Ok(load_cases(programs_dir)?
        .into_iter()
        .filter(|case| {
            case.spec.bench.enabled && case.spec.bench.tags.iter().any(|name| name == tag)
        })
        .collect())
}

pub fn normalize_output(output: &str) -> String {
    output.replace("\r\n", "\n").trim_end().to_string()
}
