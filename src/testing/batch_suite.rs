//! Batch suite: every program in a directory against every input string.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::interpreter::engine::Engine;
use crate::interpreter::state::Program;

/// A program file discovered by index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchProgram {
    /// Regex index, taken from the file name.
    pub index: u32,
    pub path: PathBuf,
}

/// Verdict for one (program, input) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    /// Regex index.
    pub program: u32,
    /// Input line index (0-based).
    pub input: usize,
    /// Input length in bytes.
    pub len: usize,
    pub matched: bool,
    /// Cycles spent, or `None` if the cycle budget ran out.
    pub cycles: Option<u64>,
}

impl fmt::Display for BatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "regex {} \t, input {} (len: {})\t, match {}",
            self.program,
            self.input,
            self.len,
            if self.matched { "True" } else { "False" }
        )
    }
}

/// Summary of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuiteResult {
    /// Programs loaded and run.
    pub programs: usize,
    /// Input strings per program.
    pub inputs: usize,
    pub matched: usize,
    pub refused: usize,
    /// Runs that hit the cycle budget.
    pub timeout: usize,
    /// Programs that failed to load.
    pub load_error: usize,
    /// Total clock cycles across finished runs.
    pub cycles: u64,
}

/// Batch of programs and inputs sharing one window width.
#[derive(Debug, Clone)]
pub struct BatchSuite {
    programs: Vec<BatchProgram>,
    inputs: Vec<String>,
    window_width: usize,
    /// Maximum cycles per match before giving up.
    max_cycles: u64,
    results: Vec<BatchResult>,
    load_errors: Vec<(u32, String)>,
}

impl BatchSuite {
    pub fn new(window_width: usize) -> Self {
        Self {
            programs: Vec::new(),
            inputs: Vec::new(),
            window_width,
            max_cycles: 1_000_000,
            results: Vec::new(),
            load_errors: Vec::new(),
        }
    }

    /// Set the maximum cycles per match.
    pub fn with_max_cycles(mut self, max: u64) -> Self {
        self.max_cycles = max;
        self
    }

    pub fn add_program(&mut self, program: BatchProgram) {
        self.programs.push(program);
    }

    pub fn add_input(&mut self, input: impl Into<String>) {
        self.inputs.push(input.into());
    }

    /// Build a suite from a program directory and a strings file.
    ///
    /// Program files must be named by their integer index; other entries
    /// are skipped. Programs run in numeric order.
    pub fn discover(
        program_dir: impl AsRef<Path>,
        strings_file: impl AsRef<Path>,
        window_width: usize,
    ) -> Result<Self> {
        let program_dir = program_dir.as_ref();
        let strings_file = strings_file.as_ref();
        let mut suite = Self::new(window_width);

        let entries = std::fs::read_dir(program_dir)
            .with_context(|| format!("Failed to read program directory {}", program_dir.display()))?;

        for entry in entries {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            match path.file_name().and_then(|n| n.to_str()).map(str::parse::<u32>) {
                Some(Ok(index)) => suite.add_program(BatchProgram { index, path }),
                _ => log::debug!("Skipping {}", path.display()),
            }
        }

        suite.programs.sort_by_key(|p| p.index);

        let strings = std::fs::read_to_string(strings_file)
            .with_context(|| format!("Unable to open {}", strings_file.display()))?;
        for line in strings.lines() {
            suite.add_input(line);
        }

        log::info!(
            "Discovered {} programs and {} inputs",
            suite.programs.len(),
            suite.inputs.len()
        );

        Ok(suite)
    }

    pub fn program_count(&self) -> usize {
        self.programs.len()
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn window_width(&self) -> usize {
        self.window_width
    }

    /// Run every program against every input.
    pub fn run_all(&mut self) -> SuiteResult {
        let mut summary = SuiteResult {
            inputs: self.inputs.len(),
            ..SuiteResult::default()
        };
        self.results.clear();
        self.load_errors.clear();

        for entry in &self.programs {
            let program = match Program::from_file(&entry.path) {
                Ok(program) => program,
                Err(e) => {
                    log::error!("Unable to load program {}: {}", entry.path.display(), e);
                    self.load_errors.push((entry.index, e.to_string()));
                    summary.load_error += 1;
                    continue;
                }
            };
            summary.programs += 1;

            let mut engine = Engine::new(&program, self.window_width);

            for (input_index, input) in self.inputs.iter().enumerate() {
                engine.reset(input.as_bytes());
                let outcome = engine.run_for(self.max_cycles);

                match outcome {
                    Some(outcome) if outcome.is_match() => summary.matched += 1,
                    Some(_) => summary.refused += 1,
                    None => {
                        log::warn!(
                            "regex {} input {}: no verdict after {} cycles",
                            entry.index,
                            input_index,
                            self.max_cycles
                        );
                        summary.timeout += 1;
                    }
                }
                summary.cycles += outcome.map_or(0, |o| o.cycles);

                self.results.push(BatchResult {
                    program: entry.index,
                    input: input_index,
                    len: input.len(),
                    matched: outcome.is_some_and(|o| o.is_match()),
                    cycles: outcome.map(|o| o.cycles),
                });
            }
        }

        summary
    }

    /// Results of the last run, in program then input order.
    pub fn results(&self) -> &[BatchResult] {
        &self.results
    }

    /// Programs that failed to load in the last run.
    pub fn load_errors(&self) -> &[(u32, String)] {
        &self.load_errors
    }

    /// Generate a summary report.
    pub fn summary_report(&self, result: &SuiteResult) -> String {
        let mut report = String::new();

        report.push_str("=== Batch Results ===\n\n");
        report.push_str(&format!(
            "Programs: {}, Inputs: {}, Window: {}, Matched: {}, Refused: {}, Timeout: {}, Load Error: {}\n",
            result.programs,
            result.inputs,
            self.window_width,
            result.matched,
            result.refused,
            result.timeout,
            result.load_error
        ));
        report.push_str(&format!("Total cycles: {}\n", result.cycles));

        if !self.load_errors.is_empty() {
            report.push_str("\n--- Load Errors ---\n");
            for (index, message) in &self.load_errors {
                report.push_str(&format!("regex {}: {}\n", index, message));
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cicero_emu_{}_{}", name, std::process::id()));
        std::fs::remove_dir_all(&dir).ok();
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_report_line() {
        let result = BatchResult {
            program: 7,
            input: 3,
            len: 12,
            matched: true,
            cycles: Some(40),
        };
        assert_eq!(result.to_string(), "regex 7 \t, input 3 (len: 12)\t, match True");
    }

    #[test]
    fn test_discover_orders_numerically() {
        let dir = scratch_dir("order");
        let programs = dir.join("programs");
        std::fs::create_dir_all(&programs).unwrap();
        for name in ["10", "2", "1", "notes.txt"] {
            std::fs::write(programs.join(name), "0000\n").unwrap();
        }
        let strings = dir.join("strings.txt");
        std::fs::write(&strings, "ab\nb\n").unwrap();

        let suite = BatchSuite::discover(&programs, &strings, 2).unwrap();
        let order: Vec<u32> = suite.programs.iter().map(|p| p.index).collect();
        assert_eq!(order, vec![1, 2, 10]);
        assert_eq!(suite.input_count(), 2);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_discover_missing_strings_file() {
        let dir = scratch_dir("nostrings");
        assert!(BatchSuite::discover(&dir, dir.join("missing.txt"), 1).is_err());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_run_all() {
        let dir = scratch_dir("run");
        // 0: ab
        std::fs::write(dir.join("0"), "4061\n4062\n0000\n").unwrap();
        // 1: a|b
        std::fs::write(dir.join("1"), "2003\n4061\n6004\n4062\n0000\n").unwrap();
        // 2: unreadable
        std::fs::write(dir.join("2"), "nothex\n").unwrap();

        let mut suite = BatchSuite::new(3);
        for index in 0..3 {
            suite.add_program(BatchProgram {
                index,
                path: dir.join(index.to_string()),
            });
        }
        for input in ["ab", "a", "c"] {
            suite.add_input(input);
        }

        let summary = suite.run_all();
        assert_eq!(summary.programs, 2);
        assert_eq!(summary.load_error, 1);
        assert_eq!(summary.matched, 2);
        assert_eq!(summary.refused, 4);

        let matched: Vec<(u32, usize)> = suite
            .results()
            .iter()
            .filter(|r| r.matched)
            .map(|r| (r.program, r.input))
            .collect();
        assert_eq!(matched, vec![(0, 0), (1, 1)]);
        assert_eq!(suite.load_errors()[0].0, 2);

        let report = suite.summary_report(&summary);
        assert!(report.contains("Matched: 2"));
        assert!(report.contains("regex 2:"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_cycle_budget() {
        let dir = scratch_dir("budget");
        // JMP 0 loops forever.
        std::fs::write(dir.join("0"), "6000\n").unwrap();

        let mut suite = BatchSuite::new(1).with_max_cycles(50);
        suite.add_program(BatchProgram {
            index: 0,
            path: dir.join("0"),
        });
        suite.add_input("x");

        let summary = suite.run_all();
        assert_eq!(summary.timeout, 1);
        assert!(!suite.results()[0].matched);
        assert_eq!(suite.results()[0].cycles, None);

        std::fs::remove_dir_all(&dir).ok();
    }
}
