//! Canned interpreter transcripts
//!
//! Real GHCi output, trimmed to the shapes the parsers care about. Tests
//! should prefer these over ad-hoc strings so the corpus of accepted
//! interpreter output stays in one place.

fn lines(input: &[&str]) -> Vec<String> {
    input.iter().map(|s| s.to_string()).collect()
}

/// A clean reload: summary line only.
pub fn reload_clean() -> Vec<String> {
    lines(&["Ok, one module loaded."])
}

/// A failed reload with one single-line error per location-spec form.
pub fn reload_with_errors_all_forms() -> Vec<String> {
    lines(&[
        "Fib.hs:5:3: error: Variable not in scope: x",
        "Fib.hs:6:1-4: error: Variable not in scope: y",
        "Fib.hs:(7,1)-(9,18): error: Variable not in scope: z",
        "Failed, no modules loaded.",
    ])
}

/// A reload mixing warnings, a multi-line error and compiler chatter,
/// spread over two files.
pub fn reload_mixed() -> Vec<String> {
    lines(&[
        "[1 of 2] Compiling Fib              ( Fib.hs, interpreted )",
        "Fib.hs:3:1: warning: [-Wunused-imports] The import of Data.List is redundant",
        "Fib.hs:8:5: error:",
        "    Couldn't match expected type 'Int' with 'Bool'",
        "    In the expression: fib True",
        "[2 of 2] Compiling Main             ( Main.hs, interpreted )",
        "Main.hs:4:7: warning: [-Wtyped-holes] Found hole: _ :: Int",
        "Failed, one module loaded.",
    ])
}

/// Reload output exhibiting the duplicate-warning defect: everything after
/// the "Collecting type info" marker repeats earlier messages.
pub fn reload_with_duplicate_tail() -> Vec<String> {
    lines(&[
        "Fib.hs:3:1: warning: [-Wunused-matches] Defined but not used: n",
        "Ok, one module loaded.",
        "Collecting type info for 1 module(s) ...",
        "Fib.hs:3:1: warning: [-Wunused-matches] Defined but not used: n",
    ])
}

/// A stop announcement in `file:line:col` form, with two bindings.
pub fn stop_with_bindings() -> Vec<String> {
    lines(&[
        "Stopped in Main.f, Foo.hs:5:3",
        "x :: Int = 1",
        "y :: [Int] = [1,2]",
    ])
}

/// A stop announcement in `file:(line,col)` form.
pub fn stop_pair_form() -> Vec<String> {
    lines(&["Stopped in Fib.go, Fib.hs:(9,5)", "_result :: Int = _"])
}

/// Program output with no stop announcement: ran to completion.
pub fn run_to_completion() -> Vec<String> {
    lines(&["hello from the program"])
}

/// A `:break` confirmation in column-span form.
pub fn break_confirmation(id: u64, file: &str, line: u32, col0: u32, col1: u32) -> Vec<String> {
    vec![format!(
        "Breakpoint {} activated at {}:{}:{}-{}",
        id, file, line, col0, col1
    )]
}

/// A `:break` confirmation in pair-span form.
pub fn break_confirmation_pair(id: u64, file: &str, line: u32, column: u32) -> Vec<String> {
    vec![format!(
        "Breakpoint {} activated at {}:({},{})-({},{})",
        id,
        file,
        line,
        column,
        line,
        column + 4
    )]
}

/// An evaluate reply with the bracketed step-counter prefix.
pub fn eval_reply(value: &str) -> Vec<String> {
    vec![format!("[2: Foo.hs:5:3-9] {}", value)]
}
