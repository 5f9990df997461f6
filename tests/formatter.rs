use gopretty::formatter::{FormatOptions, Mode, format_source};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

fn fmt(src: &str) -> String {
    let opts = FormatOptions {
        mode: Mode::Stdout, // irrelevant for format_source
        ..FormatOptions::default()
    };
    format_source(src, &opts).unwrap()
}

fn fmt_with(src: &str, opts: FormatOptions) -> String {
    format_source(src, &opts).unwrap()
}

fn spaces() -> FormatOptions {
    FormatOptions {
        tab_width: 4,
        use_tabs: false,
        ..FormatOptions::default()
    }
}

/// Find all test cases in the examples directory
fn find_test_cases() -> Vec<TestCase> {
    let examples_dir = Path::new("tests/examples");
    let mut test_cases = Vec::new();

    for entry in WalkDir::new(examples_dir)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        // inputs are named <base>_<n>.input
        if let Some(file_name) = path.file_name().and_then(|n| n.to_str()) {
            if file_name.ends_with(".input") && file_name.contains('_') {
                if let Some(test_case) = create_test_case(path) {
                    test_cases.push(test_case);
                }
            }
        }
    }

    test_cases.sort_by(|a, b| a.input_file.cmp(&b.input_file));
    test_cases
}

#[derive(Debug, Clone)]
struct TestCase {
    name: String,
    input_file: PathBuf,
    expected_file: PathBuf,
}

/// "decls_2.input" expects "decls.go" next to it
fn create_test_case(input_path: &Path) -> Option<TestCase> {
    let file_name = input_path.file_name()?.to_str()?;
    let parent_dir = input_path.parent()?;

    let base_name = &file_name[..file_name.rfind('_')?];
    let expected_file = parent_dir.join(format!("{}.go", base_name));

    if expected_file.exists() {
        Some(TestCase {
            name: format!("{}_{}", base_name, input_path.display()),
            input_file: input_path.to_path_buf(),
            expected_file,
        })
    } else {
        None
    }
}

fn run_test_case(test_case: &TestCase) -> Result<(), String> {
    let input_content = fs::read_to_string(&test_case.input_file).map_err(|e| {
        format!(
            "Failed to read input file {:?}: {}",
            test_case.input_file, e
        )
    })?;
    let expected_content = fs::read_to_string(&test_case.expected_file).map_err(|e| {
        format!(
            "Failed to read expected file {:?}: {}",
            test_case.expected_file, e
        )
    })?;

    let formatted_content = fmt(&input_content);

    if formatted_content.trim() == expected_content.trim() {
        Ok(())
    } else {
        Err(format!(
            "Formatting mismatch for test case '{}':\n\
             Input file: {:?}\n\
             Expected file: {:?}\n\
             \n--- Expected ---\n{}\n\
             \n--- Got ---\n{}\n\
             \n--- Diff ---\n{}",
            test_case.name,
            test_case.input_file,
            test_case.expected_file,
            expected_content,
            formatted_content,
            create_diff(&expected_content, &formatted_content)
        ))
    }
}

/// Create a simple diff visualization
fn create_diff(expected: &str, actual: &str) -> String {
    let expected_lines: Vec<&str> = expected.lines().collect();
    let actual_lines: Vec<&str> = actual.lines().collect();

    let mut diff = String::new();
    let max_lines = expected_lines.len().max(actual_lines.len());

    for i in 0..max_lines {
        let expected_line = expected_lines.get(i).unwrap_or(&"");
        let actual_line = actual_lines.get(i).unwrap_or(&"");

        if expected_line != actual_line {
            diff.push_str(&format!(
                "Line {}: Expected: {:?}, Got: {:?}\n",
                i + 1,
                expected_line,
                actual_line
            ));
        }
    }

    if diff.is_empty() {
        "No line differences (possibly trailing whitespace)".to_string()
    } else {
        diff
    }
}

#[test]
fn example_files_formatting() {
    let test_cases = find_test_cases();

    assert!(
        !test_cases.is_empty(),
        "No test cases found in tests/examples/"
    );

    println!("Found {} test case(s):", test_cases.len());
    for test_case in &test_cases {
        println!("  - {}", test_case.name);
    }

    let mut failures = Vec::new();
    for test_case in &test_cases {
        if let Err(error) = run_test_case(test_case) {
            failures.push(error);
        }
    }

    if !failures.is_empty() {
        panic!("Test failures:\n\n{}", failures.join("\n\n"));
    }
}

#[test]
fn formatted_files_are_stable() {
    let test_cases = find_test_cases();
    let mut failures = Vec::new();
    for test_case in &test_cases {
        let expected = fs::read_to_string(&test_case.expected_file).unwrap();
        let again = fmt(&expected);
        if again.trim() != expected.trim() {
            failures.push(format!(
                "{:?} changes when formatted again:\n{}",
                test_case.expected_file,
                create_diff(&expected, &again)
            ));
        }
    }
    if !failures.is_empty() {
        panic!("{}", failures.join("\n\n"));
    }
}

#[test]
fn function_body_indentation() {
    let input = "package main\nfunc main() {\nx := 1\nprintln(x)\n}\n";
    let expected = "package main\nfunc main() {\n    x := 1;\n    println(x)\n}\n";
    assert_eq!(fmt_with(input, spaces()), expected);
}

#[test]
fn blank_lines_are_capped() {
    let input = "package main\n\n\n\n\n\nvar a = 1\n";
    assert_eq!(fmt(input), "package main\n\n\nvar a\t= 1\n");

    let opts = FormatOptions {
        max_newlines: 2,
        ..FormatOptions::default()
    };
    assert_eq!(fmt_with(input, opts), "package main\n\nvar a\t= 1\n");
}

#[test]
fn comments_can_be_dropped() {
    let input = "package main\n\n// doc\nvar a = 1 // trailing\n";
    assert_eq!(
        fmt(input),
        "package main\n\n// doc\nvar a\t= 1\t// trailing\n"
    );

    let opts = FormatOptions {
        comments: false,
        ..FormatOptions::default()
    };
    // line breaks of the source go with the comments
    assert_eq!(fmt_with(input, opts), "package main\nvar a\t= 1\n");
}

#[test]
fn grouped_imports_keep_comments_and_blank_lines() {
    let input = "package main\n\nimport (\n\t\"a\"\n\t// C\n\t\"b\"\n)\n";
    let once = fmt(input);
    assert_eq!(once, "package main\n\nimport (\n\t\t\"a\";\n\t// C\n\t\t\"b\"\n)\n");
    assert_eq!(fmt(&once), once);

    let input = "package main\n\nimport (\n\t\"a\"\n\n\t\"b\"\n)\n";
    assert_eq!(fmt(input), "package main\n\nimport (\n\t\t\"a\";\n\n\t\t\"b\"\n)\n");
}

#[test]
fn line_comment_after_opening_brace() {
    let input = "package main\n\nfunc f() { // c\n\tx()\n}\n";
    let expected = "package main\n\nfunc f() {  // c\n\tx()\n}\n";
    assert_eq!(fmt(input), expected);
    assert_eq!(fmt(expected), expected);
}

#[test]
fn multi_line_composite_elements_are_indented() {
    let input = "package main\n\nvar m = map[string]int{\n\t\"a\": 1, // C\n\t\"b\": 2, // D\n}\n";
    let expected =
        "package main\n\nvar m\t= map[string]int{\"a\": 1,\t// C\n\t\"b\": 2,\t\t\t\t// D\n}\n";
    assert_eq!(fmt(input), expected);
    assert_eq!(fmt(expected), expected);
}

#[test]
fn html_links_uses_to_their_declaration() {
    let input = "package main\n\nfunc f() {}\n\nfunc g() { f() }\n";
    let opts = FormatOptions {
        html: true,
        ..FormatOptions::default()
    };
    let page = fmt_with(input, opts);
    assert!(page.starts_with("<html>\n"));
    assert!(page.contains("<title>package main</title>"));
    assert!(page.contains("func <a name=\"id1\">f</a>()"));
    assert!(page.contains("func <a name=\"id2\">g</a>()"));
    assert!(page.contains("<a href=\"#id1\">f</a>()"));
    assert!(page.trim_end().ends_with("</html>"));
}

#[test]
fn syntax_errors_block_rewriting() {
    let input = "package main\nfunc f() {\n\tx := \n}\n";
    let write = FormatOptions {
        mode: Mode::Write,
        ..FormatOptions::default()
    };
    let err = format_source(input, &write).unwrap_err();
    assert!(err.to_string().contains("syntax errors"));

    // other modes still print what could be recovered
    assert!(format_source(input, &FormatOptions::default()).is_ok());
}

#[test]
fn missing_package_clause_is_an_error() {
    assert!(format_source("func f() {}\n", &FormatOptions::default()).is_err());
}
