//! Edge case and error handling tests for setuplens


use harness::{TestProject, run_setuplens};
use setuplens::{DependencyDeclaration, Error, PackageDescriptor, extract_dependencies};
use std::os::unix::fs::symlink;

// ============================================================================
// Descriptor text
// ============================================================================

#[test]
fn test_bom_and_crlf() {
    let src = "\u{feff}from setuptools import setup\r\nsetup(\r\n    install_requires=[\r\n        'a==1',\r\n        'b',\r\n    ],\r\n)\r\n";
    assert_eq!(extract_dependencies(src).unwrap(), vec!["a==1", "b"]);
}

#[test]
fn test_indentation_and_blank_lines_do_not_matter() {
    let src = "setup(install_requires=[\n\n\n'a',\n                        'b',\n\t'c'])";
    assert_eq!(extract_dependencies(src).unwrap(), vec!["a", "b", "c"]);
}

#[test]
fn test_string_prefixes_and_quotes() {
    let src = r#"setup(install_requires=[r'raw>=1', u"unicode", """triple""", b'bytes'])"#;
    assert_eq!(
        extract_dependencies(src).unwrap(),
        vec!["raw>=1", "unicode", "triple", "bytes"]
    );
}

#[test]
fn test_escaped_quote_inside_entry() {
    let src = r#"setup(install_requires=['pkg; os_name == \'nt\''])"#;
    assert_eq!(
        extract_dependencies(src).unwrap(),
        vec!["pkg; os_name == 'nt'"]
    );
}

#[test]
fn test_unterminated_string_is_an_error() {
    let err = extract_dependencies("setup(install_requires=['a)\n").unwrap_err();
    assert!(matches!(err, Error::UnterminatedString { line: 1 }));
}

#[test]
fn test_brackets_inside_strings_do_not_count() {
    let src = "setup(description='uses [brackets] (and parens', install_requires=['x[extra]>=1'])";
    assert_eq!(extract_dependencies(src).unwrap(), vec!["x[extra]>=1"]);
}

#[test]
fn test_conditional_concatenation_is_external() {
    let src = r#"
install_requires = ['base']
if sys.version_info < (3, 8):
    install_requires += ['importlib-metadata']
setup(install_requires=install_requires + extras)
"#;
    let descriptor = PackageDescriptor::parse(src).unwrap();
    assert!(matches!(
        descriptor.install_requires,
        DependencyDeclaration::External { .. }
    ));
}

#[test]
fn test_empty_file() {
    assert!(matches!(
        extract_dependencies("").unwrap_err(),
        Error::MissingInstallRequires
    ));
}

// ============================================================================
// Filesystem
// ============================================================================

#[test]
fn test_max_file_size_skips_descriptor() {
    let project = TestProject::new();
    project.add_inline_project(".", "big", &["a", "b", "c"]);

    let (_stdout, stderr, code) =
        run_setuplens(project.path(), &["deps", "setup.py", "--max-file-size", "10"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("over the configured limit"), "stderr: {stderr}");
}

#[test]
fn test_invalid_max_file_size() {
    let project = TestProject::new();
    let (_stdout, stderr, code) =
        run_setuplens(project.path(), &["scan", "--max-file-size", "huge"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("invalid --max-file-size 'huge'"));
}

#[test]
fn test_scan_reports_unparsable_descriptor_and_continues() {
    let project = TestProject::new();
    project.add_file("broken/setup.py", "setup(install_requires=['a'\n");
    project.add_inline_project("ok", "ok", &["x"]);

    let (stdout, _stderr, code) = run_setuplens(project.path(), &["scan"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("error: "));
    assert!(stdout.contains("unbalanced bracket"));
    assert!(stdout.contains("    x\n"));
}

#[test]
fn test_symlink_to_parent_no_infinite_loop() {
    let project = TestProject::new();
    project.add_inline_project("pkg", "pkg", &["a"]);
    symlink("..", project.path().join("pkg").join("parent")).expect("Failed to create parent symlink");

    let (stdout, _stderr, code) = run_setuplens(project.path(), &["scan", "-a"]);
    assert_eq!(code, 0, "setuplens should not hang on parent symlink");
    assert!(stdout.contains("1 project,"));
}

#[test]
fn test_gitignored_project_hidden_unless_all() {
    let project = TestProject::new();
    project.add_file(".gitignore", "build/\n");
    project.add_inline_project("build/lib", "copy", &[]);
    project.add_inline_project(".", "real", &[]);

    let (stdout, _stderr, _code) = run_setuplens(project.path(), &["scan"]);
    assert!(stdout.contains("1 project,"));

    let (stdout, _stderr, _code) = run_setuplens(project.path(), &["scan", "--all"]);
    assert!(stdout.contains("2 projects,"));
}

#[test]
fn test_requirements_dir_attaches_to_parent() {
    let project = TestProject::new();
    project.add_file("setup.py", "setup(install_requires=open('requirements/prod.txt').read().split())");
    project.add_file("requirements/prod.txt", "-r base.txt\nuvicorn\n");
    project.add_file("requirements/base.txt", "starlette\n");

    let (stdout, _stderr, code) = run_setuplens(project.path(), &["scan"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("1 project, 1 descriptor, 2 requirements files"));
    assert!(stdout.contains("requirements/prod.txt  1 requirement (followed)"));
    assert!(stdout.contains("    -r base.txt\n"));
}
