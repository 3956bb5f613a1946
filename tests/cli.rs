//! End-to-end tests for the CLI commands, driven through the library.

use std::fs;
use std::path::Path;

use cellscope::cli::{run_analyze, run_notebook, run_tree, CliOptions, Input, OutputFormat};
use serde_json::Value;

const NOTEBOOK: &str = "### A Pluto.jl notebook ###
# v0.19.40

# ╔═╡ 1f2e3d4c-aaaa-11ee-0000-000000000001
xs = [1, 2, 3]

# ╔═╡ 1f2e3d4c-aaaa-11ee-0000-000000000002
total = sum(x^2 for x in xs)

# ╔═╡ Cell order:
# ╠═1f2e3d4c-aaaa-11ee-0000-000000000001
# ╠═1f2e3d4c-aaaa-11ee-0000-000000000002
";

fn setup_notebooks() -> tempfile::TempDir {
    let temp = tempfile::tempdir().expect("failed to create temp dir");
    fs::write(temp.path().join("squares.jl"), NOTEBOOK).unwrap();
    fs::create_dir(temp.path().join("nested")).unwrap();
    fs::write(temp.path().join("nested").join("again.jl"), NOTEBOOK).unwrap();
    fs::write(temp.path().join("script.jl"), "println(\"not a notebook\")\n").unwrap();
    fs::write(temp.path().join("notes.txt"), NOTEBOOK).unwrap();
    temp
}

fn notebook_json(path: &Path, options: &CliOptions) -> Value {
    let mut out = Vec::new();
    run_notebook(path, options, &mut out).unwrap();
    serde_json::from_slice(&out).unwrap()
}

#[test]
fn analyze_emits_json_envelope() {
    let input = Input::new("cell.jl", "function f(x)\n  x + y\nend");
    let mut out = Vec::new();
    run_analyze(&input, &CliOptions::default(), &mut out).unwrap();
    let json: Value = serde_json::from_slice(&out).unwrap();

    assert_eq!(json["status"], "ok");
    assert_eq!(json["schema_version"], "1");
    assert_eq!(json["file"], "cell.jl");

    let analysis = &json["analysis"];
    assert_eq!(analysis["definitions"][0]["name"], "f");
    assert_eq!(analysis["definitions"][0]["kind"], "function");
    assert_eq!(analysis["definitions"][0]["line"], 1);
    assert_eq!(analysis["definitions"][0]["col"], 10);

    let usages: Vec<_> = analysis["usages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["name"].as_str().unwrap())
        .collect();
    assert_eq!(usages, vec!["x", "y"]);
    assert_eq!(analysis["usages"][1]["line"], 2);
    assert_eq!(analysis["locals"][0]["name"], "x");
}

#[test]
fn analyze_without_locals_omits_the_field() {
    let input = Input::new("cell.jl", "g(x) = x");
    let options = CliOptions {
        include_locals: false,
        ..CliOptions::default()
    };
    let mut out = Vec::new();
    run_analyze(&input, &options, &mut out).unwrap();
    let json: Value = serde_json::from_slice(&out).unwrap();
    assert!(json["analysis"].get("locals").is_none());
}

#[test]
fn notebook_directory_finds_only_notebooks() {
    let temp = setup_notebooks();
    let json = notebook_json(temp.path(), &CliOptions::default());

    let files: Vec<_> = json["notebooks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["file"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(files.len(), 2);
    assert!(files[0].ends_with("again.jl"));
    assert!(files[1].ends_with("squares.jl"));
}

#[test]
fn notebook_positions_are_file_relative() {
    let temp = setup_notebooks();
    let path = temp.path().join("squares.jl");
    let json = notebook_json(&path, &CliOptions::default());

    let cells = &json["notebooks"][0]["cells"];
    assert_eq!(cells.as_array().unwrap().len(), 2);

    let second = &cells[1];
    assert_eq!(second["id"], "1f2e3d4c-aaaa-11ee-0000-000000000002");
    assert_eq!(second["line"], 8);
    let total = &second["analysis"]["definitions"][0];
    assert_eq!(total["name"], "total");
    assert_eq!(total["line"], 8);
    assert_eq!(total["col"], 1);

    let from = total["from"].as_u64().unwrap() as usize;
    assert_eq!(&NOTEBOOK[from..from + 5], "total");
    assert_eq!(second["analysis"]["locals"][0]["name"], "x");
}

#[test]
fn notebook_text_summary() {
    let temp = setup_notebooks();
    let path = temp.path().join("squares.jl");
    let options = CliOptions {
        format: OutputFormat::Text,
        include_locals: false,
        ..CliOptions::default()
    };
    let mut out = Vec::new();
    run_notebook(&path, &options, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<_> = text.lines().skip(1).collect();
    assert_eq!(
        lines,
        vec![
            "  1f2e3d4c-aaaa-11ee-0000-000000000001 (line 5)",
            "    definitions: xs",
            "    usages: ",
            "  1f2e3d4c-aaaa-11ee-0000-000000000002 (line 8)",
            "    definitions: total",
            "    usages: sum, x, xs",
        ]
    );
}

#[test]
fn plain_file_is_not_a_notebook() {
    let temp = setup_notebooks();
    let mut out = Vec::new();
    let err = run_notebook(&temp.path().join("script.jl"), &CliOptions::default(), &mut out)
        .unwrap_err();
    assert_eq!(err.error_code().code(), 4);
    assert!(err.to_string().contains("not a Pluto notebook"));
}

#[test]
fn missing_notebook_is_input_error() {
    let temp = setup_notebooks();
    let err = run_notebook(&temp.path().join("gone.jl"), &CliOptions::default(), &mut Vec::new())
        .unwrap_err();
    assert_eq!(err.error_code().code(), 3);
}

#[test]
fn tree_dump() {
    let input = Input::new("cell.jl", "x = 1");
    let mut out = Vec::new();
    run_tree(&input, OutputFormat::Text, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(
        text,
        "SourceFile[0,5]: \"x = 1\"\n  Assignment[0,5]: \"x = 1\"\n    Identifier[0,1]: \"x\"\n    Operator[2,3]: \"=\"\n    IntegerLiteral[4,5]: \"1\"\n"
    );
}

#[test]
fn tree_shows_unterminated_string_as_error() {
    let input = Input::new("cell.jl", "x = 1\ns = \"open");
    let mut out = Vec::new();
    run_tree(&input, OutputFormat::Text, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("  Assignment[0,5]: \"x = 1\"\n"), "{}", text);
    assert!(text.ends_with("  Error[10,15]: \"\"open\"\n"), "{}", text);
}
