// Report document shape and ranking semantics, checked end to end

use assert_cmd::Command;
use culpar::report::Report;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_coverage(base: &Path, test_id: &str, contents: &str) {
    let dir = base.join(test_id);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("demo.cpp.gcov"), contents).unwrap();
}

fn trace(lines: &[u32]) -> String {
    let mut out = String::from("        -:    0:Source:demo.cpp\n");
    for line in lines {
        out.push_str(&format!("        1:{:>5}:covered();\n", line));
    }
    out
}

/// failing = {T1}, passing = {T2, T3}; element A (line 3) covered by T1 and
/// T2, element B (line 7) covered only by T3.
fn ochiai_fixture(tmp: &TempDir) -> (std::path::PathBuf, std::path::PathBuf) {
    let coverage = tmp.path().join("coverage");
    let failed_log = tmp.path().join("failed.log");

    fs::write(&failed_log, "1:T1\n").unwrap();
    write_coverage(&coverage, "T1", &trace(&[3]));
    write_coverage(&coverage, "T2", &trace(&[3]));
    write_coverage(&coverage, "T3", &trace(&[7]));

    (failed_log, coverage)
}

fn run_culpar(failed_log: &Path, coverage: &Path, output: &Path) {
    Command::cargo_bin("culpar")
        .unwrap()
        .arg(failed_log)
        .arg(coverage)
        .arg("-o")
        .arg(output)
        .assert()
        .success();
}

#[test]
fn test_schema_section_describes_columns() {
    let tmp = TempDir::new().unwrap();
    let (failed_log, coverage) = ochiai_fixture(&tmp);
    let output = tmp.path().join("report.json");
    run_culpar(&failed_log, &coverage, &output);

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();

    let fields = report["schema"]["fields"].as_array().unwrap();
    let names: Vec<&str> = fields.iter().map(|f| f["name"].as_str().unwrap()).collect();
    assert_eq!(names, ["file", "line", "score", "rank"]);

    let types: Vec<&str> = fields.iter().map(|f| f["type"].as_str().unwrap()).collect();
    assert_eq!(types, ["string", "integer", "number", "integer"]);

    assert_eq!(
        report["schema"]["primaryKey"],
        serde_json::json!(["file", "line"])
    );
}

#[test]
fn test_ochiai_scores_and_order() {
    let tmp = TempDir::new().unwrap();
    let (failed_log, coverage) = ochiai_fixture(&tmp);
    let output = tmp.path().join("report.json");
    run_culpar(&failed_log, &coverage, &output);

    let report = Report::from_file(&output).unwrap();
    assert_eq!(report.data.len(), 2);

    // A: ef=1, nf=0, ep=1, np=1 -> 1/sqrt(1*2)
    let a = &report.data[0];
    assert_eq!(a.line, 3);
    assert_eq!(a.rank, 1);
    assert!((a.score - 0.7071).abs() < 1e-4);

    // B: ef=0 -> 0, ranked after A
    let b = &report.data[1];
    assert_eq!(b.line, 7);
    assert_eq!(b.rank, 2);
    assert_eq!(b.score, 0.0);
}

#[test]
fn test_rows_sorted_by_score_then_element() {
    let tmp = TempDir::new().unwrap();
    let coverage = tmp.path().join("coverage");
    let failed_log = tmp.path().join("failed.log");
    let output = tmp.path().join("report.json");

    // two elements tie at the top score; the (file, line) order decides
    fs::write(&failed_log, "1:T1\n").unwrap();
    write_coverage(&coverage, "T1", &trace(&[9, 2]));
    write_coverage(&coverage, "T2", &trace(&[5]));

    run_culpar(&failed_log, &coverage, &output);
    let report = Report::from_file(&output).unwrap();

    let lines: Vec<u32> = report.data.iter().map(|row| row.line).collect();
    assert_eq!(lines, [2, 9, 5]);

    let ranks: Vec<u32> = report.data.iter().map(|row| row.rank).collect();
    assert_eq!(ranks, [1, 2, 3]);

    for pair in report.data.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[test]
fn test_round_trip_reconstructs_ranked_list() {
    let tmp = TempDir::new().unwrap();
    let (failed_log, coverage) = ochiai_fixture(&tmp);
    let output = tmp.path().join("report.json");
    run_culpar(&failed_log, &coverage, &output);

    let first = Report::from_file(&output).unwrap();

    // write the deserialized report back out and read it again
    let copy = tmp.path().join("copy.json");
    first.write_to(&copy).unwrap();
    let second = Report::from_file(&copy).unwrap();

    assert_eq!(first, second);
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        fs::read_to_string(&copy).unwrap()
    );
}

#[test]
fn test_uncovered_elements_still_reported() {
    let tmp = TempDir::new().unwrap();
    let coverage = tmp.path().join("coverage");
    let failed_log = tmp.path().join("failed.log");
    let output = tmp.path().join("report.json");

    // line 8 is instrumented but executed by nobody
    let contents = "\
        -:    0:Source:demo.cpp
        1:    3:reached();
    #####:    8:never();
";
    fs::write(&failed_log, "1:T1\n").unwrap();
    write_coverage(&coverage, "T1", contents);

    run_culpar(&failed_log, &coverage, &output);
    let report = Report::from_file(&output).unwrap();

    let dead = report.data.iter().find(|row| row.line == 8).unwrap();
    assert_eq!(dead.score, 0.0);
    assert_eq!(report.data.len(), 2);
}
