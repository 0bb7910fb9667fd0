use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SAMPLE: &str = "ТОВАРНАЯ НАКЛАДНАЯ № ТН-2025-001 от 15.01.2025

Поставщик: ООО \"Альфа Торг\"
ИНН: 1234567890
КПП: 123456789

Покупатель: ЗАО \"Бета Снаб\"
ИНН: 0987654321
КПП: 987654321

Итого без НДС: 100 000,00
НДС 20%: 20 000,00
Всего к оплате: 120 000,00
";

/// Binary with the user config directory pointed at a scratch location.
fn nakl(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("nakl").unwrap();
    cmd.env("XDG_CONFIG_HOME", home.join("config"));
    cmd
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn parse_sample_to_json() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("torg12.txt");
    fs::write(&input, SAMPLE).unwrap();

    let output = nakl(dir.path())
        .arg("parse")
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["document_type"], "Товарная накладная (ТОРГ-12)");
    assert_eq!(json["number"], "ТН-2025-001");
    assert_eq!(json["date"], "15.01.2025");
    assert_eq!(json["supplier"]["INN"], "1234567890");
    assert_eq!(json["buyer"]["KPP"], "987654321");
    assert_eq!(json["amounts"]["total_with_vat"].as_f64(), Some(120000.0));
    assert!(json.get("error").is_none());
}

#[test]
fn parse_reads_stdin() {
    let dir = TempDir::new().unwrap();

    let output = nakl(dir.path())
        .args(["parse", "-", "--debug"])
        .write_stdin(SAMPLE)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["number"], "ТН-2025-001");
    assert!(json["debug_info"]["lines_count"].as_u64().unwrap() > 0);
}

#[test]
fn parse_empty_file_yields_error_record() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("empty.txt");
    fs::write(&input, "").unwrap();

    let output = nakl(dir.path())
        .arg("parse")
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["document_type"], "Неопределенный");
    assert_eq!(json["error"], "empty input text");
    assert_eq!(json["confidence_score"].as_f64(), Some(0.0));
}

#[test]
fn parse_missing_file_fails() {
    let dir = TempDir::new().unwrap();

    nakl(dir.path())
        .arg("parse")
        .arg(dir.path().join("nope.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn parse_csv_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("torg12.txt");
    fs::write(&input, SAMPLE).unwrap();

    nakl(dir.path())
        .args(["parse", "--format", "csv"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("document_type,number,date"))
        .stdout(predicate::str::contains("ТН-2025-001,15.01.2025"));
}

#[test]
fn config_init_then_show() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("nakl.json");

    nakl(dir.path())
        .args(["config", "init", "--output"])
        .arg(&config_path)
        .assert()
        .success();
    assert!(config_path.exists());

    nakl(dir.path())
        .args(["config", "init", "--output"])
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    nakl(dir.path())
        .arg("-c")
        .arg(&config_path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"max_lines_section\": 8"));

    nakl(dir.path())
        .arg("-c")
        .arg(&config_path)
        .args(["config", "get", "party_window_lines"])
        .assert()
        .success()
        .stdout(predicate::str::contains("8"));
}

#[test]
fn custom_labels_from_config() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("nakl.json");
    fs::write(
        &config_path,
        r#"{"labels": {"supplier": ["Исполнитель"], "buyer": ["Заказчик"]}}"#,
    )
    .unwrap();

    let input = dir.path().join("act.txt");
    fs::write(&input, "Акт № 12 от 03.03.2025\nИсполнитель: ИП Иванов\nЗаказчик: ООО Ромашка\n").unwrap();

    let output = nakl(dir.path())
        .arg("-c")
        .arg(&config_path)
        .arg("parse")
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["document_type"], "Акт");
    assert_eq!(json["supplier"]["name"], "ИП Иванов");
    assert_eq!(json["buyer"]["name"], "ООО Ромашка");
}

#[test]
fn batch_writes_outputs_and_summary() {
    let dir = TempDir::new().unwrap();
    let input_dir = dir.path().join("in");
    let output_dir = dir.path().join("out");
    fs::create_dir_all(&input_dir).unwrap();
    fs::write(input_dir.join("a.txt"), SAMPLE).unwrap();
    fs::write(input_dir.join("b.txt"), "").unwrap();
    fs::write(input_dir.join("ignored.pdf"), "binary").unwrap();

    let pattern = format!("{}/*", input_dir.display());

    nakl(dir.path())
        .args(["batch", &pattern, "--summary", "--continue-on-error", "--output-dir"])
        .arg(&output_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 files"))
        .stdout(predicate::str::contains("Processed 2 files"));

    assert!(output_dir.join("a.json").exists());
    assert!(!output_dir.join("b.json").exists());

    let summary = fs::read_to_string(output_dir.join("summary.csv")).unwrap();
    let lines: Vec<&str> = summary.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("filename,status,document_type"));
    assert!(lines[1].starts_with("a.txt,success,"));
    assert!(lines[2].starts_with("b.txt,error,"));
    assert!(lines[2].ends_with("empty input text"));
}

#[test]
fn batch_stops_on_first_error_by_default() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("empty.txt"), "").unwrap();

    let pattern = format!("{}/*.txt", dir.path().display());

    nakl(dir.path())
        .args(["batch", &pattern])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Processing failed"));
}

#[test]
fn parse_with_hints_summarizes_them() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("torg12.txt");
    let hints = dir.path().join("hints.json");
    fs::write(&input, SAMPLE).unwrap();
    fs::write(
        &hints,
        r#"[
            {"class_name": "recipient", "confidence": 0.9},
            {"class_name": "price", "confidence": 0.7, "text": "120 000,00"}
        ]"#,
    )
    .unwrap();

    let output = nakl(dir.path())
        .arg("parse")
        .arg(&input)
        .arg("--hints")
        .arg(&hints)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = stdout_json(&output);
    let summary = &json["debug_info"]["field_hints"];
    assert_eq!(summary["total_fields"], 2);
    assert_eq!(summary["high_confidence_fields"], 1);
    assert_eq!(summary["detected_types"], serde_json::json!(["price", "recipient"]));
    assert!((summary["average_confidence"].as_f64().unwrap() - 0.8).abs() < 1e-4);
    assert_eq!(json["number"], "ТН-2025-001");
}

#[test]
fn parse_show_confidence() {
    let dir = TempDir::new().unwrap();
    let full = dir.path().join("torg12.txt");
    let bare = dir.path().join("note.txt");
    fs::write(&full, SAMPLE).unwrap();
    fs::write(&bare, "Просто текст без реквизитов").unwrap();

    nakl(dir.path())
        .args(["parse", "--show-confidence"])
        .arg(&full)
        .assert()
        .success()
        .stdout(predicate::str::contains("Field coverage: 100.0%"))
        .stdout(predicate::str::contains("below threshold").not());

    nakl(dir.path())
        .args(["parse", "--show-confidence"])
        .arg(&bare)
        .assert()
        .success()
        .stdout(predicate::str::contains("Field coverage: 0.0% (below threshold)"));
}

#[test]
fn parse_reads_json_and_html_ocr_output() {
    let dir = TempDir::new().unwrap();

    let json_input = dir.path().join("scan.json");
    let pages = serde_json::json!({
        "pages": [
            {"markdown": "ТОВАРНАЯ НАКЛАДНАЯ № ТН-7 от 02.03.2025"},
            {"text": "Всего к оплате: 1 200,00"}
        ]
    });
    fs::write(&json_input, pages.to_string()).unwrap();

    let output = nakl(dir.path()).arg("parse").arg(&json_input).output().unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["number"], "ТН-7");
    assert_eq!(json["amounts"]["total_with_vat"].as_f64(), Some(1200.0));

    let html_input = dir.path().join("scan.html");
    fs::write(
        &html_input,
        "<html><body><h1>Счет-фактура № СФ-9 от 05.04.2025</h1>\n<p>Продавец: <b>ООО Гамма</b></p></body></html>",
    )
    .unwrap();

    let output = nakl(dir.path()).arg("parse").arg(&html_input).output().unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["document_type"], "Счет-фактура");
    assert_eq!(json["number"], "СФ-9");
    assert_eq!(json["supplier"]["name"], "ООО Гамма");
}

#[test]
fn config_validate_checks_patterns() {
    let dir = TempDir::new().unwrap();
    let good = dir.path().join("good.json");
    let bad = dir.path().join("bad.json");
    fs::write(&good, r#"{"labels": {"supplier": ["Исполнитель"]}}"#).unwrap();
    fs::write(&bad, r#"{"patterns": {"date": ["(от"]}}"#).unwrap();

    nakl(dir.path())
        .args(["config", "validate"])
        .arg(&good)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("supplier 1"));

    nakl(dir.path())
        .args(["config", "validate"])
        .arg(&bad)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid pattern for date"));
}
