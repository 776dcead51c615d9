use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[allow(deprecated)]
fn catalog() -> Command {
    let mut cmd = Command::cargo_bin("catalog").expect("binary");
    cmd.env_remove("CATALOG_SOURCE")
        .env_remove("CATALOG_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

fn json_stdout(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("command run");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid json")
}

fn write_fragments(dir: &Path) {
    fs::write(
        dir.join("Audio.json"),
        json!({
            "Summary": "sound stuff",
            "Components": { "Speaker": { "Description": "plays sound" } }
        })
        .to_string(),
    )
    .unwrap();
    fs::write(
        dir.join("CommonUI.json"),
        json!({
            "Categorys": {
                "Common UI": {
                    "Summary": "widgets",
                    "Components": { "Button": { "Description": "clickable" } }
                }
            }
        })
        .to_string(),
    )
    .unwrap();
    fs::write(dir.join("Physics.json"), "{ not json").unwrap();
}

#[test]
fn load_merges_fragments_from_directory() {
    let temp = tempdir().unwrap();
    write_fragments(temp.path());

    let body = json_stdout(
        catalog()
            .arg("--source")
            .arg(temp.path())
            .args(["load", "--json"]),
    );
    assert_eq!(
        body["Categorys"],
        json!({
            "Audio": {
                "Summary": "sound stuff",
                "Components": { "Speaker": { "Description": "plays sound" } }
            },
            "Common UI": {
                "Summary": "widgets",
                "Components": { "Button": { "Description": "clickable" } }
            }
        })
    );
    let sources = body["_meta"]["source"].as_array().unwrap();
    assert_eq!(sources.len(), 2);
    assert!(sources[0].as_str().unwrap().ends_with("Audio.json"));
}

#[test]
fn load_prints_outline_by_default() {
    let temp = tempdir().unwrap();
    write_fragments(temp.path());

    catalog()
        .arg("--source")
        .arg(temp.path())
        .arg("load")
        .assert()
        .success()
        .stdout(predicate::str::contains("[-] Audio - sound stuff"))
        .stdout(predicate::str::contains("* Button - clickable"));
}

#[test]
fn search_filters_and_selects_tag() {
    let temp = tempdir().unwrap();
    write_fragments(temp.path());

    let body = json_stdout(
        catalog()
            .arg("--source")
            .arg(temp.path())
            .args(["search", "CLICK", "--json"]),
    );
    assert_eq!(
        body["Categorys"],
        json!({
            "Common UI": {
                "Summary": "widgets",
                "Components": { "Button": { "Description": "clickable" } }
            }
        })
    );

    let body = json_stdout(
        catalog()
            .arg("--source")
            .arg(temp.path())
            .args(["search", "", "--tag", "audio", "--json"]),
    );
    let categories = body["Categorys"].as_object().unwrap();
    assert_eq!(categories.keys().collect::<Vec<_>>(), vec!["Audio"]);
}

#[test]
fn missing_source_directory_falls_back_to_empty_catalog() {
    let temp = tempdir().unwrap();
    let missing = temp.path().join("nope");

    catalog()
        .arg("--source")
        .arg(&missing)
        .arg("load")
        .assert()
        .success()
        .stdout(predicate::str::contains("No categories to display"))
        .stderr(predicate::str::contains("empty catalog"));
}

#[test]
fn merge_combines_local_files_and_reports_bad_ones() {
    let temp = tempdir().unwrap();
    write_fragments(temp.path());
    let cloud = temp.path().join("export.json");
    fs::write(
        &cloud,
        json!({ "Categorys": { "Cloud": { "Summary": "remote" }, "Data": {} } }).to_string(),
    )
    .unwrap();

    let output = catalog()
        .arg("merge")
        .arg(temp.path().join("Audio.json"))
        .arg(&cloud)
        .arg(temp.path().join("Physics.json"))
        .arg("--json")
        .output()
        .expect("command run");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Physics.json"));

    let body: Value = serde_json::from_slice(&output.stdout).unwrap();
    let categories = body["Categorys"].as_object().unwrap();
    assert_eq!(
        categories.keys().collect::<Vec<_>>(),
        vec!["Audio", "Cloud", "Data"]
    );
    assert_eq!(body["_meta"]["source"], json!(["Audio.json", "export.json"]));
}

#[test]
fn config_file_sets_tags_and_prefix() {
    let temp = tempdir().unwrap();
    fs::write(
        temp.path().join("en_Audio.json"),
        json!({ "Summary": "sound stuff" }).to_string(),
    )
    .unwrap();
    let config = temp.path().join("catalog.toml");
    fs::write(
        &config,
        format!(
            "source = {:?}\ntags = [\"Audio\", \"Common UI\"]\nfile_prefix = \"en_\"\n",
            temp.path().display().to_string()
        ),
    )
    .unwrap();

    let body = json_stdout(catalog().arg("--config").arg(&config).args(["tags", "--json"]));
    assert_eq!(
        body,
        json!([
            { "tag": "all", "file_name": null },
            { "tag": "Audio", "file_name": "en_Audio.json" },
            { "tag": "Common UI", "file_name": "en_CommonUI.json" }
        ])
    );

    let body = json_stdout(catalog().arg("--config").arg(&config).args(["load", "--json"]));
    assert_eq!(body["Categorys"], json!({ "Audio": { "Summary": "sound stuff" } }));
}

#[test]
fn invalid_config_is_an_error() {
    let temp = tempdir().unwrap();
    let config = temp.path().join("catalog.json");
    fs::write(&config, r#"{"open_depth": 1, "colour": "red"}"#).unwrap();

    catalog()
        .arg("--config")
        .arg(&config)
        .arg("tags")
        .assert()
        .failure()
        .stderr(predicate::str::contains("colour"));
}

#[test]
fn resolve_maps_file_names_to_tags() {
    catalog()
        .args(["resolve", "downloads/commonui.JSON"])
        .assert()
        .success()
        .stdout("Common UI\n");

    let body = json_stdout(catalog().args(["resolve", "notes.txt", "--json"]));
    assert_eq!(body, json!({ "file_name": "notes.txt", "tag": null }));
}

#[test]
fn schema_describes_document_keys() {
    catalog()
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("Categorys"));
}
