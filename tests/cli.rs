#![allow(deprecated)]

#[allow(unused_imports)]
use assert_cmd::cargo::CommandCargoExt;
use chrono::Local;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cmd(temp: &TempDir) -> assert_cmd::Command {
    let mut c = assert_cmd::Command::cargo_bin("snip_notes").unwrap();
    c.env("SNIP_NOTES_VAULT", temp.path())
        .env_remove("SNIP_NOTES_CONFIG")
        .env("NO_COLOR", "1");
    c
}

fn write_file(temp: &TempDir, rel: &str, content: &str) {
    let path = temp.path().join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn read_file(temp: &TempDir, rel: &str) -> String {
    fs::read_to_string(temp.path().join(rel)).unwrap()
}

fn write_settings(temp: &TempDir, json: &str) {
    fs::write(temp.path().join(".snip_notes.json"), json).unwrap();
}

/// Settings for predictable names: no date prefix, flat vault, embed.
const FLAT_EMBED: &str = r#"{
  "format": "{nWords}",
  "nWords": 3,
  "useSubdir": false,
  "textAfterExtraction": "embed"
}"#;

const INBOX: &str = "\
# Inbox

The quick brown fox jumps over the lazy dog.

Later lines stay put.
";

#[test]
fn extract_embeds_link_and_leaves_rest_untouched() {
    let temp = TempDir::new().unwrap();
    write_settings(&temp, FLAT_EMBED);
    write_file(&temp, "inbox.md", INBOX);

    cmd(&temp)
        .args(["extract", "inbox.md", "--lines", "3"])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "Extracted text to quick-brown-fox.md",
        ));

    assert_eq!(
        read_file(&temp, "quick-brown-fox.md"),
        "The quick brown fox jumps over the lazy dog."
    );
    assert_eq!(
        read_file(&temp, "inbox.md"),
        "\
# Inbox

![quick-brown-fox](quick-brown-fox.md)

Later lines stay put.
"
    );
}

#[test]
fn link_action_inserts_bare_reference() {
    let temp = TempDir::new().unwrap();
    write_settings(
        &temp,
        r#"{"format": "{nWords}", "nWords": 3, "useSubdir": false, "textAfterExtraction": "link"}"#,
    );
    write_file(&temp, "inbox.md", INBOX);

    cmd(&temp)
        .args(["extract", "inbox.md", "--lines", "3"])
        .assert()
        .success();

    let inbox = read_file(&temp, "inbox.md");
    assert!(inbox.contains("\n[quick-brown-fox](quick-brown-fox.md)\n"));
    assert!(!inbox.contains("!["));
}

#[test]
fn none_action_blanks_the_selection() {
    let temp = TempDir::new().unwrap();
    write_settings(
        &temp,
        r#"{"format": "{nWords}", "nWords": 3, "useSubdir": false, "textAfterExtraction": "none"}"#,
    );
    write_file(&temp, "inbox.md", INBOX);

    cmd(&temp)
        .args(["extract", "inbox.md", "--lines", "3"])
        .assert()
        .success();

    assert_eq!(
        read_file(&temp, "inbox.md"),
        "# Inbox\n\n\n\nLater lines stay put.\n"
    );
    assert!(temp.path().join("quick-brown-fox.md").is_file());
}

#[test]
fn subdir_mode_relocates_and_links_the_final_path() {
    let temp = TempDir::new().unwrap();
    write_settings(
        &temp,
        r#"{"format": "{nWords}", "nWords": 3, "useSubdir": true, "subdir": "extracts"}"#,
    );
    write_file(&temp, "inbox.md", INBOX);

    cmd(&temp)
        .args(["extract", "inbox.md", "--lines", "3"])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "Extracted text to extracts/quick-brown-fox.md",
        ));

    assert_eq!(
        read_file(&temp, "extracts/quick-brown-fox.md"),
        "The quick brown fox jumps over the lazy dog."
    );
    assert!(
        read_file(&temp, "inbox.md")
            .contains("![quick-brown-fox](extracts/quick-brown-fox.md)")
    );

    // The staging copy must be gone from the source folder.
    let stragglers: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_name().to_string_lossy().starts_with("quick-brown-fox-")
        })
        .collect();
    assert!(stragglers.is_empty());
}

#[test]
fn subdir_template_expands_date_tokens() {
    let temp = TempDir::new().unwrap();
    write_settings(
        &temp,
        r#"{"format": "{nWords}", "nWords": 3, "useSubdir": true, "subdir": "{DATE:YYYY}"}"#,
    );
    write_file(&temp, "inbox.md", INBOX);

    cmd(&temp)
        .args(["extract", "inbox.md", "--lines", "3"])
        .assert()
        .success();

    let year = Local::now().format("%Y").to_string();
    assert!(
        temp.path().join(&year).join("quick-brown-fox.md").is_file(),
        "expected note under {year}/"
    );
}

#[test]
fn rapid_identical_extractions_produce_distinct_notes() {
    let temp = TempDir::new().unwrap();
    write_settings(
        &temp,
        r#"{"format": "{nWords}", "nWords": 3, "useSubdir": true, "subdir": "extracts"}"#,
    );
    write_file(
        &temp,
        "inbox.md",
        "The quick brown fox jumps.\n\nThe quick brown fox jumps.\n",
    );

    cmd(&temp)
        .args(["extract", "inbox.md", "--lines", "1"])
        .assert()
        .success();
    cmd(&temp)
        .args(["extract", "inbox.md", "--lines", "3"])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "Couldn't move new file into extracts.",
        ));

    // First run lands in the subfolder; the second keeps its staging name
    // rather than overwrite it.
    assert!(temp.path().join("extracts/quick-brown-fox.md").is_file());
    let staged: Vec<String> = fs::read_dir(temp.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.starts_with("quick-brown-fox-") && n.ends_with(".md"))
        .collect();
    assert_eq!(staged.len(), 1);

    let inbox = read_file(&temp, "inbox.md");
    assert!(inbox.contains("](extracts/quick-brown-fox.md)"));
    assert!(inbox.contains(&format!("]({})", staged[0])));
}

#[test]
fn extracted_notes_own_links_are_rebased_after_relocation() {
    let temp = TempDir::new().unwrap();
    write_settings(
        &temp,
        r#"{"format": "{nWords}", "nWords": 3, "useSubdir": true, "subdir": "extracts"}"#,
    );
    write_file(&temp, "other.md", "context\n");
    write_file(
        &temp,
        "inbox.md",
        "Fox research notes citing [other](other.md) directly.\n",
    );

    cmd(&temp)
        .args(["extract", "inbox.md", "--lines", "1"])
        .assert()
        .success();

    assert_eq!(
        read_file(&temp, "extracts/fox-research-notes.md"),
        "Fox research notes citing [other](../other.md) directly."
    );
}

#[test]
fn empty_selection_fails_without_creating_anything() {
    let temp = TempDir::new().unwrap();
    write_settings(&temp, FLAT_EMBED);
    write_file(&temp, "inbox.md", "# Inbox\n\t \nbody\n");

    cmd(&temp)
        .args(["extract", "inbox.md", "--lines", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No text selected to extract."));

    assert_eq!(read_file(&temp, "inbox.md"), "# Inbox\n\t \nbody\n");
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 2);
}

#[test]
fn missing_source_note_fails_with_its_path() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["extract", "ghost.md", "--lines", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ghost.md"));
}

#[test]
fn out_of_bounds_line_range_is_rejected() {
    let temp = TempDir::new().unwrap();
    write_file(&temp, "inbox.md", "only line\n");
    cmd(&temp)
        .args(["extract", "inbox.md", "--lines", "2:9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of bounds"));
}

#[test]
fn all_stopword_selection_without_prompt_is_an_error() {
    let temp = TempDir::new().unwrap();
    write_settings(&temp, FLAT_EMBED);
    write_file(&temp, "inbox.md", "the and of it\n");

    cmd(&temp)
        .args(["extract", "inbox.md", "--lines", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please provide a note name."));
}

#[test]
fn name_flag_overrides_the_derived_default() {
    let temp = TempDir::new().unwrap();
    write_settings(&temp, FLAT_EMBED);
    write_file(&temp, "inbox.md", INBOX);

    cmd(&temp)
        .args(["extract", "inbox.md", "--lines", "3", "--name", "Fox Facts"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Extracted text to Fox Facts.md"));

    assert!(temp.path().join("Fox Facts.md").is_file());
    assert!(
        read_file(&temp, "inbox.md")
            .contains("![Fox Facts](Fox%20Facts.md)")
    );
}

#[test]
fn prompt_accepts_a_typed_name() {
    let temp = TempDir::new().unwrap();
    write_settings(&temp, FLAT_EMBED);
    write_file(&temp, "inbox.md", INBOX);

    cmd(&temp)
        .args(["extract", "inbox.md", "--lines", "3", "--prompt"])
        .write_stdin("Renamed By Hand\n")
        .assert()
        .success();

    assert!(temp.path().join("Renamed By Hand.md").is_file());
}

#[test]
fn prompt_empty_line_accepts_the_default() {
    let temp = TempDir::new().unwrap();
    write_settings(&temp, FLAT_EMBED);
    write_file(&temp, "inbox.md", INBOX);

    cmd(&temp)
        .args(["extract", "inbox.md", "--lines", "3", "--prompt"])
        .write_stdin("\n")
        .assert()
        .success();

    assert!(temp.path().join("quick-brown-fox.md").is_file());
}

#[test]
fn prompt_eof_cancels_with_no_side_effects() {
    let temp = TempDir::new().unwrap();
    write_settings(&temp, FLAT_EMBED);
    write_file(&temp, "inbox.md", INBOX);

    cmd(&temp)
        .args(["extract", "inbox.md", "--lines", "3", "--prompt"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Extraction cancelled."));

    assert_eq!(read_file(&temp, "inbox.md"), INBOX);
    assert!(!temp.path().join("quick-brown-fox.md").exists());
}

#[test]
fn prompt_and_name_flags_are_mutually_exclusive() {
    let temp = TempDir::new().unwrap();
    write_file(&temp, "inbox.md", INBOX);
    cmd(&temp)
        .args([
            "extract", "inbox.md", "--lines", "3", "--prompt", "--name", "x",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("mutually exclusive"));
}

#[test]
fn name_command_prints_the_derived_default() {
    let temp = TempDir::new().unwrap();
    write_settings(&temp, FLAT_EMBED);
    write_file(&temp, "inbox.md", INBOX);

    cmd(&temp)
        .args(["name", "inbox.md", "--lines", "3"])
        .assert()
        .success()
        .stdout("quick-brown-fox\n");
}

#[test]
fn name_command_applies_the_default_date_format() {
    let temp = TempDir::new().unwrap();
    write_file(&temp, "inbox.md", INBOX);

    let expected = format!(
        "{}_quick-brown-fox-jumps-lazy\n",
        Local::now().format("%Y-%m-%d")
    );
    cmd(&temp)
        .args(["name", "inbox.md", "--lines", "3"])
        .assert()
        .success()
        .stdout(predicate::str::diff(expected));
}

#[test]
fn config_command_shows_effective_settings() {
    let temp = TempDir::new().unwrap();
    write_settings(&temp, r#"{"nWords": 2}"#);

    cmd(&temp)
        .args(["config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"nWords\": 2"))
        .stdout(predicate::str::contains(
            "\"format\": \"{DATE:YYYY-MM-DD}_{nWords}\"",
        ))
        .stdout(predicate::str::contains("\"textAfterExtraction\": \"embed\""));
}

#[test]
fn init_writes_defaults_and_refuses_a_second_run() {
    let temp = TempDir::new().unwrap();

    cmd(&temp)
        .args(["init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote default settings"));
    let written = read_file(&temp, ".snip_notes.json");
    assert!(written.contains("\"subdir\": \"extracts\""));

    cmd(&temp)
        .args(["init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn path_command_shows_vault_and_settings_locations() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(".snip_notes.json"));
}

#[test]
fn custom_stopwords_replace_the_builtin_set() {
    let temp = TempDir::new().unwrap();
    write_settings(
        &temp,
        r#"{"format": "{nWords}", "nWords": 3, "useSubdir": false, "customStopwords": "quick brown fox"}"#,
    );
    write_file(&temp, "inbox.md", INBOX);

    cmd(&temp)
        .args(["name", "inbox.md", "--lines", "3"])
        .assert()
        .success()
        .stdout("the-jumps-over\n");
}

#[test]
fn config_flag_points_at_an_alternate_settings_file() {
    let temp = TempDir::new().unwrap();
    write_file(&temp, "alt.json", r#"{"format": "{nWords}", "nWords": 1, "useSubdir": false}"#);
    write_file(&temp, "inbox.md", INBOX);

    let alt = temp.path().join("alt.json");
    cmd(&temp)
        .args(["name", "inbox.md", "--lines", "3"])
        .args(["--config", alt.to_str().unwrap()])
        .assert()
        .success()
        .stdout("quick\n");
}

#[test]
fn malformed_settings_file_is_reported() {
    let temp = TempDir::new().unwrap();
    write_settings(&temp, "{not json");
    write_file(&temp, "inbox.md", INBOX);

    cmd(&temp)
        .args(["extract", "inbox.md", "--lines", "3"])
        .assert()
        .failure();
}

#[test]
fn help_and_unknown_commands() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Snip Notes CLI"))
        .stdout(predicate::str::contains("extract <file>"));

    cmd(&temp)
        .args(["frobnicate"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Unknown command: frobnicate"));
}
