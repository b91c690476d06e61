pub mod config;
pub mod error;
pub mod host;
pub mod naming;
pub mod selection;
pub mod stopwords;
pub mod term;
pub mod vault;
pub mod workflow;

use std::env;
use std::error::Error;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::config::ExtractConfig;
use crate::host::{Editor, NamePrompt, PromptOutcome};
use crate::selection::FileSelection;
use crate::term::{ClockSuffix, TermNotifier, TermPrompt};
use crate::vault::FsVault;
use crate::workflow::{ExtractOutcome, Extractor};

pub fn entry() -> Result<(), Box<dyn Error>> {
    let mut args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        print_help();
        return Ok(());
    }

    let cmd = args.remove(0);
    match cmd.as_str() {
        "extract" => extract_cmd(args)?,
        "name" => name_cmd(args)?,
        "config" => config_cmd(args)?,
        "init" => init_cmd(args)?,
        "path" => path_cmd(args)?,
        "help" => print_help(),
        other => {
            eprintln!("Unknown command: {other}");
            print_help();
        }
    }

    Ok(())
}

fn print_help() {
    println!(
        "\
Snip Notes CLI
Usage:
  snip_notes extract <file> --lines <A[:B]> [--prompt | --name <name>]
                                  Extract the selected lines into a new linked note
  snip_notes name <file> --lines <A[:B]>
                                  Print the default name an extract would use
  snip_notes config               Print the effective settings as JSON
  snip_notes init                 Write a default settings file to the vault
  snip_notes path                 Show the vault root and settings file path
  snip_notes help                 Show this message

Options:
  --lines <A[:B]>                 1-based inclusive line range of the selection
  --prompt | -p                   Confirm or edit the name interactively (an empty
                                  line accepts the default; end of input cancels)
  --name <name> | -n <name>       Use <name> instead of the derived default
  --vault <dir>                   Vault root (default: SNIP_NOTES_VAULT or the
                                  current directory)
  --config <path>                 Settings file (default: SNIP_NOTES_CONFIG or
                                  <vault>/.snip_notes.json)

File arguments are vault-relative.

Environment:
  SNIP_NOTES_VAULT                Vault root directory
  SNIP_NOTES_CONFIG               Settings file path
  NO_COLOR                        Disable colored notices
"
    );
}

/// A `--name <value>` override, fed through the prompt seam so the same
/// validation applies.
struct PresetPrompt {
    name: String,
}

impl NamePrompt for PresetPrompt {
    fn ask(&mut self, _default_name: &str) -> PromptOutcome {
        PromptOutcome::Submitted(self.name.clone())
    }
}

fn extract_cmd(args: Vec<String>) -> Result<(), Box<dyn Error>> {
    let mut file: Option<String> = None;
    let mut lines: Option<(usize, usize)> = None;
    let mut use_prompt = false;
    let mut preset_name: Option<String> = None;
    let mut vault_flag: Option<String> = None;
    let mut config_flag: Option<String> = None;
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--lines" | "-l" => {
                if let Some(v) = iter.next() {
                    lines = Some(parse_line_range(&v)?);
                } else {
                    return Err(
                        "Provide a line range after --lines, e.g. 3 or 3:7"
                            .into(),
                    );
                }
            }
            "--prompt" | "-p" => use_prompt = true,
            "--name" | "-n" => {
                if let Some(v) = iter.next() {
                    if v.trim().is_empty() {
                        return Err(
                            "Provide a non-empty name after --name".into()
                        );
                    }
                    preset_name = Some(v);
                } else {
                    return Err("Provide a name after --name".into());
                }
            }
            "--vault" => {
                if let Some(v) = iter.next() {
                    vault_flag = Some(v);
                } else {
                    return Err("Provide a directory after --vault".into());
                }
            }
            "--config" => {
                if let Some(v) = iter.next() {
                    config_flag = Some(v);
                } else {
                    return Err("Provide a file path after --config".into());
                }
            }
            other if file.is_none() && !other.starts_with('-') => {
                file = Some(other.to_string());
            }
            other => {
                return Err(format!("Unknown flag for extract: {other}").into());
            }
        }
    }
    let file = file.ok_or(
        "Provide the note to extract from, e.g. `snip_notes extract note.md --lines 3:7`",
    )?;
    let (start, end) =
        lines.ok_or("Provide the selection with --lines, e.g. --lines 3:7")?;
    if use_prompt && preset_name.is_some() {
        return Err("--prompt and --name are mutually exclusive".into());
    }

    let vault_root = resolve_vault(vault_flag)?;
    let config_path = resolve_config_path(config_flag, &vault_root);
    let settings = ExtractConfig::load(&config_path)?;
    let source = vault_relative(&file, &vault_root)?;

    let mut store = FsVault::open(&vault_root)?;
    let mut editor = FileSelection::capture(&vault_root, &source, start, end)?;
    let notifier = TermNotifier::from_env();
    let mut suffixes = ClockSuffix;

    let outcome = {
        let mut extractor =
            Extractor::new(&mut store, &mut editor, &notifier, &mut suffixes);
        match preset_name {
            Some(name) => {
                let mut preset = PresetPrompt { name };
                extractor.extract(&settings, Some(&mut preset))?
            }
            None if use_prompt => {
                let mut prompt = TermPrompt;
                extractor.extract(&settings, Some(&mut prompt))?
            }
            None => extractor.extract(&settings, None)?,
        }
    };

    if outcome == ExtractOutcome::Cancelled {
        eprintln!("Extraction cancelled.");
    }
    Ok(())
}

fn name_cmd(args: Vec<String>) -> Result<(), Box<dyn Error>> {
    let mut file: Option<String> = None;
    let mut lines: Option<(usize, usize)> = None;
    let mut vault_flag: Option<String> = None;
    let mut config_flag: Option<String> = None;
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--lines" | "-l" => {
                if let Some(v) = iter.next() {
                    lines = Some(parse_line_range(&v)?);
                } else {
                    return Err(
                        "Provide a line range after --lines, e.g. 3 or 3:7"
                            .into(),
                    );
                }
            }
            "--vault" => {
                if let Some(v) = iter.next() {
                    vault_flag = Some(v);
                } else {
                    return Err("Provide a directory after --vault".into());
                }
            }
            "--config" => {
                if let Some(v) = iter.next() {
                    config_flag = Some(v);
                } else {
                    return Err("Provide a file path after --config".into());
                }
            }
            other if file.is_none() && !other.starts_with('-') => {
                file = Some(other.to_string());
            }
            other => {
                return Err(format!("Unknown flag for name: {other}").into());
            }
        }
    }
    let file = file.ok_or(
        "Provide the note to name from, e.g. `snip_notes name note.md --lines 3:7`",
    )?;
    let (start, end) =
        lines.ok_or("Provide the selection with --lines, e.g. --lines 3:7")?;

    let vault_root = resolve_vault(vault_flag)?;
    let config_path = resolve_config_path(config_flag, &vault_root);
    let settings = ExtractConfig::load(&config_path)?;
    let source = vault_relative(&file, &vault_root)?;

    let selection = FileSelection::capture(&vault_root, &source, start, end)?;
    let name = naming::derive_name(
        selection.selected_text().trim(),
        &settings,
        Local::now(),
    );
    println!("{name}");
    Ok(())
}

fn config_cmd(args: Vec<String>) -> Result<(), Box<dyn Error>> {
    let (vault_flag, config_flag) = parse_common_flags(args, "config")?;
    let vault_root = resolve_vault(vault_flag)?;
    let config_path = resolve_config_path(config_flag, &vault_root);
    let settings = ExtractConfig::load(&config_path)?;
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

fn init_cmd(args: Vec<String>) -> Result<(), Box<dyn Error>> {
    let (vault_flag, config_flag) = parse_common_flags(args, "init")?;
    let vault_root = resolve_vault(vault_flag)?;
    let config_path = resolve_config_path(config_flag, &vault_root);
    if config_path.exists() {
        return Err(format!(
            "Settings file already exists: {}",
            config_path.display()
        )
        .into());
    }
    ExtractConfig::default().save(&config_path)?;
    println!("Wrote default settings to {}", config_path.display());
    Ok(())
}

fn path_cmd(args: Vec<String>) -> Result<(), Box<dyn Error>> {
    let (vault_flag, config_flag) = parse_common_flags(args, "path")?;
    let vault_root = resolve_vault(vault_flag)?;
    let config_path = resolve_config_path(config_flag, &vault_root);
    println!("{}", vault_root.display());
    println!("{}", config_path.display());
    Ok(())
}

fn parse_common_flags(
    args: Vec<String>,
    cmd: &str,
) -> Result<(Option<String>, Option<String>), Box<dyn Error>> {
    let mut vault_flag: Option<String> = None;
    let mut config_flag: Option<String> = None;
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--vault" => {
                if let Some(v) = iter.next() {
                    vault_flag = Some(v);
                } else {
                    return Err("Provide a directory after --vault".into());
                }
            }
            "--config" => {
                if let Some(v) = iter.next() {
                    config_flag = Some(v);
                } else {
                    return Err("Provide a file path after --config".into());
                }
            }
            other => {
                return Err(format!("Unknown flag for {cmd}: {other}").into());
            }
        }
    }
    Ok((vault_flag, config_flag))
}

/// Parse `A` or `A:B` into a 1-based inclusive line range.
fn parse_line_range(value: &str) -> Result<(usize, usize), Box<dyn Error>> {
    let (start, end) = match value.split_once(':') {
        Some((a, b)) => (a, b),
        None => (value, value),
    };
    let start: usize = start
        .trim()
        .parse()
        .map_err(|_| format!("Invalid line range: {value}"))?;
    let end: usize = end
        .trim()
        .parse()
        .map_err(|_| format!("Invalid line range: {value}"))?;
    Ok((start, end))
}

fn resolve_vault(flag: Option<String>) -> Result<PathBuf, Box<dyn Error>> {
    let root = match flag {
        Some(dir) => PathBuf::from(dir),
        None => match env::var("SNIP_NOTES_VAULT") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => env::current_dir()?,
        },
    };
    let canon = root.canonicalize().map_err(|err| {
        format!("Vault root {} is not usable: {err}", root.display())
    })?;
    Ok(canon)
}

fn resolve_config_path(flag: Option<String>, vault_root: &Path) -> PathBuf {
    match flag {
        Some(path) => PathBuf::from(path),
        None => ExtractConfig::default_path(vault_root),
    }
}

/// Interpret a file argument as a vault-relative path. Absolute paths are
/// accepted when they point inside the vault.
fn vault_relative(
    file: &str,
    vault_root: &Path,
) -> Result<PathBuf, Box<dyn Error>> {
    let path = Path::new(file);
    if !path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let canon = path
        .canonicalize()
        .map_err(|err| format!("Cannot read {file}: {err}"))?;
    match canon.strip_prefix(vault_root) {
        Ok(rel) => Ok(rel.to_path_buf()),
        Err(_) => Err(format!(
            "{file} is outside the vault {}",
            vault_root.display()
        )
        .into()),
    }
}
