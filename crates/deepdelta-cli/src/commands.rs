use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use deepdelta_diff::{observable_diff, DiffConfig};
use deepdelta_patch::{apply_all, revert_all};
use deepdelta_types::{Diff, DiffKind, Value};
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => DiffConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DiffConfig::default(),
    };

    match cli.command {
        Command::Diff(args) => cmd_diff(args, config, &cli.format),
        Command::Apply(args) => cmd_patch(args, Direction::Apply, &cli.format),
        Command::Revert(args) => cmd_patch(args, Direction::Revert, &cli.format),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Apply,
    Revert,
}

fn cmd_diff(args: DiffArgs, config: DiffConfig, format: &OutputFormat) -> anyhow::Result<()> {
    let changes = diff_files(&args, config)?;
    println!("{}", render_changes(&changes, format)?);
    Ok(())
}

fn cmd_patch(args: PatchArgs, direction: Direction, format: &OutputFormat) -> anyhow::Result<()> {
    let (result, count) = patch_files(&args.target, &args.changes, direction)?;
    let text = serde_json::to_string_pretty(&result)?;

    match &args.output {
        Some(path) => std::fs::write(path, text + "\n")
            .with_context(|| format!("writing {}", path.display()))?,
        None => println!("{text}"),
    }

    if matches!(format, OutputFormat::Text) {
        let verb = match direction {
            Direction::Apply => "Applied",
            Direction::Revert => "Reverted",
        };
        eprintln!("{} {} {} change(s)", "✓".green().bold(), verb, count.to_string().bold());
    }
    Ok(())
}

pub fn read_value(path: &Path) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

pub fn read_changes(path: &Path) -> anyhow::Result<Vec<Diff>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("parsing change records in {}", path.display()))
}

/// Diff two JSON files. Command-line flags extend the loaded configuration.
pub fn diff_files(args: &DiffArgs, mut config: DiffConfig) -> anyhow::Result<Vec<Diff>> {
    config.order_independent |= args.order_independent;
    config.ignore.extend(args.ignore.iter().cloned());

    let left = read_value(&args.left)?;
    let right = read_value(&args.right)?;
    let rules = config.ignore_rules().context("compiling ignore patterns")?;
    let changes = observable_diff(&left, &right, None, &config.options(&rules));
    debug!(changes = changes.len(), left = %args.left.display(), right = %args.right.display(), "diffed files");
    Ok(changes)
}

/// Apply or revert the records in `changes` against the document in `target`.
pub fn patch_files(target: &Path, changes: &Path, direction: Direction) -> anyhow::Result<(Value, usize)> {
    let mut value = read_value(target)?;
    let changes = read_changes(changes)?;
    match direction {
        Direction::Apply => apply_all(&mut value, &changes),
        Direction::Revert => revert_all(&mut value, &changes),
    }
    .map_err(|e| anyhow::Error::msg(e.to_string()))
    .with_context(|| format!("{direction:?} failed on {}", target.display()))?;
    Ok((value, changes.len()))
}

pub fn render_changes(changes: &[Diff], format: &OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(changes)?),
        OutputFormat::Text if changes.is_empty() => Ok("No differences.".into()),
        OutputFormat::Text => Ok(changes
            .iter()
            .map(|change| {
                let line = change.to_string();
                match leaf_kind(change) {
                    DiffKind::New => line.green().to_string(),
                    DiffKind::Deleted => line.red().to_string(),
                    DiffKind::Edited => line.yellow().to_string(),
                    DiffKind::Array => line.cyan().to_string(),
                }
            })
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

fn leaf_kind(change: &Diff) -> DiffKind {
    match change.item() {
        Some(item) => leaf_kind(item),
        None => change.kind(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, text: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    fn diff_args(left: PathBuf, right: PathBuf) -> DiffArgs {
        DiffArgs { left, right, order_independent: false, ignore: Vec::new() }
    }

    #[test]
    fn diff_files_reports_changes() {
        let dir = TempDir::new().unwrap();
        let left = write(&dir, "l.json", r#"{"a": 1, "xs": [1, 2]}"#);
        let right = write(&dir, "r.json", r#"{"a": 2, "xs": [1]}"#);
        let changes = diff_files(&diff_args(left, right), DiffConfig::default()).unwrap();
        assert_eq!(changes.len(), 2);
    }

    #[test]
    fn ignore_flag_and_config_combine() {
        let dir = TempDir::new().unwrap();
        let left = write(&dir, "l.json", r#"{"a": 1, "b": 1, "c": 1}"#);
        let right = write(&dir, "r.json", r#"{"a": 2, "b": 2, "c": 2}"#);
        let mut args = diff_args(left, right);
        args.ignore.push("b".into());
        let config = DiffConfig { ignore: vec!["c".into()], ..Default::default() };
        let changes = diff_files(&args, config).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path().to_string(), "a");
    }

    #[test]
    fn order_independent_flag() {
        let dir = TempDir::new().unwrap();
        let left = write(&dir, "l.json", "[1, 2, 3]");
        let right = write(&dir, "r.json", "[3, 1, 2]");
        let mut args = diff_args(left, right);
        assert!(!diff_files(&args, DiffConfig::default()).unwrap().is_empty());
        args.order_independent = true;
        assert!(diff_files(&args, DiffConfig::default()).unwrap().is_empty());
    }

    #[test]
    fn apply_then_revert_through_files() {
        let dir = TempDir::new().unwrap();
        let left = write(&dir, "l.json", r#"{"name": "x", "tags": ["a", "b", "c"]}"#);
        let right = write(&dir, "r.json", r#"{"name": "y", "tags": ["a"], "extra": true}"#);
        let changes = diff_files(&diff_args(left.clone(), right.clone()), DiffConfig::default()).unwrap();
        let records = write(&dir, "c.json", &render_changes(&changes, &OutputFormat::Json).unwrap());

        let (applied, count) = patch_files(&left, &records, Direction::Apply).unwrap();
        assert_eq!(count, changes.len());
        assert_eq!(applied, read_value(&right).unwrap());

        let (reverted, _) = patch_files(&right, &records, Direction::Revert).unwrap();
        assert_eq!(reverted, read_value(&left).unwrap());
    }

    #[test]
    fn unordered_diff_applies_to_the_left_file() {
        let dir = TempDir::new().unwrap();
        let left = write(&dir, "l.json", r#"{"ids": [3, 1], "tags": ["x", "y", "z"]}"#);
        let right = write(&dir, "r.json", r#"{"ids": [1, 2], "tags": ["z", "x"]}"#);
        let mut args = diff_args(left.clone(), right.clone());
        args.order_independent = true;
        let changes = diff_files(&args, DiffConfig::default()).unwrap();
        let records = write(&dir, "c.json", &render_changes(&changes, &OutputFormat::Json).unwrap());

        let (applied, _) = patch_files(&left, &records, Direction::Apply).unwrap();
        let out = write(&dir, "out.json", &serde_json::to_string(&applied).unwrap());
        args.left = out.clone();
        assert!(diff_files(&args, DiffConfig::default()).unwrap().is_empty());

        let (reverted, _) = patch_files(&out, &records, Direction::Revert).unwrap();
        assert_eq!(reverted, read_value(&left).unwrap());
    }

    #[test]
    fn cmd_patch_writes_output_file() {
        let dir = TempDir::new().unwrap();
        let target = write(&dir, "t.json", r#"{"a": 1}"#);
        let records = write(&dir, "c.json", r#"[{"kind": "E", "path": ["a"], "lhs": 1, "rhs": 5}]"#);
        let output = dir.path().join("out.json");
        let args = PatchArgs { target, changes: records, output: Some(output.clone()) };
        cmd_patch(args, Direction::Apply, &OutputFormat::Json).unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(output).unwrap()).unwrap();
        assert_eq!(written, serde_json::json!({"a": 5}));
    }

    #[test]
    fn missing_file_is_reported_with_path() {
        let dir = TempDir::new().unwrap();
        let err = read_value(&dir.path().join("nope.json")).unwrap_err();
        assert!(format!("{err:#}").contains("nope.json"));
    }

    #[test]
    fn render_text_for_no_changes() {
        assert_eq!(render_changes(&[], &OutputFormat::Text).unwrap(), "No differences.");
    }

    #[test]
    fn render_json_is_an_array() {
        let dir = TempDir::new().unwrap();
        let left = write(&dir, "l.json", "[1]");
        let right = write(&dir, "r.json", "[1, 2]");
        let changes = diff_files(&diff_args(left, right), DiffConfig::default()).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&render_changes(&changes, &OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json[0]["kind"], "A");
        assert_eq!(json[0]["index"], 1);
        assert_eq!(json[0]["item"]["kind"], "N");
    }
}
