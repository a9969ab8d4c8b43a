//! Command-line entry point.

mod script;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use framemark_core::{Annotator, AnnotatorConfig, FrameArchive, FrameClock, FrameStore, Scene};
use script::Script;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "framemark", about = "Frame-synchronized video annotation tools")]
struct Cli {
    /// Session config (JSON). Defaults apply to anything it leaves out.
    #[arg(long, global = true, env = "FRAMEMARK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a scripted session and report the stored drawings.
    Replay {
        script: PathBuf,
        /// Archive to start from.
        #[arg(long)]
        input: Option<PathBuf>,
        /// Where to write the resulting archive.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Summarize an archive frame by frame.
    Inspect { archive: PathBuf },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AnnotatorConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AnnotatorConfig::default(),
    };

    match cli.command {
        Command::Replay { script, input, out } => replay(config, &script, input, out),
        Command::Inspect { archive } => inspect(&archive),
    }
}

fn replay(
    config: AnnotatorConfig,
    script: &Path,
    input: Option<PathBuf>,
    out: Option<PathBuf>,
) -> Result<()> {
    let script = Script::load(script)?;
    let store = match input {
        Some(path) => FrameArchive::read_from(&path)?.into_store(),
        None => FrameStore::new(),
    };
    let frame_rate = config.frame_rate;

    log::info!("Replaying {} step(s)", script.steps.len());
    let mut annotator = Annotator::new(store, config);
    script.replay(&mut annotator)?;
    annotator.force_save();
    let store = annotator.dispose();

    let archive = FrameArchive::from_store(&store, frame_rate);
    print_summary(&archive);
    if let Some(path) = out {
        archive.write_to(&path)?;
        log::info!("Wrote {} drawing(s) to {}", archive.len(), path.display());
    }
    Ok(())
}

fn inspect(path: &Path) -> Result<()> {
    let archive = FrameArchive::read_from(path)?;
    print_summary(&archive);
    Ok(())
}

fn print_summary(archive: &FrameArchive) {
    for line in summary_lines(archive) {
        println!("{line}");
    }
}

/// Header line plus one line per annotated frame.
fn summary_lines(archive: &FrameArchive) -> Vec<String> {
    let clock = FrameClock::new(archive.frame_rate);
    let mut lines = vec![format!(
        "{} annotated frame(s) at {} fps",
        archive.len(),
        archive.frame_rate
    )];
    for drawing in &archive.drawings {
        let seconds = clock.frame_start(drawing.frame);
        lines.push(match Scene::deserialize(&drawing.scene) {
            Ok(scene) => {
                let kinds: Vec<_> = scene.objects().iter().map(|s| s.kind()).collect();
                format!(
                    "frame {:>6} ({:>8.3}s): {} object(s) [{}] saved {}",
                    drawing.frame,
                    seconds,
                    scene.len(),
                    kinds.join(", "),
                    drawing.saved_at.to_rfc3339()
                )
            }
            Err(e) => format!(
                "frame {:>6} ({:>8.3}s): unreadable ({e})",
                drawing.frame, seconds
            ),
        });
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const SCRIPT: &str = r#"{
        "steps": [
            {"op": "tool", "tool": "line"},
            {"op": "drag", "from": [10, 10], "to": [100, 100]},
            {"op": "time", "seconds": 1.0},
            {"op": "tool", "tool": "arrow"},
            {"op": "drag", "from": [0, 0], "to": [80, 0]}
        ]
    }"#;

    #[test]
    fn test_replay_writes_archive() {
        let dir = tempdir().unwrap();
        let script = dir.path().join("script.json");
        let out = dir.path().join("out.json");
        fs::write(&script, SCRIPT).unwrap();

        replay(AnnotatorConfig::default(), &script, None, Some(out.clone())).unwrap();
        inspect(&out).unwrap();

        let archive = FrameArchive::read_from(&out).unwrap();
        let frames: Vec<_> = archive.drawings.iter().map(|d| d.frame).collect();
        assert_eq!(frames, vec![0, 30]);

        let lines = summary_lines(&archive);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("2 annotated frame(s) at 30 fps"));
        assert!(lines[1].contains("(   0.000s): 1 object(s) [line]"));
        assert!(lines[2].contains("(   1.000s): 3 object(s) [line, line, line]"));
    }

    #[test]
    fn test_replay_continues_from_input_archive() {
        let dir = tempdir().unwrap();
        let script = dir.path().join("script.json");
        let first = dir.path().join("first.json");
        let second = dir.path().join("second.json");
        fs::write(&script, SCRIPT).unwrap();
        replay(AnnotatorConfig::default(), &script, None, Some(first.clone())).unwrap();

        let empty = dir.path().join("empty.json");
        fs::write(&empty, r#"{"steps": []}"#).unwrap();
        replay(AnnotatorConfig::default(), &empty, Some(first.clone()), Some(second.clone()))
            .unwrap();

        // Saving again refreshes savedAt, so compare frames and scenes
        let contents = |path: &Path| -> Vec<_> {
            FrameArchive::read_from(path)
                .unwrap()
                .drawings
                .into_iter()
                .map(|d| (d.frame, d.scene))
                .collect()
        };
        assert_eq!(contents(&second), contents(&first));
    }

    #[test]
    fn test_summary_marks_unreadable_frames() {
        let json = r#"{
            "version": 1,
            "frameRate": 25.0,
            "exportedAt": "2024-01-01T00:00:00Z",
            "drawings": [
                {"frame": 50, "scene": "garbage", "savedAt": "2024-01-01T00:00:00Z"}
            ]
        }"#;
        let archive = FrameArchive::from_json(json).unwrap();
        let lines = summary_lines(&archive);
        assert!(lines[1].starts_with("frame     50 (   2.000s): unreadable"));
    }

    #[test]
    fn test_inspect_missing_file_fails() {
        let dir = tempdir().unwrap();
        assert!(inspect(&dir.path().join("missing.json")).is_err());
    }
}
