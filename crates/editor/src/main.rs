use std::io::BufRead;
use std::process::ExitCode;

use scene_editor_lib::command::{execute_json, execute_json_batch, CommandResponse};
use scene_editor_lib::harness::TestHarness;
use scene_editor_lib::state::scene::SceneState;
use scene_editor_lib::state::settings::EditorSettings;

/// Command-line arguments
#[derive(Debug, Default)]
struct Args {
    /// Project file to load before running commands
    scene: Option<String>,
    /// JSON array of commands; stdin (one command per line) when absent
    commands: Option<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scene_editor=info,scene_editor_lib=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args();
    let settings = EditorSettings::load();
    if !EditorSettings::exists() {
        if let Err(e) = settings.save() {
            tracing::warn!("Could not write default settings: {e}");
        }
    }
    let autosave = settings.autosave;
    let mut harness = TestHarness::with_settings(settings);

    if let Some(path) = &args.scene {
        let loaded = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|json| harness.load_scene_json(&json).map_err(|e| e.to_string()));
        match loaded {
            Ok(()) => tracing::info!("Loaded scene from {path} ({} elements)", harness.element_count()),
            Err(e) => {
                tracing::error!("Failed to load scene from {path}: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else if autosave {
        if let Some(project) = SceneState::load_autosave() {
            harness.scene.load_scene(project.elements);
        }
    }

    let ok = match &args.commands {
        Some(path) => run_batch(&mut harness, path),
        None => run_stdin(&mut harness),
    };

    if autosave {
        if let Err(e) = harness.scene.autosave() {
            tracing::warn!("Autosave failed: {e}");
        }
    }

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run_batch(harness: &mut TestHarness, path: &str) -> bool {
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to read commands file {path}: {e}");
            return false;
        }
    };
    match execute_json_batch(harness, &json) {
        Ok(responses) => {
            print_json(&responses);
            responses.iter().all(|r| r.success)
        }
        Err(e) => {
            tracing::error!("{e}");
            false
        }
    }
}

fn run_stdin(harness: &mut TestHarness) -> bool {
    let mut ok = true;
    for line in std::io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::error!("Failed to read stdin: {e}");
                return false;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        let response = execute_json(harness, &line).unwrap_or_else(|e| CommandResponse {
            success: false,
            error: Some(e),
            data: None,
        });
        ok &= response.success;
        print_json(&response);
    }
    ok
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!("Failed to serialize response: {e}"),
    }
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--scene" => args.scene = iter.next(),
            "--commands" => args.commands = iter.next(),
            other => tracing::warn!("Ignoring unknown argument {other}"),
        }
    }
    args
}
