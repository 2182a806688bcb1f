use std::io::Read;

use partsnap_lib::command::execute_json_batch;
use partsnap_lib::harness::TestHarness;
use partsnap_lib::state::EngineSettings;

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "partsnap=info".into()),
        )
        .init();

    let mut harness = TestHarness::with_settings(EngineSettings::load());

    // Parse --scene <path> argument
    if let Some(scene) = parse_scene_arg() {
        harness.load_scene(scene);
    }

    let Some(commands) = read_commands() else {
        std::process::exit(1);
    };

    match execute_json_batch(&mut harness, &commands) {
        Ok(responses) => match serde_json::to_string_pretty(&responses) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                tracing::error!("Failed to serialize responses: {e}");
                std::process::exit(1);
            }
        },
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    }
}

fn arg_value(flag: &str) -> Option<String> {
    let args: Vec<String> = std::env::args().collect();
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1).cloned())
}

fn parse_scene_arg() -> Option<shared::Scene> {
    let path = arg_value("--scene")?;
    match std::fs::read_to_string(&path) {
        Ok(json) => match serde_json::from_str::<shared::Scene>(&json) {
            Ok(scene) => {
                tracing::info!("Loaded scene from {path} ({} bodies)", scene.bodies.len());
                Some(scene)
            }
            Err(e) => {
                tracing::error!("Failed to parse scene JSON from {path}: {e}");
                None
            }
        },
        Err(e) => {
            tracing::error!("Failed to read scene file {path}: {e}");
            None
        }
    }
}

/// Command batch from `--commands <path>`, or stdin when the flag is absent
fn read_commands() -> Option<String> {
    match arg_value("--commands") {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(json) => Some(json),
            Err(e) => {
                tracing::error!("Failed to read commands file {path}: {e}");
                None
            }
        },
        None => {
            let mut json = String::new();
            match std::io::stdin().read_to_string(&mut json) {
                Ok(_) => Some(json),
                Err(e) => {
                    tracing::error!("Failed to read commands from stdin: {e}");
                    None
                }
            }
        }
    }
}
