use std::{fs, path::PathBuf};

use tempfile::tempdir;

use tailrace_cli::{Args, Command, VolumeArg, run};

fn demos_dir() -> PathBuf {
    // Demos are at workspace root, relative to workspace not the crate
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

/// Collects all .json files from a directory
fn collect_json_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json")
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

fn args(command: Command) -> Args {
    Args {
        command,
        config: None,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let valid_demos = collect_json_files(demos_dir());

    assert!(!valid_demos.is_empty(), "No valid demos found in demos/");

    let mut failed_demos = Vec::new();

    for demo_path in &valid_demos {
        let stem = demo_path.file_stem().unwrap().to_string_lossy().to_string();
        let input = demo_path.to_string_lossy().to_string();
        let svg_path = temp_dir.path().join(format!("{stem}.svg"));
        let normalized_path = temp_dir.path().join(format!("{stem}.json"));

        let commands = [
            Command::Check {
                input: input.clone(),
            },
            Command::Render {
                input: input.clone(),
                output: svg_path.to_string_lossy().to_string(),
                zoom: 1.5,
            },
            Command::Normalize {
                input: input.clone(),
                output: Some(normalized_path.to_string_lossy().to_string()),
            },
        ];

        for command in commands {
            if let Err(e) = run(&args(command)) {
                failed_demos.push((demo_path.clone(), e));
            }
        }

        if svg_path.exists() {
            let svg = fs::read_to_string(&svg_path).unwrap();
            assert!(svg.contains("<svg"), "{} rendered no SVG", demo_path.display());
        }
    }

    if !failed_demos.is_empty() {
        eprintln!("\nValid demos that failed:");
        for (path, err) in &failed_demos {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} valid demo run(s) failed unexpectedly", failed_demos.len());
    }

    println!("All {} valid demos passed", valid_demos.len());
}

#[test]
fn e2e_smoke_test_error_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let error_demos = collect_json_files(demos_dir().join("errors"));

    assert!(
        !error_demos.is_empty(),
        "No error demos found in demos/errors/"
    );

    let mut unexpectedly_succeeded = Vec::new();

    for demo_path in &error_demos {
        let output_path = temp_dir.path().join(format!(
            "error_{}.svg",
            demo_path.file_stem().unwrap().to_string_lossy()
        ));

        let command = Command::Render {
            input: demo_path.to_string_lossy().to_string(),
            output: output_path.to_string_lossy().to_string(),
            zoom: 1.0,
        };

        if run(&args(command)).is_ok() {
            unexpectedly_succeeded.push(demo_path.clone());
        }
        assert!(
            !output_path.exists(),
            "{} produced output despite failing",
            demo_path.display()
        );
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError demos that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error demo(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }

    println!("All {} error demos failed as expected", error_demos.len());
}

#[test]
fn e2e_normalize_assigns_edge_ids_and_drops_unresolved_edges() {
    let temp_dir = tempdir().unwrap();
    let output = temp_dir.path().join("normalized.json");
    run(&args(Command::Normalize {
        input: demos_dir()
            .join("legacy_without_ids.json")
            .to_string_lossy()
            .to_string(),
        output: Some(output.to_string_lossy().to_string()),
    }))
    .unwrap();

    let (diagram, diagnostics) = tailrace::persistence::load_file(&output).unwrap();
    assert!(diagnostics.is_empty());
    let ids: Vec<String> = diagram
        .graph()
        .edges()
        .map(|edge| edge.id().to_string())
        .collect();
    assert_eq!(ids, vec!["edge_1", "edge_2"]);
}

#[test]
fn e2e_set_volume_updates_and_clears() {
    let temp_dir = tempdir().unwrap();
    let output = temp_dir.path().join("plant.json");
    let output_str = output.to_string_lossy().to_string();
    let input = demos_dir()
        .join("plant_water_balance.json")
        .to_string_lossy()
        .to_string();

    run(&args(Command::SetVolume {
        input,
        edge: "e_plant_rwd".to_string(),
        volume: VolumeArg(Some(640.0)),
        output: Some(output_str.clone()),
    }))
    .unwrap();
    let (diagram, _) = tailrace::persistence::load_file(&output).unwrap();
    assert_eq!(
        diagram.graph().edge("e_plant_rwd").unwrap().volume(),
        Some(640.0)
    );

    run(&args(Command::SetVolume {
        input: output_str.clone(),
        edge: "e_borehole_tsf".to_string(),
        volume: VolumeArg(None),
        output: None,
    }))
    .unwrap();
    let (diagram, _) = tailrace::persistence::load_file(&output).unwrap();
    assert_eq!(diagram.graph().edge("e_borehole_tsf").unwrap().volume(), None);
    assert_eq!(
        diagram.graph().edge("e_plant_rwd").unwrap().volume(),
        Some(640.0)
    );
}

#[test]
fn e2e_set_volume_rejects_unknown_edge_and_non_finite_volume() {
    let temp_dir = tempdir().unwrap();
    let output = temp_dir.path().join("plant.json");
    let input = demos_dir()
        .join("plant_water_balance.json")
        .to_string_lossy()
        .to_string();

    for (edge, volume) in [("nope", Some(1.0)), ("e_plant_rwd", Some(f64::NAN))] {
        let result = run(&args(Command::SetVolume {
            input: input.clone(),
            edge: edge.to_string(),
            volume: VolumeArg(volume),
            output: Some(output.to_string_lossy().to_string()),
        }));
        assert!(result.is_err(), "{edge} {volume:?} should fail");
    }
    assert!(!output.exists());
}

#[test]
fn e2e_render_with_sample_config() {
    let temp_dir = tempdir().unwrap();
    let output = temp_dir.path().join("plant.svg");
    let result = run(&Args {
        command: Command::Render {
            input: demos_dir()
                .join("plant_water_balance.json")
                .to_string_lossy()
                .to_string(),
            output: output.to_string_lossy().to_string(),
            zoom: 10.0,
        },
        config: Some(demos_dir().join("tailrace.toml").to_string_lossy().to_string()),
        log_level: "off".to_string(),
    });
    assert!(result.is_ok(), "{result:?}");
    let svg = fs::read_to_string(output).unwrap();
    assert!(svg.contains("<rect"));
    assert!(svg.contains("data-layer"));
}
