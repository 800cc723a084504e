use std::{env, fs, path::PathBuf, process::Command};
use virion::analysis::{Report, load_results};

#[test]
fn basic_workflow() {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("basic_workflow");

    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir_all(&test_dir).expect("failed to create test directory");

    let config_path = test_dir.join("config.toml");
    let config_contents = String::new()
        + "[model]\n"
        + "max_birth_prob = 0.1\n"
        + "clear_prob = 0.05\n"
        + "mut_prob = 0.005\n"
        + "max_population = 1000\n"
        + "\n"
        + "[init]\n"
        + "n_agents = 100\n"
        + "resistances = { guttagonol = false }\n"
        + "\n"
        + "[treatment]\n"
        + "doses = [ { drug = \"guttagonol\", step = 50 } ]\n"
        + "\n"
        + "[run]\n"
        + "n_trials = 8\n"
        + "n_steps = 100\n"
        + "seed = 1234\n"
        + "\n"
        + "[output]\n"
        + "hist_bins = 4\n";

    fs::write(&config_path, config_contents).expect("failed to write config file");

    fn run_bin(args: &[&str]) {
        let bin = PathBuf::from(env!("CARGO_BIN_EXE_virion"));

        let output = Command::new(bin)
            .args(args)
            .output()
            .expect("failed to execute command");

        let stdout_str =
            std::str::from_utf8(&output.stdout).expect("failed to convert stdout to string");
        let stderr_str =
            std::str::from_utf8(&output.stderr).expect("failed to convert stderr to string");

        assert!(
            output.status.success(),
            "failed to run binary with {args:?}\nstdout:\n{stdout_str}\nstderr:\n{stderr_str}\n"
        );
    }

    let test_dir_str = test_dir
        .to_str()
        .expect("failed to convert test directory to string");

    run_bin(&["--sim-dir", test_dir_str, "create"]);
    run_bin(&["--sim-dir", test_dir_str, "create"]);

    assert!(test_dir.join("run-0000/trials.msgpack").is_file());
    assert!(test_dir.join("run-0001/trials.msgpack").is_file());

    run_bin(&["--sim-dir", test_dir_str, "analyze"]);

    let reports =
        load_results(test_dir.join("run-0000/results.msgpack")).expect("failed to load results");
    assert_eq!(reports.len(), 3);
    match &reports[0] {
        Report::Trajectory { steps, .. } => assert_eq!(steps.len(), 100),
        report => panic!("unexpected report {report:?}"),
    }
    match &reports[2] {
        Report::Distribution { hist, .. } => assert_eq!(hist.n_vals(), 8),
        report => panic!("unexpected report {report:?}"),
    }

    // Both runs share the configured seed.
    let reports_1 =
        load_results(test_dir.join("run-0001/results.msgpack")).expect("failed to load results");
    assert_eq!(reports, reports_1);

    run_bin(&["--sim-dir", test_dir_str, "clean"]);
    assert!(!test_dir.join("run-0000").exists());

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn invalid_config_fails() {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("invalid_config");

    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir_all(&test_dir).expect("failed to create test directory");

    let config_contents = r#"
[model]
max_birth_prob = 1.5
clear_prob = 0.05
max_population = 1000

[init]
n_agents = 100

[run]
n_trials = 2
n_steps = 10

[output]
hist_bins = 4
"#;
    fs::write(test_dir.join("config.toml"), config_contents).expect("failed to write config file");

    let output = Command::new(env!("CARGO_BIN_EXE_virion"))
        .args(["--sim-dir", test_dir.to_str().unwrap(), "create"])
        .output()
        .expect("failed to execute command");
    assert!(!output.status.success());
    assert!(!test_dir.join("run-0000").exists());

    fs::remove_dir_all(&test_dir).ok();
}
