use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

struct CliTestEnv {
    _temp_dir: TempDir,
    home: PathBuf,
    xdg_data: PathBuf,
    xdg_config: PathBuf,
    xdg_state: PathBuf,
}

impl CliTestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let base = temp_dir.path().to_path_buf();
        let home = base.join("home");
        let xdg_data = base.join("xdg-data");
        let xdg_config = base.join("xdg-config");
        let xdg_state = base.join("xdg-state");

        fs::create_dir_all(&home).expect("failed to create HOME");
        fs::create_dir_all(&xdg_data).expect("failed to create XDG_DATA_HOME");
        fs::create_dir_all(&xdg_config).expect("failed to create XDG_CONFIG_HOME");
        fs::create_dir_all(&xdg_state).expect("failed to create XDG_STATE_HOME");

        Self {
            _temp_dir: temp_dir,
            home,
            xdg_data,
            xdg_config,
            xdg_state,
        }
    }

    fn log_path(&self) -> PathBuf {
        self.xdg_data.join("smslog/messages.txt")
    }

    fn index_path(&self) -> PathBuf {
        self.xdg_data.join("smslog/message_hashes.txt")
    }

    fn seed_log(&self, fixture: &str) {
        let source = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../smslog-core/tests/fixtures")
            .join(fixture);
        let target = self.log_path();
        fs::create_dir_all(target.parent().expect("missing log parent"))
            .expect("failed to create data dir");
        fs::copy(source, target).expect("failed to copy fixture");
    }

    fn write_config(&self, content: &str) {
        let path = self.xdg_config.join("smslog/config.toml");
        fs::create_dir_all(path.parent().expect("missing config parent"))
            .expect("failed to create config dir");
        fs::write(path, content).expect("failed to write config");
    }
}

fn run(env: &CliTestEnv, args: &[&str]) -> Output {
    let bin_path = PathBuf::from(assert_cmd::cargo::cargo_bin!("smslog"));

    Command::new(bin_path)
        .args(args)
        .env("HOME", &env.home)
        .env("XDG_DATA_HOME", &env.xdg_data)
        .env("XDG_CONFIG_HOME", &env.xdg_config)
        .env("XDG_STATE_HOME", &env.xdg_state)
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("failed to execute smslog: {e}"))
}

fn assert_success(args: &[&str], output: &Output) {
    if output.status.success() {
        return;
    }

    let rendered_args = args
        .iter()
        .map(|arg| OsString::from(arg).to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    panic!(
        "smslog {rendered_args} failed\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
        output.status, stdout, stderr
    );
}

fn run_ok(env: &CliTestEnv, args: &[&str]) -> String {
    let output = run(env, args);
    assert_success(args, &output);
    String::from_utf8_lossy(&output.stdout).into_owned()
}

const HELLO: &[&str] = &[
    "ingest",
    "--address",
    "+255700000000",
    "--body",
    "Hello",
    "--timestamp",
    "1700000000000",
    "--type",
    "received",
];

#[test]
fn ingest_twice_stores_once() {
    let env = CliTestEnv::new();

    let first = run_ok(&env, HELLO);
    assert!(first.contains("Stored:"), "got:\n{first}");

    let second = run_ok(&env, HELLO);
    assert!(second.contains("Duplicate"), "got:\n{second}");

    let log = fs::read_to_string(env.log_path()).expect("log should exist");
    assert_eq!(log.lines().count(), 1);
    assert!(log.starts_with("[2023-11-14 22:13:20] RECEIVED | +255700000000 | Hello | HASH:"));

    let index = fs::read_to_string(env.index_path()).expect("index should exist");
    assert_eq!(index.lines().count(), 1);
}

#[test]
fn ingest_without_type_is_rejected() {
    let env = CliTestEnv::new();
    let args = [
        "ingest",
        "--address",
        "+255700000000",
        "--body",
        "Hello",
        "--timestamp",
        "1700000000000",
    ];

    let output = run(&env, &args);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("type"), "got:\n{stderr}");
    assert!(!env.log_path().exists());
}

#[test]
fn legacy_sender_defaults_to_received() {
    let env = CliTestEnv::new();
    let args = [
        "ingest",
        "--sender",
        "M-PESA",
        "--body",
        "Confirmed",
        "--timestamp",
        "1700000000000",
    ];

    run_ok(&env, &args);
    let log = fs::read_to_string(env.log_path()).expect("log should exist");
    assert!(log.contains("] RECEIVED | M-PESA | Confirmed | HASH:"));
}

#[test]
fn list_json_reads_mixed_history() {
    let env = CliTestEnv::new();
    env.seed_log("mixed-log.txt");

    let stdout = run_ok(&env, &["list", "--json"]);
    let views: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    let views = views.as_array().expect("array");

    assert_eq!(views.len(), 5);
    assert_eq!(views[0]["sender"], "M-PESA");
    assert!(views.iter().all(|v| v.get("message").is_some()));
}

#[test]
fn conversations_are_most_recent_first() {
    let env = CliTestEnv::new();
    env.seed_log("mixed-log.txt");

    let stdout = run_ok(&env, &["conversations"]);
    let addresses: Vec<&str> = stdout
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .collect();
    assert_eq!(addresses, vec!["+255711111111", "+255700000000", "M-PESA"]);
}

#[test]
fn stats_counts_mixed_history() {
    let env = CliTestEnv::new();
    env.seed_log("mixed-log.txt");

    let stdout = run_ok(&env, &["stats", "--json"]);
    let stats: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    assert_eq!(stats["total"], 5);
    assert_eq!(stats["unparsed"], 1);
}

#[test]
fn data_dir_flag_overrides_storage() {
    let env = CliTestEnv::new();
    let custom = env.home.join("archive");
    let custom_arg = custom.to_string_lossy().into_owned();

    let mut args = vec!["--data-dir", custom_arg.as_str()];
    args.extend_from_slice(HELLO);
    run_ok(&env, &args);

    assert!(custom.join("messages.txt").exists());
    assert!(!env.log_path().exists());
}

#[test]
fn utc_offset_from_config_shifts_display_time() {
    let env = CliTestEnv::new();
    env.write_config("[storage]\nutc_offset_minutes = 180\n");

    run_ok(&env, HELLO);
    let log = fs::read_to_string(env.log_path()).expect("log should exist");
    assert!(log.starts_with("[2023-11-15 01:13:20] RECEIVED"), "got:\n{log}");
}

#[test]
fn push_without_server_fails() {
    let env = CliTestEnv::new();
    let args = [
        "push",
        "--address",
        "+255700000000",
        "--body",
        "Hello",
        "--type",
        "sent",
    ];

    let output = run(&env, &args);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no server configured"), "got:\n{stderr}");
}

#[test]
fn paths_follow_xdg_env() {
    let env = CliTestEnv::new();

    let stdout = run_ok(&env, &["paths"]);
    assert!(stdout.contains(&env.log_path().display().to_string()));
    assert!(stdout.contains(&env.xdg_config.join("smslog/config.toml").display().to_string()));
}
