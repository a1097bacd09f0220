//! Config file discovery and env overrides as seen from the binary.

mod common;

use common::TestEnv;

const IMPORT_IO: &str = "import IO [print] print['io'];";

#[test]
fn test_project_config_disables_module() {
    let env = TestEnv::new();
    env.write("canterbury.toml", "[stdlib]\nmodules = [\"Math\"]\n");
    env.write("main.cb", IMPORT_IO);

    let result = env.run(&["main.cb"]);

    assert_eq!(result.exit_code, 70);
    assert!(result.stderr.contains("Undefined module 'IO'."));
}

#[test]
fn test_user_config_is_used_without_project_config() {
    let env = TestEnv::new();
    env.write_user_config("[stdlib]\nmodules = []\n");
    env.write("main.cb", IMPORT_IO);

    let result = env.run(&["main.cb"]);

    assert_eq!(result.exit_code, 70);
}

#[test]
fn test_project_config_wins_over_user_config() {
    let env = TestEnv::new();
    env.write_user_config("[stdlib]\nmodules = []\n");
    env.write("canterbury.toml", "[stdlib]\nmodules = [\"IO\"]\n");
    env.write("main.cb", IMPORT_IO);

    let result = env.run(&["main.cb"]);

    assert_eq!(result.exit_code, 0, "stderr: {}", result.stderr);
    assert_eq!(result.stdout, "io\n");
}

#[test]
fn test_explicit_config_flag() {
    let env = TestEnv::new();
    env.write("limits.toml", "[interpreter]\nmax_call_depth = 5\n");
    env.write("deep.cb", "f := func [n] [ if [n = 0] return 0; return f[n - 1]; ];\nf[10];");

    let shallow = env.run(&["--config", "limits.toml", "deep.cb"]);
    assert_eq!(shallow.exit_code, 70);
    assert!(shallow.stderr.contains("Stack overflow."));

    let default = env.run(&["deep.cb"]);
    assert_eq!(default.exit_code, 0, "stderr: {}", default.stderr);
}

#[test]
fn test_env_override_beats_config_file() {
    let env = TestEnv::new();
    env.write("canterbury.toml", "[stdlib]\nmodules = []\n");
    env.write("main.cb", IMPORT_IO);

    let result = env.run_with(&["main.cb"], "", &[("CANTERBURY_MODULES", "IO")]);

    assert_eq!(result.exit_code, 0, "stderr: {}", result.stderr);
}

#[test]
fn test_unknown_key_warns_with_suggestion() {
    let env = TestEnv::new();
    env.write("canterbury.toml", "[repl]\npromt = \"$ \"\n");
    env.write("main.cb", "print[1];");

    let result = env.run(&["main.cb"]);

    assert_eq!(result.exit_code, 0);
    assert!(
        result.stderr.contains("did you mean 'prompt'?"),
        "stderr: {}",
        result.stderr
    );
}

#[test]
fn test_invalid_config_exit_code() {
    let env = TestEnv::new();
    env.write("canterbury.toml", "[interpreter]\nmax_call_depth = \"lots\"\n");
    env.write("main.cb", "print[1];");

    let result = env.run(&["main.cb"]);

    assert_eq!(result.exit_code, 78);
    assert!(result.stderr.contains("canterbury.toml"));
}

#[test]
fn test_call_depth_beyond_limit_is_rejected() {
    let env = TestEnv::new();
    env.write("cfg.toml", "[interpreter]\nmax_call_depth = 1000000\n");
    env.write("rec.cb", "f := func [n] [ if [n = 0] return 0; return f[n - 1]; ];\nf[500000];");

    let result = env.run(&["--config", "cfg.toml", "rec.cb"]);

    assert_eq!(result.exit_code, 78, "stderr: {}", result.stderr);
    assert!(result.stderr.contains("max_call_depth must be between 1 and 4096"));
}

#[test]
fn test_zero_call_depth_is_rejected_as_json() {
    let env = TestEnv::new();
    env.write("canterbury.toml", "[interpreter]\nmax_call_depth = 0\n");
    env.write("main.cb", "print[1];");

    let result = env.run(&["--json", "main.cb"]);

    assert_eq!(result.exit_code, 78);
    let line = result
        .stderr
        .lines()
        .find(|l| l.contains("\"error\""))
        .expect("expected a JSON error line");
    let report: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(report["error"], "config");
    assert!(report["message"].as_str().unwrap().contains("max_call_depth"));
}
