use super::*;

#[cfg(unix)]
fn sh(script: &str) -> (PathBuf, Vec<String>) {
    (
        PathBuf::from("/bin/sh"),
        vec!["-c".to_string(), script.to_string()],
    )
}

#[cfg(unix)]
#[test]
fn captures_stdout_and_stderr() {
    let (prog, args) = sh("printf 'hello'; echo diag >&2");
    let out = run(&prog, &args, &RunOpts::default()).unwrap();
    assert_eq!(out.stdout, b"hello");
    assert_eq!(out.stderr.trim(), "diag");
}

#[cfg(unix)]
#[test]
fn non_zero_exit_carries_code_and_diagnostics() {
    let (prog, args) = sh("echo 'Invalid argument' >&2; exit 3");
    match run(&prog, &args, &RunOpts::default()) {
        Err(ReelError::Process { code, stderr }) => {
            assert_eq!(code, Some(3));
            assert!(stderr.contains("Invalid argument"));
        }
        other => panic!("expected process error, got {other:?}"),
    }
}

#[cfg(unix)]
#[test]
fn timeout_kills_the_process() {
    let (prog, args) = sh("exec sleep 10");
    let opts = RunOpts {
        timeout: Duration::from_millis(200),
        budget: Duration::from_secs(1),
        poll_interval: Duration::from_millis(20),
        ..RunOpts::default()
    };
    let started = Instant::now();
    let err = run(&prog, &args, &opts).unwrap_err();
    assert!(matches!(err, ReelError::Timeout { secs } if (secs - 1.0).abs() < 1e-9));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[cfg(unix)]
#[test]
fn cancellation_stops_within_a_poll_interval() {
    let (prog, args) = sh("exec sleep 10");
    let token = CancelToken::new();
    let remote = token.clone();
    let canceller = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(100));
        remote.cancel();
    });
    let opts = RunOpts {
        poll_interval: Duration::from_millis(20),
        cancel: Some(token.clone()),
        ..RunOpts::default()
    };
    let started = Instant::now();
    let err = run(&prog, &args, &opts).unwrap_err();
    canceller.join().unwrap();
    assert!(matches!(err, ReelError::Cancelled));
    assert!(token.is_cancelled());
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[cfg(unix)]
#[test]
fn runs_in_requested_directory() {
    let dir = tempfile::tempdir().unwrap();
    let (prog, args) = sh("pwd");
    let opts = RunOpts {
        cwd: Some(dir.path().to_path_buf()),
        ..RunOpts::default()
    };
    let out = run(&prog, &args, &opts).unwrap();
    let printed = PathBuf::from(String::from_utf8(out.stdout).unwrap().trim());
    assert_eq!(
        printed.canonicalize().unwrap(),
        dir.path().canonicalize().unwrap()
    );
}

#[test]
fn missing_binary_is_a_resource_error() {
    let err = run(
        Path::new("/definitely/not/an/encoder"),
        &[],
        &RunOpts::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ReelError::Resource(ref m) if m.contains("/definitely/not/an/encoder")));
}

#[test]
fn truncate_tail_keeps_the_end() {
    assert_eq!(truncate_tail("short", 10), "short");
    let long = format!("{}fatal: last line", "x".repeat(100));
    let cut = truncate_tail(&long, 16);
    assert!(cut.starts_with("[...] "));
    assert!(cut.ends_with("fatal: last line"));

    // Never splits a multi-byte character.
    let cut = truncate_tail("ééééé", 3);
    assert_eq!(cut, "[...] é");
}
