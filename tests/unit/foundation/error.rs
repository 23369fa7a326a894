use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ReelError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        ReelError::resource("x")
            .to_string()
            .contains("resource error:")
    );
    assert!(ReelError::io("x").to_string().contains("io error:"));
    assert!(
        ReelError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ReelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn kinds_split_timeout_from_process() {
    let process = ReelError::Process {
        code: Some(1),
        stderr: "bad".to_string(),
    };
    let timeout = ReelError::Timeout { secs: 300.0 };
    assert_eq!(process.kind(), ErrorKind::Process);
    assert_eq!(timeout.kind(), ErrorKind::Timeout);
    assert!(process.is_caller_recoverable());
    assert!(!ReelError::resource("missing").is_caller_recoverable());
}

#[test]
fn io_errors_convert() {
    let err: ReelError = std::io::Error::other("disk full").into();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(err.to_string().contains("disk full"));
}
