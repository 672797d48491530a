//! Library integration tests.

use preingest::PreingestError;

#[test]
fn error_types_are_public() {
    let err = PreingestError::UnknownStep { id: "test".into() };
    assert!(err.to_string().contains("test"));
}

#[test]
fn result_type_alias_is_public() {
    fn test_fn() -> preingest::Result<()> {
        Ok(())
    }
    assert!(test_fn().is_ok());
}

#[test]
fn cli_types_are_public() {
    use clap::Parser;
    use preingest::cli::{Cli, Commands};

    let cli = Cli::parse_from(["preingest", "status", "7a3f-s1", "--json"]);

    if let Commands::Status(args) = cli.command {
        assert_eq!(args.session, "7a3f-s1");
        assert!(args.json);
    } else {
        panic!("Expected Status command");
    }
}

#[test]
fn connection_errors_are_transient() {
    let err = PreingestError::Connection {
        message: "refused".into(),
    };
    assert!(err.is_transient());
    assert!(!PreingestError::NoSuchSession {
        session_id: "s".into()
    }
    .is_transient());
}
