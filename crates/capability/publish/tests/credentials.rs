use ems_publish::{
    ChainCredentialProvider, CredentialError, FileCredentialProvider, StaticCredentialProvider,
    resolve_root_ca,
};
use std::path::PathBuf;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ems-publish-{name}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create dir");
    dir
}

#[tokio::test]
async fn static_provider_wins_over_files() {
    let dir = scratch_dir("static");
    std::fs::write(dir.join("certificate.pem.crt"), "file-cert").expect("write");
    std::fs::write(dir.join("private.pem.key"), "file-key").expect("write");

    let chain = ChainCredentialProvider::new()
        .with(StaticCredentialProvider::new(
            Some("env-cert".to_string()),
            Some("env-key".to_string()),
        ))
        .with(FileCredentialProvider::new(&dir));
    let identity = chain.resolve().await.expect("identity");

    assert_eq!(identity.certificate, b"env-cert");
    assert_eq!(identity.private_key, b"env-key");
}

#[tokio::test]
async fn falls_back_to_cert_dir() {
    let dir = scratch_dir("files");
    std::fs::write(dir.join("certificate.pem.crt"), "file-cert").expect("write");
    std::fs::write(dir.join("private.pem.key"), "file-key").expect("write");

    let chain = ChainCredentialProvider::new()
        .with(StaticCredentialProvider::default())
        .with(FileCredentialProvider::new(&dir));
    let identity = chain.resolve().await.expect("identity");

    assert_eq!(identity.certificate, b"file-cert");
    assert!(!format!("{identity:?}").contains("file-key"));
}

#[tokio::test]
async fn half_configured_identity_is_rejected() {
    let chain = ChainCredentialProvider::new()
        .with(StaticCredentialProvider::new(Some("cert".to_string()), None));
    let err = chain.resolve().await.expect_err("incomplete");
    assert!(matches!(err, CredentialError::Incomplete("static")));
}

#[tokio::test]
async fn missing_identity_reports_not_found() {
    let dir = scratch_dir("empty");
    let chain = ChainCredentialProvider::new().with(FileCredentialProvider::new(dir.join("none")));
    let err = chain.resolve().await.expect_err("missing");
    assert!(matches!(err, CredentialError::NotFound(_)));
}

#[tokio::test]
async fn root_ca_uses_first_existing_candidate() {
    let dir = scratch_dir("ca");
    std::fs::write(dir.join("second.pem"), "second-ca").expect("write");
    std::fs::write(dir.join("third.pem"), "third-ca").expect("write");

    let ca = resolve_root_ca(&[
        dir.join("first.pem"),
        dir.join("second.pem"),
        dir.join("third.pem"),
    ])
    .await
    .expect("root ca");
    assert_eq!(ca, b"second-ca");

    let err = resolve_root_ca(&[dir.join("absent.pem")])
        .await
        .expect_err("missing");
    assert!(matches!(err, CredentialError::NotFound(_)));
}
