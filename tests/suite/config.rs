//! Config file to running dashboard.

use std::io::Write;

use userdash_engine::{App, DashConfig};

use crate::common::{mount_alice_backend, settle, start_backend};

#[tokio::test]
async fn config_file_points_the_app_at_the_backend() {
    let server = start_backend().await;
    mount_alice_backend(&server).await;

    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(
        file,
        "[backend]\nbase_url = \"{}\"\nrequest_timeout_secs = 5\n\n[app]\nascii_only = true\n",
        server.uri()
    )
    .expect("write config");

    let config = DashConfig::load_from(file.path())
        .expect("config parses")
        .expect("config exists");
    let mut app = App::from_config(Some(&config)).expect("client builds");
    assert!(app.ui_options().ascii_only);

    app.mount();
    assert!(settle(&mut app).await);
    assert_eq!(app.state().users.len(), 1);
    assert_eq!(app.state().error, None);
}

#[test]
fn malformed_config_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(file, "[backend\nbase_url = ").expect("write config");

    let err = DashConfig::load_from(file.path()).expect_err("malformed TOML");
    assert_eq!(err.path(), file.path());
}

#[test]
fn non_http_backend_url_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(file, "[backend]\nbase_url = \"ftp://example.com\"\n").expect("write config");

    let config = DashConfig::load_from(file.path())
        .expect("config parses")
        .expect("config exists");
    assert!(App::from_config(Some(&config)).is_err());
}
