use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use cryptoblog::identity::{
    IdentityClient, LocalAuthorizer, MemorySessionStore, SessionIdentityClient, SessionStore,
    StoredSession,
};
use cryptoblog::post::{Post, Principal};

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Identity client that logs in as `principal` without leaving the process.
#[allow(dead_code)]
pub fn local_identity(principal: &str) -> Arc<dyn IdentityClient> {
    Arc::new(SessionIdentityClient::new(
        Arc::new(MemorySessionStore::new()),
        Arc::new(LocalAuthorizer::new(
            Principal::parse(principal).expect("valid principal"),
        )),
    ))
}

/// Identity client that already holds a session carrying `token`.
#[allow(dead_code)]
pub fn identity_with_token(principal: &str, token: &str) -> Arc<dyn IdentityClient> {
    let store = MemorySessionStore::new();
    store
        .save(&StoredSession {
            principal: Principal::parse(principal).expect("valid principal"),
            access_token: Some(token.to_string()),
            expires_at: None,
        })
        .expect("save session");
    Arc::new(SessionIdentityClient::new(
        Arc::new(store),
        Arc::new(LocalAuthorizer::new(
            Principal::parse(principal).expect("valid principal"),
        )),
    ))
}

#[allow(dead_code)]
pub fn sample_post(id: u64, title: &str) -> Post {
    Post {
        id,
        title: title.to_string(),
        content: format!("Content of {}", title),
        author: Some("Ada".to_string()),
        timestamp: 1_700_000_000_000_000_000,
        author_principal: Some(Principal::parse("aaaaa-aa").expect("valid principal")),
    }
}
