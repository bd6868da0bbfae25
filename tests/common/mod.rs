use std::fs;
use std::path::PathBuf;

use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::MockServer;

use skolauth::config::{ClientRegistration, Config, DirectoryConfig, HttpConfig};
use skolauth::flow::LoginFlow;

/// Registration used by every integration test.
#[allow(dead_code)]
pub fn test_registration() -> ClientRegistration {
    ClientRegistration {
        client_id: "app".to_string(),
        client_secret: "s3cret".to_string(),
        redirect_uri: "myapp://callback".to_string(),
        scope: "openid".to_string(),
        response_type: "code".to_string(),
    }
}

/// Configuration pointing the directory at `{server}/schools`.
#[allow(dead_code)]
pub fn test_config(server: &MockServer) -> Config {
    Config {
        directory: DirectoryConfig {
            base_url: format!("{}/schools", server.uri()),
            max_results: 100,
        },
        client: test_registration(),
        http: HttpConfig {
            timeout_seconds: 5,
            ..HttpConfig::default()
        },
    }
}

#[allow(dead_code)]
pub fn test_flow(server: &MockServer) -> LoginFlow {
    LoginFlow::from_config(&test_config(server)).expect("failed to build login flow")
}

/// One directory entry in the wire format of the school directory.
#[allow(dead_code)]
pub fn school_entry(id: &str, name: &str, well_known: &str) -> Value {
    json!({
        "id": id,
        "type": "school",
        "attributes": {
            "name": name,
            "addressLine1": "1 rue de la Paix",
            "addressLine2": null,
            "addressLine3": null,
            "zipCode": "75001",
            "city": "Paris",
            "country": "France",
            "emsOIDCWellKnownUrl": well_known
        }
    })
}

/// Discovery document whose token endpoint lives on `base_url`.
#[allow(dead_code)]
pub fn discovery_body(authorization_endpoint: &str, base_url: &str) -> Value {
    json!({
        "issuer": base_url,
        "authorization_endpoint": authorization_endpoint,
        "token_endpoint": format!("{}/t", base_url),
        "jwks_uri": format!("{}/jwks", base_url),
        "response_types_supported": ["code"]
    })
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
