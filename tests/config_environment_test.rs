// ABOUTME: Tests for environment-driven server configuration
// ABOUTME: Serialized because every case mutates process environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Aeterna Health

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use aeterna_gateway::config::{Environment, ServerConfig, StorageBackend};
use aeterna_gateway::errors::ErrorCode;
use serial_test::serial;
use std::env;
use std::path::PathBuf;

const VARS: &[&str] = &[
    "HOST",
    "HTTP_PORT",
    "ENVIRONMENT",
    "CORS_ALLOWED_ORIGINS",
    "OPENAI_API_KEY",
    "OPENAI_BASE_URL",
    "OPENAI_MODEL",
    "OPENAI_TEMPERATURE",
    "OPENAI_MAX_TOKENS",
    "STORAGE_BACKEND",
    "UPLOAD_FOLDER",
    "TEMP_UPLOAD_DIR",
    "PUBLIC_BASE_URL",
    "S3_ENDPOINT_URL",
    "S3_BUCKET_NAME",
    "AWS_REGION",
    "S3_AUTH_TOKEN",
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
    "AWS_SESSION_TOKEN",
    "S3_OBJECT_ACL",
    "OPENAI_FALLBACK_MODELS",
    "MAX_UPLOAD_BYTES",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_defaults_without_environment() {
    clear_env();
    let config = ServerConfig::from_env().unwrap();

    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.http_port, 5000);
    assert_eq!(config.environment, Environment::Development);
    assert!(config.llm.is_none());
    assert_eq!(config.storage.upload_dir, PathBuf::from("uploads"));
    assert_eq!(config.storage.temp_dir, env::temp_dir().join("aeterna-gateway"));
    assert_ne!(config.storage.temp_dir, config.storage.upload_dir);
    assert_eq!(config.storage.max_upload_bytes, 10 * 1024 * 1024);
    match &config.storage.backend {
        StorageBackend::Local { public_base_url } => {
            assert_eq!(public_base_url, "http://localhost:5000/uploads");
        }
        StorageBackend::S3Like { .. } => panic!("expected local backend"),
    }
    assert!(config.summary().contains("llm=disabled"));
}

#[test]
#[serial]
fn test_llm_settings_and_redaction() {
    clear_env();
    env::set_var("OPENAI_API_KEY", "sk-test-secret");
    env::set_var("OPENAI_MODEL", "gpt-4o-mini");
    env::set_var("OPENAI_TEMPERATURE", "0.1");
    env::set_var("ENVIRONMENT", "production");

    let config = ServerConfig::from_env().unwrap();
    let llm = config.llm.as_ref().unwrap();
    assert_eq!(llm.model, "gpt-4o-mini");
    assert_eq!(llm.base_url, "https://api.openai.com/v1");
    assert!((llm.temperature - 0.1).abs() < f32::EPSILON);
    assert_eq!(llm.max_tokens, 1000);
    assert_eq!(llm.fallback_models, vec!["gpt-4o", "gpt-4-turbo", "gpt-4"]);
    assert!(config.environment.is_production());

    assert!(!format!("{config:?}").contains("sk-test-secret"));
    assert!(!config.summary().contains("sk-test-secret"));
    assert!(config.summary().contains("gpt-4o-mini"));
    clear_env();
}

#[test]
#[serial]
fn test_fallback_models_list() {
    clear_env();
    env::set_var("OPENAI_API_KEY", "sk-test");
    env::set_var("OPENAI_FALLBACK_MODELS", " gpt-4.1 , ,gpt-4o-mini");
    let llm = ServerConfig::from_env().unwrap().llm.unwrap();
    assert_eq!(llm.fallback_models, vec!["gpt-4.1", "gpt-4o-mini"]);
    clear_env();
}

#[test]
#[serial]
fn test_dotenv_file_is_loaded() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".env"),
        "OPENAI_API_KEY=sk-from-dotenv\nHTTP_PORT=5100\n",
    )
    .unwrap();
    env::set_var("HTTP_PORT", "5200");

    let previous_dir = env::current_dir().unwrap();
    env::set_current_dir(dir.path()).unwrap();
    let result = ServerConfig::from_env();
    env::set_current_dir(previous_dir).unwrap();

    let config = result.unwrap();
    assert_eq!(config.llm.unwrap().api_key, "sk-from-dotenv");
    assert_eq!(config.http_port, 5200, "process environment wins over .env");
    clear_env();
}

#[test]
#[serial]
fn test_blank_api_key_disables_llm() {
    clear_env();
    env::set_var("OPENAI_API_KEY", "   ");
    assert!(ServerConfig::from_env().unwrap().llm.is_none());
    clear_env();
}

#[test]
#[serial]
fn test_s3_backend_default_endpoint() {
    clear_env();
    env::set_var("STORAGE_BACKEND", "S3");
    env::set_var("S3_BUCKET_NAME", "meals");
    env::set_var("S3_AUTH_TOKEN", "tok");

    let config = ServerConfig::from_env().unwrap();
    match &config.storage.backend {
        StorageBackend::S3Like {
            endpoint_url,
            region,
            credentials,
            auth_token,
            object_acl,
        } => {
            assert_eq!(endpoint_url, "https://meals.s3.ap-northeast-2.amazonaws.com");
            assert_eq!(region, "ap-northeast-2");
            assert!(credentials.is_none());
            assert_eq!(auth_token.as_deref(), Some("tok"));
            assert_eq!(object_acl.as_deref(), Some("public-read"));
        }
        StorageBackend::Local { .. } => panic!("expected s3 backend"),
    }
    assert!(format!("{:?}", config.storage).contains("[REDACTED]"));
    clear_env();
}

#[test]
#[serial]
fn test_s3_backend_reads_aws_credentials() {
    clear_env();
    env::set_var("STORAGE_BACKEND", "s3");
    env::set_var("AWS_ACCESS_KEY_ID", "AKIDEXAMPLE");
    env::set_var("AWS_SECRET_ACCESS_KEY", "very-secret-key");
    env::set_var("AWS_REGION", "us-west-2");
    env::set_var("S3_OBJECT_ACL", "");

    let config = ServerConfig::from_env().unwrap();
    match &config.storage.backend {
        StorageBackend::S3Like {
            endpoint_url,
            region,
            credentials,
            object_acl,
            ..
        } => {
            assert_eq!(
                endpoint_url,
                "https://aeterna-health-images.s3.us-west-2.amazonaws.com"
            );
            assert_eq!(region, "us-west-2");
            let credentials = credentials.as_ref().unwrap();
            assert_eq!(credentials.access_key_id, "AKIDEXAMPLE");
            assert_eq!(credentials.secret_access_key, "very-secret-key");
            assert!(credentials.session_token.is_none());
            assert!(object_acl.is_none());
        }
        StorageBackend::Local { .. } => panic!("expected s3 backend"),
    }
    assert!(!format!("{config:?}").contains("very-secret-key"));

    env::remove_var("AWS_SECRET_ACCESS_KEY");
    match ServerConfig::from_env().unwrap().storage.backend {
        StorageBackend::S3Like { credentials, .. } => assert!(credentials.is_none()),
        StorageBackend::Local { .. } => panic!("expected s3 backend"),
    }
    clear_env();
}

#[test]
#[serial]
fn test_invalid_values_are_config_errors() {
    clear_env();
    env::set_var("HTTP_PORT", "not-a-port");
    let err = ServerConfig::from_env().unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigInvalid);
    assert!(err.message.contains("HTTP_PORT"));

    clear_env();
    env::set_var("STORAGE_BACKEND", "ftp");
    let err = ServerConfig::from_env().unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigInvalid);

    clear_env();
    env::set_var("MAX_UPLOAD_BYTES", "-1");
    assert!(ServerConfig::from_env().is_err());
    clear_env();
}
