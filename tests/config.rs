use std::collections::HashMap;

use curso_seeder::SeedError;
use curso_seeder::config::{BackendConfig, KeyKind, jwt_role};

const SERVICE_ROLE_JWT: &str =
    "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.eyJyb2xlIjoic2VydmljZV9yb2xlIn0.firma";

fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();
    move |name: &str| vars.get(name).cloned()
}

#[test]
fn prefers_the_service_role_key() {
    let config = BackendConfig::from_lookup(lookup_from(&[
        ("SUPABASE_URL", "https://demo.supabase.co"),
        ("SUPABASE_SERVICE_ROLE_KEY", "service-key"),
        ("SUPABASE_ANON_KEY", "anon-key"),
    ]))
    .expect("config resolved");

    assert_eq!(config.api_key, "service-key");
    assert_eq!(config.key_kind, KeyKind::ServiceRole);
}

#[test]
fn falls_back_to_the_anon_key() {
    let config = BackendConfig::from_lookup(lookup_from(&[
        ("SUPABASE_URL", "https://demo.supabase.co"),
        ("SUPABASE_ANON_KEY", "anon-key"),
    ]))
    .expect("config resolved");

    assert_eq!(config.api_key, "anon-key");
    assert_eq!(config.key_kind, KeyKind::Anon);
}

#[test]
fn a_missing_url_is_an_error() {
    let error = BackendConfig::from_lookup(lookup_from(&[(
        "SUPABASE_SERVICE_ROLE_KEY",
        "service-key",
    )]))
    .expect_err("must fail");

    assert!(matches!(error, SeedError::Config(_)));
}

#[test]
fn a_missing_key_is_an_error() {
    let error =
        BackendConfig::from_lookup(lookup_from(&[("SUPABASE_URL", "https://demo.supabase.co")]))
            .expect_err("must fail");

    assert!(matches!(error, SeedError::Config(_)));
}

#[test]
fn empty_values_count_as_unset() {
    let error = BackendConfig::from_lookup(lookup_from(&[
        ("SUPABASE_URL", "https://demo.supabase.co"),
        ("SUPABASE_SERVICE_ROLE_KEY", ""),
        ("SUPABASE_ANON_KEY", ""),
    ]))
    .expect_err("must fail");

    assert!(matches!(error, SeedError::Config(_)));
}

#[test]
fn decodes_the_role_claim_from_a_jwt_key() {
    let config = BackendConfig::from_lookup(lookup_from(&[
        ("SUPABASE_URL", "https://demo.supabase.co"),
        ("SUPABASE_SERVICE_ROLE_KEY", SERVICE_ROLE_JWT),
    ]))
    .expect("config resolved");

    assert_eq!(config.key_role().as_deref(), Some("service_role"));
}

#[test]
fn tolerates_keys_that_are_not_jwts() {
    assert_eq!(jwt_role("plain-api-key"), None);
    assert_eq!(jwt_role("a.b.c"), None);
    assert_eq!(jwt_role(""), None);
}
