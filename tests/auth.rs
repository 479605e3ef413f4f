use std::{
    net::{IpAddr, Ipv4Addr},
    time::{Duration, Instant},
};

use chrono::Utc;
use directory_tracker::{
    config::AppConfig,
    error::AppError,
    middleware::{
        auth::{self, AuthUser},
        rate_limit::{LimitCategory, RateLimitQuota, RateLimitRule, RateLimiter, RateLimits},
    },
    models::{Role, User},
    services::auth_service,
};

fn test_limits() -> RateLimits {
    RateLimits {
        default: RateLimitQuota::parse("200 per day, 50 per hour").unwrap(),
        login: RateLimitQuota::parse("5 per minute").unwrap(),
        register: RateLimitQuota::parse("3 per hour").unwrap(),
        add_edit: RateLimitQuota::parse("10 per minute").unwrap(),
        delete: RateLimitQuota::parse("5 per minute").unwrap(),
        api: RateLimitQuota::parse("100 per hour").unwrap(),
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://localhost/unused".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        secret: "unit-test-secret".to_string(),
        session_ttl_secs: 3600,
        cookie_secure: false,
        rate_limits: test_limits(),
    }
}

fn sample_user() -> User {
    User {
        id: "user-abc12345".to_string(),
        username: "admin".to_string(),
        email: "admin@company.com".to_string(),
        password_hash: String::new(),
        full_name: "System Administrator".to_string(),
        role: "admin".to_string(),
        is_active: true,
        created_at: Utc::now(),
    }
}

fn auth_user(role: Role) -> AuthUser {
    AuthUser {
        user_id: "user-abc12345".to_string(),
        username: "admin".to_string(),
        full_name: "System Administrator".to_string(),
        role,
        csrf: "csrf-secret".to_string(),
    }
}

#[test]
fn password_hashing_round_trips() {
    let hash = auth_service::hash_password("Admin123!").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(auth_service::verify_password(&hash, "Admin123!").unwrap());
    assert!(!auth_service::verify_password(&hash, "WrongPass1!").unwrap());
}

#[test]
fn verify_rejects_garbage_hashes() {
    assert!(auth_service::verify_password("not a hash", "Admin123!").is_err());
}

#[test]
fn session_token_carries_the_user_claims() {
    let config = test_config();
    let user = sample_user();
    let token = auth_service::issue_session(&config, &user).unwrap();

    let claims = auth::decode_claims(&config.secret, &token).unwrap();
    assert_eq!(claims.sub, user.id);
    assert_eq!(claims.username, "admin");
    assert_eq!(claims.full_name, "System Administrator");
    assert_eq!(claims.role, "admin");
    assert!(!claims.csrf.is_empty());
    assert!(claims.exp > Utc::now().timestamp() as usize);
}

#[test]
fn session_tokens_get_a_fresh_csrf_secret() {
    let config = test_config();
    let user = sample_user();
    let first = auth_service::issue_session(&config, &user).unwrap();
    let second = auth_service::issue_session(&config, &user).unwrap();
    let first = auth::decode_claims(&config.secret, &first).unwrap();
    let second = auth::decode_claims(&config.secret, &second).unwrap();
    assert_ne!(first.csrf, second.csrf);
}

#[test]
fn tokens_signed_with_another_secret_are_rejected() {
    let config = test_config();
    let token = auth_service::issue_session(&config, &sample_user()).unwrap();
    let err = auth::decode_claims("different-secret", &token).unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));
}

#[test]
fn session_cookie_is_http_only_and_scoped_to_root() {
    let config = test_config();
    let cookie = auth::session_cookie(&config, "token-value".to_string());
    assert_eq!(cookie.name(), "session");
    assert_eq!(cookie.value(), "token-value");
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.secure(), Some(false));
    assert_eq!(cookie.max_age(), Some(time::Duration::seconds(3600)));
}

#[test]
fn next_targets_must_be_relative_paths() {
    assert_eq!(auth::sanitize_next(Some("/view/dog-1")), "/view/dog-1");
    assert_eq!(auth::sanitize_next(Some("//evil.example")), "/");
    assert_eq!(auth::sanitize_next(Some("https://evil.example")), "/");
    assert_eq!(auth::sanitize_next(Some("")), "/");
    assert_eq!(auth::sanitize_next(None), "/");
}

#[test]
fn csrf_check_requires_a_non_empty_match() {
    let user = auth_user(Role::Admin);
    assert!(auth::csrf_ok(&user, "csrf-secret"));
    assert!(!auth::csrf_ok(&user, "some-other-token"));
    assert!(!auth::csrf_ok(&user, ""));

    let mut blank = auth_user(Role::Admin);
    blank.csrf = String::new();
    assert!(!auth::csrf_ok(&blank, ""));
}

#[test]
fn only_admins_pass_the_admin_gate() {
    assert!(auth::ensure_admin(&auth_user(Role::Admin)).is_ok());
    let err = auth::ensure_admin(&auth_user(Role::Employee)).unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
    let err = auth::ensure_admin(&auth_user(Role::Manager)).unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
}

#[test]
fn rate_limit_rules_parse_counts_and_units() {
    let rule = RateLimitRule::parse("5 per minute").unwrap();
    assert_eq!(rule.max, 5);
    assert_eq!(rule.window, Duration::from_secs(60));

    let rule = RateLimitRule::parse("200 per day").unwrap();
    assert_eq!(rule.max, 200);
    assert_eq!(rule.window, Duration::from_secs(86_400));

    let rule = RateLimitRule::parse("100 per hours").unwrap();
    assert_eq!(rule.window, Duration::from_secs(3_600));
}

#[test]
fn malformed_rate_limit_rules_are_errors() {
    assert!(RateLimitRule::parse("per minute").is_err());
    assert!(RateLimitRule::parse("5 minute").is_err());
    assert!(RateLimitRule::parse("5 per fortnight").is_err());
    assert!(RateLimitRule::parse("5 per minute extra").is_err());
    assert!(RateLimitQuota::parse("").is_err());
}

#[test]
fn quota_strings_may_hold_several_rules() {
    let quota = RateLimitQuota::parse("200 per day, 50 per hour").unwrap();
    assert_eq!(quota.rules.len(), 2);
    assert_eq!(quota.rules[0].max, 200);
    assert_eq!(quota.rules[1].window, Duration::from_secs(3_600));
}

#[test]
fn limiter_admits_up_to_the_quota_then_denies() {
    let limiter = RateLimiter::new(test_limits());
    let ip = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
    let now = Instant::now();

    for _ in 0..5 {
        assert!(limiter.check_at(LimitCategory::Login, ip, now));
    }
    assert!(!limiter.check_at(LimitCategory::Login, ip, now));
}

#[test]
fn limiter_counts_each_address_separately() {
    let limiter = RateLimiter::new(test_limits());
    let first = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
    let second = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));
    let now = Instant::now();

    for _ in 0..5 {
        assert!(limiter.check_at(LimitCategory::Login, first, now));
    }
    assert!(!limiter.check_at(LimitCategory::Login, first, now));
    assert!(limiter.check_at(LimitCategory::Login, second, now));
}

#[test]
fn limiter_keeps_categories_independent() {
    let limiter = RateLimiter::new(test_limits());
    let ip = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
    let now = Instant::now();

    for _ in 0..5 {
        assert!(limiter.check_at(LimitCategory::Delete, ip, now));
    }
    assert!(!limiter.check_at(LimitCategory::Delete, ip, now));
    assert!(limiter.check_at(LimitCategory::AddEdit, ip, now));
    assert!(limiter.check_at(LimitCategory::Api, ip, now));
}

#[test]
fn limiter_resets_after_the_window_passes() {
    let limiter = RateLimiter::new(test_limits());
    let ip = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
    let now = Instant::now();

    for _ in 0..5 {
        assert!(limiter.check_at(LimitCategory::Login, ip, now));
    }
    assert!(!limiter.check_at(LimitCategory::Login, ip, now));
    assert!(limiter.check_at(LimitCategory::Login, ip, now + Duration::from_secs(61)));
}

#[test]
fn compound_quotas_enforce_every_rule() {
    let limits = RateLimits {
        default: RateLimitQuota::parse("3 per day, 2 per minute").unwrap(),
        login: RateLimitQuota::parse("5 per minute").unwrap(),
        register: RateLimitQuota::parse("3 per hour").unwrap(),
        add_edit: RateLimitQuota::parse("10 per minute").unwrap(),
        delete: RateLimitQuota::parse("5 per minute").unwrap(),
        api: RateLimitQuota::parse("100 per hour").unwrap(),
    };
    let limiter = RateLimiter::new(limits);
    let ip = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 9));
    let now = Instant::now();

    assert!(limiter.check_at(LimitCategory::Default, ip, now));
    assert!(limiter.check_at(LimitCategory::Default, ip, now));
    assert!(!limiter.check_at(LimitCategory::Default, ip, now));

    let later = now + Duration::from_secs(61);
    assert!(limiter.check_at(LimitCategory::Default, ip, later));
    assert!(!limiter.check_at(LimitCategory::Default, ip, later + Duration::from_secs(1)));
}
