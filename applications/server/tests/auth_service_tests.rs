/// Authentication service tests
/// Tests JWT generation, password hashing, token validation
use vibesia_server::services::auth::{AuthService, TokenType};

fn create_test_auth_service() -> AuthService {
    AuthService::new("test-secret-key".to_string(), 1, 1)
}

/// Test password hashing produces valid bcrypt hashes
#[tokio::test]
async fn test_password_hashing() {
    let auth_service = create_test_auth_service();

    let password = "MySecurePassword123!";
    let hash = auth_service.hash_password(password).unwrap();

    // Verify hash format (bcrypt starts with $2b$ or $2a$)
    assert!(hash.starts_with("$2b$") || hash.starts_with("$2a$"));
    assert!(hash.len() > 50);

    // Verify the hash is different each time (salt is random)
    let hash2 = auth_service.hash_password(password).unwrap();
    assert_ne!(hash, hash2, "Hashes should differ due to random salt");
}

/// Test password verification
#[tokio::test]
async fn test_password_verification() {
    let auth_service = create_test_auth_service();

    let hash = auth_service.hash_password("MySecurePassword123!").unwrap();

    assert!(auth_service
        .verify_password("MySecurePassword123!", &hash)
        .unwrap());
    assert!(!auth_service.verify_password("WrongPassword", &hash).unwrap());
}

/// Test password verification with invalid hash format
#[tokio::test]
async fn test_password_verification_invalid_hash() {
    let auth_service = create_test_auth_service();

    let result = auth_service.verify_password("password", "not-a-valid-hash");
    assert!(result.is_err(), "Invalid hash should return error");
}

/// Test claims carry the email subject and token type
#[tokio::test]
async fn test_access_token_claims() {
    let auth_service = create_test_auth_service();

    let token = auth_service.create_access_token("dj@example.com").unwrap();
    let claims = auth_service.verify_token(&token).unwrap();

    assert_eq!(claims.sub, "dj@example.com");
    assert_eq!(claims.token_type, TokenType::Access);
    assert!(claims.exp > claims.iat);
    assert_eq!(claims.exp - claims.iat, auth_service.access_expires_in());
}

/// Test tampered tokens are rejected
#[tokio::test]
async fn test_tampered_token_is_rejected() {
    let auth_service = create_test_auth_service();

    let mut token = auth_service.create_access_token("dj@example.com").unwrap();
    token.push('x');

    assert!(auth_service.verify_access_token(&token).is_err());
}
