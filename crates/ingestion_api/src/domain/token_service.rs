use common::auth::AuthTokenProvider;
use common::domain::{Credential, CredentialCheck, CredentialStore, DomainResult, TokenIssuance};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Issues bearer tokens to collectors and validates them on later calls
pub struct TokenService {
    credential_store: Arc<dyn CredentialStore>,
    auth_token_provider: Arc<dyn AuthTokenProvider>,
}

impl TokenService {
    pub fn new(
        credential_store: Arc<dyn CredentialStore>,
        auth_token_provider: Arc<dyn AuthTokenProvider>,
    ) -> Self {
        Self {
            credential_store,
            auth_token_provider,
        }
    }

    /// Exchange credentials for a token.
    ///
    /// Bad or empty credentials yield `Denied`. Errors are reserved for store
    /// and signing faults.
    #[instrument(skip(self, credential), fields(username = %credential.username))]
    pub async fn issue_token(&self, credential: Credential) -> DomainResult<TokenIssuance> {
        if common::garde::validate_struct(&credential).is_err() {
            debug!("credential missing username or secret");
            return Ok(TokenIssuance::Denied);
        }

        let check = self
            .credential_store
            .check(&credential.username, &credential.secret)
            .await?;

        let CredentialCheck::Valid { expires_at } = check else {
            debug!("credential check failed");
            return Ok(TokenIssuance::Denied);
        };

        let token = self
            .auth_token_provider
            .generate_token(&credential.username, expires_at)?;

        debug!(expires_at = %token.expires_at, "token issued");
        Ok(TokenIssuance::Issued(token))
    }

    /// Signature and expiry check
    pub fn validate_token(&self, token: &str) -> bool {
        self.authenticate(token).is_ok()
    }

    /// Validate a token and return the collector it was issued to
    pub fn authenticate(&self, token: &str) -> DomainResult<String> {
        self.auth_token_provider.validate_token(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use common::auth::MockAuthTokenProvider;
    use common::domain::{DomainError, IssuedToken, MockCredentialStore};

    fn service(store: MockCredentialStore, provider: MockAuthTokenProvider) -> TokenService {
        TokenService::new(Arc::new(store), Arc::new(provider))
    }

    #[tokio::test]
    async fn test_issue_token_success() {
        let expires_at = Utc::now() + Duration::minutes(15);
        let mut store = MockCredentialStore::new();
        let mut provider = MockAuthTokenProvider::new();

        store
            .expect_check()
            .withf(|username: &str, password: &str| username == "collector" && password == "s3cret")
            .times(1)
            .return_once(move |_, _| Ok(CredentialCheck::Valid { expires_at }));

        provider
            .expect_generate_token()
            .withf(move |subject: &str, exp: &DateTime<Utc>| {
                subject == "collector" && *exp == expires_at
            })
            .times(1)
            .return_once(move |_, exp| {
                Ok(IssuedToken {
                    value: "signed".to_string(),
                    expires_at: exp,
                })
            });

        let issuance = service(store, provider)
            .issue_token(Credential::new("collector", "s3cret"))
            .await
            .unwrap();

        match issuance {
            TokenIssuance::Issued(token) => {
                assert_eq!(token.value, "signed");
                assert_eq!(token.expires_at, expires_at);
            }
            TokenIssuance::Denied => panic!("Expected issued token"),
        }
    }

    #[tokio::test]
    async fn test_issue_token_wrong_credentials_denied() {
        let mut store = MockCredentialStore::new();
        let mut provider = MockAuthTokenProvider::new();

        store
            .expect_check()
            .times(1)
            .return_once(|_, _| Ok(CredentialCheck::Invalid));
        provider.expect_generate_token().times(0);

        let issuance = service(store, provider)
            .issue_token(Credential::new("collector", "wrong"))
            .await
            .unwrap();

        assert_eq!(issuance, TokenIssuance::Denied);
    }

    #[tokio::test]
    async fn test_issue_token_empty_credentials_denied_without_lookup() {
        let mut store = MockCredentialStore::new();
        store.expect_check().times(0);

        let issuance = service(store, MockAuthTokenProvider::new())
            .issue_token(Credential::new("", ""))
            .await
            .unwrap();

        assert_eq!(issuance, TokenIssuance::Denied);
    }

    #[tokio::test]
    async fn test_issue_token_store_fault_is_error() {
        let mut store = MockCredentialStore::new();
        store.expect_check().times(1).return_once(|_, _| {
            Err(DomainError::RepositoryError(anyhow::anyhow!(
                "credential backend unavailable"
            )))
        });

        let result = service(store, MockAuthTokenProvider::new())
            .issue_token(Credential::new("collector", "s3cret"))
            .await;

        assert!(matches!(result, Err(DomainError::RepositoryError(_))));
    }

    #[test]
    fn test_validate_token() {
        let mut provider = MockAuthTokenProvider::new();
        provider
            .expect_validate_token()
            .returning(|token| match token {
                "good" => Ok("collector".to_string()),
                _ => Err(DomainError::InvalidToken("bad signature".to_string())),
            });

        let service = service(MockCredentialStore::new(), provider);
        assert!(service.validate_token("good"));
        assert!(!service.validate_token("forged"));
        assert_eq!(service.authenticate("good").unwrap(), "collector");
    }
}
