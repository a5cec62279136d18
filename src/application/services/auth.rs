//! Account registration, login and profile lookup

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::billing::PlanType;
use crate::domain::user::{NewUser, User, UserRole};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};
use crate::infrastructure::crypto::{create_token, hash_password, verify_password, JwtConfig};

const INVALID_CREDENTIALS: &str = "E-mail ou senha inválidos.";

/// Issued token plus the account it belongs to.
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub name: String,
    pub password: String,
}

pub struct AuthService {
    repos: Arc<dyn RepositoryProvider>,
    jwt_config: JwtConfig,
}

impl AuthService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, jwt_config: JwtConfig) -> Self {
        Self { repos, jwt_config }
    }

    fn issue(&self, user: User) -> DomainResult<AuthResult> {
        let token = create_token(user.id, &user.email, user.plan, &self.jwt_config)
            .map_err(|e| DomainError::Internal(format!("token: {e}")))?;
        Ok(AuthResult {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt_config.expires_in(),
            user,
        })
    }

    /// New accounts start on the STARTER tier.
    pub async fn register(&self, input: Registration) -> DomainResult<AuthResult> {
        let email = input.email.trim().to_lowercase();
        if self.repos.users().find_by_email(&email).await?.is_some() {
            return Err(DomainError::Conflict("E-mail já cadastrado.".into()));
        }

        let password_hash = hash_password(&input.password)
            .map_err(|e| DomainError::Internal(format!("password hash: {e}")))?;
        let user = self
            .repos
            .users()
            .create(NewUser {
                email,
                name: input.name.trim().to_string(),
                password_hash,
                role: UserRole::Member,
                plan: PlanType::Starter,
            })
            .await?;

        info!(user_id = user.id, "Account registered");
        self.issue(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> DomainResult<AuthResult> {
        let email = email.trim().to_lowercase();
        let Some(user) = self.repos.users().find_by_email(&email).await? else {
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.into()));
        };
        if !user.is_active {
            warn!(user_id = user.id, "Login attempt on disabled account");
            return Err(DomainError::Unauthorized("Conta desativada.".into()));
        }
        if !verify_password(password, &user.password_hash) {
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.into()));
        }

        self.repos.users().touch_login(user.id).await?;
        info!(user_id = user.id, "User logged in");
        self.issue(user)
    }

    /// Creates the administrator account on first start. Returns `None`
    /// when the email is already registered.
    pub async fn ensure_admin(&self, email: &str, name: &str, password: &str) -> DomainResult<Option<User>> {
        let email = email.trim().to_lowercase();
        if self.repos.users().find_by_email(&email).await?.is_some() {
            return Ok(None);
        }
        let password_hash = hash_password(password)
            .map_err(|e| DomainError::Internal(format!("password hash: {e}")))?;
        let admin = self
            .repos
            .users()
            .create(NewUser {
                email,
                name: name.to_string(),
                password_hash,
                role: UserRole::Admin,
                plan: PlanType::Imobiliaria,
            })
            .await?;
        info!(user_id = admin.id, email = %admin.email, "Default admin created");
        Ok(Some(admin))
    }

    pub async fn me(&self, user_id: i32) -> DomainResult<User> {
        self.repos
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", "id", user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::testing::repos;
    use crate::infrastructure::crypto::verify_token;

    fn service(repos: Arc<dyn RepositoryProvider>) -> AuthService {
        AuthService::new(repos, JwtConfig::new("test-secret", 2))
    }

    #[tokio::test]
    async fn register_then_login() {
        let (_, repos) = repos().await;
        let auth = service(repos);

        let registered = auth
            .register(Registration {
                email: " Ana@Imobi.test ".into(),
                name: "Ana".into(),
                password: "segredo123".into(),
            })
            .await
            .unwrap();
        assert_eq!(registered.user.email, "ana@imobi.test");
        assert_eq!(registered.user.plan, PlanType::Starter);
        assert_eq!(registered.expires_in, 7200);

        let logged = auth.login("ana@imobi.test", "segredo123").await.unwrap();
        let claims = verify_token(&logged.token, &JwtConfig::new("test-secret", 2)).unwrap();
        assert_eq!(claims.user_id(), Some(logged.user.id));

        let me = auth.me(logged.user.id).await.unwrap();
        assert_eq!(me.name, "Ana");
    }

    #[tokio::test]
    async fn duplicate_email_and_bad_password() {
        let (_, repos) = repos().await;
        let auth = service(repos);
        let input = Registration {
            email: "bia@imobi.test".into(),
            name: "Bia".into(),
            password: "segredo123".into(),
        };
        auth.register(input.clone()).await.unwrap();

        assert!(matches!(auth.register(input).await, Err(DomainError::Conflict(_))));
        assert!(matches!(
            auth.login("bia@imobi.test", "errada").await,
            Err(DomainError::Unauthorized(_))
        ));
        assert!(matches!(
            auth.login("ninguem@imobi.test", "x").await,
            Err(DomainError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn admin_is_created_once() {
        let (_, repos) = repos().await;
        let auth = service(repos);

        let admin = auth
            .ensure_admin("Admin@Imobi.test", "Administrador", "admin12345")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.role, UserRole::Admin);
        assert_eq!(admin.plan, PlanType::Imobiliaria);
        assert!(auth.ensure_admin("admin@imobi.test", "Outro", "x").await.unwrap().is_none());
        assert!(auth.login("admin@imobi.test", "admin12345").await.is_ok());
    }
}
