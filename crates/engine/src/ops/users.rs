use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use chrono::Utc;
use uuid::Uuid;

use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};

use crate::{
    EngineError, NewUser, ResultEngine, User, sessions, users,
    util::{normalize_optional_text, normalize_required},
};

use super::{Engine, with_tx};

const MIN_PASSWORD_LEN: usize = 6;

fn hash_password(password: &str) -> ResultEngine<String> {
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(|err| EngineError::InvalidInput(format!("cannot build salt: {err}")))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| EngineError::InvalidInput(format!("cannot hash password: {err}")))
}

fn verify_password(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .and_then(|hash| Argon2::default().verify_password(password.as_bytes(), &hash))
        .is_ok()
}

fn normalize_email(email: &str) -> ResultEngine<String> {
    let email = normalize_required(email, "email")?.to_lowercase();
    if !email.contains('@') {
        return Err(EngineError::InvalidInput("email is not valid".to_string()));
    }
    Ok(email)
}

impl Engine {
    /// Registers a new user and opens a session for them.
    ///
    /// Returns the user and the bearer token of the new session.
    pub async fn register_user(&self, input: NewUser) -> ResultEngine<(User, String)> {
        let first_name = normalize_required(&input.first_name, "first name")?;
        let last_name = normalize_required(&input.last_name, "last name")?;
        let email = normalize_email(&input.email)?;
        let role = normalize_required(&input.role, "role")?;
        if input.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(EngineError::InvalidInput(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        let password = hash_password(&input.password)?;

        with_tx!(self, |db_tx| {
            let exists = users::Entity::find()
                .filter(users::Column::Email.eq(email.as_str()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(email));
            }

            let model = users::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                email: ActiveValue::Set(email.clone()),
                first_name: ActiveValue::Set(first_name),
                last_name: ActiveValue::Set(last_name),
                phone: ActiveValue::Set(normalize_optional_text(input.phone.as_deref())),
                role: ActiveValue::Set(role),
                password: ActiveValue::Set(password),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            tracing::info!("registered user {}", model.id);

            let token = self.open_session(&db_tx, &model.id).await?;
            Ok((User::from(model), token))
        })
    }

    /// Checks the credentials and opens a new session.
    pub async fn login(&self, email: &str, password: &str) -> ResultEngine<(User, String)> {
        let email = email.trim().to_lowercase();

        with_tx!(self, |db_tx| {
            let model = users::Entity::find()
                .filter(users::Column::Email.eq(email.as_str()))
                .one(&db_tx)
                .await?
                .filter(|model| verify_password(password, &model.password))
                .ok_or_else(|| EngineError::Unauthorized("invalid credentials".to_string()))?;

            let token = self.open_session(&db_tx, &model.id).await?;
            Ok((User::from(model), token))
        })
    }

    /// Resolves a bearer token into the user owning the session.
    pub async fn user_by_token(&self, token: &str) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            let session = sessions::Entity::find_by_id(token.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::Unauthorized("invalid token".to_string()))?;
            users::Entity::find_by_id(session.user_id)
                .one(&db_tx)
                .await?
                .map(User::from)
                .ok_or_else(|| EngineError::Unauthorized("invalid token".to_string()))
        })
    }

    /// Looks up a user by id.
    pub async fn user(&self, user_id: &str) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            users::Entity::find_by_id(user_id.to_string())
                .one(&db_tx)
                .await?
                .map(User::from)
                .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
        })
    }

    async fn open_session(&self, db: &DatabaseTransaction, user_id: &str) -> ResultEngine<String> {
        let token = Uuid::new_v4().simple().to_string();
        sessions::ActiveModel {
            token: ActiveValue::Set(token.clone()),
            user_id: ActiveValue::Set(user_id.to_string()),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(db)
        .await?;
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_password_verifies() {
        let hash = hash_password("secret1").unwrap();
        assert_ne!(hash, "secret1");
        assert!(verify_password("secret1", &hash));
        assert!(!verify_password("secret2", &hash));
    }

    #[test]
    fn broken_hash_never_verifies() {
        assert!(!verify_password("secret1", "plain-text"));
    }

    #[test]
    fn email_is_normalized() {
        assert_eq!(
            normalize_email("  Ada@Example.COM ").unwrap(),
            "ada@example.com"
        );
        assert!(normalize_email("nobody").is_err());
        assert!(normalize_email("  ").is_err());
    }
}
