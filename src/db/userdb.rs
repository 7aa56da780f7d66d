// db/userdb.rs
use async_trait::async_trait;
use uuid::Uuid;

use super::db::DBClient;

use crate::models::{
    bookingmodel::Language,
    usermodel::{User, UserProfile},
};

#[async_trait]
pub trait UserExt {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;

    async fn get_user_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, sqlx::Error>;

    async fn get_user_languages(&self, user_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error>;

    async fn get_blacklisted_translators(&self, customer_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error>;

    async fn get_language(&self, language_id: Uuid) -> Result<Option<Language>, sqlx::Error>;

    async fn get_active_languages(&self) -> Result<Vec<Language>, sqlx::Error>;
}

#[async_trait]
impl UserExt for DBClient {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, phone, role, active, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, phone, role, active, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_user_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, sqlx::Error> {
        sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT user_id, consumer_type, translator_type, translator_level, gender,
                   city, instructions, not_get_emergency, not_get_nighttime, not_get_notification
            FROM user_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_user_languages(&self, user_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT lang_id FROM user_languages WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn get_blacklisted_translators(&self, customer_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT translator_id FROM user_blacklists WHERE user_id = $1
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn get_language(&self, language_id: Uuid) -> Result<Option<Language>, sqlx::Error> {
        sqlx::query_as::<_, Language>(
            r#"
            SELECT id, name, active FROM languages WHERE id = $1
            "#,
        )
        .bind(language_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_active_languages(&self) -> Result<Vec<Language>, sqlx::Error> {
        sqlx::query_as::<_, Language>(
            r#"
            SELECT id, name, active FROM languages WHERE active = true ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }
}
