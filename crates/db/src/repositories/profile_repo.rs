//! Repository for the `profiles` table.

use beacon_core::types::DbId;
use sqlx::PgPool;

use crate::models::profile::{SenderProfile, UpsertProfile};

/// Column list for `profiles` queries.
const COLUMNS: &str =
    "user_id, full_name, company_name, email, years_of_experience, created_at, updated_at";

/// Provides access to campaign owners' sender profiles.
pub struct ProfileRepo;

impl ProfileRepo {
    /// Create or replace the profile for a user.
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        input: &UpsertProfile,
    ) -> Result<SenderProfile, sqlx::Error> {
        let query = format!(
            "INSERT INTO profiles (user_id, full_name, company_name, email, years_of_experience) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (user_id) DO UPDATE SET \
                 full_name = EXCLUDED.full_name, \
                 company_name = EXCLUDED.company_name, \
                 email = EXCLUDED.email, \
                 years_of_experience = EXCLUDED.years_of_experience, \
                 updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SenderProfile>(&query)
            .bind(user_id)
            .bind(&input.full_name)
            .bind(&input.company_name)
            .bind(&input.email)
            .bind(input.years_of_experience)
            .fetch_one(pool)
            .await
    }

    /// Find the profile belonging to a user.
    pub async fn find_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<SenderProfile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE user_id = $1");
        sqlx::query_as::<_, SenderProfile>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }
}
