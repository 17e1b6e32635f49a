use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use scolara_core::{AppError, Role, verify_password};

use crate::config::jwt::JwtConfig;
use crate::utils::jwt::create_access_token;

use super::model::{LoginRequest, LoginResponse, Principal};

#[derive(sqlx::FromRow)]
struct Credentials {
    id: Uuid,
    username: String,
    password: String,
    school_id: Option<Uuid>,
    role: String,
}

pub struct AuthService;

impl AuthService {
    /// Authenticate a caller by username across the four principal tables
    /// and issue an access token. The response never reveals whether the
    /// username or the password was wrong.
    #[instrument(skip(db, dto, jwt_config), fields(username = %dto.username))]
    pub async fn login(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let credentials = Self::find_principal(db, &dto.username)
            .await?
            .ok_or_else(|| {
                AppError::unauthenticated(anyhow::anyhow!("Invalid username or password"))
            })?;

        let is_valid = verify_password(&dto.password, &credentials.password)?;
        if !is_valid {
            return Err(AppError::unauthenticated(anyhow::anyhow!(
                "Invalid username or password"
            )));
        }

        let role = Role::parse(&credentials.role).ok_or_else(|| {
            AppError::internal(anyhow::anyhow!("Unknown role on stored record"))
        })?;

        let access_token =
            create_access_token(credentials.id, role, credentials.school_id, jwt_config)?;

        Ok(LoginResponse {
            access_token,
            principal: Principal {
                id: credentials.id,
                username: credentials.username,
                role: role.as_str().to_string(),
                school_id: credentials.school_id,
            },
        })
    }

    /// Look the username up in administrations, teachers, students, and
    /// parents, in that order. Usernames are unique per table; the first
    /// match wins.
    async fn find_principal(
        db: &PgPool,
        username: &str,
    ) -> Result<Option<Credentials>, AppError> {
        let admin = sqlx::query_as::<_, Credentials>(
            "SELECT id, username, password, school_id, role FROM administrations WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(db)
        .await?;
        if admin.is_some() {
            return Ok(admin);
        }

        let teacher = sqlx::query_as::<_, Credentials>(
            "SELECT id, username, password, school_id, 'teacher' AS role FROM teachers WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(db)
        .await?;
        if teacher.is_some() {
            return Ok(teacher);
        }

        let student = sqlx::query_as::<_, Credentials>(
            "SELECT id, username, password, school_id, 'student' AS role FROM students WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(db)
        .await?;
        if student.is_some() {
            return Ok(student);
        }

        let parent = sqlx::query_as::<_, Credentials>(
            "SELECT id, username, password, school_id, 'parent' AS role FROM parents WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(db)
        .await?;

        Ok(parent)
    }
}
