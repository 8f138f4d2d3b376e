use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::{JwtService, is_valid_email, validate_delivery_address};
use chrono::Utc;
use sqlx::PgPool;

const PRIVACY_VERSION: &str = "1.0";

#[derive(Clone)]
pub struct AuthService {
    pool: PgPool,
    jwt_service: JwtService,
}

impl AuthService {
    pub fn new(pool: PgPool, jwt_service: JwtService) -> Self {
        Self { pool, jwt_service }
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        let errores = validate_delivery_address(&request.torre, request.piso, &request.apartamento);
        if !errores.is_empty() {
            return Err(AppError::ValidationError(errores.join(", ")));
        }

        if request.nombre.trim().is_empty()
            || request.cedula.trim().is_empty()
            || request.telefono.trim().is_empty()
        {
            return Err(AppError::ValidationError(
                "Nombre, email, cédula y teléfono son obligatorios".to_string(),
            ));
        }

        if !is_valid_email(&request.email) {
            return Err(AppError::ValidationError("Email inválido".to_string()));
        }

        if !request.privacy_accepted {
            return Err(AppError::ValidationError(
                "Debe aceptar la política de tratamiento de datos personales para registrarse"
                    .to_string(),
            ));
        }

        let email = request.email.trim().to_lowercase();

        let email_exists: Option<i64> = sqlx::query_scalar("SELECT id FROM usuarios WHERE email = $1")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?;
        if email_exists.is_some() {
            return Err(AppError::ValidationError("El email ya está registrado".to_string()));
        }

        let cedula_exists: Option<i64> =
            sqlx::query_scalar("SELECT id FROM usuarios WHERE cedula = $1")
                .bind(request.cedula.trim())
                .fetch_optional(&self.pool)
                .await?;
        if cedula_exists.is_some() {
            return Err(AppError::ValidationError("La cédula ya está registrada".to_string()));
        }

        let ahora = Utc::now();
        let marketing_date = request.marketing_accepted.then_some(ahora);

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO usuarios (
                nombre, email, cedula, telefono, telefono_alternativo,
                torre, piso, apartamento, notas_entrega,
                privacy_accepted, privacy_date, privacy_version,
                marketing_accepted, marketing_date
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(request.nombre.trim())
        .bind(&email)
        .bind(request.cedula.trim())
        .bind(request.telefono.trim())
        .bind(&request.telefono_alternativo)
        .bind(&request.torre)
        .bind(request.piso)
        .bind(request.apartamento.trim())
        .bind(&request.notas_entrega)
        .bind(true)
        .bind(ahora)
        .bind(PRIVACY_VERSION)
        .bind(request.marketing_accepted)
        .bind(marketing_date)
        .fetch_one(&self.pool)
        .await?;

        log::info!(
            "Registro exitoso: user_id={}, email={}, marketing={}",
            user.id,
            user.email,
            user.marketing_accepted
        );

        self.build_auth_response(user)
    }

    /// Login sin contraseña: email, cédula y teléfono deben coincidir.
    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        if request.email.trim().is_empty()
            || request.cedula.trim().is_empty()
            || request.telefono.trim().is_empty()
        {
            return Err(AppError::ValidationError(
                "Email, cédula y teléfono son obligatorios".to_string(),
            ));
        }

        let email = request.email.trim().to_lowercase();

        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM usuarios WHERE email = $1 AND cedula = $2 AND telefono = $3",
        )
        .bind(&email)
        .bind(request.cedula.trim())
        .bind(request.telefono.trim())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            AppError::ValidationError(
                "Los datos ingresados no coinciden con ningún usuario registrado".to_string(),
            )
        })?;

        self.build_auth_response(user)
    }

    pub async fn get_profile(&self, user_id: i64) -> AppResult<UserProfile> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM usuarios WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

        Ok(user.into())
    }

    pub async fn update_profile(
        &self,
        user_id: i64,
        request: UpdateProfileRequest,
    ) -> AppResult<UserProfile> {
        if let (Some(torre), Some(piso), Some(apartamento)) =
            (&request.torre, request.piso, &request.apartamento)
        {
            let errores = validate_delivery_address(torre, piso, apartamento);
            if !errores.is_empty() {
                return Err(AppError::ValidationError(errores.join(", ")));
            }
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE usuarios SET
                nombre = COALESCE($1, nombre),
                telefono = COALESCE($2, telefono),
                telefono_alternativo = COALESCE($3, telefono_alternativo),
                torre = COALESCE($4, torre),
                piso = COALESCE($5, piso),
                apartamento = COALESCE($6, apartamento),
                notas_entrega = COALESCE($7, notas_entrega)
            WHERE id = $8
            RETURNING *
            "#,
        )
        .bind(&request.nombre)
        .bind(&request.telefono)
        .bind(&request.telefono_alternativo)
        .bind(&request.torre)
        .bind(request.piso)
        .bind(&request.apartamento)
        .bind(&request.notas_entrega)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

        Ok(user.into())
    }

    fn build_auth_response(&self, user: User) -> AppResult<AuthResponse> {
        let token = self
            .jwt_service
            .generate_token(user.id, &user.email, user.rol.as_str())?;

        Ok(AuthResponse {
            token,
            expires_in: self.jwt_service.get_token_expires_in(),
            user: user.into(),
        })
    }
}
