use sqlx::PgPool;

use crate::models::food::CanonicalFood;

/// Load every food-composition row, ordered by name.
///
/// NULL nutrient cells are read as zero.
pub async fn list_foods(pool: &PgPool) -> Result<Vec<CanonicalFood>, sqlx::Error> {
    sqlx::query_as::<_, CanonicalFood>(
        r#"
        SELECT nome_alimento,
               COALESCE(calorias, 0)::float8    AS calorias,
               COALESCE(proteina, 0)::float8    AS proteina,
               COALESCE(carboidrato, 0)::float8 AS carboidrato,
               COALESCE(gordura, 0)::float8     AS gordura
        FROM alimentos
        WHERE nome_alimento IS NOT NULL
        ORDER BY nome_alimento
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Database liveness probe used by the health check.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await.map(|_| ())
}
