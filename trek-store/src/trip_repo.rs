use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use std::str::FromStr;
use trek_core::repository::TripRepository;
use trek_core::{NewTrip, StoreError, StoreResult, Trip};
use tracing::info;

use crate::store_error;

pub struct StoreTripRepository {
    pool: SqlitePool,
}

impl StoreTripRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

// Prices are kept as TEXT so no precision is lost on the way through SQLite
#[derive(sqlx::FromRow)]
struct TripRow {
    id: i64,
    name: String,
    description: Option<String>,
    price: String,
}

impl TryFrom<TripRow> for Trip {
    type Error = StoreError;

    fn try_from(row: TripRow) -> Result<Self, Self::Error> {
        let price = Decimal::from_str(&row.price)
            .map_err(|e| StoreError::Corrupt(format!("trip {} price {:?}: {}", row.id, row.price, e)))?;

        Ok(Trip {
            id: row.id,
            name: row.name,
            description: row.description,
            price,
        })
    }
}

#[async_trait]
impl TripRepository for StoreTripRepository {
    async fn list_trips(&self) -> StoreResult<Vec<Trip>> {
        let rows = sqlx::query_as::<_, TripRow>(
            "SELECT id, name, description, price FROM trips ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        rows.into_iter().map(Trip::try_from).collect()
    }

    async fn get_trip(&self, id: i64) -> StoreResult<Option<Trip>> {
        let row = sqlx::query_as::<_, TripRow>(
            "SELECT id, name, description, price FROM trips WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        row.map(Trip::try_from).transpose()
    }

    async fn seed_trips(&self, trips: &[NewTrip]) -> StoreResult<u64> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;
        let mut inserted = 0;

        for trip in trips {
            let result = sqlx::query(
                r#"
                INSERT INTO trips (name, description, price)
                SELECT ?, ?, ?
                WHERE NOT EXISTS (SELECT 1 FROM trips WHERE name = ?)
                "#,
            )
            .bind(&trip.name)
            .bind(&trip.description)
            .bind(trip.price.to_string())
            .bind(&trip.name)
            .execute(&mut *tx)
            .await
            .map_err(store_error)?;

            inserted += result.rows_affected();
        }

        tx.commit().await.map_err(store_error)?;

        info!("Seeded {} trip(s)", inserted);
        Ok(inserted)
    }
}
