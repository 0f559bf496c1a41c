//! Postgres store backed by sqlx

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, types::Json, Pool, Postgres, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{EquipmentCondition, TransactionStatus},
        equipment::{CreateEquipment, Equipment, UpdateEquipment},
        fine::Fine,
        notification::Notification,
        record::Record,
        transaction::{BorrowedItem, Transaction},
        user::User,
    },
};

use super::{Store, WriteBatch};

#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_transaction(row: &PgRow) -> AppResult<Transaction> {
    let items: Json<Vec<BorrowedItem>> = row.try_get("items")?;
    let status: String = row.try_get("status")?;
    Ok(Transaction {
        id: row.try_get("id")?,
        transaction_id: row.try_get("transaction_id")?,
        student_id: row.try_get("student_id")?,
        student_name: row.try_get("student_name")?,
        student_email: row.try_get("student_email")?,
        items: items.0,
        borrowed_date: row.try_get("borrowed_date")?,
        due_date: row.try_get("due_date")?,
        status: status.parse()?,
        total_price: row.try_get("total_price")?,
        fine_amount: row.try_get("fine_amount")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        version: row.try_get("version")?,
    })
}

fn row_to_record(row: &PgRow) -> AppResult<Record> {
    let items: Json<Vec<BorrowedItem>> = row.try_get("items")?;
    Ok(Record {
        id: row.try_get("id")?,
        transaction_id: row.try_get("transaction_id")?,
        student_id: row.try_get("student_id")?,
        student_name: row.try_get("student_name")?,
        student_email: row.try_get("student_email")?,
        items: items.0,
        borrowed_date: row.try_get("borrowed_date")?,
        due_date: row.try_get("due_date")?,
        returned_date: row.try_get("returned_date")?,
        completed_date: row.try_get("completed_date")?,
        final_status: row.try_get("final_status")?,
        total_price: row.try_get("total_price")?,
        fine_amount: row.try_get("fine_amount")?,
        archived_at: row.try_get("archived_at")?,
    })
}

fn row_to_fine(row: &PgRow) -> AppResult<Fine> {
    Ok(Fine {
        id: row.try_get("id")?,
        transaction_id: row.try_get("transaction_id")?,
        student_id: row.try_get("student_id")?,
        student_name: row.try_get("student_name")?,
        student_email: row.try_get("student_email")?,
        fine_type: row.try_get("fine_type")?,
        amount: row.try_get("amount")?,
        reason: row.try_get("reason")?,
        days_overdue: row.try_get("days_overdue")?,
        status: row.try_get("status")?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_notification(row: &PgRow) -> AppResult<Notification> {
    Ok(Notification {
        id: row.try_get("id")?,
        to: row.try_get("recipient")?,
        subject: row.try_get("subject")?,
        text: row.try_get("text")?,
        html: row.try_get("html")?,
        user_id: row.try_get("user_id")?,
        notification_type: row.try_get("notification_type")?,
        transaction_id: row.try_get("transaction_id")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl Store for PgStore {
    async fn list_equipment(&self) -> AppResult<Vec<Equipment>> {
        let rows = sqlx::query_as::<_, Equipment>("SELECT * FROM equipment ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_equipment(&self, id: i32) -> AppResult<Option<Equipment>> {
        let row = sqlx::query_as::<_, Equipment>("SELECT * FROM equipment WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_equipment_batch(&self, ids: &[i32]) -> AppResult<Vec<Equipment>> {
        let rows = sqlx::query_as::<_, Equipment>(
            "SELECT * FROM equipment WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_equipment(&self, data: &CreateEquipment) -> AppResult<Equipment> {
        let row = sqlx::query_as::<_, Equipment>(
            r#"
            INSERT INTO equipment
                (name, total_quantity, available_quantity, borrowed_quantity,
                 price_per_unit, condition, status, notes, crea_date, version)
            VALUES ($1, $2, $2, 0, $3, $4, 0, $5, $6, 0)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(data.total_quantity)
        .bind(data.price_per_unit)
        .bind(data.condition.unwrap_or(EquipmentCondition::Good.into()))
        .bind(&data.notes)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_equipment_details(
        &self,
        id: i32,
        data: &UpdateEquipment,
    ) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>(
            r#"
            UPDATE equipment SET
                name = COALESCE($2, name),
                price_per_unit = COALESCE($3, price_per_unit),
                condition = COALESCE($4, condition),
                status = COALESCE($5, status),
                notes = COALESCE($6, notes),
                modif_date = $7,
                version = version + 1
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(data.price_per_unit)
        .bind(data.condition)
        .bind(data.status)
        .bind(&data.notes)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    async fn delete_equipment(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM equipment WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Equipment {} not found", id)));
        }
        Ok(())
    }

    async fn get_user(&self, id: i32) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, User>(
            "SELECT id, firstname, lastname, email FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_transaction(&self, id: Uuid) -> AppResult<Option<Transaction>> {
        let row = sqlx::query("SELECT * FROM transactions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_transaction).transpose()
    }

    async fn list_transactions(
        &self,
        status: Option<TransactionStatus>,
    ) -> AppResult<Vec<Transaction>> {
        let rows = match status {
            Some(status) => {
                sqlx::query(
                    "SELECT * FROM transactions WHERE status = $1 ORDER BY created_at",
                )
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query("SELECT * FROM transactions ORDER BY created_at")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        rows.iter().map(row_to_transaction).collect()
    }

    async fn list_transactions_by_student(
        &self,
        student_id: i32,
    ) -> AppResult<Vec<Transaction>> {
        let rows = sqlx::query(
            "SELECT * FROM transactions WHERE student_id = $1 ORDER BY created_at",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_transaction).collect()
    }

    async fn list_sweepable_transactions(&self) -> AppResult<Vec<Transaction>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM transactions
            WHERE status IN ('Ongoing', 'Overdue', 'Incomplete', 'Incomplete and Overdue')
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_transaction).collect()
    }

    async fn list_records(&self) -> AppResult<Vec<Record>> {
        let rows = sqlx::query("SELECT * FROM records ORDER BY archived_at DESC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_record).collect()
    }

    async fn list_fines(&self) -> AppResult<Vec<Fine>> {
        let rows = sqlx::query("SELECT * FROM fines ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_fine).collect()
    }

    async fn list_notifications(&self) -> AppResult<Vec<Notification>> {
        let rows = sqlx::query("SELECT * FROM notifications ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_notification).collect()
    }

    async fn commit(&self, batch: WriteBatch) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        for txn in &batch.insert_transactions {
            sqlx::query(
                r#"
                INSERT INTO transactions
                    (id, transaction_id, student_id, student_name, student_email,
                     items, borrowed_date, due_date, status, total_price,
                     fine_amount, created_at, updated_at, version)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, 0)
                "#,
            )
            .bind(txn.id)
            .bind(&txn.transaction_id)
            .bind(txn.student_id)
            .bind(&txn.student_name)
            .bind(&txn.student_email)
            .bind(Json(&txn.items))
            .bind(txn.borrowed_date)
            .bind(txn.due_date)
            .bind(txn.status.as_str())
            .bind(txn.total_price)
            .bind(txn.fine_amount)
            .bind(txn.created_at)
            .bind(txn.updated_at)
            .execute(&mut *tx)
            .await?;
        }

        // Guarded writes are conditional on the version observed at read
        // time; a miss aborts the whole transaction.
        for txn in &batch.update_transactions {
            let result = sqlx::query(
                r#"
                UPDATE transactions SET
                    items = $1, borrowed_date = $2, status = $3,
                    fine_amount = $4, updated_at = $5, version = version + 1
                WHERE id = $6 AND version = $7
                "#,
            )
            .bind(Json(&txn.items))
            .bind(txn.borrowed_date)
            .bind(txn.status.as_str())
            .bind(txn.fine_amount)
            .bind(txn.updated_at)
            .bind(txn.id)
            .bind(txn.version)
            .execute(&mut *tx)
            .await?;
            if result.rows_affected() == 0 {
                return Err(AppError::Conflict(format!(
                    "Transaction {} changed concurrently",
                    txn.id
                )));
            }
        }

        for (id, version) in &batch.delete_transactions {
            let result = sqlx::query("DELETE FROM transactions WHERE id = $1 AND version = $2")
                .bind(id)
                .bind(version)
                .execute(&mut *tx)
                .await?;
            if result.rows_affected() == 0 {
                return Err(AppError::Conflict(format!(
                    "Transaction {} changed concurrently",
                    id
                )));
            }
        }

        for equipment in &batch.update_equipment {
            let result = sqlx::query(
                r#"
                UPDATE equipment SET
                    available_quantity = $1, borrowed_quantity = $2,
                    modif_date = $3, version = version + 1
                WHERE id = $4 AND version = $5
                "#,
            )
            .bind(equipment.available_quantity)
            .bind(equipment.borrowed_quantity)
            .bind(equipment.modif_date)
            .bind(equipment.id)
            .bind(equipment.version)
            .execute(&mut *tx)
            .await?;
            if result.rows_affected() == 0 {
                return Err(AppError::Conflict(format!(
                    "Equipment {} changed concurrently",
                    equipment.id
                )));
            }
        }

        for record in &batch.insert_records {
            sqlx::query(
                r#"
                INSERT INTO records
                    (id, transaction_id, student_id, student_name, student_email,
                     items, borrowed_date, due_date, returned_date, completed_date,
                     final_status, total_price, fine_amount, archived_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
                "#,
            )
            .bind(record.id)
            .bind(&record.transaction_id)
            .bind(record.student_id)
            .bind(&record.student_name)
            .bind(&record.student_email)
            .bind(Json(&record.items))
            .bind(record.borrowed_date)
            .bind(record.due_date)
            .bind(record.returned_date)
            .bind(record.completed_date)
            .bind(&record.final_status)
            .bind(record.total_price)
            .bind(record.fine_amount)
            .bind(record.archived_at)
            .execute(&mut *tx)
            .await?;
        }

        for fine in &batch.insert_fines {
            sqlx::query(
                r#"
                INSERT INTO fines
                    (id, transaction_id, student_id, student_name, student_email,
                     fine_type, amount, reason, days_overdue, status, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                "#,
            )
            .bind(fine.id)
            .bind(&fine.transaction_id)
            .bind(fine.student_id)
            .bind(&fine.student_name)
            .bind(&fine.student_email)
            .bind(&fine.fine_type)
            .bind(fine.amount)
            .bind(&fine.reason)
            .bind(fine.days_overdue)
            .bind(&fine.status)
            .bind(fine.created_at)
            .execute(&mut *tx)
            .await?;
        }

        for notification in &batch.insert_notifications {
            sqlx::query(
                r#"
                INSERT INTO notifications
                    (id, recipient, subject, text, html, user_id,
                     notification_type, transaction_id, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(notification.id)
            .bind(&notification.to)
            .bind(&notification.subject)
            .bind(&notification.text)
            .bind(&notification.html)
            .bind(notification.user_id)
            .bind(&notification.notification_type)
            .bind(&notification.transaction_id)
            .bind(notification.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
