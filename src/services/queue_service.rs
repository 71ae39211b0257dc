//! QueueService — message queue gateway for the two lanes, backed by a
//! single SQLite table keyed by queue name. Leases are modeled with a
//! `visible_at` column: a received message is invisible until its lease
//! lapses, and deletion is fenced by the receipt token issued at receive
//! time. That receipt fencing is the one real concurrency contract in the
//! system.

use crate::errors::{StorageError, StorageResult};
use crate::models::message::{LeasedMessage, QueueLane, QueueMessage};
use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// How long a received message stays invisible before its lease lapses.
pub const VISIBILITY_TIMEOUT_SECS: i64 = 30;

/// QueueService provides the queue operations per lane:
/// - Send (append; returns generated id and insertion time)
/// - Peek (non-destructive read of visible messages)
/// - Receive (lease visible messages: fresh receipt, visibility pushed out,
///   dequeue count bumped)
/// - Delete-by-receipt (fails on a stale receipt)
/// - Approximate length
#[derive(Clone)]
pub struct QueueService {
    db: Arc<SqlitePool>,
    visibility: Duration,
}

impl QueueService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self {
            db,
            visibility: Duration::seconds(VISIBILITY_TIMEOUT_SECS),
        }
    }

    #[cfg(test)]
    fn with_visibility(db: Arc<SqlitePool>, visibility: Duration) -> Self {
        Self { db, visibility }
    }

    /// Append a message to the lane.
    pub async fn send(&self, lane: QueueLane, text: &str) -> StorageResult<QueueMessage> {
        let message = QueueMessage {
            message_id: Uuid::new_v4().to_string(),
            message_text: text.to_string(),
            inserted_on: Utc::now(),
            dequeue_count: 0,
        };

        sqlx::query(
            "INSERT INTO queue_messages (id, queue_name, body, inserted_at, visible_at, dequeue_count)
             VALUES (?, ?, ?, ?, ?, 0)",
        )
        .bind(&message.message_id)
        .bind(lane.queue_name())
        .bind(&message.message_text)
        .bind(message.inserted_on)
        .bind(message.inserted_on)
        .execute(&*self.db)
        .await?;

        debug!("message {} sent to {}", message.message_id, lane);
        Ok(message)
    }

    /// Up to `max` currently-visible messages, oldest first, without touching
    /// leases. Insertion order is what the store gives back; it is not a
    /// strict FIFO guarantee.
    pub async fn peek(&self, lane: QueueLane, max: usize) -> StorageResult<Vec<QueueMessage>> {
        let messages = sqlx::query_as::<_, QueueMessage>(
            "SELECT id AS message_id, body AS message_text, inserted_at AS inserted_on,
                    dequeue_count
             FROM queue_messages
             WHERE queue_name = ? AND visible_at <= ?
             ORDER BY inserted_at ASC, rowid ASC
             LIMIT ?",
        )
        .bind(lane.queue_name())
        .bind(Utc::now())
        .bind(max as i64)
        .fetch_all(&*self.db)
        .await?;
        Ok(messages)
    }

    /// Lease up to `max` visible messages.
    ///
    /// Runs in one transaction: each selected message gets a fresh receipt,
    /// its visibility pushed past the timeout, and its dequeue count
    /// incremented, so no other receiver can lease it until the lease lapses.
    pub async fn receive(&self, lane: QueueLane, max: usize) -> StorageResult<Vec<LeasedMessage>> {
        let now = Utc::now();
        let next_visible = now + self.visibility;
        let mut tx = self.db.begin().await?;

        let ids: Vec<(String,)> = sqlx::query_as(
            "SELECT id FROM queue_messages
             WHERE queue_name = ? AND visible_at <= ?
             ORDER BY inserted_at ASC, rowid ASC
             LIMIT ?",
        )
        .bind(lane.queue_name())
        .bind(now)
        .bind(max as i64)
        .fetch_all(&mut *tx)
        .await?;

        let mut leased = Vec::with_capacity(ids.len());
        for (id,) in ids {
            let message = sqlx::query_as::<_, LeasedMessage>(
                "UPDATE queue_messages
                 SET receipt = ?, visible_at = ?, dequeue_count = dequeue_count + 1
                 WHERE id = ?
                 RETURNING id AS message_id, body AS message_text,
                           inserted_at AS inserted_on, dequeue_count,
                           receipt, visible_at AS next_visible_on",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(next_visible)
            .bind(&id)
            .fetch_one(&mut *tx)
            .await?;
            leased.push(message);
        }

        tx.commit().await?;
        debug!("leased {} message(s) from {}", leased.len(), lane);
        Ok(leased)
    }

    /// Permanently remove a message, fenced by its receipt token.
    ///
    /// Fails with StaleReceipt when the token no longer matches the live
    /// lease (another receive re-leased the message, or the lease lapsed),
    /// and with NotFound when the message id is unknown.
    pub async fn delete_message(
        &self,
        lane: QueueLane,
        id: &str,
        receipt: &str,
    ) -> StorageResult<()> {
        let result = sqlx::query(
            "DELETE FROM queue_messages
             WHERE queue_name = ? AND id = ? AND receipt = ? AND visible_at > ?",
        )
        .bind(lane.queue_name())
        .bind(id)
        .bind(receipt)
        .bind(Utc::now())
        .execute(&*self.db)
        .await?;

        if result.rows_affected() == 0 {
            let exists: Option<(i64,)> =
                sqlx::query_as("SELECT 1 FROM queue_messages WHERE queue_name = ? AND id = ?")
                    .bind(lane.queue_name())
                    .bind(id)
                    .fetch_optional(&*self.db)
                    .await?;
            return Err(if exists.is_some() {
                StorageError::StaleReceipt {
                    queue: lane.queue_name().to_string(),
                    id: id.to_string(),
                }
            } else {
                StorageError::MessageNotFound {
                    queue: lane.queue_name().to_string(),
                    id: id.to_string(),
                }
            });
        }

        debug!("message {} deleted from {}", id, lane);
        Ok(())
    }

    /// Best-effort message count for the lane, leased messages included. Not
    /// exact under concurrent mutation.
    pub async fn approximate_length(&self, lane: QueueLane) -> StorageResult<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM queue_messages WHERE queue_name = ?")
                .bind(lane.queue_name())
                .fetch_one(&*self.db)
                .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_pool;

    #[tokio::test]
    async fn send_assigns_id_and_insertion_time() {
        let service = QueueService::new(test_pool().await);
        let sent = service.send(QueueLane::Order, "order #1").await.unwrap();
        assert!(!sent.message_id.is_empty());
        assert_eq!(sent.message_text, "order #1");
        assert_eq!(sent.dequeue_count, 0);
    }

    #[tokio::test]
    async fn lanes_are_independent() {
        let service = QueueService::new(test_pool().await);
        service.send(QueueLane::Order, "order").await.unwrap();
        service.send(QueueLane::Inventory, "restock").await.unwrap();

        let orders = service.peek(QueueLane::Order, 32).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].message_text, "order");

        assert_eq!(service.approximate_length(QueueLane::Order).await.unwrap(), 1);
        assert_eq!(
            service.approximate_length(QueueLane::Inventory).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn peek_never_decreases_length_or_consumes() {
        let service = QueueService::new(test_pool().await);
        service.send(QueueLane::Order, "a").await.unwrap();
        service.send(QueueLane::Order, "b").await.unwrap();

        let before = service.approximate_length(QueueLane::Order).await.unwrap();
        for _ in 0..3 {
            let peeked = service.peek(QueueLane::Order, 32).await.unwrap();
            assert_eq!(peeked.len(), 2);
            assert!(peeked.iter().all(|m| m.dequeue_count == 0));
        }
        assert_eq!(service.approximate_length(QueueLane::Order).await.unwrap(), before);
    }

    #[tokio::test]
    async fn receive_hides_message_and_bumps_dequeue_count() {
        let service = QueueService::new(test_pool().await);
        service.send(QueueLane::Order, "only").await.unwrap();

        let leased = service.receive(QueueLane::Order, 1).await.unwrap();
        assert_eq!(leased.len(), 1);
        assert_eq!(leased[0].dequeue_count, 1);
        assert!(!leased[0].receipt.is_empty());

        // Invisible to peek and to a second receiver while leased.
        assert!(service.peek(QueueLane::Order, 32).await.unwrap().is_empty());
        assert!(service.receive(QueueLane::Order, 1).await.unwrap().is_empty());

        // Still counted in the approximate length.
        assert_eq!(service.approximate_length(QueueLane::Order).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn receive_then_delete_decreases_length() {
        let service = QueueService::new(test_pool().await);
        service.send(QueueLane::Inventory, "restock shelf 3").await.unwrap();

        let leased = service.receive(QueueLane::Inventory, 1).await.unwrap();
        let msg = &leased[0];
        service
            .delete_message(QueueLane::Inventory, &msg.message_id, &msg.receipt)
            .await
            .unwrap();
        assert_eq!(
            service.approximate_length(QueueLane::Inventory).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn delete_with_wrong_receipt_fails() {
        let service = QueueService::new(test_pool().await);
        service.send(QueueLane::Order, "contested").await.unwrap();

        let leased = service.receive(QueueLane::Order, 1).await.unwrap();
        let msg = &leased[0];

        let err = service
            .delete_message(QueueLane::Order, &msg.message_id, "not-the-receipt")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::StaleReceipt { .. }));

        // The legitimate holder can still delete.
        service
            .delete_message(QueueLane::Order, &msg.message_id, &msg.receipt)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn receipt_goes_stale_when_message_is_re_leased() {
        let pool = test_pool().await;
        // Zero visibility: a received message is immediately receivable again.
        let service = QueueService::with_visibility(pool, Duration::seconds(0));
        service.send(QueueLane::Order, "hot potato").await.unwrap();

        let first = service.receive(QueueLane::Order, 1).await.unwrap();
        let second = service.receive(QueueLane::Order, 1).await.unwrap();
        assert_eq!(first[0].message_id, second[0].message_id);
        assert_ne!(first[0].receipt, second[0].receipt);
        assert_eq!(second[0].dequeue_count, 2);

        // With an expired lease even the latest receipt cannot delete, and
        // the first receipt is stale outright.
        for receipt in [&first[0].receipt, &second[0].receipt] {
            let err = service
                .delete_message(QueueLane::Order, &first[0].message_id, receipt)
                .await
                .unwrap_err();
            assert!(matches!(err, StorageError::StaleReceipt { .. }));
        }
    }

    #[tokio::test]
    async fn delete_of_unknown_message_is_not_found() {
        let service = QueueService::new(test_pool().await);
        let err = service
            .delete_message(QueueLane::Order, "missing-id", "any")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::MessageNotFound { .. }));
    }

    #[tokio::test]
    async fn receive_respects_max_and_oldest_first() {
        let service = QueueService::new(test_pool().await);
        for i in 0..3 {
            service.send(QueueLane::Order, &format!("m{i}")).await.unwrap();
        }

        let leased = service.receive(QueueLane::Order, 2).await.unwrap();
        assert_eq!(leased.len(), 2);
        assert_eq!(leased[0].message_text, "m0");
        assert_eq!(leased[1].message_text, "m1");

        let rest = service.peek(QueueLane::Order, 32).await.unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].message_text, "m2");
    }
}
