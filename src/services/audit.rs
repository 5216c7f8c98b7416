// src/services/audit.rs

use crate::auth::ActorContext;
use serde_json::Value;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug)]
pub struct AuditEvent {
    pub module: &'static str,
    pub action: &'static str,
    pub entity: &'static str,
    pub entity_id: Option<Uuid>,
    pub before: Option<Value>,
    pub after: Option<Value>,
    pub note: Option<String>,
}

impl AuditEvent {
    pub fn new(action: &'static str, entity_id: Uuid) -> Self {
        AuditEvent {
            module: "payroll",
            action,
            entity: "payroll_record",
            entity_id: Some(entity_id),
            before: None,
            after: None,
            note: None,
        }
    }

    pub fn with_snapshots(mut self, before: Option<Value>, after: Option<Value>) -> Self {
        self.before = before;
        self.after = after;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Best-effort write to the audit trail. A failure here is logged and
/// swallowed; it never changes the outcome of the primary operation.
pub async fn emit(db: &PgPool, ctx: &ActorContext, event: AuditEvent) {
    if let Err(e) = insert(db, ctx, &event).await {
        warn!(
            error = %e,
            action = event.action,
            entity_id = ?event.entity_id,
            "audit log write failed"
        );
    }
}

async fn insert(db: &PgPool, ctx: &ActorContext, event: &AuditEvent) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO audit_logs (
            id, tenant_id, actor_id, actor_name,
            module, action, entity, entity_id,
            before, after, note, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW())
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(ctx.tenant_id)
    .bind(ctx.user_id)
    .bind(&ctx.name)
    .bind(event.module)
    .bind(event.action)
    .bind(event.entity)
    .bind(event.entity_id)
    .bind(&event.before)
    .bind(&event.after)
    .bind(event.note.as_deref())
    .execute(db)
    .await?;
    Ok(())
}
