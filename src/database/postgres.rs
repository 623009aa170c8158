use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::store::FlatRecordStore;
use crate::tree::{FlatRecord, NodePayload, OrderPatch, TreeKind};

#[derive(Debug, Clone, FromRow)]
struct MenuRow {
    id: i64,
    parent_id: Option<i64>,
    order: i32,
    title: String,
    route: Option<String>,
    icon: Option<String>,
    permission_name: Option<String>,
}

impl From<MenuRow> for FlatRecord {
    fn from(row: MenuRow) -> Self {
        FlatRecord {
            id: row.id,
            parent_id: row.parent_id,
            order: row.order,
            payload: NodePayload::Menu {
                title: row.title,
                route: row.route,
                icon: row.icon,
                permission_name: row.permission_name,
            },
        }
    }
}

#[derive(Debug, Clone, FromRow)]
struct FolderRow {
    id: i64,
    parent_id: Option<i64>,
    order: i32,
    name: String,
}

impl From<FolderRow> for FlatRecord {
    fn from(row: FolderRow) -> Self {
        FlatRecord {
            id: row.id,
            parent_id: row.parent_id,
            order: row.order,
            payload: NodePayload::Folder { name: row.name, mime_type: None },
        }
    }
}

const SELECT_MENUS: &str = r#"SELECT id, parent_id, "order", title, route, icon, permission_name
    FROM menus ORDER BY parent_id NULLS FIRST, "order", id"#;

const SELECT_FOLDERS: &str = r#"SELECT id, parent_id, "order", name
    FROM folders ORDER BY parent_id NULLS FIRST, "order", id"#;

/// Record store over the `menus` and `folders` tables
#[derive(Debug, Clone)]
pub struct PgTreeStore {
    pool: PgPool,
}

impl PgTreeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn update_sql(kind: TreeKind) -> String {
        format!(r#"UPDATE {} SET "order" = $1, parent_id = $2 WHERE id = $3"#, kind.table_name())
    }
}

#[async_trait]
impl FlatRecordStore for PgTreeStore {
    async fn load(&self, kind: TreeKind) -> Result<Vec<FlatRecord>, DatabaseError> {
        let records = match kind {
            TreeKind::Menu => sqlx::query_as::<_, MenuRow>(SELECT_MENUS)
                .fetch_all(&self.pool)
                .await?
                .into_iter()
                .map(FlatRecord::from)
                .collect(),
            TreeKind::Folder => sqlx::query_as::<_, FolderRow>(SELECT_FOLDERS)
                .fetch_all(&self.pool)
                .await?
                .into_iter()
                .map(FlatRecord::from)
                .collect(),
        };
        Ok(records)
    }

    async fn apply_patch(&self, kind: TreeKind, patch: &[OrderPatch]) -> Result<(), DatabaseError> {
        if patch.is_empty() {
            return Ok(());
        }

        let sql = Self::update_sql(kind);
        let mut tx = self.pool.begin().await?;
        for row in patch {
            let result = sqlx::query(&sql)
                .bind(row.order)
                .bind(row.parent_id)
                .bind(row.id)
                .execute(&mut *tx)
                .await?;
            if result.rows_affected() == 0 {
                // Dropping the transaction rolls it back
                return Err(DatabaseError::NotFound(format!("{} {}", kind, row.id)));
            }
        }
        tx.commit().await?;

        tracing::info!("Persisted {} order rows to {}", patch.len(), kind.table_name());
        Ok(())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
