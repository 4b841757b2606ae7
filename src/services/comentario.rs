//! Comment operations for bulletin posts.

use chrono::Utc;

use crate::error::Result;
use crate::models::comentario::{Comentario, ComentarioCreate, ComentarioUpdate};
use crate::query::{Filter, Order, Query};
use crate::table::{Page, TableExecutor};

const TABLE: &str = "aviso_comentario";
const SELECT_WITH_USUARIO: &str = "*, usuario:usuario(id, nome, foto_url)";

/// Comments under bulletin-board posts.
#[derive(Clone)]
pub struct ComentarioService {
    tables: TableExecutor,
}

impl ComentarioService {
    pub(crate) fn new(tables: TableExecutor) -> Self {
        Self { tables }
    }

    /// Comments of one post, oldest first, with authors embedded.
    pub async fn find_by_aviso(&self, id_aviso: i64) -> Result<Page<Comentario>> {
        let query = Query::new()
            .with_select(SELECT_WITH_USUARIO)
            .with_filter(Filter::eq("id_aviso", id_aviso))
            .with_order(Order::asc("data_criacao"));
        self.tables.find_all(TABLE, &query).await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Comentario> {
        self.tables
            .find_by_id(TABLE, id, Some(SELECT_WITH_USUARIO))
            .await
    }

    pub async fn create(&self, data: ComentarioCreate) -> Result<Comentario> {
        self.tables.create(TABLE, &data, None).await
    }

    /// Edit a comment; stamps `data_atualizacao`.
    pub async fn update(&self, id: i64, mut data: ComentarioUpdate) -> Result<Comentario> {
        data.data_atualizacao = Some(Utc::now());
        self.tables.update(TABLE, id, &data, None).await
    }

    pub async fn delete(&self, id: i64) -> Result<Comentario> {
        self.tables.delete(TABLE, id).await
    }
}
