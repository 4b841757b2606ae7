//! Mutual-aid operations.

use chrono::Utc;

use crate::error::Result;
use crate::models::ajuda_mutua::{
    AjudaMutua, AjudaMutuaCreate, AjudaMutuaUpdate, StatusAjuda, TipoAjuda,
};
use crate::query::{Filter, Order, Query};
use crate::services::apply_defaults;
use crate::table::{Page, TableExecutor};

const TABLE: &str = "ajuda_mutua";
const SELECT_WITH_USUARIO: &str = "*, usuario:usuario(id, nome, foto_url)";

/// Mutual-aid offers and requests between residents.
#[derive(Clone)]
pub struct AjudaMutuaService {
    tables: TableExecutor,
}

impl AjudaMutuaService {
    pub(crate) fn new(tables: TableExecutor) -> Self {
        Self { tables }
    }

    /// List posts, newest first, with the author embedded.
    pub async fn find_all(&self, query: Query) -> Result<Page<AjudaMutua>> {
        let query = apply_defaults(query, SELECT_WITH_USUARIO, &[Order::desc("data_criacao")]);
        self.tables.find_all(TABLE, &query).await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<AjudaMutua> {
        self.tables
            .find_by_id(TABLE, id, Some(SELECT_WITH_USUARIO))
            .await
    }

    /// Post an offer or request; new posts start open.
    pub async fn create(&self, mut data: AjudaMutuaCreate) -> Result<AjudaMutua> {
        data.status = Some(data.status.unwrap_or(StatusAjuda::Aberto));
        self.tables.create(TABLE, &data, None).await
    }

    /// Edit a post; stamps `data_atualizacao`.
    pub async fn update(&self, id: i64, mut data: AjudaMutuaUpdate) -> Result<AjudaMutua> {
        data.data_atualizacao = Some(Utc::now());
        self.tables.update(TABLE, id, &data, None).await
    }

    pub async fn delete(&self, id: i64) -> Result<AjudaMutua> {
        self.tables.delete(TABLE, id).await
    }

    pub async fn find_by_condominio(&self, id_condominio: i64) -> Result<Page<AjudaMutua>> {
        self.find_all(Query::new().with_filter(Filter::eq("id_condominio", id_condominio)))
            .await
    }

    /// Open posts of one kind (offers or requests).
    pub async fn find_by_tipo(
        &self,
        tipo: TipoAjuda,
        id_condominio: i64,
    ) -> Result<Page<AjudaMutua>> {
        self.find_all(
            Query::new()
                .with_filter(Filter::eq("tipo", serde_json::to_value(tipo)?))
                .with_filter(Filter::eq("id_condominio", id_condominio))
                .with_filter(Filter::eq("status", "aberto")),
        )
        .await
    }

    /// Close a post.
    pub async fn fechar(&self, id: i64) -> Result<AjudaMutua> {
        self.update(
            id,
            AjudaMutuaUpdate {
                status: Some(StatusAjuda::Fechado),
                ..AjudaMutuaUpdate::default()
            },
        )
        .await
    }
}
