//! Lost-and-found operations.

use crate::error::Result;
use crate::models::item_achado_perdido::{
    ItemAchadoPerdido, ItemAchadoPerdidoCreate, ItemAchadoPerdidoUpdate, TipoItem,
};
use crate::query::{Filter, Order, Query};
use crate::services::apply_defaults;
use crate::table::{Page, TableExecutor};

const TABLE: &str = "item_achado_perdido";
const SELECT_WITH_USUARIO: &str = "*, usuario:usuario(id, nome, foto_url)";

/// Lost and found items reported by residents.
#[derive(Clone)]
pub struct ItemAchadoPerdidoService {
    tables: TableExecutor,
}

impl ItemAchadoPerdidoService {
    pub(crate) fn new(tables: TableExecutor) -> Self {
        Self { tables }
    }

    /// List items, newest first, with the reporter embedded.
    pub async fn find_all(&self, query: Query) -> Result<Page<ItemAchadoPerdido>> {
        let query = apply_defaults(query, SELECT_WITH_USUARIO, &[Order::desc("data_criacao")]);
        self.tables.find_all(TABLE, &query).await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<ItemAchadoPerdido> {
        self.tables
            .find_by_id(TABLE, id, Some(SELECT_WITH_USUARIO))
            .await
    }

    /// Report an item; new reports start unresolved.
    pub async fn create(&self, mut data: ItemAchadoPerdidoCreate) -> Result<ItemAchadoPerdido> {
        data.resolvido = Some(data.resolvido.unwrap_or(false));
        self.tables.create(TABLE, &data, None).await
    }

    pub async fn update(
        &self,
        id: i64,
        data: ItemAchadoPerdidoUpdate,
    ) -> Result<ItemAchadoPerdido> {
        self.tables.update(TABLE, id, &data, None).await
    }

    pub async fn delete(&self, id: i64) -> Result<ItemAchadoPerdido> {
        self.tables.delete(TABLE, id).await
    }

    pub async fn find_by_condominio(&self, id_condominio: i64) -> Result<Page<ItemAchadoPerdido>> {
        self.find_all(Query::new().with_filter(Filter::eq("id_condominio", id_condominio)))
            .await
    }

    /// Unresolved items of one kind (lost or found).
    pub async fn find_by_tipo(
        &self,
        tipo: TipoItem,
        id_condominio: i64,
    ) -> Result<Page<ItemAchadoPerdido>> {
        self.find_all(
            Query::new()
                .with_filter(Filter::eq("tipo", serde_json::to_value(tipo)?))
                .with_filter(Filter::eq("id_condominio", id_condominio))
                .with_filter(Filter::eq("resolvido", false)),
        )
        .await
    }

    pub async fn find_nao_resolvidos(&self, id_condominio: i64) -> Result<Page<ItemAchadoPerdido>> {
        self.find_all(
            Query::new()
                .with_filter(Filter::eq("id_condominio", id_condominio))
                .with_filter(Filter::eq("resolvido", false)),
        )
        .await
    }

    /// Mark an item as returned to its owner.
    pub async fn marcar_como_resolvido(&self, id: i64) -> Result<ItemAchadoPerdido> {
        self.update(
            id,
            ItemAchadoPerdidoUpdate {
                resolvido: Some(true),
                ..ItemAchadoPerdidoUpdate::default()
            },
        )
        .await
    }
}
