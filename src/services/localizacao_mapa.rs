//! Collaborative-map operations.

use crate::error::Result;
use crate::models::localizacao_mapa::{
    LocalizacaoMapa, LocalizacaoMapaCreate, LocalizacaoMapaUpdate, TipoLocalizacao,
};
use crate::query::{Filter, Order, Query};
use crate::services::apply_defaults;
use crate::table::{Page, TableExecutor};

const TABLE: &str = "localizacao_mapa";
const SELECT_WITH_USUARIO: &str = "*, usuario:usuario(id, nome)";

/// Pins on the collaborative community map.
#[derive(Clone)]
pub struct LocalizacaoMapaService {
    tables: TableExecutor,
}

impl LocalizacaoMapaService {
    pub(crate) fn new(tables: TableExecutor) -> Self {
        Self { tables }
    }

    /// List pins, most voted first, newest breaking ties.
    pub async fn find_all(&self, query: Query) -> Result<Page<LocalizacaoMapa>> {
        let query = apply_defaults(
            query,
            SELECT_WITH_USUARIO,
            &[Order::desc("votos"), Order::desc("data_criacao")],
        );
        self.tables.find_all(TABLE, &query).await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<LocalizacaoMapa> {
        self.tables
            .find_by_id(TABLE, id, Some(SELECT_WITH_USUARIO))
            .await
    }

    /// Drop a pin; new pins start with zero votes.
    pub async fn create(&self, mut data: LocalizacaoMapaCreate) -> Result<LocalizacaoMapa> {
        data.votos = Some(0);
        self.tables.create(TABLE, &data, None).await
    }

    pub async fn update(&self, id: i64, data: LocalizacaoMapaUpdate) -> Result<LocalizacaoMapa> {
        self.tables.update(TABLE, id, &data, None).await
    }

    pub async fn delete(&self, id: i64) -> Result<LocalizacaoMapa> {
        self.tables.delete(TABLE, id).await
    }

    pub async fn find_by_condominio(&self, id_condominio: i64) -> Result<Page<LocalizacaoMapa>> {
        self.find_all(Query::new().with_filter(Filter::eq("id_condominio", id_condominio)))
            .await
    }

    pub async fn find_by_tipo(
        &self,
        tipo: TipoLocalizacao,
        id_condominio: i64,
    ) -> Result<Page<LocalizacaoMapa>> {
        self.find_all(
            Query::new()
                .with_filter(Filter::eq("tipo", serde_json::to_value(tipo)?))
                .with_filter(Filter::eq("id_condominio", id_condominio)),
        )
        .await
    }

    /// Upvote a pin. Read-then-write; concurrent votes may collapse, which
    /// is acceptable for a neighborhood map.
    pub async fn incrementar_votos(&self, id: i64) -> Result<LocalizacaoMapa> {
        let pin = self.find_by_id(id).await?;
        let votos = pin.votos.unwrap_or(0);
        self.update(
            id,
            LocalizacaoMapaUpdate {
                votos: Some(votos + 1),
                ..LocalizacaoMapaUpdate::default()
            },
        )
        .await
    }
}
