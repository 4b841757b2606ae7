//! Package-tracking operations.

use chrono::Utc;
use log::debug;

use crate::error::Result;
use crate::models::encomenda::{Encomenda, EncomendaCreate, EncomendaUpdate, StatusEncomenda};
use crate::query::{Filter, Order, Query};
use crate::services::apply_defaults;
use crate::table::{Page, TableExecutor};

const TABLE: &str = "encomenda";
const SELECT_WITH_USUARIO: &str = "*, usuario:usuario!id_usuario(id, nome, unidade)";

/// Packages registered at the front desk.
#[derive(Clone)]
pub struct EncomendaService {
    tables: TableExecutor,
}

impl EncomendaService {
    pub(crate) fn new(tables: TableExecutor) -> Self {
        Self { tables }
    }

    /// List packages, newest first, with the addressee embedded; degrades
    /// to the relation-less shape when the embed cannot be resolved.
    pub async fn find_all(&self, query: Query) -> Result<Page<Encomenda>> {
        let default_order = [Order::desc("data_criacao")];
        let embedded = apply_defaults(query.clone(), SELECT_WITH_USUARIO, &default_order);

        match self.tables.find_all(TABLE, &embedded).await {
            Err(err) if err.is_degradable() => {
                debug!(
                    "[ENCOMENDA] embedded fetch failed ({}); retrying without relation",
                    err
                );
                let plain = apply_defaults(query, "*", &default_order);
                self.tables.find_all(TABLE, &plain).await
            }
            other => other,
        }
    }

    /// Fetch one package: plain row first, upgraded with the addressee
    /// embed when that read succeeds.
    pub async fn find_by_id(&self, id: i64) -> Result<Encomenda> {
        let plain: Encomenda = self.tables.find_by_id(TABLE, id, Some("*")).await?;

        match self
            .tables
            .find_by_id(TABLE, id, Some(SELECT_WITH_USUARIO))
            .await
        {
            Ok(embedded) => Ok(embedded),
            Err(err) => {
                debug!(
                    "[ENCOMENDA] embedded fetch of package {} failed ({}); returning plain row",
                    id, err
                );
                Ok(plain)
            }
        }
    }

    /// Register a package; new packages default to waiting for pickup.
    pub async fn create(&self, mut data: EncomendaCreate) -> Result<Encomenda> {
        data.status = Some(data.status.unwrap_or(StatusEncomenda::Aguardando));
        self.tables.create(TABLE, &data, None).await
    }

    /// Edit a package; stamps `updated_at`, and stamps `data_retirada` when
    /// the status flips to picked-up without an explicit pickup time.
    pub async fn update(&self, id: i64, mut data: EncomendaUpdate) -> Result<Encomenda> {
        if data.status == Some(StatusEncomenda::Retirada) && data.data_retirada.is_none() {
            data.data_retirada = Some(Utc::now());
        }
        data.updated_at = Some(Utc::now());
        self.tables.update(TABLE, id, &data, None).await
    }

    pub async fn delete(&self, id: i64) -> Result<Encomenda> {
        self.tables.delete(TABLE, id).await
    }

    pub async fn find_by_condominio(&self, id_condominio: i64) -> Result<Page<Encomenda>> {
        self.find_all(Query::new().with_filter(Filter::eq("id_condominio", id_condominio)))
            .await
    }

    /// Packages still waiting at the front desk.
    pub async fn find_aguardando(&self, id_condominio: i64) -> Result<Page<Encomenda>> {
        self.find_all(
            Query::new()
                .with_filter(Filter::eq("id_condominio", id_condominio))
                .with_filter(Filter::eq("status", "aguardando")),
        )
        .await
    }

    /// Mark a package as picked up now.
    pub async fn marcar_como_retirada(&self, id: i64) -> Result<Encomenda> {
        self.update(
            id,
            EncomendaUpdate {
                status: Some(StatusEncomenda::Retirada),
                data_retirada: Some(Utc::now()),
                ..EncomendaUpdate::default()
            },
        )
        .await
    }
}
