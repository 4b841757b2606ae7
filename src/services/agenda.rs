//! Shared-resource scheduling operations.

use chrono::{DateTime, Utc};
use log::debug;

use crate::error::Result;
use crate::models::agenda::{Agenda, AgendaCreate, AgendaUpdate, TipoAgenda};
use crate::query::{Filter, Order, Query};
use crate::services::apply_defaults;
use crate::table::{Page, TableExecutor};

const TABLE: &str = "agenda";
/// The booking owner embed names the foreign key explicitly because
/// `agenda` carries more than one reference into `usuario`.
const SELECT_WITH_USUARIO: &str = "*, usuario:usuario!id_usuario(id, nome, unidade)";

/// Bookings of shared resources (courts, party rooms, equipment).
#[derive(Clone)]
pub struct AgendaService {
    tables: TableExecutor,
}

impl AgendaService {
    pub(crate) fn new(tables: TableExecutor) -> Self {
        Self { tables }
    }

    /// List bookings, earliest start first, with the owner embedded.
    ///
    /// When the embedded fetch fails because the backend cannot resolve the
    /// relation (or refuses it by policy), the same fetch is retried without
    /// the embed and the degraded rows are returned instead of the error.
    pub async fn find_all(&self, query: Query) -> Result<Page<Agenda>> {
        let default_order = [Order::asc("data_inicio")];
        let embedded = apply_defaults(query.clone(), SELECT_WITH_USUARIO, &default_order);

        match self.tables.find_all(TABLE, &embedded).await {
            Err(err) if err.is_degradable() => {
                debug!(
                    "[AGENDA] embedded fetch failed ({}); retrying without relation",
                    err
                );
                let plain = apply_defaults(query, "*", &default_order);
                self.tables.find_all(TABLE, &plain).await
            }
            other => other,
        }
    }

    /// Fetch one booking. Reads the plain row first, then tries to upgrade
    /// it with the owner embed; if the embedded read fails for any reason
    /// the plain row is returned.
    pub async fn find_by_id(&self, id: i64) -> Result<Agenda> {
        let plain: Agenda = self.tables.find_by_id(TABLE, id, Some("*")).await?;

        match self
            .tables
            .find_by_id(TABLE, id, Some(SELECT_WITH_USUARIO))
            .await
        {
            Ok(embedded) => Ok(embedded),
            Err(err) => {
                debug!(
                    "[AGENDA] embedded fetch of booking {} failed ({}); returning plain row",
                    id, err
                );
                Ok(plain)
            }
        }
    }

    pub async fn create(&self, data: AgendaCreate) -> Result<Agenda> {
        self.tables.create(TABLE, &data, None).await
    }

    /// Edit a booking; stamps `updated_at`.
    pub async fn update(&self, id: i64, mut data: AgendaUpdate) -> Result<Agenda> {
        data.updated_at = Some(Utc::now());
        self.tables.update(TABLE, id, &data, None).await
    }

    pub async fn delete(&self, id: i64) -> Result<Agenda> {
        self.tables.delete(TABLE, id).await
    }

    pub async fn find_by_condominio(&self, id_condominio: i64) -> Result<Page<Agenda>> {
        self.find_all(Query::new().with_filter(Filter::eq("id_condominio", id_condominio)))
            .await
    }

    pub async fn find_by_tipo(
        &self,
        id_condominio: i64,
        tipo: TipoAgenda,
    ) -> Result<Page<Agenda>> {
        self.find_all(
            Query::new()
                .with_filter(Filter::eq("id_condominio", id_condominio))
                .with_filter(Filter::eq("tipo", serde_json::to_value(tipo)?)),
        )
        .await
    }

    /// Bookings starting and ending inside `[data_inicio, data_fim]`.
    pub async fn find_by_periodo(
        &self,
        id_condominio: i64,
        data_inicio: DateTime<Utc>,
        data_fim: DateTime<Utc>,
    ) -> Result<Page<Agenda>> {
        self.find_all(
            Query::new()
                .with_filter(Filter::eq("id_condominio", id_condominio))
                .with_filter(Filter::gte("data_inicio", data_inicio.to_rfc3339()))
                .with_filter(Filter::lte("data_fim", data_fim.to_rfc3339())),
        )
        .await
    }

    /// Bookings of `nome_recurso` whose window overlaps `[inicio, fim)`.
    ///
    /// The filter layer is conjunctive only, so the overlap condition (an
    /// OR between boundary cases) cannot be pushed to the backend: this
    /// fetches the resource's bookings and narrows them client-side.
    pub async fn verificar_conflitos(
        &self,
        id_condominio: i64,
        nome_recurso: &str,
        data_inicio: DateTime<Utc>,
        data_fim: DateTime<Utc>,
        exclude_id: Option<i64>,
    ) -> Result<Vec<Agenda>> {
        let mut query = Query::new()
            .with_filter(Filter::eq("id_condominio", id_condominio))
            .with_filter(Filter::eq("nome_recurso", nome_recurso));
        if let Some(id) = exclude_id {
            query = query.with_filter(Filter::neq("id", id));
        }

        let page = self.find_all(query).await?;
        let conflitos = page
            .rows
            .into_iter()
            .filter(|agenda| agenda.conflita_com(data_inicio, data_fim))
            .collect();
        Ok(conflitos)
    }
}
