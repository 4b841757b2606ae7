//! Interest-group operations.

use crate::error::{Result, VizinhaLinkError};
use crate::models::grupo::{Grupo, GrupoCreate, GrupoMembro, GrupoMembroCreate, GrupoUpdate};
use crate::query::{Filter, Order, Query};
use crate::services::apply_defaults;
use crate::table::{Page, TableExecutor};

const TABLE: &str = "grupo";
const MEMBER_TABLE: &str = "grupo_membro";
const SELECT_WITH_CRIADOR: &str = "*, criador:usuario(id, nome)";
const SELECT_MEMBER_WITH_USUARIO: &str = "*, usuario:usuario(id, nome, foto_url)";

/// Interest groups and their memberships.
#[derive(Clone)]
pub struct GrupoService {
    tables: TableExecutor,
}

impl GrupoService {
    pub(crate) fn new(tables: TableExecutor) -> Self {
        Self { tables }
    }

    /// List groups, newest first, with the creator embedded.
    pub async fn find_all(&self, query: Query) -> Result<Page<Grupo>> {
        let query = apply_defaults(query, SELECT_WITH_CRIADOR, &[Order::desc("data_criacao")]);
        self.tables.find_all(TABLE, &query).await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Grupo> {
        self.tables
            .find_by_id(TABLE, id, Some(SELECT_WITH_CRIADOR))
            .await
    }

    pub async fn create(&self, data: GrupoCreate) -> Result<Grupo> {
        self.tables.create(TABLE, &data, None).await
    }

    pub async fn update(&self, id: i64, data: GrupoUpdate) -> Result<Grupo> {
        self.tables.update(TABLE, id, &data, None).await
    }

    pub async fn delete(&self, id: i64) -> Result<Grupo> {
        self.tables.delete(TABLE, id).await
    }

    pub async fn find_by_condominio(&self, id_condominio: i64) -> Result<Page<Grupo>> {
        self.find_all(Query::new().with_filter(Filter::eq("id_condominio", id_condominio)))
            .await
    }

    /// Members of a group in joining order, profiles embedded.
    pub async fn find_membros(&self, id_grupo: i64) -> Result<Page<GrupoMembro>> {
        let query = Query::new()
            .with_select(SELECT_MEMBER_WITH_USUARIO)
            .with_filter(Filter::eq("id_grupo", id_grupo))
            .with_order(Order::asc("data_entrada"));
        self.tables.find_all(MEMBER_TABLE, &query).await
    }

    pub async fn add_membro(&self, data: GrupoMembroCreate) -> Result<GrupoMembro> {
        self.tables.create(MEMBER_TABLE, &data, None).await
    }

    /// Remove a user from a group; the membership row is looked up first so
    /// a missing membership reports as not-found instead of a silent no-op.
    pub async fn remove_membro(&self, id_grupo: i64, id_usuario: &str) -> Result<GrupoMembro> {
        let memberships: Page<GrupoMembro> = self
            .tables
            .find_all(MEMBER_TABLE, &Self::membership_query(id_grupo, id_usuario))
            .await?;

        match memberships.rows.into_iter().next() {
            Some(membership) => self.tables.delete(MEMBER_TABLE, membership.id).await,
            None => Err(VizinhaLinkError::NotFound(format!(
                "no membership found for user {} in group {}",
                id_usuario, id_grupo
            ))),
        }
    }

    pub async fn is_membro(&self, id_grupo: i64, id_usuario: &str) -> Result<bool> {
        let memberships: Page<GrupoMembro> = self
            .tables
            .find_all(MEMBER_TABLE, &Self::membership_query(id_grupo, id_usuario))
            .await?;
        Ok(!memberships.is_empty())
    }

    fn membership_query(id_grupo: i64, id_usuario: &str) -> Query {
        Query::new()
            .with_filter(Filter::eq("id_grupo", id_grupo))
            .with_filter(Filter::eq("id_usuario", id_usuario))
    }
}
