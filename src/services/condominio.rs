//! Community operations.

use std::sync::Arc;

use log::warn;

use crate::error::{Result, VizinhaLinkError};
use crate::models::condominio::{Condominio, CondominioCreate, CondominioUpdate};
use crate::models::usuario::UsuarioUpdate;
use crate::query::{Filter, Order, Query};
use crate::services::apply_defaults;
use crate::services::usuario::UsuarioService;
use crate::session::SessionManager;
use crate::table::{Page, TableExecutor};

const TABLE: &str = "condominio";

/// Outcome of [`CondominioService::create_and_associate`].
#[derive(Debug, Clone)]
pub struct CondominioAssociado {
    pub condominio: Condominio,
    /// Whether the current user's profile was linked to the new community
    pub usuario_atualizado: bool,
}

/// Communities and the onboarding flow that links a resident to one.
#[derive(Clone)]
pub struct CondominioService {
    tables: TableExecutor,
    usuarios: UsuarioService,
    session: Arc<SessionManager>,
}

impl CondominioService {
    pub(crate) fn new(
        tables: TableExecutor,
        usuarios: UsuarioService,
        session: Arc<SessionManager>,
    ) -> Self {
        Self {
            tables,
            usuarios,
            session,
        }
    }

    /// List communities alphabetically.
    pub async fn find_all(&self, query: Query) -> Result<Page<Condominio>> {
        let query = apply_defaults(query, "*", &[Order::asc("nome")]);
        self.tables.find_all(TABLE, &query).await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Condominio> {
        self.tables.find_by_id(TABLE, id, None).await
    }

    pub async fn create(&self, data: CondominioCreate) -> Result<Condominio> {
        self.tables.create(TABLE, &data, None).await
    }

    pub async fn update(&self, id: i64, data: CondominioUpdate) -> Result<Condominio> {
        self.tables.update(TABLE, id, &data, None).await
    }

    pub async fn delete(&self, id: i64) -> Result<Condominio> {
        self.tables.delete(TABLE, id).await
    }

    pub async fn find_by_cep(&self, cep: &str) -> Result<Page<Condominio>> {
        let query = Query::new().with_filter(Filter::eq("cep", cep));
        self.tables.find_all(TABLE, &query).await
    }

    /// Create a community and link the signed-in resident to it.
    ///
    /// The community creation is the part that must succeed; a failed link
    /// leaves `usuario_atualizado: false` rather than failing the call,
    /// since the community already exists at that point. On a successful
    /// link the cached session profile is reloaded so the rest of the app
    /// sees the new community reference.
    pub async fn create_and_associate(
        &self,
        data: CondominioCreate,
        auto_associate: bool,
    ) -> Result<CondominioAssociado> {
        let current = self.session.current_user().ok_or_else(|| {
            VizinhaLinkError::AuthenticationError(
                "no signed-in user; sign in before creating a community".to_string(),
            )
        })?;

        let condominio = self.create(data).await?;
        if !auto_associate {
            return Ok(CondominioAssociado {
                condominio,
                usuario_atualizado: false,
            });
        }

        let link = self
            .usuarios
            .update(
                &current.id,
                UsuarioUpdate {
                    id_condominio: Some(condominio.id),
                    ..UsuarioUpdate::default()
                },
            )
            .await;

        match link {
            Ok(_) => {
                if let Err(err) = self.session.load_user(&current.id).await {
                    warn!(
                        "[CONDOMINIO] community created and linked, but the session profile \
                         could not be reloaded: {}",
                        err
                    );
                }
                Ok(CondominioAssociado {
                    condominio,
                    usuario_atualizado: true,
                })
            }
            Err(err) => {
                warn!(
                    "[CONDOMINIO] community {} created but linking user {} failed: {}",
                    condominio.id, current.id, err
                );
                Ok(CondominioAssociado {
                    condominio,
                    usuario_atualizado: false,
                })
            }
        }
    }
}
