//! Resident profile operations.

use chrono::Utc;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VizinhaLinkError};
use crate::models::usuario::{Perfil, Usuario, UsuarioCreate, UsuarioUpdate};
use crate::query::{Filter, Query};
use crate::services::apply_defaults;
use crate::table::{Page, TableExecutor};

const TABLE: &str = "usuario";
const SELECT_WITH_CONDOMINIO: &str = "*, condominio:condominio(*)";
/// Column subset exposed when listing a community's residents
const SELECT_RESIDENT_LIST: &str = "id, nome, email, unidade, foto_url, perfil, verificado";

/// Arguments of the `create_usuario_profile` database function
#[derive(Serialize)]
struct CreateProfileArgs<'a> {
    p_id: &'a str,
    p_nome: &'a str,
    p_email: &'a str,
    p_perfil: Perfil,
    p_verificado: bool,
}

/// Row returned by `create_usuario_profile`. Columns carry a `usuario_`
/// prefix to avoid ambiguity inside the function; older deployments return
/// them unprefixed, hence the aliases.
#[derive(Deserialize)]
struct ProfileRow {
    #[serde(alias = "id")]
    usuario_id: String,
    #[serde(alias = "nome")]
    usuario_nome: String,
    #[serde(alias = "email")]
    usuario_email: String,
    #[serde(default, alias = "perfil")]
    usuario_perfil: Option<Perfil>,
    #[serde(default, alias = "verificado")]
    usuario_verificado: Option<bool>,
}

#[derive(Serialize)]
struct UsuarioCreateWithId<'a> {
    id: &'a str,
    #[serde(flatten)]
    data: &'a UsuarioCreate,
}

/// Profile rows of the `usuario` table.
#[derive(Clone)]
pub struct UsuarioService {
    tables: TableExecutor,
}

impl UsuarioService {
    pub(crate) fn new(tables: TableExecutor) -> Self {
        Self { tables }
    }

    /// List profiles; embeds the community row by default.
    pub async fn find_all(&self, query: Query) -> Result<Page<Usuario>> {
        let query = apply_defaults(query, SELECT_WITH_CONDOMINIO, &[]);
        self.tables.find_all(TABLE, &query).await
    }

    /// Fetch one profile. `include_relations` embeds the community row;
    /// the plain shape is cheaper and is what the session manager tries
    /// first.
    pub async fn find_by_id(&self, id: &str, include_relations: bool) -> Result<Usuario> {
        let select = if include_relations {
            SELECT_WITH_CONDOMINIO
        } else {
            "*"
        };
        self.tables.find_by_id(TABLE, id, Some(select)).await
    }

    pub async fn create(&self, data: UsuarioCreate) -> Result<Usuario> {
        self.tables.create(TABLE, &data, None).await
    }

    /// Create a profile row whose id matches an auth identity.
    ///
    /// Prefers the `create_usuario_profile` database function, which runs
    /// privileged and sidesteps recursive row policies on `usuario`. When
    /// the function is absent (older deployment), falls back to a direct
    /// insert; a recursion failure there gets a clearer configuration
    /// message because the generic backend text does not say how to fix it.
    pub async fn create_with_id(&self, id: &str, data: UsuarioCreate) -> Result<Usuario> {
        let args = CreateProfileArgs {
            p_id: id,
            p_nome: &data.nome,
            p_email: &data.email,
            p_perfil: data.perfil.unwrap_or_default(),
            p_verificado: data.verificado.unwrap_or(false),
        };

        let created: Result<Vec<ProfileRow>> =
            self.tables.rpc("create_usuario_profile", &args).await;
        match created {
            Ok(rows) => {
                if let Some(row) = rows.into_iter().next() {
                    return Ok(Usuario {
                        id: row.usuario_id,
                        nome: row.usuario_nome,
                        email: row.usuario_email,
                        perfil: row.usuario_perfil.or(data.perfil).unwrap_or_default(),
                        verificado: row.usuario_verificado.unwrap_or(false),
                        telefone: data.telefone,
                        unidade: data.unidade,
                        id_condominio: data.id_condominio,
                        foto_url: None,
                        bio: None,
                        interesses: None,
                        metodo_verificacao: None,
                        condominio: None,
                        data_criacao: None,
                        updated_at: None,
                    });
                }
                // function ran but returned nothing; insert directly
                self.insert_with_id(id, &data).await
            }
            Err(err) if err.is_degradable() => {
                warn!(
                    "[USUARIO] create_usuario_profile unavailable ({}); falling back to direct insert",
                    err
                );
                match self.insert_with_id(id, &data).await {
                    Err(err) if err.to_string().contains("infinite recursion") => {
                        Err(VizinhaLinkError::ConfigurationError(
                            "row policies on 'usuario' recurse and the create_usuario_profile \
                             function is missing; apply the profile-creation migration"
                                .to_string(),
                        ))
                    }
                    other => other,
                }
            }
            Err(err) => Err(err),
        }
    }

    async fn insert_with_id(&self, id: &str, data: &UsuarioCreate) -> Result<Usuario> {
        self.tables
            .create(TABLE, &UsuarioCreateWithId { id, data }, None)
            .await
    }

    /// Partial profile update; stamps `updated_at`.
    pub async fn update(&self, id: &str, mut data: UsuarioUpdate) -> Result<Usuario> {
        data.updated_at = Some(Utc::now());
        self.tables.update(TABLE, id, &data, None).await
    }

    pub async fn delete(&self, id: &str) -> Result<Usuario> {
        self.tables.delete(TABLE, id).await
    }

    /// Residents of one community, as the short directory shape.
    pub async fn find_by_condominio(&self, id_condominio: i64) -> Result<Page<Usuario>> {
        let query = Query::new()
            .with_select(SELECT_RESIDENT_LIST)
            .with_filter(Filter::eq("id_condominio", id_condominio));
        self.tables.find_all(TABLE, &query).await
    }

    pub async fn find_verified(&self) -> Result<Page<Usuario>> {
        let query = Query::new().with_filter(Filter::eq("verificado", true));
        self.tables.find_all(TABLE, &query).await
    }

    pub async fn update_foto_perfil(&self, id: &str, foto_url: &str) -> Result<Usuario> {
        self.update(
            id,
            UsuarioUpdate {
                foto_url: Some(foto_url.to_string()),
                ..UsuarioUpdate::default()
            },
        )
        .await
    }
}
