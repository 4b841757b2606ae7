//! Direct-messaging operations.

use std::collections::HashMap;

use log::debug;
use serde_json::json;

use crate::error::Result;
use crate::models::mensagem::{Conversa, Mensagem, MensagemCreate, MensagemUpdate};
use crate::models::usuario::UsuarioResumo;
use crate::query::{Filter, Order, Query};
use crate::services::apply_defaults;
use crate::table::{Page, TableExecutor};

const TABLE: &str = "mensagem";
/// Both participants embed from `usuario`, so each names its foreign key.
const SELECT_WITH_USUARIOS: &str = "*, usuario_origem:usuario!id_usuario_origem(id, nome, foto_url), usuario_destino:usuario!id_usuario_destino(id, nome, foto_url)";

/// Direct messages between residents.
#[derive(Clone)]
pub struct MensagemService {
    tables: TableExecutor,
}

impl MensagemService {
    pub(crate) fn new(tables: TableExecutor) -> Self {
        Self { tables }
    }

    /// List messages oldest-first with both participants embedded.
    pub async fn find_all(&self, query: Query) -> Result<Page<Mensagem>> {
        let query = apply_defaults(query, SELECT_WITH_USUARIOS, &[Order::asc("data_criacao")]);
        self.tables.find_all(TABLE, &query).await
    }

    /// Fetch one message with participants embedded; degrades to the plain
    /// shape when the embeds cannot be resolved.
    pub async fn find_by_id(&self, id: i64) -> Result<Mensagem> {
        match self
            .tables
            .find_by_id(TABLE, id, Some(SELECT_WITH_USUARIOS))
            .await
        {
            Err(err) if err.is_degradable() => {
                debug!(
                    "[MENSAGEM] embedded fetch of message {} failed ({}); retrying without relations",
                    id, err
                );
                self.tables.find_by_id(TABLE, id, None).await
            }
            other => other,
        }
    }

    /// Send a message; new messages start unread.
    pub async fn create(&self, mut data: MensagemCreate) -> Result<Mensagem> {
        data.lida = Some(data.lida.unwrap_or(false));
        self.tables.create(TABLE, &data, None).await
    }

    pub async fn update(&self, id: i64, data: MensagemUpdate) -> Result<Mensagem> {
        self.tables.update(TABLE, id, &data, None).await
    }

    pub async fn delete(&self, id: i64) -> Result<Mensagem> {
        self.tables.delete(TABLE, id).await
    }

    /// Every message exchanged between two residents, oldest first.
    pub async fn find_conversa(&self, id_usuario1: &str, id_usuario2: &str) -> Result<Page<Mensagem>> {
        self.find_all(
            Query::new()
                .with_filter(Filter::in_list(
                    "id_usuario_origem",
                    vec![json!(id_usuario1), json!(id_usuario2)],
                ))
                .with_filter(Filter::in_list(
                    "id_usuario_destino",
                    vec![json!(id_usuario1), json!(id_usuario2)],
                )),
        )
        .await
    }

    pub async fn find_recebidas(&self, id_usuario: &str) -> Result<Page<Mensagem>> {
        self.find_all(Query::new().with_filter(Filter::eq("id_usuario_destino", id_usuario)))
            .await
    }

    pub async fn find_nao_lidas(&self, id_usuario: &str) -> Result<Page<Mensagem>> {
        self.find_all(
            Query::new()
                .with_filter(Filter::eq("id_usuario_destino", id_usuario))
                .with_filter(Filter::eq("lida", false)),
        )
        .await
    }

    /// Mark every unread message from `id_usuario_origem` to `id_usuario`
    /// as read, in one filtered update.
    pub async fn marcar_como_lidas(
        &self,
        id_usuario: &str,
        id_usuario_origem: &str,
    ) -> Result<Vec<Mensagem>> {
        let filters = [
            Filter::eq("id_usuario_destino", id_usuario),
            Filter::eq("id_usuario_origem", id_usuario_origem),
            Filter::eq("lida", false),
        ];
        self.tables
            .update_many(
                TABLE,
                &filters,
                &MensagemUpdate { lida: Some(true) },
                None,
            )
            .await
    }

    /// Assemble the conversation list of a resident: one entry per partner,
    /// carrying the newest message and the unread count.
    ///
    /// A leg that fails to load is skipped rather than failing the whole
    /// list, so one broken direction cannot blank the messaging screen.
    pub async fn find_conversas(&self, id_usuario: &str) -> Result<Vec<Conversa>> {
        let enviadas = self
            .find_all(Query::new().with_filter(Filter::eq("id_usuario_origem", id_usuario)))
            .await;
        let recebidas = self
            .find_all(Query::new().with_filter(Filter::eq("id_usuario_destino", id_usuario)))
            .await;

        let mut todas: Vec<Mensagem> = Vec::new();
        if let Ok(page) = enviadas {
            todas.extend(page.rows);
        }
        if let Ok(page) = recebidas {
            todas.extend(page.rows);
        }
        if todas.is_empty() {
            return Ok(Vec::new());
        }

        let mut conversas: HashMap<String, Conversa> = HashMap::new();
        for mensagem in todas {
            let outro_id = if mensagem.id_usuario_origem == id_usuario {
                mensagem.id_usuario_destino.clone()
            } else {
                mensagem.id_usuario_origem.clone()
            };

            let entry = conversas.entry(outro_id.clone()).or_insert_with(|| Conversa {
                usuario: partner_resumo(&mensagem, id_usuario, &outro_id),
                ultima_mensagem: None,
                nao_lidas_count: 0,
            });

            let newer = match &entry.ultima_mensagem {
                Some(atual) => mensagem.data_criacao > atual.data_criacao,
                None => true,
            };
            if newer {
                entry.ultima_mensagem = Some(mensagem);
            }
        }

        if let Ok(nao_lidas) = self.find_nao_lidas(id_usuario).await {
            for mensagem in nao_lidas.rows {
                if let Some(conversa) = conversas.get_mut(&mensagem.id_usuario_origem) {
                    conversa.nao_lidas_count += 1;
                }
            }
        }

        Ok(conversas.into_values().collect())
    }
}

/// The embedded summary of the conversation partner, or a placeholder when
/// the embed was absent (degraded fetch).
fn partner_resumo(mensagem: &Mensagem, id_usuario: &str, outro_id: &str) -> UsuarioResumo {
    let embedded = if mensagem.id_usuario_origem == id_usuario {
        mensagem.usuario_destino.clone()
    } else {
        mensagem.usuario_origem.clone()
    };
    embedded.unwrap_or_else(|| UsuarioResumo {
        id: outro_id.to_string(),
        nome: "Usuário".to_string(),
        foto_url: None,
        unidade: None,
    })
}
