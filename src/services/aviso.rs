//! Bulletin-board operations.

use chrono::Utc;
use log::warn;

use crate::error::{Result, VizinhaLinkError};
use crate::models::aviso::{
    Aviso, AvisoCreate, AvisoLike, AvisoLikeCreate, AvisoUpdate, Prioridade, TipoAviso,
};
use crate::query::{Filter, Order, Query};
use crate::services::apply_defaults;
use crate::table::{Page, TableExecutor};

const TABLE: &str = "aviso";
const LIKE_TABLE: &str = "aviso_like";
const SELECT_WITH_USUARIO: &str = "*, usuario:usuario(id, nome, foto_url)";

/// Posts of the community bulletin board.
#[derive(Clone)]
pub struct AvisoService {
    tables: TableExecutor,
}

impl AvisoService {
    pub(crate) fn new(tables: TableExecutor) -> Self {
        Self { tables }
    }

    fn defaults(query: Query) -> Query {
        apply_defaults(query, SELECT_WITH_USUARIO, &[Order::desc("data_criacao")])
    }

    /// List posts, newest first, with the author embedded.
    pub async fn find_all(&self, query: Query) -> Result<Page<Aviso>> {
        self.tables.find_all(TABLE, &Self::defaults(query)).await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Aviso> {
        self.tables
            .find_by_id(TABLE, id, Some(SELECT_WITH_USUARIO))
            .await
    }

    /// Publish a post. New posts default to medium priority and start with
    /// zero likes and comments.
    pub async fn create(&self, mut data: AvisoCreate) -> Result<Aviso> {
        data.prioridade = Some(data.prioridade.unwrap_or(Prioridade::Media));
        data.likes = Some(0);
        data.comentarios = Some(0);
        self.tables.create(TABLE, &data, None).await
    }

    /// Edit a post; stamps `data_atualizacao`.
    pub async fn update(&self, id: i64, mut data: AvisoUpdate) -> Result<Aviso> {
        data.data_atualizacao = Some(Utc::now());
        self.tables.update(TABLE, id, &data, None).await
    }

    pub async fn delete(&self, id: i64) -> Result<Aviso> {
        self.tables.delete(TABLE, id).await
    }

    pub async fn find_by_condominio(&self, id_condominio: i64) -> Result<Page<Aviso>> {
        self.find_all(Query::new().with_filter(Filter::eq("id_condominio", id_condominio)))
            .await
    }

    pub async fn find_by_tipo(&self, tipo: TipoAviso, id_condominio: i64) -> Result<Page<Aviso>> {
        self.find_all(
            Query::new()
                .with_filter(Filter::eq("tipo", serde_json::to_value(tipo)?))
                .with_filter(Filter::eq("id_condominio", id_condominio)),
        )
        .await
    }

    pub async fn find_by_prioridade(
        &self,
        prioridade: Prioridade,
        id_condominio: i64,
    ) -> Result<Page<Aviso>> {
        self.find_all(
            Query::new()
                .with_filter(Filter::eq("prioridade", serde_json::to_value(prioridade)?))
                .with_filter(Filter::eq("id_condominio", id_condominio)),
        )
        .await
    }

    /// Whether `user_id` already liked the post.
    pub async fn has_user_liked(&self, aviso_id: i64, user_id: &str) -> Result<bool> {
        let likes: Page<AvisoLike> = self
            .tables
            .find_all(LIKE_TABLE, &Self::like_query(aviso_id, user_id))
            .await?;
        Ok(!likes.is_empty())
    }

    /// Like the post if not yet liked, unlike it otherwise, then return the
    /// reloaded post. An unreadable like state counts as "not liked", the
    /// same as a missing row.
    pub async fn toggle_like(&self, aviso_id: i64, user_id: &str) -> Result<Aviso> {
        let liked = self.has_user_liked(aviso_id, user_id).await.unwrap_or(false);

        if liked {
            let likes: Page<AvisoLike> = self
                .tables
                .find_all(LIKE_TABLE, &Self::like_query(aviso_id, user_id))
                .await?;
            match likes.rows.into_iter().next() {
                Some(like) => {
                    let _removed: AvisoLike = self.tables.delete(LIKE_TABLE, like.id).await?;
                }
                None => {
                    warn!(
                        "[AVISO] like on post {} by {} vanished before removal",
                        aviso_id, user_id
                    );
                    return Err(VizinhaLinkError::QueryError(
                        "like row disappeared before it could be removed".to_string(),
                    ));
                }
            }
        } else {
            let _created: AvisoLike = self
                .tables
                .create(
                    LIKE_TABLE,
                    &AvisoLikeCreate {
                        id_aviso: aviso_id,
                        id_usuario: user_id.to_string(),
                    },
                    None,
                )
                .await?;
        }

        self.find_by_id(aviso_id).await
    }

    /// Unconditionally bump the like counter. Superseded by
    /// [`Self::toggle_like`]; kept for the one legacy screen still using it.
    pub async fn incrementar_likes(&self, id: i64) -> Result<Aviso> {
        let aviso = self.find_by_id(id).await?;
        let likes = aviso.likes.unwrap_or(0);
        self.update(
            id,
            AvisoUpdate {
                likes: Some(likes + 1),
                ..AvisoUpdate::default()
            },
        )
        .await
    }

    fn like_query(aviso_id: i64, user_id: &str) -> Query {
        Query::new()
            .with_filter(Filter::eq("id_aviso", aviso_id))
            .with_filter(Filter::eq("id_usuario", user_id))
    }
}
