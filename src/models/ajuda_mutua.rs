//! Mutual-aid offers and requests (`ajuda_mutua` table).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::usuario::UsuarioResumo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipoAjuda {
    Oferta,
    Pedido,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatusAjuda {
    #[default]
    Aberto,
    Fechado,
}

/// A mutual-aid post: someone offering or asking for help.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AjudaMutua {
    pub id: i64,
    pub titulo: String,
    pub descricao: String,
    pub tipo: TipoAjuda,
    pub status: StatusAjuda,
    pub id_usuario: String,
    pub id_condominio: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_criacao: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_atualizacao: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usuario: Option<UsuarioResumo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AjudaMutuaCreate {
    pub titulo: String,
    pub descricao: String,
    pub tipo: TipoAjuda,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusAjuda>,
    pub id_usuario: String,
    pub id_condominio: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AjudaMutuaUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub titulo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo: Option<TipoAjuda>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusAjuda>,
    /// Stamped by the service on every update
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_atualizacao: Option<DateTime<Utc>>,
}
