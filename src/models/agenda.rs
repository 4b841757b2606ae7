//! Shared-resource scheduling (`agenda` table).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::usuario::UsuarioResumo;

/// What kind of resource the booking is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipoAgenda {
    Evento,
    Quadra,
    Item,
}

/// A booking of a shared resource over a time window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agenda {
    pub id: i64,
    pub titulo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    pub tipo: TipoAgenda,
    /// Name of the booked court/item/event space
    pub nome_recurso: String,
    pub data_inicio: DateTime<Utc>,
    pub data_fim: DateTime<Utc>,
    pub id_usuario: String,
    pub id_condominio: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_criacao: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usuario: Option<UsuarioResumo>,
}

impl Agenda {
    /// True when this booking's window overlaps `[inicio, fim)`
    pub fn conflita_com(&self, inicio: DateTime<Utc>, fim: DateTime<Utc>) -> bool {
        self.data_inicio < fim && self.data_fim > inicio
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgendaCreate {
    pub titulo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    pub tipo: TipoAgenda,
    pub nome_recurso: String,
    pub data_inicio: DateTime<Utc>,
    pub data_fim: DateTime<Utc>,
    pub id_usuario: String,
    pub id_condominio: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AgendaUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub titulo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo: Option<TipoAgenda>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome_recurso: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_inicio: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_fim: Option<DateTime<Utc>>,
    /// Stamped by the service on every update
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}
