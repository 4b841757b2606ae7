//! Collaborative map pins (`localizacao_mapa` table).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::usuario::UsuarioResumo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TipoLocalizacao {
    PontoInteresse,
    Problema,
}

/// A point of interest or reported problem on the community map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalizacaoMapa {
    pub id: i64,
    pub titulo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    pub tipo: TipoLocalizacao,
    pub latitude: f64,
    pub longitude: f64,
    pub id_usuario: String,
    pub id_condominio: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub votos: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_criacao: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usuario: Option<UsuarioResumo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalizacaoMapaCreate {
    pub titulo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    pub tipo: TipoLocalizacao,
    pub latitude: f64,
    pub longitude: f64,
    pub id_usuario: String,
    pub id_condominio: i64,
    /// Filled in by the service; new pins start with zero votes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub votos: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LocalizacaoMapaUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub titulo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo: Option<TipoLocalizacao>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub votos: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tipo_wire_names() {
        assert_eq!(
            serde_json::to_string(&TipoLocalizacao::PontoInteresse).unwrap(),
            "\"ponto_interesse\""
        );
        assert_eq!(
            serde_json::to_string(&TipoLocalizacao::Problema).unwrap(),
            "\"problema\""
        );
    }
}
