//! Feature services: one thin wrapper per table.
//!
//! Each service owns a clone of the [`crate::TableExecutor`] and adds what
//! its screen needs — a default select with relation embeds, a default
//! ordering, the degraded relation-less retry, and a handful of domain
//! helpers. No service talks HTTP directly.

pub mod agenda;
pub mod ajuda_mutua;
pub mod aviso;
pub mod comentario;
pub mod condominio;
pub mod encomenda;
pub mod grupo;
pub mod item_achado_perdido;
pub mod localizacao_mapa;
pub mod mensagem;
pub mod usuario;

pub use agenda::AgendaService;
pub use ajuda_mutua::AjudaMutuaService;
pub use aviso::AvisoService;
pub use comentario::ComentarioService;
pub use condominio::{CondominioAssociado, CondominioService};
pub use encomenda::EncomendaService;
pub use grupo::GrupoService;
pub use item_achado_perdido::ItemAchadoPerdidoService;
pub use localizacao_mapa::LocalizacaoMapaService;
pub use mensagem::MensagemService;
pub use usuario::UsuarioService;

use crate::query::{Order, Query};

/// Fill in a service's default select and ordering, keeping whatever the
/// caller already chose.
pub(crate) fn apply_defaults(mut query: Query, select: &str, order: &[Order]) -> Query {
    if query.select.is_none() {
        query.select = Some(select.to_string());
    }
    if query.order_by.is_empty() {
        query.order_by = order.to_vec();
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Filter;

    #[test]
    fn test_apply_defaults_fills_missing_fields() {
        let query = apply_defaults(
            Query::new(),
            "*, usuario:usuario(id, nome)",
            &[Order::desc("data_criacao")],
        );
        assert_eq!(query.effective_select(), "*, usuario:usuario(id, nome)");
        assert_eq!(query.order_param().unwrap(), "data_criacao.desc");
    }

    #[test]
    fn test_apply_defaults_keeps_caller_choices() {
        let query = Query::new()
            .with_select("id, titulo")
            .with_order(Order::asc("titulo"))
            .with_filter(Filter::eq("id_condominio", 7));
        let query = apply_defaults(query, "*", &[Order::desc("data_criacao")]);
        assert_eq!(query.effective_select(), "id, titulo");
        assert_eq!(query.order_param().unwrap(), "titulo.asc");
        assert_eq!(query.filters.len(), 1);
    }
}
