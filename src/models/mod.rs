//! Data models for the community tables.
//!
//! One module per backend table. Field and enum names mirror the backend
//! schema exactly (Portuguese wire names); Create/Update companion structs
//! omit absent optional fields so partial writes stay partial.

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

pub use agenda::{Agenda, AgendaCreate, AgendaUpdate, TipoAgenda};
pub use ajuda_mutua::{AjudaMutua, AjudaMutuaCreate, AjudaMutuaUpdate, StatusAjuda, TipoAjuda};
pub use aviso::{
    Aviso, AvisoCreate, AvisoLike, AvisoLikeCreate, AvisoUpdate, Prioridade, TipoAviso,
};
pub use comentario::{Comentario, ComentarioCreate, ComentarioUpdate};
pub use condominio::{Condominio, CondominioCreate, CondominioUpdate};
pub use encomenda::{Encomenda, EncomendaCreate, EncomendaUpdate, StatusEncomenda};
pub use grupo::{Grupo, GrupoCreate, GrupoMembro, GrupoMembroCreate, GrupoUpdate};
pub use item_achado_perdido::{
    ItemAchadoPerdido, ItemAchadoPerdidoCreate, ItemAchadoPerdidoUpdate, TipoItem,
};
pub use localizacao_mapa::{
    LocalizacaoMapa, LocalizacaoMapaCreate, LocalizacaoMapaUpdate, TipoLocalizacao,
};
pub use mensagem::{Conversa, Mensagem, MensagemCreate, MensagemUpdate};
pub use usuario::{
    MetodoVerificacao, Perfil, Usuario, UsuarioCreate, UsuarioResumo, UsuarioUpdate,
};
