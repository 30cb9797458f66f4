//! # Modelos de la API del hotel
//!
//! Registros que devuelve la API remota y que el panel mantiene en memoria.
//! Los ids los asigna siempre el servidor: un borrador nuevo lleva `id: None`.
//!
//! - [`Persona`] - huéspedes (`/api/persona`)
//! - [`Habitacion`] - habitaciones (`/api/habitacion`)
//! - [`Reserva`] - reservas con monto calculado (`/api/reserva`)

mod habitacion;
mod persona;
mod reserva;

pub use habitacion::Habitacion;
pub use persona::{Persona, PersonaResumen};
pub use reserva::Reserva;
pub(crate) use reserva::leer_monto;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::api::AppResult;

/// Identificador asignado por la API remota.
///
/// El servidor puede usar ids numéricos o de texto. Dos ids son iguales si
/// su forma textual coincide, así `7` y `"7"` identifican el mismo registro.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecursoId {
    Numero(i64),
    Texto(String),
}

impl RecursoId {
    /// Interpreta un segmento de ruta: numérico si se puede, texto si no.
    pub fn from_path(segmento: &str) -> Self {
        match segmento.parse::<i64>() {
            Ok(n) => Self::Numero(n),
            Err(_) => Self::Texto(segmento.to_string()),
        }
    }
}

impl fmt::Display for RecursoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numero(n) => write!(f, "{}", n),
            Self::Texto(s) => f.write_str(s),
        }
    }
}

impl PartialEq for RecursoId {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Numero(a), Self::Numero(b)) => a == b,
            (Self::Texto(a), Self::Texto(b)) => a == b,
            _ => self.to_string() == other.to_string(),
        }
    }
}

impl Eq for RecursoId {}

impl Hash for RecursoId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

impl From<i64> for RecursoId {
    fn from(n: i64) -> Self {
        Self::Numero(n)
    }
}

impl From<&str> for RecursoId {
    fn from(s: &str) -> Self {
        Self::Texto(s.to_string())
    }
}

/// Forma común de los registros sincronizados con una colección remota.
///
/// `Default` produce el borrador en blanco del formulario.
pub trait Recurso:
    Serialize + DeserializeOwned + Clone + fmt::Debug + Default + Send + Sync + 'static
{
    /// Ruta de la colección relativa a la URL base, por ejemplo `/api/persona`.
    const RUTA: &'static str;

    /// Nombre usado en mensajes al usuario ("Persona", "Reserva"...).
    const NOMBRE: &'static str;

    fn id(&self) -> Option<&RecursoId>;

    /// Restricciones de campo que se comprueban antes de enviar un borrador.
    fn validar(&self) -> AppResult<()> {
        Ok(())
    }

    fn ruta_item(id: &RecursoId) -> String {
        format!("{}/{}", Self::RUTA, id)
    }
}

pub(crate) fn requerido(campo: &str, valor: &str) -> AppResult<()> {
    if valor.trim().is_empty() {
        return Err(crate::api::AppError::validation_field(
            campo,
            "es requerido",
        ));
    }
    Ok(())
}
