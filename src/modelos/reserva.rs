use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{PersonaResumen, Recurso, RecursoId};
use crate::api::{AppError, AppResult};

/// Reserva de una habitación por una persona entre dos fechas.
///
/// `monto` lo calcula el servidor; en el formulario se rellena con la
/// cotización de [`crate::api::Cotizador`] y es de solo lectura.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reserva {
    pub id: Option<RecursoId>,
    #[serde(with = "fecha")]
    pub fechaentrada: Option<NaiveDate>,
    #[serde(with = "fecha")]
    pub fechasalida: Option<NaiveDate>,
    pub habitacionid: Option<RecursoId>,
    pub personaid: Option<RecursoId>,
    /// Algunas respuestas embeben la persona en lugar de `personaid`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persona: Option<PersonaResumen>,
    #[serde(deserialize_with = "monto::deserialize")]
    pub monto: Option<f64>,
}

/// Lee un monto que el servidor puede mandar como número o como texto
/// (`"400.00"`).
pub(crate) fn leer_monto(valor: &Value) -> Option<f64> {
    match valor {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl Reserva {
    /// Id de la persona, venga como `personaid` o como resumen embebido.
    pub fn persona_id(&self) -> Option<&RecursoId> {
        self.personaid
            .as_ref()
            .or_else(|| self.persona.as_ref().map(|p| &p.id))
    }

    /// Devuelve el par de fechas si ambas están presentes.
    ///
    /// # Errores
    /// - `ValidationWithField`: si la entrada no es estrictamente anterior a la salida
    pub fn rango_fechas(&self) -> AppResult<Option<(NaiveDate, NaiveDate)>> {
        match (self.fechaentrada, self.fechasalida) {
            (Some(entrada), Some(salida)) if entrada < salida => Ok(Some((entrada, salida))),
            (Some(_), Some(_)) => Err(AppError::validation_field(
                "fechasalida",
                "La fecha de entrada debe ser anterior a la fecha de salida",
            )),
            _ => Ok(None),
        }
    }
}

impl Recurso for Reserva {
    const RUTA: &'static str = "/api/reserva";
    const NOMBRE: &'static str = "Reserva";

    fn id(&self) -> Option<&RecursoId> {
        self.id.as_ref()
    }

    fn validar(&self) -> AppResult<()> {
        if self.rango_fechas()?.is_none() {
            return Err(AppError::Validation(
                "Las fechas de entrada y salida son requeridas".to_string(),
            ));
        }
        if self.habitacionid.is_none() {
            return Err(AppError::validation_field("habitacionid", "Seleccione una Habitacion"));
        }
        if self.persona_id().is_none() {
            return Err(AppError::validation_field("personaid", "Seleccione una Persona"));
        }
        Ok(())
    }
}

/// Fechas `YYYY-MM-DD`. Al leer se acepta también un timestamp ISO completo
/// (solo cuenta el día) y el texto vacío como ausencia de fecha.
mod fecha {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMATO: &str = "%Y-%m-%d";

    pub fn serialize<S>(fecha: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match fecha {
            Some(f) => serializer.serialize_str(&f.format(FORMATO).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let texto: Option<String> = Option::deserialize(deserializer)?;
        match texto.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(texto) => {
                let dia = texto.get(..10).unwrap_or(texto);
                NaiveDate::parse_from_str(dia, FORMATO)
                    .map(Some)
                    .map_err(|_| serde::de::Error::custom("Formato de fecha inválido, use YYYY-MM-DD"))
            }
        }
    }
}

mod monto {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(valor) => super::leer_monto(&valor).map(Some).ok_or_else(|| {
                serde::de::Error::custom(format!("monto no numérico: {}", valor))
            }),
        }
    }
}
