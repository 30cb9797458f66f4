//! # Sobre JSON de la API
//!
//! Todas las respuestas siguen la convención
//! `{ status: "success"|"error", data?, message?, errors?: [{message}] }`.
//! Los mensajes de error se leen así: primero la lista `errors` unida en un
//! solo texto, luego `message`, y si no hay nada, el mensaje por defecto de
//! la operación.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::transport::Respuesta;
use super::{AppError, AppResult, ResultExt};

pub const STATUS_SUCCESS: &str = "success";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Envelope {
    pub status: Option<String>,
    pub data: Option<Value>,
    pub message: Option<String>,
    pub errors: Option<Value>,
}

impl Envelope {
    /// Interpreta un cuerpo como sobre. `None` si no es un objeto JSON.
    pub fn parse(cuerpo: &str) -> Option<Self> {
        match serde_json::from_str::<Value>(cuerpo) {
            Ok(valor @ Value::Object(_)) => serde_json::from_value(valor).ok(),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some(STATUS_SUCCESS)
    }

    /// Mensajes por campo unidos con `"; "`, o el `message` suelto.
    pub fn error_message(&self) -> Option<String> {
        let por_campo: Vec<String> = match &self.errors {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    otro => otro.get("message").and_then(Value::as_str).map(str::to_string),
                })
                .filter(|m| !m.trim().is_empty())
                .collect(),
            _ => Vec::new(),
        };

        if !por_campo.is_empty() {
            return Some(por_campo.join("; "));
        }
        self.message.clone().filter(|m| !m.trim().is_empty())
    }

    /// `data` como secuencia, si lo es.
    pub fn data_list<T: DeserializeOwned>(&self) -> Option<Vec<T>> {
        match &self.data {
            Some(valor @ Value::Array(_)) => serde_json::from_value(valor.clone()).ok(),
            _ => None,
        }
    }

    pub fn data_as<T: DeserializeOwned>(&self) -> AppResult<T> {
        let data = self
            .data
            .clone()
            .ok_or_else(|| AppError::Decode("la respuesta no trae data".to_string()))?;
        serde_json::from_value(data).map_err_decode("data con forma inesperada")
    }
}

/// Aplica la convención de errores a una respuesta de una operación.
///
/// - Estado no 2xx: se buscan mensajes estructurados en el cuerpo.
/// - Estado 2xx con `status` distinto de `"success"`: mensaje del servidor.
/// - Estado 2xx con cuerpo vacío: éxito sin `data`.
///
/// # Errores
/// - `Api`: la API rechazó la operación
/// - `Decode`: cuerpo 2xx que no es un sobre JSON
pub fn interpretar(respuesta: &Respuesta, mensaje_defecto: &str) -> AppResult<Envelope> {
    let envelope = Envelope::parse(&respuesta.cuerpo);

    if !respuesta.is_success() {
        let message = envelope
            .as_ref()
            .and_then(Envelope::error_message)
            .unwrap_or_else(|| mensaje_defecto.to_string());
        return Err(AppError::Api {
            status: respuesta.status,
            message,
        });
    }

    let envelope = match envelope {
        Some(envelope) => envelope,
        None if respuesta.cuerpo.trim().is_empty() => Envelope {
            status: Some(STATUS_SUCCESS.to_string()),
            ..Default::default()
        },
        None => {
            return Err(AppError::Decode(
                "la respuesta no es un sobre JSON".to_string(),
            ))
        }
    };

    if !envelope.is_success() {
        return Err(AppError::Api {
            status: respuesta.status,
            message: envelope
                .error_message()
                .unwrap_or_else(|| mensaje_defecto.to_string()),
        });
    }
    Ok(envelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn respuesta(status: u16, cuerpo: Value) -> Respuesta {
        Respuesta {
            status,
            cuerpo: cuerpo.to_string(),
        }
    }

    #[test]
    fn field_errors_win_over_message() {
        let r = respuesta(
            400,
            json!({
                "status": "error",
                "message": "Datos inválidos",
                "errors": [{ "message": "correo ya registrado" }, { "message": "telefono requerido" }]
            }),
        );
        let err = interpretar(&r, "Operacion fallida").unwrap_err();
        assert!(matches!(
            err,
            AppError::Api { status: 400, ref message } if message == "correo ya registrado; telefono requerido"
        ));
    }

    #[test]
    fn falls_back_to_message_then_default() {
        let con_mensaje = respuesta(200, json!({ "status": "error", "message": "Habitación ocupada" }));
        assert_eq!(
            interpretar(&con_mensaje, "Operacion fallida").unwrap_err().user_message(),
            "Habitación ocupada"
        );

        let sin_nada = Respuesta {
            status: 500,
            cuerpo: "<html>Internal Server Error</html>".to_string(),
        };
        assert_eq!(
            interpretar(&sin_nada, "Operacion fallida").unwrap_err().user_message(),
            "Operacion fallida"
        );
    }

    #[test]
    fn empty_errors_list_uses_message() {
        let r = respuesta(422, json!({ "status": "error", "errors": [], "message": "No válido" }));
        assert_eq!(interpretar(&r, "x").unwrap_err().user_message(), "No válido");
    }

    #[test]
    fn success_envelope_passes_through() {
        let r = respuesta(201, json!({ "status": "success", "data": { "id": 1 }, "message": "Creada" }));
        let envelope = interpretar(&r, "x").unwrap();
        assert_eq!(envelope.message.as_deref(), Some("Creada"));
        assert_eq!(envelope.data, Some(json!({ "id": 1 })));
    }

    #[test]
    fn empty_2xx_body_is_success_without_data() {
        let r = Respuesta {
            status: 204,
            cuerpo: String::new(),
        };
        let envelope = interpretar(&r, "x").unwrap();
        assert!(envelope.data.is_none());
    }

    #[test]
    fn non_json_2xx_body_is_decode_error() {
        let r = Respuesta {
            status: 200,
            cuerpo: "ok".to_string(),
        };
        assert!(matches!(interpretar(&r, "x"), Err(AppError::Decode(_))));
    }

    #[test]
    fn data_list_requires_a_sequence() {
        let lista = Envelope::parse(r#"{"status":"success","data":[1,2,3]}"#).unwrap();
        assert_eq!(lista.data_list::<i32>(), Some(vec![1, 2, 3]));

        let objeto = Envelope::parse(r#"{"status":"success","data":{"a":1}}"#).unwrap();
        assert_eq!(objeto.data_list::<i32>(), None);

        assert!(Envelope::parse("[1,2]").is_none());
    }
}
