//! # Cotización de reservas
//!
//! Cuando cambia alguna de las dos fechas del borrador se pide el monto a
//! `GET /api/reserva/calcular-monto?fechaentrada=&fechasalida=` y se escribe
//! en `monto`. Cada solicitud recibe un número creciente; solo la respuesta
//! de la última solicitud emitida puede escribir el monto, las anteriores se
//! descartan aunque lleguen después.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::envelope::interpretar;
use super::middleware::ErrorLogExt;
use super::transport::{Peticion, Transporte};
use super::{AppError, AppResult};
use crate::modelos::{leer_monto, Reserva};

pub const RUTA_COTIZACION: &str = "/api/reserva/calcular-monto";

/// Solicitud de cotización ya numerada.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solicitud {
    pub token: u64,
    pub entrada: NaiveDate,
    pub salida: NaiveDate,
}

/// Monto devuelto para una solicitud concreta.
#[derive(Debug, Clone, PartialEq)]
pub struct Presupuesto {
    pub token: u64,
    pub monto: f64,
}

#[derive(Deserialize)]
struct DatosMonto {
    monto: Value,
}

pub struct Cotizador {
    transporte: Arc<dyn Transporte>,
    ultimo: AtomicU64,
}

impl Cotizador {
    pub fn new(transporte: Arc<dyn Transporte>) -> Self {
        Self {
            transporte,
            ultimo: AtomicU64::new(0),
        }
    }

    /// Comprueba las fechas del borrador y, si se puede cotizar, emite una
    /// solicitud nueva que deja obsoletas a las anteriores.
    ///
    /// # Retorna
    /// `None` si falta alguna fecha (no hay nada que cotizar)
    ///
    /// # Errores
    /// - `ValidationWithField`: la entrada no es anterior a la salida; no se
    ///   emite nada y las solicitudes en curso quedan obsoletas
    pub fn preparar(&self, borrador: &Reserva) -> AppResult<Option<Solicitud>> {
        let rango = match borrador.rango_fechas().log_warn_context("fechas de la reserva") {
            Ok(rango) => rango,
            Err(e) => {
                self.invalidar();
                return Err(e);
            }
        };
        let Some((entrada, salida)) = rango else {
            return Ok(None);
        };

        let token = self.ultimo.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Some(Solicitud {
            token,
            entrada,
            salida,
        }))
    }

    /// Deja obsoletas todas las solicitudes emitidas hasta ahora. Se usa
    /// cuando el borrador cambia de dueño (alta nueva, edición, guardado).
    pub fn invalidar(&self) {
        let anterior = self.ultimo.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(token = anterior, "Cotizaciones en curso invalidadas");
    }

    pub fn es_vigente(&self, token: u64) -> bool {
        self.ultimo.load(Ordering::SeqCst) == token
    }

    /// Pide el monto al servidor. No toca ningún borrador.
    pub async fn consultar(&self, solicitud: &Solicitud) -> AppResult<Presupuesto> {
        let peticion = Peticion::get(RUTA_COTIZACION)
            .with_query("fechaentrada", solicitud.entrada.format("%Y-%m-%d").to_string())
            .with_query("fechasalida", solicitud.salida.format("%Y-%m-%d").to_string());

        let respuesta = self
            .transporte
            .enviar(peticion)
            .await
            .log_error_context("al calcular el monto")?;
        let datos: DatosMonto =
            interpretar(&respuesta, "No se pudo calcular el monto")?.data_as()?;
        let monto = leer_monto(&datos.monto)
            .ok_or_else(|| AppError::Decode(format!("monto no numérico: {}", datos.monto)))?;

        Ok(Presupuesto {
            token: solicitud.token,
            monto,
        })
    }

    /// Escribe el monto en el borrador si el presupuesto es de la última
    /// solicitud. Devuelve si se aplicó.
    pub fn aplicar(&self, borrador: &mut Reserva, presupuesto: &Presupuesto) -> bool {
        if !self.es_vigente(presupuesto.token) {
            tracing::debug!(
                token = presupuesto.token,
                "Cotización obsoleta descartada"
            );
            return false;
        }
        borrador.monto = Some(presupuesto.monto);
        true
    }

    /// Prepara, consulta y aplica en un solo paso.
    ///
    /// # Retorna
    /// El monto aplicado, o `None` si no había fechas o la respuesta quedó obsoleta
    ///
    /// # Errores
    /// Los de [`Cotizador::preparar`] y, si la solicitud sigue vigente, los de
    /// [`Cotizador::consultar`]. El monto anterior se conserva.
    pub async fn recalcular(&self, borrador: &mut Reserva) -> AppResult<Option<f64>> {
        let Some(solicitud) = self.preparar(borrador)? else {
            return Ok(None);
        };

        match self.consultar(&solicitud).await {
            Ok(presupuesto) => Ok(self
                .aplicar(borrador, &presupuesto)
                .then_some(presupuesto.monto)),
            Err(e) if self.es_vigente(solicitud.token) => Err(e),
            Err(e) => {
                tracing::debug!(token = solicitud.token, error = %e, "Error de cotización obsoleta ignorado");
                Ok(None)
            }
        }
    }
}
