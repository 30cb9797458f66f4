use serde::{Deserialize, Serialize};

use super::{Recurso, RecursoId};
use crate::api::{AppError, AppResult};

/// Habitación del hotel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Habitacion {
    pub id: Option<RecursoId>,
    /// Piso, de 1 a 10
    pub habitacionpiso: i32,
    /// Número dentro del piso, de 1 a 20
    pub habitacionnro: i32,
    /// Cantidad de camas, de 1 a 4
    pub cantcamas: i32,
    pub tienetelevision: bool,
    pub tienefrigobar: bool,
}

fn en_rango(campo: &str, valor: i32, min: i32, max: i32) -> AppResult<()> {
    if valor < min || valor > max {
        return Err(AppError::validation_field(
            campo,
            &format!("debe estar entre {} y {}", min, max),
        ));
    }
    Ok(())
}

impl Habitacion {
    /// Etiqueta usada en el selector de habitaciones de una reserva.
    pub fn etiqueta(&self) -> String {
        format!("Piso {}, Número {}", self.habitacionpiso, self.habitacionnro)
    }
}

impl Recurso for Habitacion {
    const RUTA: &'static str = "/api/habitacion";
    const NOMBRE: &'static str = "Habitacion";

    fn id(&self) -> Option<&RecursoId> {
        self.id.as_ref()
    }

    fn validar(&self) -> AppResult<()> {
        en_rango("habitacionpiso", self.habitacionpiso, 1, 10)?;
        en_rango("habitacionnro", self.habitacionnro, 1, 20)?;
        en_rango("cantcamas", self.cantcamas, 1, 4)
    }
}
