//! # Panel de administración de reservas de hotel
//!
//! Cliente de la API REST del hotel (personas, habitaciones y reservas) con
//! listas locales sincronizadas, cotización de reservas y un panel HTTP.

pub mod api;
pub mod config;
pub mod modelos;
