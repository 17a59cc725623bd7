//! Fixed-layout dashboard workbook.
//!
//! ```text
//! Sheet: Dashboard
//! |   | Indicador                    | Descripción/Detalle          | sep-24 |
//! |---|------------------------------|------------------------------|--------|
//! |   | Conversaciones               | Q Conversaciones             |        |
//! |   | ...                          | ...                          |        |
//! |   | Mensajes Pushes Enviados     | Q de mensajes enviados ...   | 1542   |
//! ```
//!
//! Every run builds the workbook from scratch; only the metric's own row
//! gets a value in column D.

use crate::error::ReportResult;
use crate::metric::MetricKind;
use crate::result::MetricValue;
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;

pub const SHEET_NAME: &str = "Dashboard";

const COL_LABEL: u16 = 1;
const COL_DESCRIPTION: u16 = 2;
const COL_VALUE: u16 = 3;

const LABEL_WIDTH: f64 = 35.0;
const VALUE_WIDTH: f64 = 15.0;

/// Label and description of dashboard rows 2 through 16.
pub const INDICATORS: [(&str, &str); 15] = [
    ("Conversaciones", "Q Conversaciones"),
    ("Usuarios", "Q Usuarios únicos"),
    (
        "Sesiones abiertas por Pushes",
        "Q Sesiones que se abrieron con una Push",
    ),
    (
        "Sesiones Alcanzadas por Pushes",
        "Q Sesiones que recibieron al menos 1 Push",
    ),
    (
        "Mensajes Pushes Enviados",
        "Q de mensajes enviados bajo el formato push [Hilde gris]",
    ),
    (
        "Contenidos en Botmaker",
        "Contenidos prendidos en botmaker (todos los prendidos, incluy",
    ),
    (
        "Contenidos Prendidos para  el USUARIO",
        "Contenidos prendidos de cara al usuario (relevantes) – (no inclu",
    ),
    ("Interacciones", "Q Interacciones"),
    (
        "Trámites, solicitudes y turnos",
        "Q Trámites, solicitudes y turnos disponibles",
    ),
    (
        "contenidos mas consultados",
        "Q Contenidos con más interacciones en el mes (Top 10)",
    ),
    ("Derivaciones", "Q Derivaciones"),
    (
        "No entendimiento",
        "Performance motor de búsqueda del nuevo modelo de IA",
    ),
    (
        "Tasa de Efectividad",
        "Mide el porcentaje de usuarios que lograron su objetivo [Estadísticas Eventos]",
    ),
    (
        "CES (Customer Effort Score)",
        "Mide la facilidad con la que los usuarios pueden interactuar con",
    ),
    (
        "Satisfacción (CSAT)",
        "Mide la satisfacción usando una escala de 1 a 5, donde 1 es \"muy insatisfecho\"",
    ),
];

/// In-memory description of the workbook about to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardDocument {
    pub period_header: String,
    pub metric: MetricKind,
    pub value: MetricValue,
}

impl DashboardDocument {
    pub fn new(metric: MetricKind, period_header: impl Into<String>, value: MetricValue) -> Self {
        Self {
            period_header: period_header.into(),
            metric,
            value,
        }
    }

    pub fn build_workbook(&self) -> ReportResult<Workbook> {
        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;

        sheet.write_string_with_format(0, COL_LABEL, "Indicador", &header)?;
        sheet.write_string_with_format(0, COL_DESCRIPTION, "Descripción/Detalle", &header)?;
        sheet.write_string_with_format(0, COL_VALUE, &self.period_header, &header)?;

        let target_row = self.metric.dashboard_row();
        for (idx, (label, description)) in INDICATORS.iter().enumerate() {
            // Zero-based sheet row; row 1 holds the headers.
            let row = idx as u32 + 1;
            sheet.write_string(row, COL_LABEL, *label)?;
            sheet.write_string(row, COL_DESCRIPTION, *description)?;
            if row + 1 == target_row {
                sheet.write_number(row, COL_VALUE, self.value.get() as f64)?;
            }
        }

        sheet.set_column_width(COL_LABEL, LABEL_WIDTH)?;
        sheet.set_column_width(COL_DESCRIPTION, self.metric.description_column_width())?;
        sheet.set_column_width(COL_VALUE, VALUE_WIDTH)?;
        Ok(workbook)
    }

    /// Create the workbook at `path`, replacing any existing file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ReportResult<()> {
        let mut workbook = self.build_workbook()?;
        workbook.save(path.as_ref())?;
        Ok(())
    }
}
