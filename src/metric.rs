use crate::date_config::DateConfig;
use serde::{Deserialize, Serialize};

/// The two dashboard metrics this crate knows how to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    MessagesSent,
    SessionsOpenedByPush,
}

/// Category of `starting_cause` that marks a session opened by a push.
pub const PUSH_STARTING_CAUSE: &str = "WhatsAppTemplate";

impl MetricKind {
    pub fn title(&self) -> &'static str {
        match self {
            MetricKind::MessagesSent => "Mensajes Pushes Enviados",
            MetricKind::SessionsOpenedByPush => "Sesiones abiertas por Pushes",
        }
    }

    pub fn file_prefix(&self) -> &'static str {
        match self {
            MetricKind::MessagesSent => "mensajes_pushes_enviados",
            MetricKind::SessionsOpenedByPush => "sesiones_abiertas_pushes",
        }
    }

    /// One-based dashboard row that receives the value.
    pub fn dashboard_row(&self) -> u32 {
        match self {
            MetricKind::MessagesSent => 6,
            MetricKind::SessionsOpenedByPush => 4,
        }
    }

    pub fn dashboard_cell(&self) -> String {
        format!("D{}", self.dashboard_row())
    }

    pub fn description_column_width(&self) -> f64 {
        match self {
            MetricKind::MessagesSent => 60.0,
            MetricKind::SessionsOpenedByPush => 50.0,
        }
    }

    /// Tables the query reads, for diagnostics.
    pub fn source_tables(&self) -> &'static [&'static str] {
        match self {
            MetricKind::MessagesSent => &["boti_event_metrics_2", "boti_message_metrics_2"],
            MetricKind::SessionsOpenedByPush => &["boti_session_metrics_2"],
        }
    }

    pub fn build_sql(&self, period: &DateConfig) -> String {
        let start = period.start_iso();
        let end = period.end_iso();
        match self {
            MetricKind::MessagesSent => format!(
                r#"SELECT count(distinct m.id) as count_messages
FROM "caba-piba-consume-zone-db"."boti_event_metrics_2" ev
JOIN "caba-piba-consume-zone-db"."boti_message_metrics_2" m
ON ev.session_id=m.session_id
WHERE CAST(ev.creation_time AS DATE) BETWEEN date '{start}' and date '{end}'
AND regexp_like(m.message, '^Template')
and events_name in ('notification-status-sent')"#
            ),
            MetricKind::SessionsOpenedByPush => format!(
                r#"SELECT starting_cause, count(distinct (session_id)) as Cant_sesiones
FROM "caba-piba-consume-zone-db"."boti_session_metrics_2"
WHERE CAST(session_creation_time AS DATE) BETWEEN date '{start}' and date '{end}'
group by starting_cause"#
            ),
        }
    }

    pub fn csv_file_name(&self, period: &DateConfig) -> String {
        format!("{}_{}.csv", self.file_prefix(), period.file_stamp())
    }

    pub fn xlsx_file_name(&self, period: &DateConfig) -> String {
        format!("{}_{}.xlsx", self.file_prefix(), period.file_stamp())
    }
}
