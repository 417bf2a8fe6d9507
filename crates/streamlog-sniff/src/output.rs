use serde::Serialize;
use tracing::warn;

use streamlog_core::{Event, EventSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => anyhow::bail!("Invalid output format '{}'. Expected 'text' or 'json'.", s),
        }
    }
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    timestamp: String,
    #[serde(flatten)]
    event: &'a Event,
}

/// Writes every event to stdout, one line each.
pub struct PrintSink {
    format: OutputFormat,
}

impl PrintSink {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    fn render(&self, event: &Event) -> Option<String> {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        match self.format {
            OutputFormat::Text => Some(format_text(&timestamp, event)),
            OutputFormat::Json => {
                let record = JsonRecord { timestamp, event };
                match serde_json::to_string(&record) {
                    Ok(line) => Some(line),
                    Err(e) => {
                        warn!("Failed to encode event: {}", e);
                        None
                    }
                }
            }
        }
    }
}

impl EventSink for PrintSink {
    fn emit(&self, event: Event) {
        if let Some(line) = self.render(&event) {
            println!("{}", line);
        }
    }
}

fn format_text(timestamp: &str, event: &Event) -> String {
    match event {
        Event::Dns(q) => format!("{}  DNS  {:<6} {}", timestamp, q.record_type, q.name),
        Event::Tls(h) => format!("{}  TLS  {:<6} {}", timestamp, "SNI", h.sni_hostname),
    }
}
