use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Info,
    Warning,
    Error,
    Security,
}

/// Observability sink with four severity channels. Recording never fails:
/// a broken sink must not hide the error that is being reported.
pub trait Audit {
    fn record(&self, channel: Channel, message: &str, context: Value);

    fn info(&self, message: &str, context: Value) {
        self.record(Channel::Info, message, context);
    }

    fn warning(&self, message: &str, context: Value) {
        self.record(Channel::Warning, message, context);
    }

    fn error(&self, message: &str, context: Value) {
        self.record(Channel::Error, message, context);
    }

    fn security(&self, message: &str, context: Value) {
        self.record(Channel::Security, message, context);
    }
}

/// Forwards audit records to `tracing`. Security events get their own
/// target so they can be routed or filtered independently.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAudit;

impl Audit for TracingAudit {
    fn record(&self, channel: Channel, message: &str, context: Value) {
        match channel {
            Channel::Info => tracing::info!(target: "schoold::audit", %context, "{message}"),
            Channel::Warning => tracing::warn!(target: "schoold::audit", %context, "{message}"),
            Channel::Error => tracing::error!(target: "schoold::audit", %context, "{message}"),
            Channel::Security => {
                tracing::warn!(target: "schoold::security", %context, "{message}")
            }
        }
    }
}
