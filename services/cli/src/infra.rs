use std::sync::{Arc, Mutex};

use excuse_ladder::config::AppConfig;
use excuse_ladder::workflows::excuses::{
    AuditRegistry, EscalationChain, HandlerKey, LadderContext, Mode, Notice, NotificationPort,
    NotifyError,
};
use tracing::info;

/// Logs every notice and keeps a copy so commands can print what was sent.
#[derive(Default, Clone)]
pub(crate) struct TracingNotifier {
    outbox: Arc<Mutex<Vec<Notice>>>,
}

impl NotificationPort for TracingNotifier {
    fn send(&self, notice: &Notice) -> Result<(), NotifyError> {
        info!(
            to = %notice.to,
            from = %notice.from,
            subject = %notice.subject,
            "notice sent"
        );
        let mut guard = self.outbox.lock().expect("outbox mutex poisoned");
        guard.push(notice.clone());
        Ok(())
    }
}

impl TracingNotifier {
    pub(crate) fn outbox(&self) -> Vec<Notice> {
        self.outbox.lock().expect("outbox mutex poisoned").clone()
    }
}

pub(crate) struct Ladder {
    pub(crate) chain: EscalationChain,
    pub(crate) notifier: Arc<TracingNotifier>,
    pub(crate) registry: Arc<AuditRegistry>,
}

/// Standard four-rung ladder staffed from the configured roster.
pub(crate) fn standard_ladder(config: &AppConfig) -> Ladder {
    let notifier = Arc::new(TracingNotifier::default());
    let registry = Arc::new(AuditRegistry::new());
    let context = LadderContext::new(notifier.clone(), registry.clone(), config.ladder.clone());
    let chain = EscalationChain::standard(context, &config.roster);

    Ladder {
        chain,
        notifier,
        registry,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ModeOverride {
    pub(crate) key: HandlerKey,
    pub(crate) mode: Mode,
}

/// Parses `key=mode`, e.g. `ceo=delegate`.
pub(crate) fn parse_mode_override(raw: &str) -> Result<ModeOverride, String> {
    let (key, mode) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=MODE, got '{raw}'"))?;
    let key = HandlerKey::new(key);
    if key.as_str().is_empty() {
        return Err(format!("missing handler key in '{raw}'"));
    }
    let mode = mode.parse::<Mode>().map_err(|err| err.to_string())?;

    Ok(ModeOverride { key, mode })
}
