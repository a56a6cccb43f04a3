use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::types::{RecordId, TenantId, WidgetId};

/// all events emitted by pipeline and dashboard operations
///
/// the UI layer drains these to drive its toast/log surface; the library
/// itself never retries or compensates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // pipeline events
    RecordsFetched {
        tenant_id: TenantId,
        fetched: usize,
        valid: usize,
    },
    RecordSkipped {
        record_id: RecordId,
        reason: String,
    },
    ReportComputed {
        tenant_id: TenantId,
        bucket_count: usize,
        total_expected: Money,
    },
    TargetEvaluated {
        tenant_id: TenantId,
        target: Money,
        achieved: Money,
        percent_achieved: Rate,
    },

    // dashboard widget events
    WidgetAdded {
        widget_id: WidgetId,
        kind: String,
    },
    WidgetMoved {
        widget_id: WidgetId,
        x: u32,
        y: u32,
    },
    WidgetResized {
        widget_id: WidgetId,
        width: u32,
        height: u32,
    },
    WidgetFiltersChanged {
        widget_id: WidgetId,
    },
    WidgetRemoved {
        widget_id: WidgetId,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
