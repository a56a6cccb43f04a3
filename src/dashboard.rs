use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{PipelineError, Result};
use crate::events::{Event, EventStore};
use crate::types::{OwnerScope, PeriodType, TenantId, WidgetId};

/// grid placement of a widget on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl GridPosition {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Result<Self> {
        let position = Self {
            x,
            y,
            width,
            height,
        };
        position.validate()?;
        Ok(position)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PipelineError::InvalidArgument {
                message: format!("zero-sized widget: {}x{}", self.width, self.height),
            });
        }
        Ok(())
    }
}

/// the reporting widgets backed by the aggregation engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WidgetKind {
    PaymentPipeline,
    IncomingPayments,
    TargetProgress,
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WidgetKind::PaymentPipeline => "payment_pipeline",
            WidgetKind::IncomingPayments => "incoming_payments",
            WidgetKind::TargetProgress => "target_progress",
        };
        write!(f, "{name}")
    }
}

/// per-widget filter state persisted with the layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WidgetFilters {
    pub period_type: PeriodType,
    pub owner_scope: OwnerScope,
}

impl Default for WidgetFilters {
    fn default() -> Self {
        Self {
            period_type: PeriodType::Monthly,
            owner_scope: OwnerScope::All,
        }
    }
}

/// one persisted widget row per user per widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetConfig {
    pub id: WidgetId,
    pub kind: WidgetKind,
    pub position: GridPosition,
    pub filters: WidgetFilters,
    pub settings: serde_json::Value,
}

/// a user's dashboard: persisted UI state, mutated on drag, resize,
/// filter change, and widget removal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardLayout {
    pub user_id: Uuid,
    pub tenant_id: TenantId,
    pub widgets: Vec<WidgetConfig>,
}

impl DashboardLayout {
    /// hard-coded defaults created on first dashboard load
    pub fn with_defaults(user_id: Uuid, tenant_id: TenantId) -> Self {
        let defaults = [
            (WidgetKind::PaymentPipeline, GridPosition { x: 0, y: 0, width: 8, height: 4 }),
            (WidgetKind::IncomingPayments, GridPosition { x: 8, y: 0, width: 4, height: 2 }),
            (WidgetKind::TargetProgress, GridPosition { x: 8, y: 2, width: 4, height: 2 }),
        ];

        Self {
            user_id,
            tenant_id,
            widgets: defaults
                .into_iter()
                .map(|(kind, position)| WidgetConfig {
                    id: Uuid::new_v4(),
                    kind,
                    position,
                    filters: WidgetFilters::default(),
                    settings: serde_json::Value::Object(Default::default()),
                })
                .collect(),
        }
    }

    pub fn widget(&self, id: WidgetId) -> Result<&WidgetConfig> {
        self.widgets
            .iter()
            .find(|w| w.id == id)
            .ok_or(PipelineError::NotFound {
                entity: "widget",
                id,
            })
    }

    fn widget_mut(&mut self, id: WidgetId) -> Result<&mut WidgetConfig> {
        self.widgets
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or(PipelineError::NotFound {
                entity: "widget",
                id,
            })
    }

    /// add a widget instance; each kind appears at most once per user
    pub fn add_widget(
        &mut self,
        kind: WidgetKind,
        position: GridPosition,
        events: &mut EventStore,
    ) -> Result<WidgetId> {
        position.validate()?;

        if self.widgets.iter().any(|w| w.kind == kind) {
            return Err(PipelineError::Conflict {
                entity: "widget",
                message: format!("widget already present: {kind}"),
            });
        }

        let id = Uuid::new_v4();
        self.widgets.push(WidgetConfig {
            id,
            kind,
            position,
            filters: WidgetFilters::default(),
            settings: serde_json::Value::Object(Default::default()),
        });

        events.emit(Event::WidgetAdded {
            widget_id: id,
            kind: kind.to_string(),
        });
        Ok(id)
    }

    pub fn move_widget(
        &mut self,
        id: WidgetId,
        x: u32,
        y: u32,
        events: &mut EventStore,
    ) -> Result<()> {
        let widget = self.widget_mut(id)?;
        widget.position.x = x;
        widget.position.y = y;

        events.emit(Event::WidgetMoved { widget_id: id, x, y });
        Ok(())
    }

    pub fn resize_widget(
        &mut self,
        id: WidgetId,
        width: u32,
        height: u32,
        events: &mut EventStore,
    ) -> Result<()> {
        GridPosition {
            x: 0,
            y: 0,
            width,
            height,
        }
        .validate()?;

        let widget = self.widget_mut(id)?;
        widget.position.width = width;
        widget.position.height = height;

        events.emit(Event::WidgetResized {
            widget_id: id,
            width,
            height,
        });
        Ok(())
    }

    pub fn set_widget_filters(
        &mut self,
        id: WidgetId,
        filters: WidgetFilters,
        events: &mut EventStore,
    ) -> Result<()> {
        let widget = self.widget_mut(id)?;
        widget.filters = filters;

        events.emit(Event::WidgetFiltersChanged { widget_id: id });
        Ok(())
    }

    pub fn remove_widget(&mut self, id: WidgetId, events: &mut EventStore) -> Result<()> {
        let before = self.widgets.len();
        self.widgets.retain(|w| w.id != id);
        if self.widgets.len() == before {
            return Err(PipelineError::NotFound {
                entity: "widget",
                id,
            });
        }

        events.emit(Event::WidgetRemoved { widget_id: id });
        Ok(())
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// restore a persisted layout
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> DashboardLayout {
        DashboardLayout::with_defaults(Uuid::new_v4(), Uuid::new_v4())
    }

    #[test]
    fn test_default_layout_has_all_widgets() {
        let layout = layout();
        assert_eq!(layout.widgets.len(), 3);
        assert!(layout
            .widgets
            .iter()
            .any(|w| w.kind == WidgetKind::PaymentPipeline));
        for widget in &layout.widgets {
            assert!(widget.position.validate().is_ok());
            assert_eq!(widget.filters, WidgetFilters::default());
        }
    }

    #[test]
    fn test_move_and_resize() {
        let mut layout = layout();
        let mut events = EventStore::new();
        let id = layout.widgets[0].id;

        layout.move_widget(id, 4, 6, &mut events).unwrap();
        layout.resize_widget(id, 6, 3, &mut events).unwrap();

        let widget = layout.widget(id).unwrap();
        assert_eq!(widget.position.x, 4);
        assert_eq!(widget.position.y, 6);
        assert_eq!(widget.position.width, 6);
        assert_eq!(widget.position.height, 3);
        assert_eq!(events.events().len(), 2);
    }

    #[test]
    fn test_zero_size_resize_rejected() {
        let mut layout = layout();
        let id = layout.widgets[0].id;

        let err = layout
            .resize_widget(id, 0, 3, &mut EventStore::new())
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidArgument { .. }));
    }

    #[test]
    fn test_missing_widget_not_found() {
        let mut layout = layout();
        let unknown = Uuid::new_v4();

        let err = layout
            .move_widget(unknown, 0, 0, &mut EventStore::new())
            .unwrap_err();
        assert!(matches!(err, PipelineError::NotFound { .. }));
    }

    #[test]
    fn test_duplicate_kind_conflicts() {
        let mut layout = layout();
        let position = GridPosition::new(0, 4, 2, 2).unwrap();

        let err = layout
            .add_widget(WidgetKind::TargetProgress, position, &mut EventStore::new())
            .unwrap_err();
        assert!(matches!(err, PipelineError::Conflict { .. }));
    }

    #[test]
    fn test_remove_then_re_add() {
        let mut layout = layout();
        let mut events = EventStore::new();
        let id = layout
            .widgets
            .iter()
            .find(|w| w.kind == WidgetKind::TargetProgress)
            .unwrap()
            .id;

        layout.remove_widget(id, &mut events).unwrap();
        assert_eq!(layout.widgets.len(), 2);
        assert!(layout.widget(id).is_err());

        let position = GridPosition::new(8, 2, 4, 2).unwrap();
        layout
            .add_widget(WidgetKind::TargetProgress, position, &mut events)
            .unwrap();
        assert_eq!(layout.widgets.len(), 3);
    }

    #[test]
    fn test_filters_update() {
        let mut layout = layout();
        let id = layout.widgets[0].id;
        let user = Uuid::new_v4();

        layout
            .set_widget_filters(
                id,
                WidgetFilters {
                    period_type: PeriodType::Quarterly,
                    owner_scope: OwnerScope::User(user),
                },
                &mut EventStore::new(),
            )
            .unwrap();

        let widget = layout.widget(id).unwrap();
        assert_eq!(widget.filters.period_type, PeriodType::Quarterly);
        assert_eq!(widget.filters.owner_scope, OwnerScope::User(user));
    }

    #[test]
    fn test_json_round_trip() {
        let layout = layout();

        let json = layout.to_json_pretty().unwrap();
        let restored = DashboardLayout::from_json(&json).unwrap();

        assert_eq!(restored, layout);
    }
}
