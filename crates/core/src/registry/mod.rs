//! Overlay renderer registry keyed by event kind.

use std::collections::BTreeMap;

use crate::timeline::{EventKind, TimelineEvent};

/// Presentation handler for one event kind.
pub trait OverlayRenderer: Send + Sync {
    /// Kind this renderer is registered under.
    fn kind(&self) -> EventKind;

    /// Produces the overlay text for an active event of this kind.
    fn render(&self, event: &TimelineEvent) -> String;
}

/// Text overlay: a fixed headline followed by selected payload fields.
#[derive(Debug, Clone)]
pub struct HeadlineRenderer {
    kind: EventKind,
    headline: &'static str,
    detail_keys: &'static [&'static str],
}

impl HeadlineRenderer {
    pub fn new(
        kind: EventKind,
        headline: &'static str,
        detail_keys: &'static [&'static str],
    ) -> Self {
        Self {
            kind,
            headline,
            detail_keys,
        }
    }
}

impl OverlayRenderer for HeadlineRenderer {
    fn kind(&self) -> EventKind {
        self.kind.clone()
    }

    fn render(&self, event: &TimelineEvent) -> String {
        let details: Vec<&str> = self
            .detail_keys
            .iter()
            .filter_map(|key| event.payload_str(key))
            .collect();
        if details.is_empty() {
            self.headline.to_string()
        } else {
            format!("{} · {}", self.headline, details.join(" · "))
        }
    }
}

/// Registry holding the renderers available to the presentation layer.
#[derive(Default)]
pub struct RendererRegistry {
    renderers: BTreeMap<String, Box<dyn OverlayRenderer>>,
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with a headline renderer for every known kind.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        registry.register(Box::new(HeadlineRenderer::new(
            EventKind::Touchdown,
            "TOUCHDOWN!",
            &["playerName", "teamName"],
        )));
        registry.register(Box::new(HeadlineRenderer::new(
            EventKind::Penalty,
            "FLAG ON THE PLAY!",
            &["callDescription", "team"],
        )));
        registry.register(Box::new(HeadlineRenderer::new(
            EventKind::Turnover,
            "TURNOVER!",
            &["turnoverType", "player", "team"],
        )));
        registry.register(Box::new(HeadlineRenderer::new(
            EventKind::Celebration,
            "CELEBRATE!",
            &["gameContext", "playerName"],
        )));
        registry.register(Box::new(HeadlineRenderer::new(
            EventKind::ControversialCall,
            "GOOD CALL OR BAD CALL?",
            &["callDescription", "gameImpact"],
        )));
        registry.register(Box::new(HeadlineRenderer::new(
            EventKind::MvpVote,
            "VOTE FOR YOUR MVP!",
            &["gameContext"],
        )));
        registry.register(Box::new(HeadlineRenderer::new(
            EventKind::TwoPointKickPoll,
            "BE THE COACH!",
            &["situation", "timeRemaining"],
        )));
        registry.register(Box::new(HeadlineRenderer::new(
            EventKind::StatsComparison,
            "GAME STATS",
            &["gameTitle", "performanceRating"],
        )));
        registry.register(Box::new(HeadlineRenderer::new(
            EventKind::Generic,
            "BIG MOMENT!",
            &[],
        )));

        tracing::info!(count = registry.renderers.len(), "registered overlay renderers");
        registry
    }

    /// Registers a renderer, replacing any previous one for the same kind.
    pub fn register(&mut self, renderer: Box<dyn OverlayRenderer>) {
        let kind = renderer.kind().as_str().to_string();
        if self.renderers.insert(kind.clone(), renderer).is_some() {
            tracing::debug!(%kind, "replaced overlay renderer");
        }
    }

    pub fn get(&self, kind: &EventKind) -> Option<&dyn OverlayRenderer> {
        self.renderers.get(kind.as_str()).map(|renderer| &**renderer)
    }

    pub fn is_registered(&self, kind: &EventKind) -> bool {
        self.renderers.contains_key(kind.as_str())
    }

    /// Registered kind tags, sorted.
    pub fn registered_kinds(&self) -> Vec<&str> {
        self.renderers.keys().map(String::as_str).collect()
    }

    /// Renders `event` with its kind's renderer, if one is registered.
    pub fn render(&self, event: &TimelineEvent) -> Option<String> {
        self.get(&event.kind).map(|renderer| renderer.render(event))
    }
}

impl std::fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererRegistry")
            .field("kinds", &self.registered_kinds())
            .finish()
    }
}
