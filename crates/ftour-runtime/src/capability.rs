#![forbid(unsafe_code)]

//! Host capabilities consumed by the presentation controller.
//!
//! The controller never talks to a concrete UI toolkit. It consumes three
//! narrow traits, bundled in a [`Host`]:
//!
//! - [`Navigator`]: read the current route, transition to another.
//! - [`Narrator`]: speak text asynchronously, cancel immediately.
//! - [`UiSurface`]: resolve a selector to element geometry, scroll.
//!
//! Every call returns a [`CapabilityResult`]; the controller logs failures and
//! carries on, so a missing capability only removes a visual or audio cue.
//!
//! [`RegionRegistry`] is a ready-made [`UiSurface`] for hosts without a DOM:
//! the host registers named regions and their bounds, and unknown names
//! resolve to nothing.

use std::collections::HashMap;

use ftour_core::geometry::{Bounds, Viewport};
use ftour_script::Selector;

use crate::error::{CapabilityError, CapabilityResult};

/// Route reading and navigation.
pub trait Navigator {
    /// The route currently displayed by the host.
    fn current_route(&self) -> String;

    /// Transition to `route`. Completion is not awaited; the controller waits
    /// a settle delay before querying the new page.
    fn navigate(&mut self, route: &str) -> CapabilityResult<()>;
}

/// A synthesis voice offered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    /// BCP 47 tag, e.g. `fr-FR`.
    pub locale: String,
}

impl Voice {
    pub fn new(name: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            locale: locale.into(),
        }
    }
}

/// One narration request.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub locale: String,
    /// `None` lets the host pick its default voice.
    pub voice: Option<Voice>,
    /// Speaking rate, follows the tour playback speed.
    pub rate: f32,
}

/// Fire-and-forget speech output.
pub trait Narrator {
    /// Voices available for selection. Empty when the host has no preference list.
    fn voices(&self) -> Vec<Voice> {
        Vec::new()
    }

    /// Start speaking. Must return without waiting for the speech to finish.
    fn speak(&mut self, utterance: &Utterance) -> CapabilityResult<()>;

    /// Stop any speech in progress. Must be safe to call when silent.
    fn cancel(&mut self);
}

/// Element lookup and scrolling.
pub trait UiSurface {
    /// Current viewport size in pixels.
    fn viewport(&self) -> Viewport;

    /// Resolve `selector` to zero or more element bounds. A miss is an empty
    /// list, not an error.
    fn query(&self, selector: &Selector) -> CapabilityResult<Vec<Bounds>>;

    fn scroll_to_origin(&mut self) -> CapabilityResult<()>;

    /// Scroll so that `bounds` is centred in the viewport.
    fn scroll_into_view(&mut self, bounds: Bounds) -> CapabilityResult<()>;
}

/// The capabilities a tour session runs against.
pub struct Host {
    pub navigator: Box<dyn Navigator>,
    pub narrator: Box<dyn Narrator>,
    pub surface: Box<dyn UiSurface>,
}

impl Host {
    pub fn new(
        navigator: impl Navigator + 'static,
        narrator: impl Narrator + 'static,
        surface: impl UiSurface + 'static,
    ) -> Self {
        Self {
            navigator: Box::new(navigator),
            narrator: Box::new(narrator),
            surface: Box::new(surface),
        }
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("route", &self.navigator.current_route())
            .field("viewport", &self.surface.viewport())
            .finish()
    }
}

/// Pick a voice for `locale`.
///
/// Preference order:
/// 1. exact locale whose name contains `preferred` (case-insensitive),
/// 2. exact locale,
/// 3. same primary language (`fr` for `fr-FR`),
/// 4. `None`: the host default.
pub fn select_voice(voices: &[Voice], locale: &str, preferred: Option<&str>) -> Option<Voice> {
    let exact = |voice: &&Voice| voice.locale.eq_ignore_ascii_case(locale);
    if let Some(fragment) = preferred.map(str::to_lowercase) {
        if let Some(voice) = voices
            .iter()
            .filter(exact)
            .find(|voice| voice.name.to_lowercase().contains(&fragment))
        {
            return Some(voice.clone());
        }
    }
    if let Some(voice) = voices.iter().find(exact) {
        return Some(voice.clone());
    }
    let language = primary_language(locale);
    voices
        .iter()
        .find(|voice| primary_language(&voice.locale).eq_ignore_ascii_case(language))
        .cloned()
}

fn primary_language(tag: &str) -> &str {
    tag.split(['-', '_']).next().unwrap_or(tag)
}

/// Narrator for hosts without speech synthesis; every request reports
/// [`CapabilityError::Unavailable`].
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNarrator;

impl Narrator for NullNarrator {
    fn speak(&mut self, _utterance: &Utterance) -> CapabilityResult<()> {
        Err(CapabilityError::Unavailable("speech synthesis"))
    }

    fn cancel(&mut self) {}
}

/// Named-region registry: a [`UiSurface`] populated by the host.
///
/// Selectors are matched verbatim against registered names. Scrolling is
/// recorded as a vertical offset so hosts can mirror it.
#[derive(Debug, Clone, Default)]
pub struct RegionRegistry {
    viewport: Viewport,
    regions: HashMap<String, Vec<Bounds>>,
    scroll_y: f32,
}

impl RegionRegistry {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            regions: HashMap::new(),
            scroll_y: 0.0,
        }
    }

    /// Add `bounds` under `name`. Repeated names accumulate elements.
    pub fn register(&mut self, name: impl Into<String>, bounds: Bounds) -> &mut Self {
        self.regions.entry(name.into()).or_default().push(bounds);
        self
    }

    /// Remove every element registered under `name`.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.regions.remove(name).is_some()
    }

    /// Drop every region, e.g. on page change.
    pub fn clear(&mut self) {
        self.regions.clear();
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Current vertical scroll offset in pixels.
    pub fn scroll_y(&self) -> f32 {
        self.scroll_y
    }
}

impl UiSurface for RegionRegistry {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn query(&self, selector: &Selector) -> CapabilityResult<Vec<Bounds>> {
        Ok(self
            .regions
            .get(selector.as_str())
            .cloned()
            .unwrap_or_default())
    }

    fn scroll_to_origin(&mut self) -> CapabilityResult<()> {
        self.scroll_y = 0.0;
        Ok(())
    }

    fn scroll_into_view(&mut self, bounds: Bounds) -> CapabilityResult<()> {
        let centre = bounds.center().y;
        self.scroll_y = (centre - self.viewport.height / 2.0).max(0.0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voices() -> Vec<Voice> {
        vec![
            Voice::new("Thomas", "fr-FR"),
            Voice::new("Google français", "fr-FR"),
            Voice::new("Amélie", "fr-CA"),
            Voice::new("Samantha", "en-US"),
        ]
    }

    #[test]
    fn preferred_voice_wins_within_locale() {
        let voice = select_voice(&voices(), "fr-FR", Some("google")).expect("voice");
        assert_eq!(voice.name, "Google français");
    }

    #[test]
    fn exact_locale_when_preference_missing() {
        let voice = select_voice(&voices(), "fr-FR", Some("Siri")).expect("voice");
        assert_eq!(voice.name, "Thomas");
    }

    #[test]
    fn language_fallback() {
        let voice = select_voice(&voices(), "fr_BE", None).expect("voice");
        assert_eq!(voice.locale, "fr-FR");
        assert!(select_voice(&voices(), "de-DE", Some("Google")).is_none());
        assert!(select_voice(&[], "fr-FR", None).is_none());
    }

    #[test]
    fn registry_miss_is_empty_not_error() {
        let registry = RegionRegistry::new(Viewport::default());
        assert_eq!(registry.query(&Selector::new("#nowhere")), Ok(Vec::new()));
    }

    #[test]
    fn registry_accumulates_and_unregisters() {
        let mut registry = RegionRegistry::new(Viewport::default());
        registry
            .register("#card", Bounds::new(0.0, 0.0, 10.0, 10.0))
            .register("#card", Bounds::new(20.0, 0.0, 10.0, 10.0));
        assert_eq!(registry.query(&Selector::new("#card")).map(|b| b.len()), Ok(2));
        assert!(registry.unregister("#card"));
        assert!(!registry.unregister("#card"));
    }

    #[test]
    fn registry_scroll_centres_element() {
        let mut registry = RegionRegistry::new(Viewport::new(1000.0, 600.0));
        registry
            .scroll_into_view(Bounds::new(0.0, 1500.0, 100.0, 100.0))
            .expect("scroll");
        assert_eq!(registry.scroll_y(), 1250.0);
        registry.scroll_to_origin().expect("scroll");
        assert_eq!(registry.scroll_y(), 0.0);
    }

    #[test]
    fn null_narrator_reports_unavailable() {
        let mut narrator = NullNarrator;
        let utterance = Utterance {
            text: "hello".into(),
            locale: "fr-FR".into(),
            voice: None,
            rate: 1.0,
        };
        assert_eq!(
            narrator.speak(&utterance),
            Err(CapabilityError::Unavailable("speech synthesis"))
        );
        narrator.cancel();
    }
}
