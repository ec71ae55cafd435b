#![allow(dead_code)]

//! Recording capability doubles shared by the integration tests.

use std::cell::RefCell;
use std::rc::Rc;

use ftour_core::geometry::{Bounds, Viewport};
use ftour_runtime::{
    CapabilityError, CapabilityResult, Host, Navigator, Narrator, RegionRegistry, UiSurface,
    Utterance, Voice,
};
use ftour_script::Selector;

/// One recorded capability call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Navigate(String),
    Speak(String),
    CancelSpeech,
    Query(String),
    ScrollTop,
    ScrollInto(Bounds),
}

/// Shared, ordered call log.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<Call>>>);

impl CallLog {
    pub fn push(&self, call: Call) {
        self.0.borrow_mut().push(call);
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().clone()
    }

    /// Calls recorded after the first `mark` entries.
    pub fn since(&self, mark: usize) -> Vec<Call> {
        self.0.borrow().iter().skip(mark).cloned().collect()
    }

    pub fn spoken(&self) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::Speak(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::Navigate(route) => Some(route.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn queried(&self, selector: &str) -> usize {
        self.0
            .borrow()
            .iter()
            .filter(|call| matches!(call, Call::Query(s) if s == selector))
            .count()
    }
}

pub struct SpyNavigator {
    route: String,
    refuse: bool,
    log: CallLog,
}

impl Navigator for SpyNavigator {
    fn current_route(&self) -> String {
        self.route.clone()
    }

    fn navigate(&mut self, route: &str) -> CapabilityResult<()> {
        self.log.push(Call::Navigate(route.to_string()));
        if self.refuse {
            return Err(CapabilityError::Rejected(format!("no route {route}")));
        }
        self.route = route.to_string();
        Ok(())
    }
}

pub struct SpyNarrator {
    available: bool,
    log: CallLog,
}

impl Narrator for SpyNarrator {
    fn voices(&self) -> Vec<Voice> {
        vec![Voice::new("Google français", "fr-FR")]
    }

    fn speak(&mut self, utterance: &Utterance) -> CapabilityResult<()> {
        if !self.available {
            return Err(CapabilityError::Unavailable("speech synthesis"));
        }
        self.log.push(Call::Speak(utterance.text.clone()));
        Ok(())
    }

    fn cancel(&mut self) {
        self.log.push(Call::CancelSpeech);
    }
}

pub struct SpySurface {
    registry: RegionRegistry,
    log: CallLog,
}

impl UiSurface for SpySurface {
    fn viewport(&self) -> Viewport {
        self.registry.viewport()
    }

    fn query(&self, selector: &Selector) -> CapabilityResult<Vec<Bounds>> {
        self.log.push(Call::Query(selector.as_str().to_string()));
        self.registry.query(selector)
    }

    fn scroll_to_origin(&mut self) -> CapabilityResult<()> {
        self.log.push(Call::ScrollTop);
        self.registry.scroll_to_origin()
    }

    fn scroll_into_view(&mut self, bounds: Bounds) -> CapabilityResult<()> {
        self.log.push(Call::ScrollInto(bounds));
        self.registry.scroll_into_view(bounds)
    }
}

/// Builder for a spy host.
pub struct SpyHost {
    route: String,
    regions: Vec<(String, Bounds)>,
    speech: bool,
    refuse_navigation: bool,
}

impl SpyHost {
    pub fn at(route: &str) -> Self {
        Self {
            route: route.to_string(),
            regions: Vec::new(),
            speech: true,
            refuse_navigation: false,
        }
    }

    pub fn region(mut self, name: &str, bounds: Bounds) -> Self {
        self.regions.push((name.to_string(), bounds));
        self
    }

    pub fn without_speech(mut self) -> Self {
        self.speech = false;
        self
    }

    pub fn refusing_navigation(mut self) -> Self {
        self.refuse_navigation = true;
        self
    }

    pub fn build(self) -> (Host, CallLog) {
        let log = CallLog::default();
        let mut registry = RegionRegistry::new(Viewport::new(1000.0, 800.0));
        for (name, bounds) in self.regions {
            registry.register(name, bounds);
        }
        let host = Host::new(
            SpyNavigator {
                route: self.route,
                refuse: self.refuse_navigation,
                log: log.clone(),
            },
            SpyNarrator {
                available: self.speech,
                log: log.clone(),
            },
            SpySurface {
                registry,
                log: log.clone(),
            },
        );
        (host, log)
    }
}

pub fn ms(value: u64) -> std::time::Duration {
    std::time::Duration::from_millis(value)
}

/// Tick `tour` in `step` increments for `total`.
pub fn run_for(tour: &mut ftour_runtime::PresentationController, total: u64, step: u64) {
    let mut left = total;
    while left > 0 {
        let dt = left.min(step);
        tour.tick(ms(dt));
        left -= dt;
    }
}
