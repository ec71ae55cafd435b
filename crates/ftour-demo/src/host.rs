#![forbid(unsafe_code)]

//! In-memory portal host: a router over the portal routes, one region
//! registry per page, and a narrator that writes to the log.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use ftour_core::geometry::{Bounds, Viewport};
use ftour_runtime::{
    CapabilityError, CapabilityResult, Host, Navigator, Narrator, RegionRegistry, UiSurface,
    Utterance, Voice,
};
use ftour_script::Selector;
use ftour_script::builtin::PORTAL_ROUTES;
use tracing::{debug, info};

/// Viewports narrower than this hide the CV preview pane.
const NARROW_WIDTH: f32 = 1000.0;

/// Route shared between the router and the page surface.
pub type SharedRoute = Rc<RefCell<String>>;

/// Router accepting the portal routes only.
pub struct PortalRouter {
    route: SharedRoute,
    routes: Vec<String>,
}

impl PortalRouter {
    pub fn new(route: SharedRoute) -> Self {
        Self {
            route,
            routes: PORTAL_ROUTES.iter().map(|r| r.to_string()).collect(),
        }
    }
}

impl Navigator for PortalRouter {
    fn current_route(&self) -> String {
        self.route.borrow().clone()
    }

    fn navigate(&mut self, route: &str) -> CapabilityResult<()> {
        if !self.routes.iter().any(|known| known == route) {
            return Err(CapabilityError::Rejected(format!("unknown route {route}")));
        }
        *self.route.borrow_mut() = route.to_string();
        Ok(())
    }
}

/// Narrator that logs each utterance instead of producing audio.
#[derive(Debug, Default)]
pub struct LogNarrator {
    speaking: bool,
}

impl Narrator for LogNarrator {
    fn voices(&self) -> Vec<Voice> {
        vec![
            Voice::new("Thomas", "fr-FR"),
            Voice::new("Google français", "fr-FR"),
            Voice::new("Samantha", "en-US"),
        ]
    }

    fn speak(&mut self, utterance: &Utterance) -> CapabilityResult<()> {
        self.speaking = true;
        let voice = utterance
            .voice
            .as_ref()
            .map_or("default", |voice| voice.name.as_str());
        info!(
            voice,
            locale = %utterance.locale,
            rate = utterance.rate,
            "narrating: {}",
            utterance.text
        );
        Ok(())
    }

    fn cancel(&mut self) {
        if std::mem::take(&mut self.speaking) {
            debug!("narration cancelled");
        }
    }
}

/// Element lookup scoped to the page of the current route.
pub struct PortalPages {
    route: SharedRoute,
    viewport: Viewport,
    pages: HashMap<String, RegionRegistry>,
}

impl PortalPages {
    /// Lay out the portal pages for `viewport`.
    pub fn new(route: SharedRoute, viewport: Viewport) -> Self {
        let mut pages = HashMap::new();
        for (route, regions) in portal_layout(viewport) {
            let mut registry = RegionRegistry::new(viewport);
            for (name, bounds) in regions {
                registry.register(name, bounds);
            }
            pages.insert(route.to_string(), registry);
        }
        Self {
            route,
            viewport,
            pages,
        }
    }

    fn page(&self) -> Option<&RegionRegistry> {
        self.pages.get(self.route.borrow().as_str())
    }

    fn page_mut(&mut self) -> Option<&mut RegionRegistry> {
        let route = self.route.borrow().clone();
        self.pages.get_mut(&route)
    }

    /// Vertical scroll of the current page.
    pub fn scroll_y(&self) -> f32 {
        self.page().map_or(0.0, RegionRegistry::scroll_y)
    }
}

impl UiSurface for PortalPages {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn query(&self, selector: &Selector) -> CapabilityResult<Vec<Bounds>> {
        match self.page() {
            Some(page) => page.query(selector),
            None => Ok(Vec::new()),
        }
    }

    fn scroll_to_origin(&mut self) -> CapabilityResult<()> {
        match self.page_mut() {
            Some(page) => page.scroll_to_origin(),
            None => Ok(()),
        }
    }

    fn scroll_into_view(&mut self, bounds: Bounds) -> CapabilityResult<()> {
        match self.page_mut() {
            Some(page) => page.scroll_into_view(bounds),
            None => Ok(()),
        }
    }
}

/// Host for the demo, starting on the portal home page.
pub fn portal_host(viewport: Viewport) -> Host {
    let route: SharedRoute = Rc::new(RefCell::new("/".to_string()));
    Host::new(
        PortalRouter::new(route.clone()),
        LogNarrator::default(),
        PortalPages::new(route, viewport),
    )
}

/// Element bounds per route, proportional to the viewport.
fn portal_layout(viewport: Viewport) -> Vec<(&'static str, Vec<(&'static str, Bounds)>)> {
    let at = |x: f32, y: f32, w: f32, h: f32| {
        Bounds::new(
            x / 100.0 * viewport.width,
            y / 100.0 * viewport.height,
            w / 100.0 * viewport.width,
            h / 100.0 * viewport.height,
        )
    };
    let mut cv = vec![("#cv-theme-picker", at(55.0, 15.0, 35.0, 30.0))];
    if viewport.width >= NARROW_WIDTH {
        cv.push(("#cv-preview", at(10.0, 15.0, 40.0, 70.0)));
    }
    vec![
        (
            "/",
            vec![
                ("#hero-section", at(5.0, 10.0, 90.0, 45.0)),
                ("#hero-cta", at(40.0, 45.0, 20.0, 6.0)),
            ],
        ),
        (
            "/services",
            vec![
                ("#services-grid", at(5.0, 20.0, 90.0, 120.0)),
                ("[data-service=civil-status]", at(7.0, 22.0, 28.0, 25.0)),
            ],
        ),
        (
            "/register",
            vec![
                ("#registration-form", at(25.0, 15.0, 50.0, 70.0)),
                ("#registration-submit", at(40.0, 78.0, 20.0, 6.0)),
            ],
        ),
        ("/cv", cv),
        ("/correspondence", vec![("#inbox", at(10.0, 40.0, 80.0, 110.0))]),
        (
            "/requests",
            vec![
                ("#request-timeline", at(10.0, 20.0, 55.0, 60.0)),
                ("#request-status-badge", at(70.0, 22.0, 15.0, 5.0)),
            ],
        ),
        ("/assistant", vec![("#assistant-button", at(85.0, 85.0, 8.0, 10.0))]),
    ]
}
