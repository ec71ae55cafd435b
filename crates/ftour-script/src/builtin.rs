#![forbid(unsafe_code)]

//! Built-in tour of the municipal citizen portal.

use crate::step::{PresentationAction as Action, PresentationStep as Step};
use crate::table::ScriptTable;

/// Routes the portal exposes; the demo host's router is populated from this.
pub const PORTAL_ROUTES: &[&str] = &[
    "/",
    "/services",
    "/register",
    "/cv",
    "/correspondence",
    "/requests",
    "/assistant",
];

/// Steps of the default portal tour.
pub fn municipal_steps() -> Vec<Step> {
    vec![
        Step::new("welcome", "/", "Welcome")
            .icon("home")
            .narration(
                "Welcome to the city hall online portal. I am your assistant and I will \
                 show you around in a couple of minutes.",
            )
            .duration_secs(9)
            .action(Action::scroll_top())
            .action(Action::move_to(50.0, 45.0))
            .action(Action::highlight("#hero-section").delay_ms(1500))
            .action(Action::point("#hero-cta").delay_ms(4500)),
        Step::new("services", "/services", "Online services")
            .icon("grid")
            .narration(
                "Here are the administrative services available online: civil status, \
                 urban planning, social aid and local taxes.",
            )
            .duration_secs(10)
            .action(Action::move_to(25.0, 35.0))
            .action(Action::scroll("#services-grid").delay_ms(600))
            .action(Action::highlight("#services-grid").delay_ms(1200))
            .action(Action::point("[data-service=civil-status]").delay_ms(4000))
            .action(Action::move_to(70.0, 55.0).delay_ms(6500)),
        Step::new("register", "/register", "Create your account")
            .icon("user-plus")
            .narration(
                "To use the services, create your citizen account. Your identity \
                 documents are checked once and reused for every request.",
            )
            .duration_secs(10)
            .action(Action::scroll_top())
            .action(Action::move_to(30.0, 30.0))
            .action(Action::highlight("#registration-form").delay_ms(1000))
            .action(Action::click("#registration-submit").delay_ms(6000)),
        Step::new("cv", "/cv", "CV builder")
            .icon("file-text")
            .narration(
                "The CV builder turns your profile into a professional resume, with \
                 several themes to choose from.",
            )
            .duration_secs(8)
            .action(Action::move_to(65.0, 30.0))
            .action(Action::highlight("#cv-theme-picker").delay_ms(800))
            .action(Action::point("#cv-preview").delay_ms(3500)),
        Step::new("correspondence", "/correspondence", "Correspondence")
            .icon("mail")
            .narration(
                "Every letter exchanged with the administration is kept here, with its \
                 attachments and delivery receipts.",
            )
            .duration_secs(8)
            .action(Action::move_to(20.0, 60.0))
            .action(Action::scroll("#inbox").delay_ms(400))
            .action(Action::highlight("#inbox").delay_ms(1000)),
        Step::new("requests", "/requests", "Track your requests")
            .icon("clipboard-list")
            .narration(
                "Follow each request in real time, from submission to the final \
                 decision, and download your receipts.",
            )
            .duration_secs(9)
            .action(Action::move_to(55.0, 40.0))
            .action(Action::highlight("#request-timeline").delay_ms(900))
            .action(Action::point("#request-status-badge").delay_ms(4200)),
        Step::new("assistant", "/assistant", "Ask the assistant")
            .icon("bot")
            .narration(
                "You can talk to me at any time. Ask a question by voice or by text and \
                 I will guide you to the right service.",
            )
            .duration_secs(8)
            .action(Action::move_to(80.0, 70.0))
            .action(Action::highlight("#assistant-button").delay_ms(700))
            .action(Action::click("#assistant-button").delay_ms(3500)),
        Step::new("farewell", "/", "You are ready")
            .icon("check-circle")
            .narration("That is all. Thank you for following this tour, see you soon!")
            .duration_secs(6)
            .action(Action::scroll_top())
            .action(Action::move_to(50.0, 50.0)),
    ]
}

/// The default portal tour as a validated table.
pub fn municipal_tour() -> ScriptTable {
    // The built-in steps are covered by the unit tests below; validation cannot fail.
    match ScriptTable::new(municipal_steps()) {
        Ok(table) => table,
        Err(err) => unreachable!("built-in tour is invalid: {err}"),
    }
}
