//! A complete sample portfolio page
//!
//! Laid out for a 1280px wide viewport. Used by the `vitrine` runner and by
//! integration tests.

use vitrine_core::{Element, Page};

pub const PAGE_WIDTH: f32 = 1280.0;
pub const HEADER_HEIGHT: f32 = 80.0;

pub const ABOUT_TOP: f32 = 800.0;
pub const SKILLS_TOP: f32 = 1500.0;
pub const PROJECTS_TOP: f32 = 2200.0;
pub const CONTACT_TOP: f32 = 2900.0;
/// Short enough to be 60% inside the navigation root of an 800px viewport
pub const SECTION_HEIGHT: f32 = 700.0;

/// Skill names and their bar widths
pub const SKILLS: [(&str, &str); 4] = [("Rust", "95"), ("TypeScript", "85"), ("Design", "70"), ("Ops", "60")];

/// `data-count` of each stat item
pub const STATS: [&str; 3] = ["50", "120", "8"];

fn section_header(title: &str) -> Element {
    Element::new("div")
        .class("section-header")
        .rect(140.0, 0.0, 1000.0, 120.0)
        .child(Element::new("h2").text(title).rect(140.0, 0.0, 1000.0, 60.0))
        .child(Element::new("div").class("header-line"))
}

/// Build the sample page
pub fn demo_page() -> Page {
    let mut page = Page::new();
    let root = page.root();

    page.append(
        root,
        Element::new("header").rect(0.0, 0.0, PAGE_WIDTH, HEADER_HEIGHT).child(
            Element::new("ul").class("nav-links").children(
                ["home", "about", "skills", "projects", "contact"]
                    .iter()
                    .enumerate()
                    .map(|(i, id)| {
                        Element::new("li").child(
                            Element::new("a")
                                .attr("href", format!("#{}", id))
                                .text(*id)
                                .rect(600.0 + i as f32 * 120.0, 20.0, 100.0, 40.0),
                        )
                    }),
            ),
        ),
    );

    page.append(
        root,
        Element::new("section")
            .id("home")
            .class("hero")
            .rect(0.0, 0.0, PAGE_WIDTH, 800.0)
            .children([
                Element::new("h1")
                    .class("hero-title")
                    .rect(140.0, 250.0, 1000.0, 120.0)
                    .children(
                        ["Building", "things", "that", "move"]
                            .into_iter()
                            .map(|word| Element::new("span").class("word").text(word)),
                    ),
                Element::new("div").class("floating-element").attr("data-speed", "0.3"),
                Element::new("div").class("floating-element"),
                Element::new("a")
                    .classes("btn btn-secondary")
                    .attr("href", "#projects")
                    .text("See my work")
                    .rect(140.0, 450.0, 200.0, 56.0),
            ]),
    );

    page.append(
        root,
        Element::new("section")
            .id("about")
            .class("animated-section")
            .rect(0.0, 0.0, PAGE_WIDTH, SECTION_HEIGHT)
            .children([
                section_header("About"),
                Element::new("p")
                    .class("reveal-text")
                    .text("I make interfaces feel alive.")
                    .rect(140.0, 160.0, 1000.0, 120.0),
                Element::new("div").class("stats").rect(140.0, 400.0, 1000.0, 160.0).children(
                    STATS.iter().enumerate().map(|(i, count)| {
                        Element::new("div")
                            .class("stat-item")
                            .attr("data-count", *count)
                            .rect(140.0 + i as f32 * 340.0, 400.0, 300.0, 160.0)
                            .child(Element::new("span").class("stat-number").text("0"))
                    }),
                ),
            ])
            .offset_y(ABOUT_TOP),
    );

    page.append(
        root,
        Element::new("section")
            .id("skills")
            .class("animated-section")
            .rect(0.0, 0.0, PAGE_WIDTH, SECTION_HEIGHT)
            .children([
                section_header("Skills"),
                Element::new("div")
                    .class("skills-grid")
                    .rect(140.0, 150.0, 1000.0, 520.0)
                    .children(SKILLS.iter().enumerate().map(|(i, (name, width))| {
                        Element::new("div")
                            .class("skill-card")
                            .attr("data-tilt", "")
                            .rect(140.0 + (i % 2) as f32 * 520.0, 150.0 + (i / 2) as f32 * 270.0, 480.0, 240.0)
                            .child(Element::new("h3").text(*name))
                            .child(Element::new("div").class("progress-bar").attr("data-width", *width))
                    })),
            ])
            .offset_y(SKILLS_TOP),
    );

    page.append(
        root,
        Element::new("section")
            .id("projects")
            .class("animated-section")
            .rect(0.0, 0.0, PAGE_WIDTH, SECTION_HEIGHT)
            .children([
                section_header("Projects"),
                Element::new("div")
                    .class("projects-grid")
                    .rect(140.0, 150.0, 1000.0, 400.0)
                    .children((0..3).map(|i| {
                        Element::new("div")
                            .class("project-card")
                            .attr("data-tilt", "")
                            .text(format!("Project {}", i + 1))
                            .rect(140.0 + i as f32 * 340.0, 150.0, 300.0, 400.0)
                    })),
            ])
            .offset_y(PROJECTS_TOP),
    );

    page.append(
        root,
        Element::new("section")
            .id("contact")
            .class("animated-section")
            .rect(0.0, 0.0, PAGE_WIDTH, SECTION_HEIGHT)
            .children([
                section_header("Contact"),
                Element::new("form")
                    .class("contact-form")
                    .rect(340.0, 150.0, 600.0, 500.0)
                    .children([
                        Element::new("div")
                            .class("form-group")
                            .rect(340.0, 150.0, 600.0, 80.0)
                            .child(Element::new("input").attr("name", "name")),
                        Element::new("div")
                            .class("form-group")
                            .rect(340.0, 240.0, 600.0, 80.0)
                            .child(Element::new("input").attr("name", "email")),
                        Element::new("div")
                            .class("form-group")
                            .rect(340.0, 330.0, 600.0, 160.0)
                            .child(Element::new("textarea").attr("name", "message")),
                        Element::new("button")
                            .classes("btn btn-primary")
                            .text("Send Message")
                            .rect(340.0, 520.0, 200.0, 56.0),
                    ]),
            ])
            .offset_y(CONTACT_TOP),
    );

    page
}
