//! Integration tests for frame-driven effects sharing one scheduler
//!
//! These tests verify that:
//! - A counter driven through its full duration lands exactly on its target
//! - Counters, scrambles and the particle field run side by side
//! - A fault in one loop leaves the others untouched

use vitrine_animation::{
    CounterAnimator, FrameScheduler, FrameStatus, LoopState, ParticleConfig, ParticleSimulation,
    ScrambleEngine,
};
use vitrine_core::{Element, NodeId, Page, RandomSource};

fn portfolio_fragment() -> (Page, NodeId, NodeId, NodeId) {
    let mut page = Page::new();
    let root = page.root();
    let hero = page.append(root, Element::new("section").class("hero").rect(0.0, 0.0, 1200.0, 700.0));
    let number = page.append(
        root,
        Element::new("div")
            .class("stat-item")
            .attr("data-count", "100")
            .child(Element::new("span").class("stat-number").text("0+")),
    );
    let number = page.children(number)[0];
    let title = page.append(root, Element::new("h2").text("About"));
    (page, hero, number, title)
}

/// Counting 0 to 100 over 2000ms ends on exactly "100+", never overshoots
/// and never counts backwards
#[test]
fn test_counter_full_run() {
    let (mut page, _, number, _) = portfolio_fragment();
    let mut scheduler = FrameScheduler::new();
    let mut counters = CounterAnimator::new();
    counters.animate(&mut scheduler, number, 0, 100, 2000.0, 0.0);

    let mut seen = Vec::new();
    let mut now = 0.0;
    while !scheduler.is_empty() {
        now += 1000.0 / 60.0;
        scheduler.tick(&mut page, now);
        let text = page.text(number).unwrap();
        let value: i64 = text.trim_end_matches('+').parse().unwrap();
        assert!(text.ends_with('+'));
        seen.push(value);
    }

    assert_eq!(page.text(number), Some("100+"));
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert!(seen.iter().all(|v| *v <= 100));
    assert!(now >= 2000.0 && now < 2000.0 + 1000.0 / 30.0);
}

/// All engines tick together on a shared scheduler
#[test]
fn test_engines_share_a_scheduler() {
    let (mut page, hero, number, title) = portfolio_fragment();
    let mut scheduler = FrameScheduler::new();
    let mut counters = CounterAnimator::new();
    let mut scramble = ScrambleEngine::new(RandomSource::from_seed(4));

    let particles = ParticleSimulation::new(&page, hero, ParticleConfig::default(), RandomSource::from_seed(4))
        .unwrap()
        .start(&mut scheduler);
    counters.animate(&mut scheduler, number, 0, 25, 500.0, 0.0);
    let done = scramble.set_text(&mut page, &mut scheduler, title, "Skills").unwrap();
    assert_eq!(scheduler.len(), 3);

    for frame in 1..=120 {
        scheduler.tick(&mut page, frame as f64 * 16.0);
    }

    assert_eq!(page.text(number), Some("25+"));
    assert_eq!(page.text(title), Some("Skills"));
    assert!(done.is_complete());
    // Only the perpetual particle loop is left
    assert_eq!(scheduler.len(), 1);
    assert!(particles.is_running());
    assert_eq!(particles.simulation().canvas().circle_count(), 50);
}

/// A loop that faults is removed without disturbing the others
#[test]
fn test_fault_isolation() {
    let (mut page, _, number, _) = portfolio_fragment();
    let mut scheduler = FrameScheduler::new();
    let mut counters = CounterAnimator::new();

    let faulty = scheduler.request_fn("faulty", |frame| {
        if frame.count == 2 {
            panic!("layout went away");
        }
        Ok(FrameStatus::Continue)
    });
    let counter = counters.animate(&mut scheduler, number, 0, 10, 100.0, 0.0);

    for frame in 1..=10 {
        scheduler.tick(&mut page, frame as f64 * 16.0);
    }

    assert_eq!(faulty.state(), LoopState::Faulted);
    assert_eq!(counter.state(), LoopState::Finished);
    assert_eq!(page.text(number), Some("10+"));
}
