use straw_core::{find_by_id, ComponentHost};
use straw_test_example::{demo_dir, demo_names, demo_script, demo_session, suite_path};
use straw_tool::assert_suite;

#[test]
fn every_demo_suite_meets_its_expectations() {
    let names = demo_names();
    assert!(!names.is_empty(), "expected at least one demo suite");

    for name in names {
        let report = assert_suite(&demo_dir(&name), &suite_path(&name))
            .unwrap_or_else(|error| panic!("demo {} failed: {}", name, error));
        assert!(!report.runs.is_empty(), "demo {} has no runs", name);
        assert!(report.skipped.is_empty(), "demo {} skipped runs", name);
    }
}

#[test]
fn click_script_leaves_slider_visible_after_two_clicks() {
    let mut session = demo_session("automation").expect("session");
    let source = demo_script("automation", "click_component.rhai").expect("script");

    let run = session.engine.run_script("click_component.rhai", &source);
    assert!(run.passed(), "{:?}", run.outcome);
    assert_eq!(run.log, vec!["[SimpleAutomation] Testing clickComponent".to_string()]);

    let host = session.host.borrow();
    let slider = find_by_id(&*host, "slider").expect("slider");
    assert_eq!(host.is_visible(slider), Some(true));
}

#[test]
fn quit_script_requests_quit() {
    let mut session = demo_session("automation").expect("session");
    let source = demo_script("automation", "quit.rhai").expect("script");

    let run = session.engine.run_script("quit.rhai", &source);
    assert!(run.passed(), "{:?}", run.outcome);
    assert!(run.quit_requested);
    assert!(session.host.borrow().quit_requested());
}
