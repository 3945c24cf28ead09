//! The text attribute surface, driven the way an operator shell would.

use simtemp::attrs::{self, Attr};
use simtemp::generator::Mode;

use crate::mock_hw::make_engine;

#[test]
fn operator_walkthrough() {
    let (mut engine, ticker, _clock) = make_engine();
    engine.start().unwrap();

    // Defaults read back as decimal text.
    assert_eq!(attrs::show(&engine, Attr::SamplingMs), "100\n");
    assert_eq!(attrs::show(&engine, Attr::ThresholdMc), "45000\n");
    assert_eq!(attrs::show(&engine, Attr::Mode), "normal\n");

    // Reconfigure over the text surface; echo conventions apply.
    attrs::store(&engine, Attr::SamplingMs, "500\n").unwrap();
    attrs::store(&engine, Attr::ThresholdMc, "44015\n").unwrap();
    attrs::store(&engine, Attr::Mode, "noisy\n").unwrap();
    assert_eq!(engine.sampling_ms(), 500);
    assert_eq!(engine.threshold_mc(), 44_015);
    assert_eq!(engine.mode(), Mode::Noisy);

    // Counters appear in the stats block after some ticks.
    ticker.fire();
    ticker.fire();
    let stats = attrs::show(&engine, Attr::Stats);
    assert!(stats.starts_with("updates=2\n"), "got {stats:?}");
}

#[test]
fn attribute_lookup_by_exposed_name() {
    assert_eq!(Attr::from_name("sampling_ms"), Some(Attr::SamplingMs));
    assert_eq!(Attr::from_name("threshold_mC"), Some(Attr::ThresholdMc));
    assert_eq!(Attr::from_name("mode"), Some(Attr::Mode));
    assert_eq!(Attr::from_name("stats"), Some(Attr::Stats));
    // Case matters, as it would in a file system tree.
    assert_eq!(Attr::from_name("threshold_mc"), None);
}

#[test]
fn rejected_text_writes_leave_values_and_record_errors() {
    let (engine, _ticker, _clock) = make_engine();

    assert!(attrs::store(&engine, Attr::SamplingMs, "10001").is_err());
    assert!(attrs::store(&engine, Attr::ThresholdMc, "-20001").is_err());
    assert!(attrs::store(&engine, Attr::Mode, "normal please").is_err());

    assert_eq!(attrs::show(&engine, Attr::SamplingMs), "100\n");
    assert_eq!(attrs::show(&engine, Attr::ThresholdMc), "45000\n");
    assert_eq!(attrs::show(&engine, Attr::Mode), "normal\n");

    let stats = attrs::show(&engine, Attr::Stats);
    assert!(stats.ends_with("last_error=-22\n"), "got {stats:?}");
}

#[test]
fn boundary_values_accepted_over_text() {
    let (engine, _ticker, _clock) = make_engine();

    for (attr, value) in [
        (Attr::SamplingMs, "1"),
        (Attr::SamplingMs, "10000"),
        (Attr::ThresholdMc, "-20000"),
        (Attr::ThresholdMc, "60000"),
    ] {
        attrs::store(&engine, attr, value).unwrap();
        assert_eq!(attrs::show(&engine, attr), format!("{value}\n"));
    }
}
