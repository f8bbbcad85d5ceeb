use rs_mlscraper::{train, train_with_options, Error, Options, Sample, TrainingSet, Value};

/// Two pages where no selector picks exactly the sampled paragraph
fn imperfect_training_set() -> TrainingSet {
    TrainingSet::new()
        .with_sample(Sample::from_html("<html><body><p>a</p></body></html>", "a"))
        .and_then(|set| {
            set.with_sample(Sample::from_html(
                "<html><body><p>b</p><p>c</p></body></html>",
                "c",
            ))
        })
        .expect("consistent sample shapes")
}

#[test]
fn options_default_values_are_sensible() {
    let options = Options::default();
    assert_eq!(options.max_path_depth, 8);
    assert_eq!(options.max_candidates, 512);
    assert_eq!(options.min_score, 0.0);
    assert!(!options.strict);
    assert!(options.match_attributes);
    assert!(options.positional_selectors);
}

#[test]
fn options_struct_update_syntax_overrides_selected_fields_only() {
    let options = Options {
        strict: true,
        max_path_depth: 3,
        ..Options::default()
    };

    assert!(options.strict);
    assert_eq!(options.max_path_depth, 3);
    assert_eq!(options.max_candidates, 512);
    assert!(options.match_attributes);
}

/// An imperfect best selector is kept with a warning by default
#[test]
fn imperfect_selector_is_accepted_by_default() {
    let set = imperfect_training_set();

    let rule = train(&set).expect("training failed");

    assert_eq!(rule.scrape(&set.samples()[0].page), Value::text("a"));
}

#[test]
fn strict_mode_rejects_imperfect_selector() {
    let set = imperfect_training_set();
    let options = Options {
        strict: true,
        ..Options::default()
    };

    match train_with_options(&set, &options) {
        Err(Error::NoGeneralizingSelector { best_score: Some(score), .. }) => {
            assert!(score > 0.0 && score < 1.0, "unexpected score {score}");
        }
        other => panic!("expected NoGeneralizingSelector, got {other:?}"),
    }
}

#[test]
fn min_score_rejects_weak_selector() {
    let set = imperfect_training_set();
    let options = Options {
        min_score: 0.9,
        ..Options::default()
    };

    assert!(matches!(
        train_with_options(&set, &options),
        Err(Error::NoGeneralizingSelector { .. })
    ));
}

#[test]
fn attribute_matching_can_be_disabled() {
    let set = TrainingSet::new()
        .with_sample(Sample::from_html(
            r#"<html><body><a href="/about">About</a></body></html>"#,
            "/about",
        ))
        .expect("single sample");

    assert!(train(&set).is_ok());

    let options = Options {
        match_attributes: false,
        ..Options::default()
    };
    assert!(matches!(
        train_with_options(&set, &options),
        Err(Error::NoSampleMatch { .. })
    ));
}

#[test]
fn shallow_depth_still_trains() {
    let set = TrainingSet::new()
        .with_sample(Sample::from_html(
            r#"<html><body><div><div><div><span id="v">deep</span></div></div></div></body></html>"#,
            "deep",
        ))
        .expect("single sample");
    let options = Options {
        max_path_depth: 1,
        positional_selectors: false,
        ..Options::default()
    };

    let rule = train_with_options(&set, &options).expect("training failed");

    assert_eq!(rule.scrape(&set.samples()[0].page), Value::text("deep"));
    assert!(rule.selectors().iter().all(|s| !s.as_str().contains(' ')));
}
