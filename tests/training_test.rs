use rs_mlscraper::{train, Error, Extractor, Rule, Sample, Selector, TrainingSet, Value};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn training_set(samples: Vec<Sample>) -> TrainingSet {
    let mut set = TrainingSet::new();
    for sample in samples {
        set.add_sample(sample).expect("consistent sample shapes");
    }
    set
}

/// A single value on two pages generalizes to the shared class
#[test]
fn scalar_value_generalizes_across_pages() {
    init_logger();
    let set = training_set(vec![
        Sample::from_html(
            r#"<html><body><p class="test">test</p><p>bla</p></body></html>"#,
            "test",
        ),
        Sample::from_html(
            r#"<html><body><div></div><p class="test">hallo</p></body></html>"#,
            "hallo",
        ),
    ]);

    let rule = train(&set).expect("training failed");

    assert_eq!(rule.selectors(), vec![&Selector::Css(".test".to_string())]);
    for sample in set.samples() {
        assert_eq!(rule.scrape(&sample.page), sample.value);
    }
    let value = rule.scrape_html(r#"<html><body><p>x</p><p class="test">unseen</p></body></html>"#);
    assert_eq!(value, Value::text("unseen"));
}

/// Every key of a dict is trained on its own
#[test]
fn dict_keys_are_trained_independently() {
    init_logger();
    let set = training_set(vec![
        Sample::from_html(
            r#"<html><body><div class="product">
                <h1 class="name">Chair</h1><span class="price">10</span>
            </div></body></html>"#,
            Value::dict([("name", "Chair"), ("price", "10")]),
        ),
        Sample::from_html(
            r#"<html><body><div class="product">
                <span class="badge">new</span><h1 class="name">Table</h1><span class="price">20</span>
            </div></body></html>"#,
            Value::dict([("name", "Table"), ("price", "20")]),
        ),
    ]);

    let rule = train(&set).expect("training failed");
    let Rule::Dict { rules } = &rule else {
        panic!("expected a dict rule, got {rule:?}");
    };
    assert_eq!(
        rules.get("price"),
        Some(&Rule::Value(rs_mlscraper::Matcher::new(
            Selector::Css(".price".to_string()),
            Extractor::Text
        )))
    );

    let value = rule.scrape_html(
        r#"<html><body><div class="product">
            <span class="badge">sale</span><h1 class="name">Lamp</h1><span class="price">5</span>
        </div></body></html>"#,
    );
    assert_eq!(value, Value::dict([("name", "Lamp"), ("price", "5")]));
}

/// Two parallel records round-trip through the trained rule
#[test]
fn list_of_records_round_trips() {
    init_logger();
    let html = r#"<html><body>
        <div><h1>no 1</h1><p>the first one</p></div>
        <div><h1>no 2</h1><p>the second one</p></div>
    </body></html>"#;
    let sample = Value::list([
        Value::dict([("h", "no 1"), ("t", "the first one")]),
        Value::dict([("h", "no 2"), ("t", "the second one")]),
    ]);
    let set = training_set(vec![Sample::from_html(html, sample.clone())]);

    let rule = train(&set).expect("training failed");

    assert_eq!(rule.scrape_html(html), sample);
}

/// A list of plain strings skips elements that are not records
#[test]
fn list_of_strings_skips_noise() {
    init_logger();
    let html = "<html><body><p>a</p><i>noise</i><p>b</p><p>c</p></body></html>";
    let set = training_set(vec![Sample::from_html(html, Value::list(["a", "b", "c"]))]);

    let rule = train(&set).expect("training failed");

    assert_eq!(rule.scrape_html(html), Value::list(["a", "b", "c"]));
    assert_eq!(
        rule.scrape_html("<html><body><p>x</p><p>y</p></body></html>"),
        Value::list(["x", "y"])
    );
}

/// Noise inside an element of the same tag as the records cannot be excluded
#[test]
fn noise_with_record_markup_is_not_separable() {
    init_logger();
    // the unclosed paragraphs parse as four sibling <p>, one holding the noise
    let html = "<html><body><p>a<p><i>noise</i><p>b</p><p>c</p></body></html>";
    let set = training_set(vec![Sample::from_html(html, Value::list(["a", "b", "c"]))]);

    assert!(matches!(train(&set), Err(Error::NoContainerFound)));
}

/// Values found in attributes are read from the attribute
#[test]
fn list_reads_links_from_attributes() {
    init_logger();
    let html = r#"<html><body>
        <div class="answer"><a class="user" href="/u/1">alice</a><span class="votes">5</span></div>
        <div class="answer"><a class="user" href="/u/2">bob</a><span class="votes">7</span></div>
    </body></html>"#;
    let sample = Value::list([
        Value::dict([("user", "/u/1"), ("votes", "5")]),
        Value::dict([("user", "/u/2"), ("votes", "7")]),
    ]);
    let set = training_set(vec![Sample::from_html(html, sample.clone())]);

    let rule = train(&set).expect("training failed");
    assert_eq!(rule.scrape_html(html), sample);

    let unseen = r#"<html><body>
        <div class="answer"><a class="user" href="/u/9">carol</a><span class="votes">0</span></div>
        <div class="answer"><a class="user" href="/u/8">dave</a><span class="votes">2</span></div>
        <div class="answer"><a class="user">ghost</a><span class="votes">1</span></div>
    </body></html>"#;
    assert_eq!(
        rule.scrape_html(unseen),
        Value::list([
            Value::dict([("user", Value::text("/u/9")), ("votes", Value::text("0"))]),
            Value::dict([("user", Value::text("/u/8")), ("votes", Value::text("2"))]),
            Value::dict([("user", Value::Missing), ("votes", Value::text("1"))]),
        ])
    );
}

/// Records with a duplicated value are dropped, but still scraped
#[test]
fn records_with_duplicate_values_are_dropped_from_training() {
    init_logger();
    let html = r#"<html><body><ul>
        <li><b>apple</b><i>1</i></li>
        <li><b>pear</b><i>1</i></li>
        <li><b>plum</b><i>3</i></li>
    </ul></body></html>"#;
    let sample = Value::list([
        Value::dict([("name", "apple"), ("n", "1")]),
        Value::dict([("name", "pear"), ("n", "1")]),
        Value::dict([("name", "plum"), ("n", "3")]),
    ]);
    let set = training_set(vec![Sample::from_html(html, sample.clone())]);

    let rule = train(&set).expect("training failed");

    assert_eq!(rule.scrape_html(html), sample);
}

/// Records listed out of document order cannot be segmented
#[test]
fn records_out_of_document_order_are_rejected() {
    init_logger();
    let html = r#"<html><body>
        <div><h1>no 1</h1><p>first</p></div>
        <div><h1>no 2</h1><p>second</p></div>
    </body></html>"#;
    let sample = Value::list([
        Value::dict([("h", "no 2"), ("t", "second")]),
        Value::dict([("h", "no 1"), ("t", "first")]),
    ]);
    let set = training_set(vec![Sample::from_html(html, sample)]);

    assert!(matches!(train(&set), Err(Error::NoContainerFound)));
}

/// A list value repeated as text is located through its attribute
#[test]
fn list_value_falls_back_to_unique_attribute() {
    init_logger();
    let html = r#"<html><body>
        <ul>
            <li><a href="/u/1">profile</a><span>alice</span></li>
            <li><a href="/u/2">profile</a><span>bob</span></li>
        </ul>
        <p>/u/1</p><p>/u/1</p><p>/u/2</p><p>/u/2</p>
    </body></html>"#;
    let sample = Value::list([
        Value::dict([("link", "/u/1"), ("name", "alice")]),
        Value::dict([("link", "/u/2"), ("name", "bob")]),
    ]);
    let set = training_set(vec![Sample::from_html(html, sample.clone())]);

    let rule = train(&set).expect("training failed");
    let Rule::List { item, .. } = &rule else {
        panic!("expected a list rule, got {rule:?}");
    };
    let Rule::Dict { rules } = item.as_ref() else {
        panic!("expected dict items, got {item:?}");
    };
    assert!(matches!(
        rules.get("link"),
        Some(Rule::Value(matcher)) if matcher.extractor == Extractor::attribute("href")
    ));
    assert_eq!(rule.scrape_html(html), sample);
}

/// List values that are nowhere on the page are reported as such
#[test]
fn list_values_not_on_page_fail() {
    init_logger();
    let set = training_set(vec![Sample::from_html(
        "<html><body><div><h1>1</h1></div><div><h1>2</h1></div></body></html>",
        Value::list([
            Value::dict([("h", "1"), ("x", "zzz")]),
            Value::dict([("h", "2"), ("x", "yyy")]),
        ]),
    )]);

    assert!(matches!(
        train(&set),
        Err(Error::NoSampleMatch { key, value }) if key == "x" && value == "zzz"
    ));
}

/// A key only present in dropped records names the value that was not found
#[test]
fn key_only_in_dropped_records_fails() {
    init_logger();
    let set = training_set(vec![Sample::from_html(
        "<html><body><div><h1>1</h1></div><div><h1>2</h1></div></body></html>",
        Value::list([
            Value::dict([("h", Value::text("1")), ("x", Value::Missing)]),
            Value::dict([("h", Value::text("2")), ("x", Value::text("zzz"))]),
        ]),
    )]);

    assert!(matches!(
        train(&set),
        Err(Error::NoSampleMatch { key, value }) if key == "x" && value == "zzz"
    ));
}

/// Nothing left after dropping duplicates is an error
#[test]
fn only_duplicate_values_fail() {
    init_logger();
    let set = training_set(vec![Sample::from_html(
        "<html><body><p>x</p><p>x</p></body></html>",
        Value::list(["x", "x"]),
    )]);

    assert!(matches!(train(&set), Err(Error::AmbiguousSample { .. })));
}

/// A key missing from one record is scraped as missing there
#[test]
fn optional_record_fields() {
    init_logger();
    let html = r#"<html><body>
        <div class="r"><h2>one</h2><em>hot</em></div>
        <div class="r"><h2>two</h2></div>
    </body></html>"#;
    let sample = Value::list([
        Value::dict([("title", Value::text("one")), ("tag", Value::text("hot"))]),
        Value::dict([("title", Value::text("two")), ("tag", Value::Missing)]),
    ]);
    let set = training_set(vec![Sample::from_html(html, sample.clone())]);

    let rule = train(&set).expect("training failed");

    assert_eq!(rule.scrape_html(html), sample);
}

/// Applying a rule twice gives the same result
#[test]
fn application_is_repeatable() {
    let html = r#"<html><body><ul><li>1</li><li>2</li></ul></body></html>"#;
    let set = training_set(vec![Sample::from_html(html, Value::list(["1", "2"]))]);
    let rule = train(&set).expect("training failed");

    let page = rs_mlscraper::Page::parse(html);
    let first = rule.scrape(&page);
    let second = rule.scrape(&page);
    assert_eq!(first, second);
    assert_eq!(first, Value::list(["1", "2"]));
}

#[test]
fn value_not_on_page_fails() {
    let set = training_set(vec![Sample::from_html(
        "<html><body><p>a</p></body></html>",
        "not there",
    )]);

    assert!(matches!(train(&set), Err(Error::NoSampleMatch { .. })));
}

#[test]
fn empty_training_set_fails() {
    assert!(matches!(train(&TrainingSet::new()), Err(Error::EmptyTrainingSet)));
}

#[test]
fn mixed_sample_shapes_are_rejected() {
    let mut set = TrainingSet::new();
    set.add_sample(Sample::from_html("<p>a</p>", Value::dict([("k", "a")])))
        .expect("first sample");

    let err = set
        .add_sample(Sample::from_html("<p>a</p>", "a"))
        .expect_err("shape mismatch");
    assert!(matches!(err, Error::InconsistentSamples { .. }));
}
