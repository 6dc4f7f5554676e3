// src/suites/parse.rs

//! `test_defs.xml` parsing.
//!
//! Only `<test .../>` elements are interpreted; the root element name and
//! any other elements are ignored.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use super::definition::{DEFAULT_RUNNER, TestSuite};

const TEST_ELEMENT: &[u8] = b"test";

/// Parse every `<test>` element in `xml`, in document order.
pub fn parse_definitions(xml: &str) -> Result<Vec<TestSuite>, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut suites = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) if e.name().as_ref() == TEST_ELEMENT => {
                suites.push(parse_test_element(&e)?);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(format!(
                    "malformed XML at byte {}: {err}",
                    reader.buffer_position()
                ));
            }
        }
    }
    Ok(suites)
}

fn parse_test_element(element: &BytesStart<'_>) -> Result<TestSuite, String> {
    let mut name = None;
    let mut build_path = None;
    let mut package = None;
    let mut runner = None;
    let mut class_name = None;
    let mut coverage_target = None;
    let mut continuous = false;
    let mut description = None;

    for attr in element.attributes() {
        let attr = attr.map_err(|err| format!("bad attribute: {err}"))?;
        let value = attr
            .unescape_value()
            .map_err(|err| format!("bad attribute value: {err}"))?
            .into_owned();

        match attr.key.as_ref() {
            b"name" => name = Some(value),
            b"build_path" => build_path = Some(value),
            b"package" => package = Some(value),
            b"runner" => runner = Some(value),
            b"class" => class_name = Some(value),
            b"coverage_target" => coverage_target = Some(value),
            b"continuous" => continuous = value == "true",
            b"description" => description = Some(value),
            _ => {}
        }
    }

    let name = non_empty(name).ok_or("<test> element is missing required attribute 'name'")?;
    let package = non_empty(package)
        .ok_or_else(|| format!("test '{name}' is missing required attribute 'package'"))?;

    Ok(TestSuite {
        name,
        build_path: non_empty(build_path),
        package,
        runner: non_empty(runner).unwrap_or_else(|| DEFAULT_RUNNER.to_string()),
        class_name: non_empty(class_name),
        coverage_target: non_empty(coverage_target),
        continuous,
        description,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_attributes() {
        let suites = parse_definitions(
            r#"<?xml version="1.0"?>
<test-definitions>
  <!-- comment -->
  <test name="frameworks-core" build_path="frameworks/base/tests/CoreTests"
        package="android.core" class="android.core.CoreTests"
        runner="android.test.CustomRunner" coverage_target="framework"
        continuous="true" description="core &amp; friends" />
</test-definitions>"#,
        )
        .unwrap();

        assert_eq!(
            suites,
            vec![TestSuite {
                name: "frameworks-core".into(),
                build_path: Some("frameworks/base/tests/CoreTests".into()),
                package: "android.core".into(),
                runner: "android.test.CustomRunner".into(),
                class_name: Some("android.core.CoreTests".into()),
                coverage_target: Some("framework".into()),
                continuous: true,
                description: Some("core & friends".into()),
            }]
        );
    }

    #[test]
    fn continuous_requires_literal_true() {
        let suites = parse_definitions(
            r#"<t><test name="a" package="p" continuous="yes"></test></t>"#,
        )
        .unwrap();
        assert!(!suites[0].continuous);
        assert_eq!(suites[0].runner, DEFAULT_RUNNER);
    }

    #[test]
    fn missing_name_is_rejected() {
        let err = parse_definitions(r#"<t><test package="p" /></t>"#).unwrap_err();
        assert!(err.contains("'name'"));
    }

    #[test]
    fn malformed_xml_is_rejected() {
        assert!(parse_definitions("<t><test name=\"a\" package=\"p\"></t>").is_err());
    }
}
