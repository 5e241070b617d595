//! SDMX generic XML to [`ExchangeRateRecord`]
//!
//! Elements are matched by local name, so any namespace prefix is accepted.
//! Missing numbers become NaN and missing attributes are left out; only a
//! document that is not XML at all fails.

use std::collections::BTreeMap;

use roxmltree::{Document, Node};

use crate::error::FetchError;
use crate::models::{ExchangeRateRecord, Meta, Observation, Series};

/// Parses `xml` fetched from `url` and encodes the record as JSON.
pub fn transform(xml: &str, url: &str) -> Result<String, FetchError> {
    let record = parse_document(xml, url)?;
    serde_json::to_string(&record).map_err(|e| FetchError::Serialize(e.to_string()))
}

/// Parses an SDMX generic data message into a record.
///
/// A whitespace-only body yields an empty record without parsing.
pub fn parse_document(xml: &str, url: &str) -> Result<ExchangeRateRecord, FetchError> {
    if xml.trim().is_empty() {
        return Ok(ExchangeRateRecord::empty(url));
    }

    let doc = Document::parse(xml).map_err(|e| FetchError::Xml(e.to_string()))?;

    let data = doc
        .descendants()
        .filter(|node| has_name(node, "Series"))
        .map(|node| parse_series(&node))
        .collect();

    Ok(ExchangeRateRecord {
        data,
        meta: Meta {
            url: url.to_string(),
        },
    })
}

fn parse_series(series: &Node<'_, '_>) -> Series {
    let mut attributes = series
        .children()
        .find(|node| has_name(node, "Attributes"))
        .map(|node| collect_values(&node))
        .unwrap_or_default();
    attributes.remove("items");

    let items = series
        .descendants()
        .filter(|node| has_name(node, "Obs"))
        .map(|node| parse_observation(&node))
        .collect();

    Series { attributes, items }
}

fn parse_observation(obs: &Node<'_, '_>) -> Observation {
    let mut attributes = obs
        .children()
        .filter(|node| has_name(node, "Attributes"))
        .fold(BTreeMap::new(), |mut acc, node| {
            acc.extend(collect_values(&node));
            acc
        });
    attributes.remove("period");
    attributes.remove("value");

    let period = first_value(obs, "ObsDimension").map(str::to_string);
    let value = first_value(obs, "ObsValue")
        .and_then(parse_leading_float)
        .unwrap_or(f64::NAN);

    Observation {
        attributes,
        period,
        value,
    }
}

/// Collects `<Value id=".." value=".."/>` pairs below `parent`, skipping
/// entries with an empty id or value.
fn collect_values(parent: &Node<'_, '_>) -> BTreeMap<String, String> {
    parent
        .descendants()
        .filter(|node| has_name(node, "Value"))
        .filter_map(|node| {
            let id = node.attribute("id").filter(|id| !id.is_empty())?;
            let value = node.attribute("value").filter(|value| !value.is_empty())?;
            Some((normalize_key(id), value.to_string()))
        })
        .collect()
}

/// `value` attribute of the first descendant element called `name`.
fn first_value<'a>(node: &Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.descendants()
        .find(|child| has_name(child, name))
        .and_then(|child| child.attribute("value"))
}

/// Reads the longest decimal number at the start of `text` and ignores the
/// rest, so `1.23abc` is 1.23. `Infinity` is accepted; `inf` and `nan` are not.
fn parse_leading_float(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let digits = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    if text[end..].starts_with("Infinity") {
        return Some(if text.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let int_digits = digits(end);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits(end + 1);
        end += 1 + frac_digits;
    }
    if int_digits + frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = digits(exp);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }

    text[..end].parse().ok()
}

fn has_name(node: &Node<'_, '_>, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

// == Key Normalization ==
/// Converts an attribute id such as `TIME_FORMAT` into `timeFormat`.
pub fn normalize_key(id: &str) -> String {
    let mut key = String::with_capacity(id.len());

    for (index, word) in split_words(id).into_iter().enumerate() {
        let lower = word.to_lowercase();
        if index == 0 {
            key.push_str(&lower);
            continue;
        }
        let mut chars = lower.chars();
        if let Some(first) = chars.next() {
            key.extend(first.to_uppercase());
            key.push_str(chars.as_str());
        }
    }

    key
}

/// Splits on separators, lower-to-upper transitions, letter/digit transitions
/// and the last capital of an acronym followed by a lowercase letter.
fn split_words(id: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = id.char_indices().collect();
    let mut words = Vec::new();
    let mut start: Option<usize> = None;

    for (i, &(pos, c)) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if let Some(s) = start.take() {
                words.push(&id[s..pos]);
            }
            continue;
        }

        let Some(s) = start else {
            start = Some(pos);
            continue;
        };

        let prev = chars[i - 1].1;
        let next = chars.get(i + 1).map(|&(_, c)| c);
        let boundary = (prev.is_lowercase() && c.is_uppercase())
            || (prev.is_alphabetic() != c.is_alphabetic())
            || (prev.is_uppercase()
                && c.is_uppercase()
                && next.is_some_and(|n| n.is_lowercase()));

        if boundary {
            words.push(&id[s..pos]);
            start = Some(pos);
        }
    }

    if let Some(s) = start {
        words.push(&id[s..]);
    }

    words
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_OBS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<message:GenericData xmlns:message="http://www.sdmx.org/resources/sdmxml/schemas/v2_1/message" xmlns:generic="http://www.sdmx.org/resources/sdmxml/schemas/v2_1/data/generic">
  <message:DataSet>
    <generic:Series>
      <generic:SeriesKey>
        <generic:Value id="FREQ" value="M"/>
        <generic:Value id="CURRENCY" value="USD"/>
      </generic:SeriesKey>
      <generic:Attributes>
        <generic:Value id="TIME_FORMAT" value="P1M"/>
        <generic:Value id="SOURCE_AGENCY" value="4F0"/>
        <generic:Value id="UNIT_MULT" value="0"/>
        <generic:Value id="TITLE_COMPL" value="ECB reference exchange rate, US dollar/Euro"/>
        <generic:Value id="DECIMALS" value="4"/>
        <generic:Value id="UNIT" value="USD"/>
        <generic:Value id="COMPILATION" value=""/>
      </generic:Attributes>
      <generic:Obs>
        <generic:ObsDimension value="2020-01"/>
        <generic:ObsValue value="1.1100"/>
        <generic:Attributes>
          <generic:Value id="OBS_STATUS" value="A"/>
          <generic:Value id="OBS_CONF" value="F"/>
        </generic:Attributes>
      </generic:Obs>
      <generic:Obs>
        <generic:ObsDimension value="2020-02"/>
        <generic:ObsValue value="1.0905"/>
      </generic:Obs>
    </generic:Series>
  </message:DataSet>
</message:GenericData>"#;

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("TIME_FORMAT"), "timeFormat");
        assert_eq!(normalize_key("SOURCE_AGENCY"), "sourceAgency");
        assert_eq!(normalize_key("TITLE_COMPL"), "titleCompl");
        assert_eq!(normalize_key("UNIT"), "unit");
        assert_eq!(normalize_key("obsStatus"), "obsStatus");
        assert_eq!(normalize_key("XMLHttpRequest"), "xmlHttpRequest");
        assert_eq!(normalize_key("--unit  index-base--"), "unitIndexBase");
        assert_eq!(normalize_key(""), "");
    }

    #[test]
    fn test_parse_leading_float() {
        assert_eq!(parse_leading_float("1.1100"), Some(1.11));
        assert_eq!(parse_leading_float("  1.23abc"), Some(1.23));
        assert_eq!(parse_leading_float("-.5e2x"), Some(-50.0));
        assert_eq!(parse_leading_float("7e"), Some(7.0));
        assert_eq!(parse_leading_float("3."), Some(3.0));
        assert_eq!(parse_leading_float("Infinity"), Some(f64::INFINITY));
        assert_eq!(parse_leading_float("-Infinity"), Some(f64::NEG_INFINITY));
        assert_eq!(parse_leading_float("inf"), None);
        assert_eq!(parse_leading_float("nan"), None);
        assert_eq!(parse_leading_float("."), None);
        assert_eq!(parse_leading_float(""), None);
    }

    #[test]
    fn test_whitespace_body_is_empty_record() {
        let record = parse_document(" \n\t ", "http://example.test").unwrap();
        assert_eq!(record, ExchangeRateRecord::empty("http://example.test"));
    }

    #[test]
    fn test_one_series_two_observations() {
        let record = parse_document(TWO_OBS, "http://example.test").unwrap();

        assert_eq!(record.meta.url, "http://example.test");
        assert_eq!(record.data.len(), 1);

        let series = &record.data[0];
        assert_eq!(series.attribute("timeFormat"), Some("P1M"));
        assert_eq!(series.attribute("sourceAgency"), Some("4F0"));
        assert_eq!(series.attribute("unitMult"), Some("0"));
        assert_eq!(series.attribute("decimals"), Some("4"));
        assert_eq!(series.attribute("unit"), Some("USD"));
        // Empty values and series-key values are not header attributes
        assert_eq!(series.attribute("compilation"), None);
        assert_eq!(series.attribute("freq"), None);

        assert_eq!(series.items.len(), 2);
        assert_eq!(series.items[0].period.as_deref(), Some("2020-01"));
        assert_eq!(series.items[0].value, 1.11);
        assert_eq!(series.items[0].attribute("obsStatus"), Some("A"));
        assert_eq!(series.items[0].attribute("obsConf"), Some("F"));
        assert_eq!(series.items[1].period.as_deref(), Some("2020-02"));
        assert_eq!(series.items[1].value, 1.0905);
        assert!(series.items[1].attributes.is_empty());
    }

    #[test]
    fn test_unparseable_value_becomes_nan() {
        let xml = r#"<g:Data xmlns:g="urn:g"><g:Series>
            <g:Obs><g:ObsDimension value="2020-01-02"/><g:ObsValue value="n/a"/></g:Obs>
            <g:Obs><g:ObsDimension value="2020-01-03"/></g:Obs>
            <g:Obs><g:ObsValue value="1.5"/></g:Obs>
            <g:Obs><g:ObsValue value="2.25 (provisional)"/></g:Obs>
        </g:Series></g:Data>"#;

        let record = parse_document(xml, "u").unwrap();
        let items = &record.data[0].items;

        assert_eq!(items.len(), 4);
        assert!(items[0].value.is_nan());
        assert!(items[1].value.is_nan());
        assert_eq!(items[2].period, None);
        assert_eq!(items[2].value, 1.5);
        assert_eq!(items[3].value, 2.25);
        assert!(record.data[0].attributes.is_empty());
    }

    #[test]
    fn test_reserved_attribute_names_do_not_override_fields() {
        let xml = r#"<Data><Series>
            <Attributes><Value id="ITEMS" value="x"/></Attributes>
            <Obs>
                <ObsDimension value="2020-01"/><ObsValue value="2"/>
                <Attributes><Value id="PERIOD" value="bogus"/><Value id="VALUE" value="9"/></Attributes>
            </Obs>
        </Series></Data>"#;

        let json = transform(xml, "u").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(value["data"][0]["items"].is_array());
        assert_eq!(value["data"][0]["items"][0]["period"], "2020-01");
        assert_eq!(value["data"][0]["items"][0]["value"], 2.0);
    }

    #[test]
    fn test_malformed_xml_fails() {
        let result = parse_document("<Series><Obs></Series>", "u");
        assert!(matches!(result, Err(FetchError::Xml(_))));
    }

    #[test]
    fn test_transform_empty_body() {
        assert_eq!(
            transform("", "http://example.test/x").unwrap(),
            r#"{"data":[],"meta":{"url":"http://example.test/x"}}"#
        );
    }
}
