// src/feed.rs
use crate::error::Error;
use chrono::NaiveDate;
use quick_xml::events::Event;
use quick_xml::Reader;

/// Maturity bucket element names, in output column order. The treasury feed
/// publishes up to one rate per bucket per observation date.
pub const MATURITIES: [&str; 12] = [
    "BC_1MONTH",
    "BC_2MONTH",
    "BC_3MONTH",
    "BC_6MONTH",
    "BC_1YEAR",
    "BC_2YEAR",
    "BC_3YEAR",
    "BC_5YEAR",
    "BC_7YEAR",
    "BC_10YEAR",
    "BC_20YEAR",
    "BC_30YEAR",
];

/// One observation date's yield curve, as published in a feed entry.
/// A rate is `None` when the bucket was not published for that date
/// (2-month bills, for instance, only exist from 2018 on).
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySet {
    pub date: NaiveDate,
    pub rates: [Option<String>; 12],
}

/// The element whose text we are currently inside, if it is one we keep.
#[derive(Clone, Copy)]
enum Field {
    Date,
    Rate(usize),
}

fn classify(local_name: &[u8]) -> Option<Field> {
    if local_name == b"NEW_DATE" {
        return Some(Field::Date);
    }
    MATURITIES
        .iter()
        .position(|m| m.as_bytes() == local_name)
        .map(Field::Rate)
}

#[derive(Default)]
struct EntryBuilder {
    date: Option<String>,
    rates: [Option<String>; 12],
}

impl EntryBuilder {
    fn set(&mut self, field: Field, value: String) {
        if value.is_empty() {
            return;
        }
        match field {
            Field::Date => self.date = Some(value),
            Field::Rate(i) => self.rates[i] = Some(value),
        }
    }

    fn finish(self, year: i32) -> Result<PropertySet, Error> {
        let raw = self.date.ok_or_else(|| Error::InvalidFeedData {
            year,
            reason: "entry is missing NEW_DATE".into(),
        })?;
        let date = parse_entry_date(&raw).ok_or_else(|| Error::InvalidFeedData {
            year,
            reason: format!("unparseable NEW_DATE: {raw}"),
        })?;
        Ok(PropertySet {
            date,
            rates: self.rates,
        })
    }
}

/// The feed publishes `Edm.DateTime` values (`2020-01-02T00:00:00`); only the
/// date part matters.
fn parse_entry_date(raw: &str) -> Option<NaiveDate> {
    let date = raw.split('T').next().unwrap_or(raw);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Parse one year's XML feed into its entries, in document order.
///
/// The live feed is an Atom document with OData namespace prefixes on the
/// interesting elements (`m:properties`, `d:NEW_DATE`, `d:BC_*`). Matching on
/// local names keeps the parse independent of the prefixes. Absent or
/// `m:null="true"` buckets stay `None`; they are never defaulted to zero.
///
/// A document without a `feed` root, or a feed with no entries, is unusable
/// and reported as invalid data rather than an empty result.
pub fn parse_feed(xml: &str, year: i32) -> Result<Vec<PropertySet>, Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut saw_feed = false;
    let mut current: Option<EntryBuilder> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"feed" => saw_feed = true,
                b"properties" => current = Some(EntryBuilder::default()),
                name => {
                    field = if current.is_some() {
                        classify(name)
                    } else {
                        None
                    };
                }
            },
            // self-closed elements (m:null="true") carry no value
            Event::Empty(_) => {}
            Event::Text(t) => {
                if let (Some(entry), Some(field)) = (current.as_mut(), field) {
                    entry.set(field, t.unescape()?.into_owned());
                }
            }
            Event::End(e) => {
                if e.local_name().as_ref() == b"properties" {
                    if let Some(entry) = current.take() {
                        entries.push(entry.finish(year)?);
                    }
                }
                field = None;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_feed {
        return Err(Error::InvalidFeedData {
            year,
            reason: "document has no feed element".into(),
        });
    }
    if entries.is_empty() {
        return Err(Error::InvalidFeedData {
            year,
            reason: "feed contains no entries".into(),
        });
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED_HEADER: &str = r#"<?xml version="1.0" encoding="utf-8" standalone="yes"?>
<feed xml:base="http://data.treasury.gov/Feed.svc/"
      xmlns:d="http://schemas.microsoft.com/ado/2007/08/dataservices"
      xmlns:m="http://schemas.microsoft.com/ado/2007/08/dataservices/metadata"
      xmlns="http://www.w3.org/2005/Atom">
  <title type="text">DailyTreasuryYieldCurveRateData</title>"#;

    fn feed_doc(entries: &str) -> String {
        format!("{FEED_HEADER}\n{entries}\n</feed>")
    }

    fn entry(properties: &str) -> String {
        format!(
            "<entry><content type=\"application/xml\"><m:properties>{properties}</m:properties></content></entry>"
        )
    }

    #[test]
    fn parses_namespaced_entries_into_maturity_slots() -> Result<(), Error> {
        let xml = feed_doc(&entry(
            r#"<d:NEW_DATE m:type="Edm.DateTime">2020-01-02T00:00:00</d:NEW_DATE>
               <d:BC_1MONTH m:type="Edm.Double">1.55</d:BC_1MONTH>
               <d:BC_2MONTH m:null="true" />
               <d:BC_10YEAR m:type="Edm.Double">1.88</d:BC_10YEAR>
               <d:BC_30YEAR m:type="Edm.Double">2.33</d:BC_30YEAR>"#,
        ));

        let entries = parse_feed(&xml, 2020)?;
        assert_eq!(entries.len(), 1);

        let ps = &entries[0];
        assert_eq!(ps.date, NaiveDate::from_ymd_opt(2020, 1, 2).unwrap());
        assert_eq!(ps.rates[0].as_deref(), Some("1.55"));
        assert_eq!(ps.rates[1], None); // m:null="true"
        assert_eq!(ps.rates[9].as_deref(), Some("1.88"));
        assert_eq!(ps.rates[11].as_deref(), Some("2.33"));
        // buckets the feed never mentioned stay absent
        assert_eq!(ps.rates[4], None);
        Ok(())
    }

    #[test]
    fn preserves_document_order_across_entries() -> Result<(), Error> {
        let entries_xml = format!(
            "{}{}",
            entry(r#"<d:NEW_DATE>1990-01-03T00:00:00</d:NEW_DATE><d:BC_1YEAR>7.94</d:BC_1YEAR>"#),
            entry(r#"<d:NEW_DATE>1990-01-02T00:00:00</d:NEW_DATE><d:BC_1YEAR>7.95</d:BC_1YEAR>"#),
        );
        let entries = parse_feed(&feed_doc(&entries_xml), 1990)?;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].date, NaiveDate::from_ymd_opt(1990, 1, 3).unwrap());
        assert_eq!(entries[1].date, NaiveDate::from_ymd_opt(1990, 1, 2).unwrap());
        Ok(())
    }

    #[test]
    fn accepts_bare_date_without_time() -> Result<(), Error> {
        let xml = feed_doc(&entry(
            r#"<d:NEW_DATE>1995-03-05</d:NEW_DATE><d:BC_3MONTH>5.81</d:BC_3MONTH>"#,
        ));
        let entries = parse_feed(&xml, 1995)?;
        assert_eq!(entries[0].date, NaiveDate::from_ymd_opt(1995, 3, 5).unwrap());
        Ok(())
    }

    #[test]
    fn rejects_document_without_feed_root() {
        let err = parse_feed("<html><body>not a feed</body></html>", 2020).unwrap_err();
        assert!(matches!(err, Error::InvalidFeedData { year: 2020, .. }));
    }

    #[test]
    fn rejects_feed_with_no_entries() {
        let err = parse_feed(&feed_doc(""), 2024).unwrap_err();
        assert!(matches!(err, Error::InvalidFeedData { year: 2024, .. }));
    }

    #[test]
    fn rejects_entry_missing_its_date() {
        let xml = feed_doc(&entry(r#"<d:BC_1MONTH>1.55</d:BC_1MONTH>"#));
        let err = parse_feed(&xml, 2020).unwrap_err();
        assert!(matches!(err, Error::InvalidFeedData { .. }));
    }
}
