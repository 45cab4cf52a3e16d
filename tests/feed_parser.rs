// tests/feed_parser.rs
use artist_timeline::error::FeedParseError;
use artist_timeline::ingest::feed_parser::parse_feed;

const SOOMPI_XML: &str = include_str!("fixtures/soompi_rss.xml");
const BROKEN_XML: &str = include_str!("fixtures/broken_rss.xml");

#[test]
fn fixture_items_come_out_in_document_order() {
    let items = parse_feed(SOOMPI_XML.as_bytes()).expect("fixture parses");
    assert_eq!(items.len(), 3);

    let first = &items[0];
    assert_eq!(first.title, "BTS Announces 2025 World Tour Dates");
    assert_eq!(first.guid.as_deref(), Some("soompi-1001"));
    assert_eq!(
        first.pub_date.as_deref(),
        Some("Tue, 04 Jun 2024 09:15:00 +0900")
    );
    let enc = first.enclosure.as_ref().expect("enclosure from self-closing tag");
    assert_eq!(enc.url.as_deref(), Some("https://img.soompi.example/1001.jpg"));
    assert_eq!(enc.media_type.as_deref(), Some("image/jpeg"));
    assert!(first
        .description
        .as_deref()
        .unwrap()
        .starts_with("<p>BTS will play"));
}

#[test]
fn cdata_sections_are_read_as_text() {
    let items = parse_feed(SOOMPI_XML.as_bytes()).unwrap();
    assert_eq!(items[1].title, "NewJeans Confirm Comeback With New Mini Album");
    assert_eq!(
        items[1].description.as_deref(),
        Some("<p>The group returns with a <em>mini album</em> this summer.</p>")
    );
    assert!(items[1].enclosure.is_none());
}

#[test]
fn missing_fields_stay_absent() {
    let items = parse_feed(SOOMPI_XML.as_bytes()).unwrap();
    let third = &items[2];
    assert_eq!(third.title, "");
    assert_eq!(third.pub_date, None);
    assert_eq!(third.guid, None);
    assert_eq!(third.description.as_deref(), Some("Item without a headline"));
}

#[test]
fn structural_failure_discards_closed_items_too() {
    let res = parse_feed(BROKEN_XML.as_bytes());
    assert!(matches!(res, Err(FeedParseError::Xml { .. })), "got {res:?}");
}

#[test]
fn html_entities_inside_text_are_decoded() {
    let xml = b"<rss><channel><item><title>Caf&eacute; Live</title></item></channel></rss>";
    let items = parse_feed(xml).unwrap();
    assert_eq!(items[0].title, "Caf\u{e9} Live");
}

#[test]
fn enclosure_without_url_is_dropped() {
    let xml = br#"<rss><channel><item><title>A</title><enclosure type="image/png"/></item></channel></rss>"#;
    let items = parse_feed(xml).unwrap();
    assert!(items[0].enclosure.is_none());
}

#[test]
fn enclosure_outside_item_is_ignored() {
    let xml = br#"<rss><channel><enclosure url="https://x.example/a.png"/><item><title>A</title></item></channel></rss>"#;
    let items = parse_feed(xml).unwrap();
    assert_eq!(items.len(), 1);
    assert!(items[0].enclosure.is_none());
}
