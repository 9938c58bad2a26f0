use std::sync::Arc;

use feedreply_core_types::PlatformVariant;
use feedreply_locator::{
    find_units, is_detail_view, resolve_anchor, resolve_input, Anchor, ContentExtractor,
    LocatorCatalog, CONTROL_ATTRIBUTE,
};
use feedreply_page_dom::{HostDocument, MemoryDocument};

const LINKEDIN_FEED: &str = r#"<html><body>
  <div class="feed-shared-update-v2" data-urn="urn:li:activity:1" data-height="320">
    <div class="update-components-actor">Jane Doe · Staff Engineer</div>
    <div class="update-components-text"><span>Great insight on scaling systems!</span></div>
    <div class="feed-shared-social-action-bar"><button>Like</button></div>
    <div class="comments-comment-box__form">
      <div class="ql-editor" contenteditable="true"></div>
    </div>
  </div>
  <div class="occludable-update" data-height="200">
    <p>Plain post without any known text container</p>
    <section><em>footer</em></section>
  </div>
  <div class="comments-comment-box__form">
    <div class="ql-editor" contenteditable="true" id="global-box"></div>
  </div>
</body></html>"#;

const X_FEED: &str = r#"<html><body>
  <div data-testid="cellInnerDiv">
    <article data-testid="tweet" role="article" data-height="180">
      <div data-testid="tweetText" lang="en">shipping on a friday again</div>
      <div role="group"><button>Reply</button></div>
    </article>
  </div>
  <div data-testid="cellInnerDiv">
    <article data-testid="tweet" role="article" data-height="150">
      <div lang="en">second tweet body text</div>
    </article>
  </div>
  <div data-testid="tweetTextarea_0" role="textbox" contenteditable="true" id="old"></div>
  <div data-testid="tweetTextarea_0" role="textbox" contenteditable="true" id="new"></div>
</body></html>"#;

fn catalog() -> Arc<LocatorCatalog> {
    Arc::new(LocatorCatalog::builtin().expect("builtin locators compile"))
}

#[test]
fn professional_units_are_deduplicated_across_patterns() {
    let doc = MemoryDocument::from_html("https://www.linkedin.com/feed/", LINKEDIN_FEED);
    let catalog = catalog();
    let set = catalog
        .for_platform(PlatformVariant::ProfessionalFeed)
        .unwrap();

    // The first post matches two unit patterns but is reported once.
    let units = find_units(&doc, set);
    assert_eq!(units.len(), 2);
}

#[test]
fn extraction_prefers_text_container_then_falls_back_to_unit_text() {
    let doc = MemoryDocument::from_html("https://www.linkedin.com/feed/", LINKEDIN_FEED);
    let catalog = catalog();
    let set = catalog
        .for_platform(PlatformVariant::ProfessionalFeed)
        .unwrap();
    let extractor = ContentExtractor::new(catalog.clone());
    let units = find_units(&doc, set);

    assert_eq!(
        extractor.extract(&doc, Some(units[0]), PlatformVariant::ProfessionalFeed),
        "Great insight on scaling systems!"
    );
    assert_eq!(
        extractor.extract(&doc, Some(units[1]), PlatformVariant::ProfessionalFeed),
        "Plain post without any known text container footer"
    );
}

#[test]
fn extraction_ignores_injected_control_text() {
    let doc = MemoryDocument::from_html("https://www.linkedin.com/feed/", LINKEDIN_FEED);
    let catalog = catalog();
    let set = catalog
        .for_platform(PlatformVariant::ProfessionalFeed)
        .unwrap();
    let unit = find_units(&doc, set)[1];
    let control = doc
        .add_element(unit, "div", &[(CONTROL_ATTRIBUTE, "x")])
        .unwrap();
    doc.add_text(control, "Generating…").unwrap();

    let text = ContentExtractor::new(catalog.clone()).extract(
        &doc,
        Some(unit),
        PlatformVariant::ProfessionalFeed,
    );
    assert!(!text.contains("Generating"));
}

#[test]
fn anchors_prefer_action_bar_then_last_child() {
    let doc = MemoryDocument::from_html("https://www.linkedin.com/feed/", LINKEDIN_FEED);
    let catalog = catalog();
    let set = catalog
        .for_platform(PlatformVariant::ProfessionalFeed)
        .unwrap();
    let units = find_units(&doc, set);

    let first = resolve_anchor(&doc, units[0], set);
    assert!(matches!(first, Anchor::Actions(_)));
    assert_eq!(
        doc.attribute(first.node(), "class").as_deref(),
        Some("feed-shared-social-action-bar")
    );

    let second = resolve_anchor(&doc, units[1], set);
    assert_eq!(doc.tag_name(second.node()).as_deref(), Some("section"));

    let empty = doc.add_element(doc.body(), "div", &[]).unwrap();
    assert_eq!(resolve_anchor(&doc, empty, set), Anchor::Unit(empty));
}

#[test]
fn professional_input_prefers_unit_then_document() {
    let doc = MemoryDocument::from_html("https://www.linkedin.com/feed/", LINKEDIN_FEED);
    let catalog = catalog();
    let set = catalog
        .for_platform(PlatformVariant::ProfessionalFeed)
        .unwrap();
    let units = find_units(&doc, set);

    let own = resolve_input(&doc, Some(units[0]), set).unwrap();
    assert_eq!(doc.parent(own).and_then(|p| doc.parent(p)), Some(units[0]));

    // Without a box of its own the second post falls back to the first box in
    // the document, which is the first post's until that one goes away.
    assert_eq!(resolve_input(&doc, Some(units[1]), set), Some(own));
    doc.remove(own).unwrap();
    let fallback = resolve_input(&doc, Some(units[1]), set).unwrap();
    assert_eq!(doc.attribute(fallback, "id").as_deref(), Some("global-box"));
}

#[test]
fn microblog_input_is_latest_composer() {
    let doc = MemoryDocument::from_html("https://x.com/home", X_FEED);
    let catalog = catalog();
    let set = catalog.for_platform(PlatformVariant::Microblog).unwrap();
    let composer = resolve_input(&doc, None, set).unwrap();
    assert_eq!(doc.attribute(composer, "id").as_deref(), Some("new"));
}

#[test]
fn detail_view_by_address_or_single_tall_unit() {
    let catalog = catalog();
    let set = catalog.for_platform(PlatformVariant::Microblog).unwrap();

    let feed = MemoryDocument::from_html("https://x.com/home", X_FEED);
    assert!(!is_detail_view(&feed, set));

    let by_url = MemoryDocument::from_html("https://x.com/jack/status/20", X_FEED);
    assert!(is_detail_view(&by_url, set));

    let single = MemoryDocument::from_html(
        "https://x.com/home",
        r#"<body><article data-testid="tweet" data-height="400">one tall tweet</article></body>"#,
    );
    single.set_viewport_height(1000.0);
    assert!(is_detail_view(&single, set));
    single.set_viewport_height(2000.0);
    assert!(!is_detail_view(&single, set));

    let pro = catalog
        .for_platform(PlatformVariant::ProfessionalFeed)
        .unwrap();
    assert!(is_detail_view(&feed, pro));
}
