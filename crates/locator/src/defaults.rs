//! Built-in locator data. Bump [`LOCATOR_VERSION`] whenever a list changes so
//! configuration overrides can be checked against the shipped set.

use feedreply_core_types::PlatformVariant;

use crate::types::{DetailViewSpec, InputScope, LocatorSetSpec};

pub const LOCATOR_VERSION: u32 = 3;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

pub fn professional_feed() -> LocatorSetSpec {
    LocatorSetSpec {
        units: strings(&[
            "div.feed-shared-update-v2",
            "div[data-urn*='urn:li:activity']",
            "div.occludable-update",
        ]),
        text: strings(&[
            ".feed-shared-update-v2__description .break-words",
            ".feed-shared-inline-show-more-text",
            ".update-components-text",
            ".feed-shared-text",
            "span[dir='ltr']",
        ]),
        actions: strings(&[
            ".feed-shared-social-action-bar",
            ".social-details-social-actions",
            "[class*='social-actions']",
        ]),
        inputs: strings(&[
            ".comments-comment-box__form .ql-editor[contenteditable='true']",
            ".ql-editor[contenteditable='true']",
            "div[role='textbox'][contenteditable='true']",
            "[contenteditable='true']",
        ]),
        input_scope: InputScope::UnitThenDocument,
        min_unit_height: Some(100.0),
        min_text_chars: None,
        detail_view: None,
    }
}

pub fn microblog() -> LocatorSetSpec {
    LocatorSetSpec {
        units: strings(&[
            "article[data-testid='tweet']",
            "article[role='article']",
            "div[data-testid='cellInnerDiv'] article",
        ]),
        text: strings(&["div[data-testid='tweetText']", "div[lang]"]),
        actions: strings(&["div[role='group']"]),
        inputs: strings(&[
            "div[data-testid^='tweetTextarea_'][contenteditable='true']",
            "div[role='textbox'][contenteditable='true']",
            ".public-DraftEditor-content[contenteditable='true']",
        ]),
        input_scope: InputScope::LatestInDocument,
        min_unit_height: None,
        min_text_chars: Some(10),
        detail_view: Some(DetailViewSpec {
            url_pattern: r"/status/\d+".to_string(),
            unit: "article[data-testid='tweet']".to_string(),
            height_ratio: 0.3,
        }),
    }
}

pub fn for_platform(platform: PlatformVariant) -> Option<LocatorSetSpec> {
    match platform {
        PlatformVariant::ProfessionalFeed => Some(professional_feed()),
        PlatformVariant::Microblog => Some(microblog()),
        PlatformVariant::Unknown => None,
    }
}
