//! A stand-in for a client-side framework that owns its composer state: it
//! re-renders the composer from its own model on every `input` event, so
//! direct writes are thrown away, and it only learns new text from paste
//! events.

use std::sync::Arc;

use feedreply_core_types::PlatformVariant;
use feedreply_injection::{
    DirectAssignment, InjectionMethod, InjectionStrategy, InjectionWriter, SurfaceKind,
};
use feedreply_locator::LocatorCatalog;
use feedreply_page_dom::{
    listener, DomError, EventKind, HostDocument, ListenerVerdict, MemoryDocument, NodeId,
};
use parking_lot::Mutex;

struct Composer {
    doc: Arc<MemoryDocument>,
    node: NodeId,
    model: Arc<Mutex<String>>,
}

fn mount_composer(paste: PasteBehaviour) -> Composer {
    let doc = Arc::new(MemoryDocument::new("https://x.com/jack/status/20"));
    let tweet = doc
        .add_element(doc.body(), "article", &[("data-testid", "tweet")])
        .unwrap();
    doc.add_text(tweet, "original tweet text").unwrap();
    let node = doc
        .add_element(
            doc.body(),
            "div",
            &[
                ("data-testid", "tweetTextarea_0"),
                ("role", "textbox"),
                ("contenteditable", "true"),
            ],
        )
        .unwrap();
    let model = Arc::new(Mutex::new(String::new()));

    {
        let (page, model) = (doc.clone(), model.clone());
        doc.add_listener(
            node,
            EventKind::Input,
            listener(move |ctx| {
                page.set_text(ctx.target, &model.lock())?;
                Ok(ListenerVerdict::Continue)
            }),
        );
    }

    {
        let model = model.clone();
        doc.add_listener(
            node,
            EventKind::InsertText,
            listener(move |ctx| {
                if let Some(data) = ctx.event.data.as_deref() {
                    model.lock().push_str(data);
                }
                Ok(ListenerVerdict::Continue)
            }),
        );
    }

    match paste {
        PasteBehaviour::Accept => {
            let (page, model) = (doc.clone(), model.clone());
            doc.add_listener(
                node,
                EventKind::Paste,
                listener(move |ctx| {
                    let mut model = model.lock();
                    model.push_str(ctx.event.data.as_deref().unwrap_or_default());
                    page.set_text(ctx.target, &model)?;
                    Ok(ListenerVerdict::PreventDefault)
                }),
            );
        }
        PasteBehaviour::AcceptFlattened => {
            let (page, model) = (doc.clone(), model.clone());
            doc.add_listener(
                node,
                EventKind::Paste,
                listener(move |ctx| {
                    let mut model = model.lock();
                    model.push_str(ctx.event.data.as_deref().unwrap_or_default());
                    // Each line becomes its own block, so the rendered text
                    // carries no newline characters.
                    let rendered = model.lines().collect::<Vec<_>>().join(" ");
                    page.set_text(ctx.target, &rendered)?;
                    Ok(ListenerVerdict::PreventDefault)
                }),
            );
        }
        PasteBehaviour::Ignore => {}
        PasteBehaviour::Throw => {
            doc.add_listener(
                node,
                EventKind::Paste,
                listener(|_| Err(DomError::ListenerFailed("clipboardData is null".into()))),
            );
        }
    }

    Composer { doc, node, model }
}

enum PasteBehaviour {
    Accept,
    AcceptFlattened,
    Ignore,
    Throw,
}

fn writer() -> InjectionWriter {
    InjectionWriter::new(Arc::new(LocatorCatalog::builtin().unwrap()))
}

const REPLY: &str = "Friday deploys build character.";

#[test]
fn paste_updates_framework_state() {
    let composer = mount_composer(PasteBehaviour::Accept);
    let report = writer()
        .inject(&*composer.doc, REPLY, None, PlatformVariant::Microblog)
        .unwrap();

    assert_eq!(report.surface, composer.node);
    assert_eq!(report.kind, SurfaceKind::FrameworkComposer);
    assert_eq!(report.method, InjectionMethod::Pasted);
    assert_eq!(*composer.model.lock(), REPLY);
    assert_eq!(composer.doc.text_content(composer.node), REPLY);
    assert_eq!(
        composer.doc.caret(),
        Some((composer.node, REPLY.chars().count()))
    );
}

#[test]
fn multi_line_paste_is_not_inserted_twice() {
    let reply = "Great thread.\nSaving this one.";
    let composer = mount_composer(PasteBehaviour::AcceptFlattened);
    let report = writer()
        .inject(&*composer.doc, reply, None, PlatformVariant::Microblog)
        .unwrap();

    assert_eq!(report.method, InjectionMethod::Pasted);
    assert_eq!(*composer.model.lock(), reply);
    assert_eq!(
        composer.doc.text_content(composer.node),
        "Great thread. Saving this one."
    );
}

#[test]
fn ignored_paste_falls_back_to_insertion() {
    let composer = mount_composer(PasteBehaviour::Ignore);
    let report = writer()
        .inject(&*composer.doc, REPLY, None, PlatformVariant::Microblog)
        .unwrap();

    assert_eq!(report.method, InjectionMethod::CharacterFallback);
    assert_eq!(*composer.model.lock(), REPLY);
    assert_eq!(composer.doc.text_content(composer.node), REPLY);
}

#[test]
fn throwing_paste_falls_back_to_insertion() {
    let composer = mount_composer(PasteBehaviour::Throw);
    let report = writer()
        .inject(&*composer.doc, REPLY, None, PlatformVariant::Microblog)
        .unwrap();

    assert_eq!(report.method, InjectionMethod::CharacterFallback);
    assert_eq!(*composer.model.lock(), REPLY);
}

#[test]
fn direct_assignment_is_discarded_by_the_framework() {
    let composer = mount_composer(PasteBehaviour::Accept);
    let method = DirectAssignment
        .inject_into(&*composer.doc, composer.node, REPLY)
        .unwrap();

    // The write "succeeds" but the framework re-renders from its empty model.
    assert_eq!(method, InjectionMethod::Assigned);
    assert!(composer.model.lock().is_empty());
    assert_eq!(composer.doc.text_content(composer.node), "");
}
