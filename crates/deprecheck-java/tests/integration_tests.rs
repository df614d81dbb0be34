//! Integration tests for the Java front end

use deprecheck_core::{MemberKind, TypeRef};
use deprecheck_java::{JavaParser, MemberDeclKind, Receiver};
use pretty_assertions::assert_eq;
use std::path::Path;

const FIXTURE: &str = "../../fixtures/chromium-mini";

#[test]
fn parse_fixture_browser() {
    let path = Path::new(FIXTURE).join("chrome/java/org/chromium/chrome/Browser.java");
    let unit = JavaParser::new().parse_file(&path).unwrap();

    assert_eq!(unit.syntax().package.as_deref(), Some("org.chromium.chrome"));
    assert_eq!(unit.declarations()[0].qualified_name, "org.chromium.chrome.Browser");

    let accesses: Vec<_> = unit.member_accesses().collect();
    assert_eq!(accesses.len(), 1);

    let access = accesses[0];
    assert_eq!(access.member, "navigateToDino");
    assert_eq!(access.kind, MemberKind::Method);
    assert_eq!(access.receiver, Receiver::Name("tab".to_string()));
    assert_eq!(access.receiver_type, Some(TypeRef::qualified("org.chromium.content.Tab")));

    // `tab.navigateToDino` on the tenth line
    assert_eq!(access.span.start.line, 9);
    assert_eq!(access.span.start.column, 8);
    assert_eq!(access.span.end.column, 26);
}

#[test]
fn parse_fixture_tab_declarations() {
    let path = Path::new(FIXTURE).join("content/java/org/chromium/content/Tab.java");
    let unit = JavaParser::new().parse_file(&path).unwrap();

    let tab = &unit.declarations()[0];
    assert_eq!(tab.qualified_name, "org.chromium.content.Tab");

    let deprecated: Vec<_> = tab
        .members
        .iter()
        .filter(|m| m.deprecation.is_some())
        .map(|m| m.name.as_str())
        .collect();
    assert_eq!(deprecated, vec!["navigateToDino", "navigateToUrl", "destroy"]);

    let destroy = tab.members.iter().find(|m| m.name == "destroy").unwrap();
    let deprecation = destroy.deprecation.as_ref().unwrap();
    assert!(deprecation.for_removal);
    assert_eq!(deprecation.since.as_deref(), Some("120"));

    let constructor = &tab.members[0];
    assert_eq!(constructor.kind, MemberDeclKind::Constructor);
}

#[test]
fn parse_fixture_shell_receivers() {
    let path = Path::new(FIXTURE).join("chrome/java/org/chromium/chrome/Shell.java");
    let unit = JavaParser::new().parse_file(&path).unwrap();

    let found: Vec<_> = unit
        .member_accesses()
        .map(|a| (a.member.as_str(), a.kind, a.receiver_type.as_ref().map(|t| t.name())))
        .collect();

    assert_eq!(
        found,
        vec![
            ("navigateToUrl", MemberKind::Method, Some("org.chromium.content.Tab")),
            ("navigate", MemberKind::Method, Some("org.chromium.content.Tab")),
            ("getWebContents", MemberKind::Method, Some("org.chromium.content.Tab")),
            ("stop", MemberKind::Method, Some("org.chromium.content.WebContents")),
            ("zoomLevel", MemberKind::Field, Some("org.chromium.content.WebContents")),
            ("mTab", MemberKind::Field, Some("org.chromium.chrome.Shell")),
            ("destroy", MemberKind::Method, Some("org.chromium.content.Tab")),
        ]
    );
}

#[test]
fn parse_every_fixture_file() {
    let parser = JavaParser::new();
    for file in [
        "chrome/java/org/chromium/chrome/Browser.java",
        "chrome/java/org/chromium/chrome/Shell.java",
        "content/java/org/chromium/content/Tab.java",
        "content/java/org/chromium/content/WebContents.java",
    ] {
        let path = Path::new(FIXTURE).join(file);
        assert!(parser.parse_file(&path).is_ok(), "failed to parse {}", file);
    }
}
