/*!
 * Tests for the document model and Lexical tree handling
 */

use proofreader::document::{DocumentBody, DocumentStatus, LexicalTree, Node};
use proofreader::errors::TreeError;

use crate::common;

/// Test representation precedence
#[test]
fn test_fromRepresentations_shouldPreferTreeThenLegacyThenFlat() {
    let tree = DocumentBody::from_representations(
        Some(common::lexical_doc(&["Hi"])),
        Some("{}".to_string()),
        Some("<p>Hi</p>".to_string()),
    );
    assert_eq!(tree.representation(), "lexical");
    assert_eq!(tree.html(), Some("<p>Hi</p>"));

    let legacy = DocumentBody::from_representations(None, Some("{\"version\":\"0.3.1\"}".to_string()), None);
    assert_eq!(legacy.representation(), "mobiledoc");
    assert_eq!(legacy.html(), None);

    let flat = DocumentBody::from_representations(Some("  ".to_string()), Some(String::new()), Some("<p>x</p>".to_string()));
    assert_eq!(flat, DocumentBody::Flat { html: "<p>x</p>".to_string() });

    let empty = DocumentBody::from_representations(None, None, Some(String::new()));
    assert!(empty.is_empty());
    assert_eq!(empty.analysis_text(), "");
}

/// Test that analysis prefers HTML and falls back to the serialization
#[test]
fn test_analysisText_withoutHtml_shouldUseSerialization() {
    let lexical = common::lexical_doc(&["Only tree"]);
    let body = DocumentBody::Tree { lexical: lexical.clone(), html: None };
    assert_eq!(body.analysis_text(), lexical);

    let body = DocumentBody::Tree { lexical, html: Some("<p>Only tree</p>".to_string()) };
    assert_eq!(body.analysis_text(), "<p>Only tree</p>");
}

/// Test status parsing
#[test]
fn test_documentStatus_fromStr_shouldParseKnownStatuses() {
    assert_eq!("draft".parse::<DocumentStatus>().unwrap(), DocumentStatus::Draft);
    assert_eq!("published".parse::<DocumentStatus>().unwrap(), DocumentStatus::Published);
    assert!("archived-forever".parse::<DocumentStatus>().is_err());
    assert_eq!(DocumentStatus::Published.to_string(), "published");
}

/// Test that an untouched tree serializes back to the same bytes
#[test]
fn test_lexicalTree_roundTrip_shouldPreserveBytes() {
    let raw = common::lexical_doc(&["First paragraph.", "Second \"quoted\" one."]);

    let tree = LexicalTree::parse(&raw).unwrap();

    assert_eq!(tree.serialize().unwrap(), raw);
    assert_eq!(tree.text_leaves(), vec!["First paragraph.", "Second \"quoted\" one."]);
}

/// Test that unknown nodes and attributes survive a substitution
#[test]
fn test_lexicalTree_replaceFirst_shouldKeepOtherNodesIntact() {
    let raw = r#"{"root":{"children":[{"type":"image","src":"/a.png","version":1},{"children":[{"format":1,"text":"Bold teh","type":"text","version":1},{"type":"linebreak","version":1},{"format":0,"text":"teh end","type":"text","version":1}],"type":"paragraph","version":1}],"type":"root","version":1},"extra":true}"#;
    let mut tree = LexicalTree::parse(raw).unwrap();

    assert!(tree.replace_first("teh", "the"));

    let expected = raw.replacen("Bold teh", "Bold the", 1);
    assert_eq!(tree.serialize().unwrap(), expected);
    assert_eq!(tree.text_leaves(), vec!["Bold the", "teh end"]);
}

/// Test that a fragment spanning two leaves is not found
#[test]
fn test_lexicalTree_replaceFirst_acrossLeaves_shouldNotMatch() {
    let raw = r#"{"root":{"children":[{"children":[{"text":"Hello ","type":"text"},{"text":"world","type":"text"}],"type":"paragraph"}],"type":"root"}}"#;
    let mut tree = LexicalTree::parse(raw).unwrap();

    assert!(!tree.replace_first("Hello world", "Hi world"));
    assert_eq!(tree.serialize().unwrap(), raw);
}

/// Test malformed trees
#[test]
fn test_lexicalTree_parse_withMalformedInput_shouldFail() {
    assert!(matches!(LexicalTree::parse("not json"), Err(TreeError::Parse(_))));
    assert!(matches!(LexicalTree::parse("[]"), Err(TreeError::Parse(_))));
    assert!(matches!(LexicalTree::parse(r#"{"nope":{}}"#), Err(TreeError::Parse(_))));
    assert!(matches!(
        LexicalTree::parse(r#"{"root":{"children":{},"type":"root"}}"#),
        Err(TreeError::Parse(_))
    ));
    assert!(matches!(
        LexicalTree::parse(r#"{"root":{"children":[{"type":"text","text":7}],"type":"root"}}"#),
        Err(TreeError::Parse(_))
    ));
}

/// Test that the root is an element
#[test]
fn test_lexicalTree_root_shouldBeElement() {
    let tree = LexicalTree::parse(&common::lexical_doc(&["a", "b"])).unwrap();

    match tree.root() {
        Node::Element { children, .. } => assert_eq!(children.len(), 2),
        other => panic!("unexpected root {:?}", other),
    }
}
