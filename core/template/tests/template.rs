use std::fs;

use cftool_common::{select, Error, NodeKind};
use cftool_crypto::VaultKey;
use cftool_template::{SourceLayout, Template};
use cftool_vault::{VaultConfig, VaultStore};
use tempfile::TempDir;

const METADATA_TEMPLATE: &str = r#"
CFToolMetadata:
  Owner: Rad
  Tags:
    - Name: team
      Value: platform
Resources:
  SomeResource:
    Type: AWS::SNS::Topic
    Metadata: !meta Owner
    Properties:
      TopicName: !ref TopicName
      Tag: !meta Tags.[0].Value
"#;

fn project() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("imports")).unwrap();
    fs::create_dir(temp.path().join("files")).unwrap();
    temp
}

fn store(temp: &TempDir) -> VaultStore {
    VaultStore::new(VaultConfig::in_dir(temp.path()))
}

#[test]
fn metadata_lookup_and_export_filtering() {
    let temp = project();
    let path = temp.path().join("metadata.yml");
    fs::write(&path, METADATA_TEMPLATE).unwrap();

    let mut template = Template::new(SourceLayout::new(temp.path()), None);
    template.load(&path).unwrap();

    let doc = template.export().unwrap();
    let node = select(doc, "Resources.SomeResource.Metadata").unwrap();
    assert_eq!(node.kind, NodeKind::Scalar);
    assert_eq!(node.value, "Rad");

    let json: serde_json::Value = serde_json::from_str(&template.to_json().unwrap()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "Resources": {
                "SomeResource": {
                    "Type": "AWS::SNS::Topic",
                    "Metadata": "Rad",
                    "Properties": {
                        "TopicName": { "Ref": "TopicName" },
                        "Tag": "platform"
                    }
                }
            }
        })
    );
}

#[test]
fn vault_secrets_are_substituted() {
    let temp = project();
    let store = store(&temp);
    let key = VaultKey::generate();
    key.save(&store.config().key_path).unwrap();
    store
        .write(&key, b"Database:\n  Password: hunter2\n")
        .unwrap();

    let mut template = Template::new(SourceLayout::new(temp.path()), store.load());
    template
        .load_source(b"Password: !vault Database.Password\nOther: !vault Database.User\n")
        .unwrap();

    let doc = template.export().unwrap();
    assert_eq!(select(doc, "Password").unwrap().value, "hunter2");
    assert_eq!(select(doc, "Other").unwrap().value, "");
}

#[test]
fn vault_directive_without_key_yields_empty_string() {
    let temp = project();
    let store = store(&temp);

    let mut template = Template::new(SourceLayout::new(temp.path()), store.load());
    template.load_source(b"Password: !vault Database.Password\n").unwrap();

    assert_eq!(template.to_json().unwrap(), "{\n  \"Password\": \"\"\n}");
}

#[test]
fn nested_imports_resolve_in_one_pass() {
    let temp = project();
    fs::write(
        temp.path().join("imports/stack.yml"),
        "Resources:\n  Queue: !import queue\n",
    )
    .unwrap();
    fs::write(
        temp.path().join("imports/queue.yml"),
        "Type: AWS::SQS::Queue\nProperties:\n  RedrivePolicy: !ref DeadLetterArn\n  Script: !file init.sh\n",
    )
    .unwrap();
    fs::write(temp.path().join("files/init.sh"), "one\ntwo\nthree\n").unwrap();

    let mut template = Template::new(SourceLayout::new(temp.path()), None);
    template.load_source(b"!import stack\n").unwrap();

    let doc = template.export().unwrap();
    assert!(!doc.has_tags());

    let json: serde_json::Value = serde_json::from_str(&template.to_json().unwrap()).unwrap();
    assert_eq!(
        json["Resources"]["Queue"]["Properties"]["RedrivePolicy"],
        serde_json::json!({ "Ref": "DeadLetterArn" })
    );
    assert_eq!(
        json["Resources"]["Queue"]["Properties"]["Script"],
        serde_json::json!({ "Fn::Join": ["", ["one\n", "two\n", "three\n"]] })
    );
}

#[test]
fn unknown_tag_produces_no_document() {
    let temp = project();
    let mut template = Template::new(SourceLayout::new(temp.path()), None);

    let err = template.load_source(b"Value: !bogus thing\n").unwrap_err();
    assert!(matches!(err, Error::UnknownTag(tag) if tag == "!bogus"));
    assert!(matches!(template.export(), Err(Error::NotLoaded)));
}

#[test]
fn first_broken_import_in_document_order_is_reported() {
    let temp = project();
    fs::write(temp.path().join("imports/first.yml"), "a: [\n").unwrap();
    fs::write(temp.path().join("imports/second.yml"), "b: !bogus x\n").unwrap();

    let mut template = Template::new(SourceLayout::new(temp.path()), None);
    let err = template
        .load_source(b"- !import first\n- !import second\n")
        .unwrap_err();
    assert!(matches!(err, Error::Parse(m) if m.contains("first.yml")));
}

#[test]
fn scalar_text_survives_to_output() {
    let temp = project();
    let mut template = Template::new(SourceLayout::new(temp.path()), None);
    template
        .load_source(
            b"EngineVersion: 5.10\nPort: 0x1F\nEnabled: True\nEmpty: ~\nVersionRef: !ref 1.20\n",
        )
        .unwrap();

    let json: serde_json::Value = serde_json::from_str(&template.to_json().unwrap()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "EngineVersion": "5.10",
            "Port": "0x1F",
            "Enabled": "True",
            "Empty": "~",
            "VersionRef": { "Ref": "1.20" }
        })
    );
}
